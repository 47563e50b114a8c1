//! Layered server configuration.
//!
//! Sources, later ones winning: built-in defaults, the YAML file given with
//! `--config`, `CAMPUS__*` environment variables (`__` separates sections),
//! then command line overrides.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use attendance::config::AttendanceConfig;
use campus_auth::StaticAuthConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use org_resolver::config::OrgResolverConfig;
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "CAMPUS__";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub auth: StaticAuthConfig,
    /// User records seeded into the directory at startup.
    pub users: Vec<UserRecordConfig>,
    pub modules: ModulesConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8087".to_owned(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_owned(),
            max_connections: 5,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `info,attendance=debug`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserRecordConfig {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub org_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModulesConfig {
    pub org_resolver: OrgResolverConfig,
    pub attendance: AttendanceConfig,
}

impl AppConfig {
    /// Merge defaults, the optional YAML file and the environment.
    ///
    /// # Errors
    /// Returns an error if a source cannot be read or the merged result
    /// does not match the schema.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid configuration")
    }

    /// Apply `--port` and `-v` on top of the loaded configuration.
    ///
    /// # Errors
    /// Returns an error if the port must be replaced in an unparsable bind address.
    pub fn apply_cli_overrides(&mut self, port: Option<u16>, verbose: u8) -> Result<()> {
        if let Some(port) = port {
            let mut addr = self.bind_addr()?;
            addr.set_port(port);
            self.server.bind_addr = addr.to_string();
        }
        match verbose {
            0 => {}
            1 => "info".clone_into(&mut self.logging.level),
            2 => "debug".clone_into(&mut self.logging.level),
            _ => "trace".clone_into(&mut self.logging.level),
        }
        Ok(())
    }

    /// # Errors
    /// Returns an error if `server.bind_addr` is not `host:port`.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind_addr
            .parse()
            .with_context(|| format!("invalid server.bind_addr '{}'", self.server.bind_addr))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use campus_auth::StaticIdentity;
    use figment::Jail;

    #[test]
    fn defaults_without_sources() {
        Jail::expect_with(|_| {
            let cfg = AppConfig::load(None).map_err(|e| e.to_string())?;
            assert_eq!(cfg, AppConfig::default());
            assert_eq!(cfg.modules.attendance.max_batch_size, 500);
            Ok(())
        });
    }

    #[test]
    fn yaml_then_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "campus.yaml",
                r#"
server:
  bind_addr: "0.0.0.0:9000"
logging:
  format: json
auth:
  identities:
    - token: tok-1
      id: teacher-1
      email: t1@school.test
      metadata:
        organization_id: org-1
        role: teacher
modules:
  org_resolver:
    default_org_id: org-default
  attendance:
    max_batch_size: 50
"#,
            )?;
            jail.set_env("CAMPUS__MODULES__ATTENDANCE__MAX_BATCH_SIZE", "20");
            jail.set_env("CAMPUS__LOGGING__LEVEL", "debug");

            let cfg =
                AppConfig::load(Some(Path::new("campus.yaml"))).map_err(|e| e.to_string())?;

            assert_eq!(cfg.server.bind_addr, "0.0.0.0:9000");
            assert_eq!(cfg.logging.format, LogFormat::Json);
            assert_eq!(cfg.logging.level, "debug");
            assert_eq!(cfg.modules.attendance.max_batch_size, 20);
            assert_eq!(
                cfg.modules.org_resolver.default_org_id.as_deref(),
                Some("org-default")
            );
            let StaticIdentity { id, metadata, .. } = &cfg.auth.identities[0];
            assert_eq!(id, "teacher-1");
            assert_eq!(metadata["organization_id"], "org-1");
            Ok(())
        });
    }

    #[test]
    fn unknown_keys_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("campus.yaml", "modules:\n  attendance:\n    batch: 5\n")?;
            assert!(AppConfig::load(Some(Path::new("campus.yaml"))).is_err());
            Ok(())
        });
    }

    #[test]
    fn cli_overrides_port_and_verbosity() {
        let mut cfg = AppConfig::default();

        cfg.apply_cli_overrides(Some(9100), 2).unwrap();

        assert_eq!(cfg.server.bind_addr, "127.0.0.1:9100");
        assert_eq!(cfg.logging.level, "debug");
    }
}
