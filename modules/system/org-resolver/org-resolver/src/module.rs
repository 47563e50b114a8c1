use std::sync::Arc;

use axum::Router;
use campus_auth::Guard;
use campus_security::MetadataWriter;
use org_resolver_sdk::OrgResolverClient;
use sea_orm::{DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::api::rest::routes;
use crate::config::OrgResolverConfig;
use crate::domain::local_client::OrgResolverLocalClient;
use crate::domain::service::Service;
use crate::infra::storage::SeaOrmUserDirectory;
use crate::infra::storage::migrations::Migrator;

/// Org resolver module: wires the user directory, the metadata writer and
/// the resolution service.
pub struct OrgResolverModule {
    service: Arc<Service>,
}

impl OrgResolverModule {
    #[must_use]
    pub fn new(
        config: OrgResolverConfig,
        db: DatabaseConnection,
        writer: Arc<dyn MetadataWriter>,
    ) -> Self {
        let directory = Arc::new(SeaOrmUserDirectory::new(db));
        Self {
            service: Arc::new(Service::new(config, directory, writer)),
        }
    }

    /// Apply this module's schema migrations.
    ///
    /// # Errors
    /// Propagates migration failures.
    pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
        Migrator::up(db, None).await?;
        info!("org-resolver migrations applied");
        Ok(())
    }

    #[must_use]
    pub fn client(&self) -> Arc<dyn OrgResolverClient> {
        Arc::new(OrgResolverLocalClient::new(self.service.clone()))
    }

    #[must_use]
    pub fn router(&self, guard: &Guard) -> Router {
        routes::router(self.service.clone(), guard)
    }
}
