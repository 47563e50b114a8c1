#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use campus_security::{Identity, MetadataWriteError, MetadataWriter, Role, UserMetadata};
use org_resolver_sdk::{OrgSource, ResolveOptions};
use serde_json::json;
use tracing_test::traced_test;

use super::error::DomainError;
use super::ports::UserDirectory;
use super::service::{Service, effective_roles};
use crate::config::OrgResolverConfig;

enum DirectoryBehavior {
    Rows(HashMap<String, Option<String>>),
    Fails,
}

struct MockDirectory(DirectoryBehavior);

#[async_trait]
impl UserDirectory for MockDirectory {
    async fn get_org_id(&self, identity_id: &str) -> Result<Option<String>, DomainError> {
        match &self.0 {
            DirectoryBehavior::Rows(rows) => Ok(rows.get(identity_id).cloned().flatten()),
            DirectoryBehavior::Fails => Err(DomainError::database("connection refused")),
        }
    }
}

#[derive(Default)]
struct MockWriter {
    writes: Mutex<Vec<(String, UserMetadata)>>,
}

#[async_trait]
impl MetadataWriter for MockWriter {
    async fn update_metadata(
        &self,
        identity_id: &str,
        metadata: UserMetadata,
    ) -> Result<(), MetadataWriteError> {
        self.writes
            .lock()
            .unwrap()
            .push((identity_id.to_owned(), metadata));
        Ok(())
    }
}

fn directory_with(rows: &[(&str, Option<&str>)]) -> Arc<MockDirectory> {
    Arc::new(MockDirectory(DirectoryBehavior::Rows(
        rows.iter()
            .map(|(id, org)| ((*id).to_owned(), org.map(str::to_owned)))
            .collect(),
    )))
}

fn service(directory: Arc<dyn UserDirectory>, config: OrgResolverConfig) -> (Service, Arc<MockWriter>) {
    let writer = Arc::new(MockWriter::default());
    (Service::new(config, directory, writer.clone()), writer)
}

fn identity(raw: &serde_json::Value) -> Identity {
    Identity::from_raw_metadata("user-1", "user-1@school.test", raw)
}

#[tokio::test]
async fn null_metadata_org_falls_back_to_user_record() {
    let (svc, _) = service(
        directory_with(&[("user-1", Some("org-42"))]),
        OrgResolverConfig::default(),
    );

    let access = svc
        .resolve(&identity(&json!({ "org_id": null })), &ResolveOptions::required())
        .await
        .unwrap();

    assert_eq!(access.org_id.as_deref(), Some("org-42"));
    assert_eq!(access.org_source, Some(OrgSource::UserRecord));
}

#[tokio::test]
#[traced_test]
async fn metadata_wins_over_disagreeing_user_record() {
    let (svc, _) = service(
        directory_with(&[("user-1", Some("org-record"))]),
        OrgResolverConfig::default(),
    );

    let access = svc
        .resolve(&identity(&json!({ "orgId": "org-meta" })), &ResolveOptions::required())
        .await
        .unwrap();

    assert_eq!(access.org_id.as_deref(), Some("org-meta"));
    assert_eq!(access.org_source, Some(OrgSource::Metadata));
    assert_eq!(access.conflicting_org_id.as_deref(), Some("org-record"));
    assert!(logs_contain("disagrees with user record"));
}

#[tokio::test]
async fn default_org_only_when_allowed() {
    let config = OrgResolverConfig {
        default_org_id: Some("org-default".to_owned()),
        ..OrgResolverConfig::default()
    };
    let (svc, _) = service(directory_with(&[]), config);
    let who = identity(&json!({}));

    let err = svc.resolve(&who, &ResolveOptions::required()).await.unwrap_err();
    assert!(matches!(err, DomainError::MissingOrgId { identity_id } if identity_id == "user-1"));

    let access = svc
        .resolve(&who, &ResolveOptions::required().with_default())
        .await
        .unwrap();
    assert_eq!(access.org_id.as_deref(), Some("org-default"));
    assert_eq!(access.org_source, Some(OrgSource::Default));
}

#[tokio::test]
#[traced_test]
async fn user_record_failure_is_treated_as_miss() {
    let config = OrgResolverConfig {
        default_org_id: Some("org-default".to_owned()),
        ..OrgResolverConfig::default()
    };
    let (svc, _) = service(Arc::new(MockDirectory(DirectoryBehavior::Fails)), config);

    let access = svc
        .resolve(&identity(&json!({})), &ResolveOptions::required().with_default())
        .await
        .unwrap();

    assert_eq!(access.org_source, Some(OrgSource::Default));
    assert!(logs_contain("user record lookup failed"));
}

#[tokio::test]
async fn optional_resolution_without_org_succeeds() {
    let (svc, _) = service(directory_with(&[]), OrgResolverConfig::default());

    let access = svc
        .resolve(&identity(&json!({})), &ResolveOptions::optional())
        .await
        .unwrap();

    assert_eq!(access.org_id, None);
    assert_eq!(access.org_source, None);
    assert_eq!(access.roles, vec![Role::Parent]);
    assert_eq!(access.active_role, Role::Parent);
}

#[test]
fn active_role_not_held_falls_back_to_first_role() {
    let metadata = UserMetadata::default()
        .with_roles([Role::Teacher, Role::Parent])
        .with_active_role(Role::Admin);

    let (roles, active) = effective_roles(&metadata, Role::Parent);
    assert_eq!(roles, vec![Role::Teacher, Role::Parent]);
    assert_eq!(active, Role::Teacher);
}

#[test]
fn baseline_role_is_configurable() {
    let (roles, active) = effective_roles(&UserMetadata::default(), Role::Teacher);
    assert_eq!(roles, vec![Role::Teacher]);
    assert_eq!(active, Role::Teacher);
}

#[tokio::test]
async fn switch_to_unheld_role_is_rejected_without_write() {
    let (svc, writer) = service(directory_with(&[]), OrgResolverConfig::default());
    let who = identity(&json!({ "roles": ["teacher"], "org_id": "org-1" }));

    let err = svc.switch_active_role(&who, Role::Principal).await.unwrap_err();

    assert!(matches!(err, DomainError::RoleNotHeld { role: Role::Principal }));
    assert!(writer.writes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn switch_role_persists_metadata() {
    let (svc, writer) = service(directory_with(&[]), OrgResolverConfig::default());
    let who = identity(&json!({ "roles": ["teacher", "parent"], "activeRole": "teacher", "org_id": "org-1" }));

    let access = svc.switch_active_role(&who, Role::Parent).await.unwrap();

    assert_eq!(access.active_role, Role::Parent);
    assert_eq!(access.org_id.as_deref(), Some("org-1"));
    let writes = writer.writes.lock().unwrap();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].0, "user-1");
    assert_eq!(writes[0].1.active_role, Some(Role::Parent));
}
