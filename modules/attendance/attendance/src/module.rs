use std::sync::Arc;

use attendance_sdk::AttendanceClientV1;
use axum::Router;
use campus_auth::Guard;
use sea_orm::{DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::api::rest::routes;
use crate::config::AttendanceConfig;
use crate::domain::local_client::AttendanceLocalClient;
use crate::domain::service::Service;
use crate::infra::storage::SeaOrmAttendanceRepository;
use crate::infra::storage::migrations::Migrator;

/// Attendance module: wires the sea-orm repository into the service and
/// exposes it over REST and in-process.
pub struct AttendanceModule {
    service: Arc<Service>,
}

impl AttendanceModule {
    #[must_use]
    pub fn new(config: AttendanceConfig, db: DatabaseConnection) -> Self {
        let repo = Arc::new(SeaOrmAttendanceRepository::new(db));
        Self {
            service: Arc::new(Service::new(repo, config)),
        }
    }

    /// Apply this module's schema migrations.
    ///
    /// # Errors
    /// Propagates migration failures.
    pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
        Migrator::up(db, None).await?;
        info!("attendance migrations applied");
        Ok(())
    }

    #[must_use]
    pub fn client(&self) -> Arc<dyn AttendanceClientV1> {
        Arc::new(AttendanceLocalClient::new(self.service.clone()))
    }

    #[must_use]
    pub fn router(&self, guard: &Guard) -> Router {
        routes::router(self.service.clone(), guard)
    }
}
