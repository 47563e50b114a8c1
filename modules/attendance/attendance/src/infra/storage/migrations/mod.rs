use sea_orm::sea_query::{Alias, DynIden, IntoIden};
use sea_orm_migration::prelude::*;

mod m20260301_000001_create_attendance;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260301_000001_create_attendance::Migration)]
    }

    fn migration_table_name() -> DynIden {
        Alias::new("attendance_migrations").into_iden()
    }
}
