use sea_orm::sea_query::{Alias, DynIden, IntoIden};
use sea_orm_migration::prelude::*;

mod m20260301_000001_create_users;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260301_000001_create_users::Migration)]
    }

    // Modules share one database, each keeps its own migration history.
    fn migration_table_name() -> DynIden {
        Alias::new("org_resolver_migrations").into_iden()
    }
}
