use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m202608250001_create_users::Migration),
            Box::new(migrations::m202608250002_create_categories::Migration),
            Box::new(migrations::m202608250003_create_training_sessions::Migration),
            Box::new(migrations::m202608250004_create_enrollments::Migration),
            Box::new(migrations::m202608250005_create_attendance::Migration),
        ]
    }
}
