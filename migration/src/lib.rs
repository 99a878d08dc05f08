pub use sea_orm_migration::prelude::*;

mod m20260902_000001_create_batches_and_students;
mod m20260902_000002_create_subscription_plans;
mod m20260903_000001_create_student_subscriptions;
mod m20260910_000001_create_exams;
mod m20260915_000001_add_single_active_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260902_000001_create_batches_and_students::Migration),
            Box::new(m20260902_000002_create_subscription_plans::Migration),
            Box::new(m20260903_000001_create_student_subscriptions::Migration),
            Box::new(m20260910_000001_create_exams::Migration),
            Box::new(m20260915_000001_add_single_active_indexes::Migration),
        ]
    }
}
