use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Older duplicates are retired first so the unique indexes can be built.
const UP: [&str; 4] = [
    "UPDATE student_subscriptions s SET status = 'cancelled', updated_at = now() \
     WHERE s.status = 'active' AND EXISTS ( \
        SELECT 1 FROM student_subscriptions n \
        WHERE n.student_id = s.student_id AND n.status = 'active' \
          AND (n.start_date, n.id) > (s.start_date, s.id))",
    "CREATE UNIQUE INDEX IF NOT EXISTS uq_student_subscriptions_one_active \
     ON student_subscriptions(student_id) WHERE status = 'active'",
    "UPDATE batch_subscription_assignments a SET is_active = false \
     WHERE a.is_active AND EXISTS ( \
        SELECT 1 FROM batch_subscription_assignments n \
        WHERE n.batch_id = a.batch_id AND n.is_active \
          AND (n.assigned_at, n.id) > (a.assigned_at, a.id))",
    "CREATE UNIQUE INDEX IF NOT EXISTS uq_batch_assignments_one_active \
     ON batch_subscription_assignments(batch_id) WHERE is_active",
];

const DOWN: [&str; 2] = [
    "DROP INDEX IF EXISTS uq_batch_assignments_one_active",
    "DROP INDEX IF EXISTS uq_student_subscriptions_one_active",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // SeaQuery has no WHERE clause on index creation
        for sql in UP {
            manager.get_connection().execute_unprepared(sql).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for sql in DOWN {
            manager.get_connection().execute_unprepared(sql).await?;
        }
        Ok(())
    }
}
