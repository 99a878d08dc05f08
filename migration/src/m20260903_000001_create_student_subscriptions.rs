use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

use crate::m20260902_000001_create_batches_and_students::Students;
use crate::m20260902_000002_create_subscription_plans::SubscriptionPlans;

#[derive(DeriveIden)]
enum StudentSubscriptions {
    Table,
    Id,
    StudentId,
    PlanId,
    StartDate,
    EndDate,
    Status,
    PaymentReference,
    AmountPaid,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("subscription_status"))
                    .values(vec![
                        Alias::new("active"),
                        Alias::new("expired"),
                        Alias::new("suspended"),
                        Alias::new("cancelled"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StudentSubscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentSubscriptions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StudentSubscriptions::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentSubscriptions::PlanId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentSubscriptions::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentSubscriptions::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentSubscriptions::Status)
                            .custom(Alias::new("subscription_status"))
                            .not_null()
                            .default(Expr::cust("'active'::subscription_status")),
                    )
                    .col(
                        ColumnDef::new(StudentSubscriptions::PaymentReference)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(StudentSubscriptions::AmountPaid)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentSubscriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StudentSubscriptions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    // 订阅记录永不物理删除
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_subscriptions_student")
                            .from(StudentSubscriptions::Table, StudentSubscriptions::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_subscriptions_plan")
                            .from(StudentSubscriptions::Table, StudentSubscriptions::PlanId)
                            .to(SubscriptionPlans::Table, SubscriptionPlans::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_student_subscriptions_student")
                    .table(StudentSubscriptions::Table)
                    .col(StudentSubscriptions::StudentId)
                    .to_owned(),
            )
            .await?;

        // expiry sweep scans by (status, end_date)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_student_subscriptions_status_end")
                    .table(StudentSubscriptions::Table)
                    .col(StudentSubscriptions::Status)
                    .col(StudentSubscriptions::EndDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(StudentSubscriptions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_type(
                Type::drop()
                    .name(Alias::new("subscription_status"))
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
