use sea_orm_migration::prelude::*;

use crate::m20260902_000001_create_batches_and_students::Batches;

#[derive(DeriveIden)]
pub(crate) enum SubscriptionPlans {
    Table,
    Id,
    Name,
    Price,
    DurationMonths,
    IsActive,
    IsDefault,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SubscriptionPlanColleges {
    Table,
    PlanId,
    CollegeId,
}

#[derive(DeriveIden)]
enum BatchSubscriptionAssignments {
    Table,
    Id,
    BatchId,
    PlanId,
    IsActive,
    AssignedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SubscriptionPlans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubscriptionPlans::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::Name)
                            .string_len(255)
                            .not_null(),
                    )
                    // 价格以最小货币单位存储
                    .col(
                        ColumnDef::new(SubscriptionPlans::Price)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::DurationMonths)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlans::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SubscriptionPlanColleges::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubscriptionPlanColleges::PlanId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionPlanColleges::CollegeId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(SubscriptionPlanColleges::PlanId)
                            .col(SubscriptionPlanColleges::CollegeId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_plan_colleges_plan")
                            .from(
                                SubscriptionPlanColleges::Table,
                                SubscriptionPlanColleges::PlanId,
                            )
                            .to(SubscriptionPlans::Table, SubscriptionPlans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BatchSubscriptionAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BatchSubscriptionAssignments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BatchSubscriptionAssignments::BatchId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BatchSubscriptionAssignments::PlanId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BatchSubscriptionAssignments::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(BatchSubscriptionAssignments::AssignedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_batch_assignments_batch")
                            .from(
                                BatchSubscriptionAssignments::Table,
                                BatchSubscriptionAssignments::BatchId,
                            )
                            .to(Batches::Table, Batches::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    // 有分配记录的套餐不能被删除
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_batch_assignments_plan")
                            .from(
                                BatchSubscriptionAssignments::Table,
                                BatchSubscriptionAssignments::PlanId,
                            )
                            .to(SubscriptionPlans::Table, SubscriptionPlans::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // unique (batch_id, plan_id); one active row per batch is kept by the service layer
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_batch_assignments_batch_plan")
                    .table(BatchSubscriptionAssignments::Table)
                    .col(BatchSubscriptionAssignments::BatchId)
                    .col(BatchSubscriptionAssignments::PlanId)
                    .unique()
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
                    .table(BatchSubscriptionAssignments::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(SubscriptionPlanColleges::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(SubscriptionPlans::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
