use sea_orm_migration::prelude::*;

use crate::m20260902_000001_create_batches_and_students::Batches;

#[derive(DeriveIden)]
enum Exams {
    Table,
    Id,
    Title,
    Subject,
    CollegeId,
    DurationMinutes,
    IsPublished,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ExamBatches {
    Table,
    ExamId,
    BatchId,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Exams::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Exams::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Exams::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Exams::Subject).string_len(255).null())
                    .col(ColumnDef::new(Exams::CollegeId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Exams::DurationMinutes)
                            .integer()
                            .not_null()
                            .default(60),
                    )
                    .col(
                        ColumnDef::new(Exams::IsPublished)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Exams::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Exams::UpdatedAt)
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
                    .table(ExamBatches::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ExamBatches::ExamId).big_integer().not_null())
                    .col(ColumnDef::new(ExamBatches::BatchId).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(ExamBatches::ExamId)
                            .col(ExamBatches::BatchId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_exam_batches_exam")
                            .from(ExamBatches::Table, ExamBatches::ExamId)
                            .to(Exams::Table, Exams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_exam_batches_batch")
                            .from(ExamBatches::Table, ExamBatches::BatchId)
                            .to(Batches::Table, Batches::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 按批次查询考试
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_exam_batches_batch")
                    .table(ExamBatches::Table)
                    .col(ExamBatches::BatchId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(ExamBatches::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Exams::Table).to_owned())
            .await?;
        Ok(())
    }
}
