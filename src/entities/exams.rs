use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "exams")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub subject: Option<String>,
    pub college_id: i64,
    pub duration_minutes: i32,
    pub is_published: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::exam_batches::Entity")]
    ExamBatches,
}

impl Related<super::exam_batches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExamBatches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
