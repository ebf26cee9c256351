//! `SeaORM` Entity for approval_decisions table.
//!
//! Rows are append-only; a trigger refuses updates and deletes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "approval_decisions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// `proposal` or `account_request`.
    pub subject_type: String,
    pub subject_id: Uuid,
    pub reviewer: Uuid,
    pub decision: String,
    pub decided_at: DateTimeWithTimeZone,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
