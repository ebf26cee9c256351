//! `SeaORM` Entity for bank_transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub external_id: String,
    pub date: Date,
    /// Signed amount in minor units.
    pub amount: i64,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub memo: Option<String>,
    pub reference: Option<String>,
    pub counterpart_id: Option<Uuid>,
    pub status: String,
    pub imported_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::classification_proposals::Entity")]
    ClassificationProposals,
    #[sea_orm(has_many = "super::split_lines::Entity")]
    SplitLines,
}

impl Related<super::classification_proposals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassificationProposals.def()
    }
}

impl Related<super::split_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SplitLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
