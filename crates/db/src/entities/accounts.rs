//! `SeaORM` Entity for accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub code: String,
    pub name: String,
    pub account_type: String,
    pub nature: String,
    pub analytical: bool,
    pub active: bool,
    pub parent_code: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::split_lines::Entity")]
    SplitLines,
    #[sea_orm(has_many = "super::classification_rules::Entity")]
    ClassificationRules,
}

impl Related<super::split_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SplitLines.def()
    }
}

impl Related<super::classification_rules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassificationRules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
