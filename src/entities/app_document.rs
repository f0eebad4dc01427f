//! App document entity - key/value rows holding serialized documents.
//! The whole tracker state is one JSON document stored under a single key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored document row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_documents")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Document key (e.g., `"calorie_quest_root_v1"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Serialized document body
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// When this document was last written
    pub updated_at: DateTime,
}

/// `AppDocument` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
