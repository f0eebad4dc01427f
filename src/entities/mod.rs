//! Entity module - `SeaORM` entity definitions for the local store.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod app_document;

pub use app_document::{
    Column as AppDocumentColumn, Entity as AppDocument, Model as AppDocumentModel,
};
