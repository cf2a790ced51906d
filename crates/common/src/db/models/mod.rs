//! SeaORM entity models
//!
//! Database entities for LexForge

mod document;

pub use document::{
    display_size,
    Entity as DocumentEntity,
    Model as Document,
    ActiveModel as DocumentActiveModel,
    Column as DocumentColumn,
};
