//! API handlers module

pub mod documents;
pub mod edit;
pub mod expiry;
pub mod health;
pub mod query;
pub mod seed;
pub mod share;
