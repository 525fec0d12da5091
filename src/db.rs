//! Storage layer
//!
//! Generic CRUD operations shared by all domain routers.

pub mod store;
