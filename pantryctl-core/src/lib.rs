//! pantryctl-core: domain types and validation for the pantry inventory service
//!
//! This crate holds everything that is independent of the storage and HTTP
//! layers:
//! - Entity types (items, categories, stock transactions, projects)
//! - Input validation (barcode normalization, lenient integer coercion)
//! - Configuration loading for the `serve` command

pub mod config;
pub mod models;
pub mod validate;

pub use config::{Backend, ConfigError, FileConfig, ServeConfig, ServeOverrides};
pub use models::{
    Category, Item, ItemFields, NewTransaction, Project, ProjectFields, ProjectStatus,
    StockTransaction, TransactionKind, TransactionWithItem,
};
pub use validate::ValidationError;
