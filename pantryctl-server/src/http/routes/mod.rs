//! Route handlers organized by resource

pub mod categories;
pub mod health;
pub mod items;
pub mod projects;
pub mod transactions;

use serde::Serialize;

/// Confirmation body for deletes and barcode removal.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
