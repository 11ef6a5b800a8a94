//! Entity types shared by the storage backends and the HTTP layer.
//!
//! Records are what stores return (reads are always joined with the category
//! or item display name); the `*Fields` structs carry the mutable field set
//! for create and full-row update.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Reference category. Pre-seeded, rarely mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// Stocked item joined with its category display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub name: String,
    /// Globally unique across all items; kept sorted for stable output.
    pub barcodes: Vec<String>,
    pub category: String,
    pub category_name: String,
    pub current_stock: i64,
    pub min_stock: i64,
    pub unit: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Low-stock classification boundary is inclusive.
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.min_stock
    }
}

/// Mutable fields of an item, used for create and full-row overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFields {
    pub name: String,
    pub barcodes: Vec<String>,
    pub category: String,
    pub current_stock: i64,
    pub min_stock: i64,
    pub unit: String,
    pub location: String,
}

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Restock,
    Usage,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Restock => "restock",
            Self::Usage => "usage",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "restock" => Some(Self::Restock),
            "usage" => Some(Self::Usage),
            _ => None,
        }
    }

    /// Stock delta for a movement of `quantity`, clamped at zero for usage.
    pub fn apply(&self, current: i64, quantity: i64) -> i64 {
        match self {
            Self::Restock => current + quantity,
            Self::Usage => (current - quantity).max(0),
        }
    }
}

/// Immutable stock movement record. Creating one is the only way
/// `current_stock` changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockTransaction {
    pub id: String,
    pub item_id: String,
    pub kind: TransactionKind,
    pub quantity: i64,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Transaction joined with the item display name for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionWithItem {
    pub id: String,
    pub item_id: String,
    pub item_name: String,
    pub kind: TransactionKind,
    pub quantity: i64,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a stock movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub item_id: String,
    pub kind: TransactionKind,
    pub quantity: i64,
    pub notes: String,
}

/// Project lifecycle state. Transitions are user-driven only; "expiring" and
/// "expired" views are computed filters over active projects, never stored
/// transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Completed,
    Expired,
    Discarded,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Expired => "expired",
            Self::Discarded => "discarded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "expired" => Some(Self::Expired),
            "discarded" => Some(Self::Discarded),
            _ => None,
        }
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// Time-bounded project (ferment batch, cure, etc).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Free-text project category ("ferment", "cure", ...). Surfaced to
    /// clients as `type`.
    pub kind: String,
    pub start_date: NaiveDate,
    pub ready_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub status: ProjectStatus,
    pub location: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable fields of a project, used for create and full-row overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFields {
    pub name: String,
    pub kind: String,
    pub start_date: NaiveDate,
    pub ready_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub status: ProjectStatus,
    pub location: String,
    pub notes: String,
}
