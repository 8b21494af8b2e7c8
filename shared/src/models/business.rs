//! Business directory models
//!
//! Businesses and categories are owned by the ordering platform. The print
//! engine keeps a copy to validate zones and resolve device registrations.

use serde::{Deserialize, Serialize};

/// Business entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    pub id: i64,
    /// Short code typed into embedded devices during setup
    pub code: String,
    pub name: String,
}

/// Upsert business payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessUpsert {
    pub code: String,
    pub name: String,
}

/// Menu category entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub business_id: i64,
    pub name: String,
}

/// Upsert category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUpsert {
    pub business_id: i64,
    pub name: String,
}

/// Category reference embedded in zone listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

impl From<&Category> for CategoryRef {
    fn from(c: &Category) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
        }
    }
}
