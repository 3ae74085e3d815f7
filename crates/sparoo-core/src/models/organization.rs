//! Organization domain model.
//!
//! Organizations are the top of the Organization → Project → Instance
//! hierarchy. The owning actor is fixed at creation time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Free-form location (region, city, ...).
    pub location: String,
    /// Actor that created the organization. Immutable.
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
    pub location: String,
    pub owner_id: String,
}
