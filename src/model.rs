//! Resource data model.
//!
//! A [`Resource`] is the only persisted entity. Its status is restricted to
//! [`ResourceStatus`], so an out-of-set value cannot be represented once it
//! has passed parsing.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Availability status of a resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResourceStatus {
    /// Free to be booked. Assigned to every new resource.
    #[default]
    Available,
    /// Currently booked.
    Booked,
    /// Withdrawn from use.
    Unavailable,
}

impl ResourceStatus {
    /// Every legal status, in declaration order.
    pub const ALL: [ResourceStatus; 3] = [
        ResourceStatus::Available,
        ResourceStatus::Booked,
        ResourceStatus::Unavailable,
    ];

    /// Wire and storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Available => "available",
            ResourceStatus::Booked => "booked",
            ResourceStatus::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the legal status values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for ResourceStatus {
    type Err = UnknownStatus;

    /// Exact, case-sensitive match against the stored representation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(ResourceStatus::Available),
            "booked" => Ok(ResourceStatus::Booked),
            "unavailable" => Ok(ResourceStatus::Unavailable),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A bookable inventory item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: Uuid,
    pub name: String,
    pub resource_type: String,
    pub status: ResourceStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource {
    /// True iff the resource can currently be booked.
    pub fn is_available(&self) -> bool {
        self.status == ResourceStatus::Available
    }
}

/// Fields supplied by the caller when creating a resource.
///
/// Storage assigns the id and both timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResource {
    pub name: String,
    pub resource_type: String,
    pub status: ResourceStatus,
    pub description: Option<String>,
}
