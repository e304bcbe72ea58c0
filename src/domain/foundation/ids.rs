//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Unique identifier for a fixed or variable cost line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostItemId(Uuid);

impl CostItemId {
    /// Creates a new random CostItemId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a CostItemId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CostItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CostItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CostItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Unique identifier for a tracked competitor property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompetitorId(Uuid);

impl CompetitorId {
    /// Creates a new random CompetitorId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a CompetitorId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CompetitorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CompetitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CompetitorId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Identifier of a rentable unit.
///
/// Apartment ids are small operator-assigned numbers; they appear inside
/// booking cell keys (`{apartment}-{day}`), so they stay numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApartmentId(u32);

impl ApartmentId {
    /// Creates an ApartmentId from its number.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the numeric value.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ApartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApartmentId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|e| ValidationError::invalid_format("apartment_id", e.to_string()))
    }
}
