//! Buildings and the locations inside them.

use serde::{Deserialize, Serialize};

use crate::common::{BuildingIdentifier, LocationIdentifier};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub identifier: BuildingIdentifier,
    pub name: String,
}

impl Building {
    #[must_use]
    pub fn new(identifier: BuildingIdentifier, name: impl Into<String>) -> Self {
        Self {
            identifier,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub identifier: LocationIdentifier,
    pub name: String,
    pub building: BuildingIdentifier,
}

impl Location {
    #[must_use]
    pub fn new(
        identifier: LocationIdentifier,
        name: impl Into<String>,
        building: BuildingIdentifier,
    ) -> Self {
        Self {
            identifier,
            name: name.into(),
            building,
        }
    }
}
