//! Organizational units reports are aggregated over.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

/// Stable, URL-safe identifier of a region.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionSlug(pub String);

impl RegionSlug {
    /// Borrow the slug text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionSlug {
    fn from(slug: &str) -> Self {
        Self(slug.to_string())
    }
}

impl From<String> for RegionSlug {
    fn from(slug: String) -> Self {
        Self(slug)
    }
}

impl Borrow<str> for RegionSlug {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Identifier of a single facility in the underlying data store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacilityId(pub Uuid);

impl FacilityId {
    /// A fresh random identifier.
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Level of a region in the organizational hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// Whole organization.
    Organization,
    /// State or province.
    State,
    /// District.
    District,
    /// Block or sub-district.
    Block,
    /// A single facility.
    Facility,
}

/// An organizational unit with the facilities it covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    /// Stable identifier; results are keyed by it.
    pub slug: RegionSlug,
    /// Display name.
    pub name: String,
    /// Hierarchy level.
    pub kind: RegionKind,
    /// Facilities whose records belong to this region.
    #[serde(default)]
    pub facility_ids: Vec<FacilityId>,
}

impl Region {
    /// Creates a region with no facilities attached.
    pub fn new(slug: impl Into<RegionSlug>, name: impl Into<String>, kind: RegionKind) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            kind,
            facility_ids: Vec::new(),
        }
    }

    /// Creates a single-facility region.
    pub fn facility(slug: impl Into<RegionSlug>, name: impl Into<String>, id: FacilityId) -> Self {
        Self::new(slug, name, RegionKind::Facility).with_facilities(vec![id])
    }

    /// Replaces the facility list.
    pub fn with_facilities(mut self, facility_ids: Vec<FacilityId>) -> Self {
        self.facility_ids = facility_ids;
        self
    }

    /// Whether this region is a single facility, where per-user and per-gender
    /// breakdowns are meaningful.
    pub fn is_facility_region(&self) -> bool {
        self.kind == RegionKind::Facility
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.slug)
    }
}
