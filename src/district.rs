// District identity used for every district-level grouping.
//
// Ids from the backend are unreliable (duplicates, gaps), so a district is
// identified by its name together with its city and province. Two districts
// sharing a name in different cities stay distinct.
use crate::types::non_blank;
use serde::Serialize;
use std::fmt;

pub const UNKNOWN_DISTRICT: &str = "Unknown District";
pub const UNKNOWN_CITY: &str = "Unknown City";
pub const UNKNOWN_PROVINCE: &str = "Unknown Province";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistrictKey {
    Known {
        name: String,
        city: String,
        province: String,
    },
    /// Record had no usable district name.
    Unknown,
}

impl DistrictKey {
    /// Build a key from raw name fields. A missing or blank district name,
    /// or the backend's own "Unknown District" placeholder, yields `Unknown`;
    /// missing city or province fall back to sentinels.
    pub fn resolve(district: Option<&str>, city: Option<&str>, province: Option<&str>) -> Self {
        let usable = non_blank(district).filter(|n| !n.eq_ignore_ascii_case(UNKNOWN_DISTRICT));
        match usable {
            Some(name) => DistrictKey::Known {
                name: name.to_string(),
                city: non_blank(city).unwrap_or(UNKNOWN_CITY).to_string(),
                province: non_blank(province).unwrap_or(UNKNOWN_PROVINCE).to_string(),
            },
            None => DistrictKey::Unknown,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, DistrictKey::Known { .. })
    }

    pub fn name(&self) -> &str {
        match self {
            DistrictKey::Known { name, .. } => name,
            DistrictKey::Unknown => UNKNOWN_DISTRICT,
        }
    }

    pub fn city(&self) -> &str {
        match self {
            DistrictKey::Known { city, .. } => city,
            DistrictKey::Unknown => UNKNOWN_CITY,
        }
    }

    pub fn province(&self) -> &str {
        match self {
            DistrictKey::Known { province, .. } => province,
            DistrictKey::Unknown => UNKNOWN_PROVINCE,
        }
    }
}

impl fmt::Display for DistrictKey {
    /// `district|city|province`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.name(), self.city(), self.province())
    }
}
