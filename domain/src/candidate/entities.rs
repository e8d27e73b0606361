//! Candidate item entity

use super::hours::BusinessHours;
use crate::core::ids::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance in kilometres (haversine).
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// A candidate option as seen by the filter engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub id: ItemId,
    /// Display name
    #[serde(default)]
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub dietary_flags: BTreeSet<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    /// Absent hours mean the item is treated as always open.
    #[serde(default)]
    pub hours: Option<BusinessHours>,
}

impl CandidateItem {
    pub fn new(id: impl Into<ItemId>, category: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            category: category.into(),
            tags: BTreeSet::new(),
            dietary_flags: BTreeSet::new(),
            location: None,
            hours: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dietary_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dietary_flags = flags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_hours(mut self, hours: BusinessHours) -> Self {
        self.hours = Some(hours);
        self
    }

    /// Case-insensitive tag membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Case-insensitive dietary flag membership.
    pub fn has_dietary_flag(&self, flag: &str) -> bool {
        self.dietary_flags.iter().any(|f| f.eq_ignore_ascii_case(flag))
    }
}
