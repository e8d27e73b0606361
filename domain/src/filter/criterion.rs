//! Filter criteria and configuration

use crate::candidate::GeoPoint;
use crate::candidate::hours::parse_minutes;
use crate::core::error::{DomainError, DomainResult};
use crate::filter::activity::ActivitySubject;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

fn default_timezone() -> String {
    "UTC".to_string()
}

/// What an opening-hours criterion asks of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OpenRequirement {
    /// Must stay open for this many minutes from now.
    OpenFor { minutes: u32 },
    /// Must stay open until `time` (`HH:MM`) in the requester's timezone.
    ///
    /// `timezone` overrides the configuration's requester timezone.
    OpenUntil {
        time: String,
        #[serde(default)]
        timezone: Option<String>,
    },
}

/// Kind-specific payload of a criterion.
///
/// Unknown kinds deserialize to [`FilterKind::Unknown`] and always pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterKind {
    Category {
        #[serde(default)]
        include: BTreeSet<String>,
        #[serde(default)]
        exclude: BTreeSet<String>,
    },
    Dietary {
        #[serde(default)]
        required: BTreeSet<String>,
    },
    Location {
        center: GeoPoint,
        max_distance_km: f64,
    },
    RecentActivity {
        subject: ActivitySubject,
        within_days: u32,
    },
    OpeningHours {
        requirement: OpenRequirement,
    },
    Tags {
        #[serde(default)]
        required: BTreeSet<String>,
        #[serde(default)]
        excluded: BTreeSet<String>,
    },
    #[serde(other)]
    Unknown,
}

impl FilterKind {
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::Category { .. } => "category",
            FilterKind::Dietary { .. } => "dietary",
            FilterKind::Location { .. } => "location",
            FilterKind::RecentActivity { .. } => "recent_activity",
            FilterKind::OpeningHours { .. } => "opening_hours",
            FilterKind::Tags { .. } => "tags",
            FilterKind::Unknown => "unknown",
        }
    }
}

/// A single prioritized filter.
///
/// Priority 0 is evaluated first and carries the highest soft weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriterion {
    pub id: String,
    #[serde(default)]
    pub hard: bool,
    #[serde(default)]
    pub priority: u32,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub kind: FilterKind,
}

impl FilterCriterion {
    pub fn hard(id: impl Into<String>, priority: u32, kind: FilterKind) -> Self {
        Self {
            id: id.into(),
            hard: true,
            priority,
            description: String::new(),
            kind,
        }
    }

    pub fn soft(id: impl Into<String>, priority: u32, kind: FilterKind) -> Self {
        Self {
            hard: false,
            ..Self::hard(id, priority, kind)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Soft-score weight: `1 / (priority + 1)`.
    pub fn weight(&self) -> f64 {
        1.0 / (self.priority as f64 + 1.0)
    }
}

/// Ordered set of criteria plus the requester's timezone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfiguration {
    #[serde(default = "default_timezone")]
    pub requester_timezone: String,
    #[serde(default)]
    pub criteria: Vec<FilterCriterion>,
}

impl Default for FilterConfiguration {
    fn default() -> Self {
        Self {
            requester_timezone: default_timezone(),
            criteria: Vec::new(),
        }
    }
}

impl FilterConfiguration {
    pub fn new(criteria: Vec<FilterCriterion>) -> Self {
        Self {
            criteria,
            ..Self::default()
        }
    }

    pub fn with_requester_timezone(mut self, tz: impl Into<String>) -> Self {
        self.requester_timezone = tz.into();
        self
    }

    pub fn requester_tz(&self) -> Option<Tz> {
        self.requester_timezone.parse().ok()
    }

    /// Criteria in evaluation order: ascending priority, declaration order on ties.
    pub fn ordered(&self) -> Vec<&FilterCriterion> {
        let mut ordered: Vec<_> = self.criteria.iter().collect();
        ordered.sort_by_key(|c| c.priority);
        ordered
    }

    /// Reject malformed configurations before a session is created.
    pub fn validate(&self) -> DomainResult<()> {
        if self.requester_tz().is_none() {
            return Err(DomainError::validation(format!(
                "unknown requester timezone '{}'",
                self.requester_timezone
            )));
        }

        let mut seen = HashSet::new();
        for criterion in &self.criteria {
            if criterion.id.trim().is_empty() {
                return Err(DomainError::validation("filter criterion id must not be empty"));
            }
            if !seen.insert(criterion.id.as_str()) {
                return Err(DomainError::validation(format!(
                    "duplicate filter criterion id '{}'",
                    criterion.id
                )));
            }
            validate_kind(&criterion.id, &criterion.kind)?;
        }
        Ok(())
    }
}

fn validate_kind(id: &str, kind: &FilterKind) -> DomainResult<()> {
    match kind {
        FilterKind::Location {
            center,
            max_distance_km,
        } => {
            if !max_distance_km.is_finite() || *max_distance_km <= 0.0 {
                return Err(DomainError::validation(format!(
                    "{id}: max_distance_km must be a positive number"
                )));
            }
            if !(-90.0..=90.0).contains(&center.latitude)
                || !(-180.0..=180.0).contains(&center.longitude)
            {
                return Err(DomainError::validation(format!(
                    "{id}: center coordinates out of range"
                )));
            }
        }
        FilterKind::RecentActivity { within_days, .. } if *within_days == 0 => {
            return Err(DomainError::validation(format!(
                "{id}: within_days must be at least 1"
            )));
        }
        FilterKind::OpeningHours {
            requirement: OpenRequirement::OpenUntil { time, timezone },
        } => {
            if parse_minutes(time).is_none() {
                return Err(DomainError::validation(format!(
                    "{id}: cannot parse time '{time}', expected HH:MM"
                )));
            }
            if let Some(tz) = timezone
                && tz.parse::<Tz>().is_err()
            {
                return Err(DomainError::validation(format!(
                    "{id}: unknown timezone '{tz}'"
                )));
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::ParticipantId;

    fn tags(required: &[&str]) -> FilterKind {
        FilterKind::Tags {
            required: required.iter().map(|s| s.to_string()).collect(),
            excluded: BTreeSet::new(),
        }
    }

    #[test]
    fn test_weight_by_priority() {
        assert_eq!(FilterCriterion::soft("a", 0, tags(&[])).weight(), 1.0);
        assert_eq!(FilterCriterion::soft("b", 1, tags(&[])).weight(), 0.5);
        assert_eq!(FilterCriterion::soft("c", 3, tags(&[])).weight(), 0.25);
    }

    #[test]
    fn test_ordered_by_priority_then_declaration() {
        let config = FilterConfiguration::new(vec![
            FilterCriterion::soft("late", 2, tags(&[])),
            FilterCriterion::hard("first", 0, tags(&[])),
            FilterCriterion::soft("also-late", 2, tags(&[])),
        ]);
        let ids: Vec<_> = config.ordered().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "late", "also-late"]);
    }

    #[test]
    fn test_validate_duplicate_ids() {
        let config = FilterConfiguration::new(vec![
            FilterCriterion::soft("x", 0, tags(&[])),
            FilterCriterion::soft("x", 1, tags(&[])),
        ]);
        assert!(matches!(config.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_validate_bad_timezone() {
        let config = FilterConfiguration::default().with_requester_timezone("Nowhere/City");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_distance_and_time() {
        let location = FilterConfiguration::new(vec![FilterCriterion::hard(
            "near",
            0,
            FilterKind::Location {
                center: GeoPoint::new(0.0, 0.0),
                max_distance_km: -1.0,
            },
        )]);
        assert!(location.validate().is_err());

        let hours = FilterConfiguration::new(vec![FilterCriterion::hard(
            "late",
            0,
            FilterKind::OpeningHours {
                requirement: OpenRequirement::OpenUntil {
                    time: "late".to_string(),
                    timezone: None,
                },
            },
        )]);
        assert!(hours.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        let config = FilterConfiguration::new(vec![
            FilterCriterion::hard(
                "no-repeat",
                0,
                FilterKind::RecentActivity {
                    subject: ActivitySubject::User(ParticipantId::new("alice")),
                    within_days: 14,
                },
            ),
            FilterCriterion::soft("tagged", 1, tags(&["cozy"])),
        ])
        .with_requester_timezone("America/New_York");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_flattened_kind() {
        let criterion: FilterCriterion = serde_json::from_str(
            r#"{"id": "veg", "hard": true, "priority": 0, "kind": "dietary", "required": ["vegetarian"]}"#,
        )
        .unwrap();
        assert!(criterion.hard);
        assert_eq!(criterion.kind.name(), "dietary");
    }

    #[test]
    fn test_deserialize_toml_configuration() {
        let config: FilterConfiguration = toml::from_str(
            r#"
requester_timezone = "Europe/Berlin"

[[criteria]]
id = "open-late"
hard = true
kind = "opening_hours"
requirement = { mode = "open_for", minutes = 90 }

[[criteria]]
id = "no-chains"
priority = 2
kind = "category"
exclude = ["fast_food"]
"#,
        )
        .unwrap();
        assert_eq!(config.criteria.len(), 2);
        assert_eq!(
            config.criteria[0].kind,
            FilterKind::OpeningHours {
                requirement: OpenRequirement::OpenFor { minutes: 90 }
            }
        );
        assert!(!config.criteria[1].hard);
        assert!(config.validate().is_ok());
    }
}
