//! Filter engine
//!
//! Scores and excludes candidate items against a prioritized criteria list.
//!
//! # Scoring
//!
//! Hard criteria exclude an item outright. Soft criteria only rank: each soft
//! criterion weighs `1 / (priority + 1)` and the score is the weight of the
//! passed soft criteria divided by the total soft weight (1.0 when there are
//! no soft criteria).
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use decider_domain::candidate::CandidateItem;
//! use decider_domain::filter::{
//!     evaluate, EvaluationContext, FilterConfiguration, FilterCriterion, FilterKind, NoActivity,
//! };
//!
//! let items = vec![
//!     CandidateItem::new("a", "thai").with_tags(["cozy"]),
//!     CandidateItem::new("b", "thai"),
//! ];
//! let config = FilterConfiguration::new(vec![FilterCriterion::soft(
//!     "cozy",
//!     0,
//!     FilterKind::Tags {
//!         required: ["cozy".to_string()].into(),
//!         excluded: Default::default(),
//!     },
//! )]);
//!
//! let verdicts = evaluate(&items, &config, &EvaluationContext::new(Utc::now(), &NoActivity));
//! assert_eq!(verdicts[0].item_id.as_str(), "a");
//! assert_eq!(verdicts[1].priority_score, 0.0);
//! ```

use crate::candidate::CandidateItem;
use crate::core::ids::ItemId;
use crate::filter::activity::ActivityLookup;
use crate::filter::criterion::{FilterConfiguration, FilterCriterion, FilterKind};
use crate::filter::opening_hours::satisfies_requirement;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Inputs beyond items and criteria: the evaluation instant and activity data.
pub struct EvaluationContext<'a> {
    pub now: DateTime<Utc>,
    pub activity: &'a dyn ActivityLookup,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(now: DateTime<Utc>, activity: &'a dyn ActivityLookup) -> Self {
        Self { now, activity }
    }
}

/// Outcome of one soft criterion for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftOutcome {
    pub criterion_id: String,
    pub passed: bool,
    pub weight: f64,
}

/// Per-item result of the filter engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterVerdict {
    pub item_id: ItemId,
    pub passes_hard: bool,
    /// Ids of the hard criteria the item failed
    pub failed_hard: Vec<String>,
    pub soft_outcomes: Vec<SoftOutcome>,
    pub violation_count: usize,
    /// Weighted soft score in `[0, 1]`
    pub priority_score: f64,
}

/// Evaluate every item and return the hard-filter survivors, best first.
///
/// Ordering is by priority score descending, then by fewer soft violations;
/// remaining ties keep the input order.
pub fn evaluate(
    items: &[CandidateItem],
    config: &FilterConfiguration,
    ctx: &EvaluationContext<'_>,
) -> Vec<FilterVerdict> {
    let criteria = config.ordered();
    let requester_tz = config.requester_tz().unwrap_or(Tz::UTC);

    let mut survivors: Vec<FilterVerdict> = items
        .iter()
        .map(|item| evaluate_with(item, &criteria, requester_tz, ctx))
        .filter(|verdict| verdict.passes_hard)
        .collect();

    survivors.sort_by(|a, b| {
        b.priority_score
            .partial_cmp(&a.priority_score)
            .unwrap_or(Ordering::Equal)
            .then(a.violation_count.cmp(&b.violation_count))
    });
    survivors
}

/// Evaluate a single item, including items that fail hard criteria.
pub fn evaluate_item(
    item: &CandidateItem,
    config: &FilterConfiguration,
    ctx: &EvaluationContext<'_>,
) -> FilterVerdict {
    let requester_tz = config.requester_tz().unwrap_or(Tz::UTC);
    evaluate_with(item, &config.ordered(), requester_tz, ctx)
}

fn evaluate_with(
    item: &CandidateItem,
    criteria: &[&FilterCriterion],
    requester_tz: Tz,
    ctx: &EvaluationContext<'_>,
) -> FilterVerdict {
    let mut failed_hard = Vec::new();
    let mut soft_outcomes = Vec::new();

    for criterion in criteria {
        let passed = criterion_passes(item, &criterion.kind, requester_tz, ctx);
        if criterion.hard {
            if !passed {
                failed_hard.push(criterion.id.clone());
            }
        } else {
            soft_outcomes.push(SoftOutcome {
                criterion_id: criterion.id.clone(),
                passed,
                weight: criterion.weight(),
            });
        }
    }

    let total: f64 = soft_outcomes.iter().map(|o| o.weight).sum();
    let earned: f64 = soft_outcomes
        .iter()
        .filter(|o| o.passed)
        .map(|o| o.weight)
        .sum();
    let priority_score = if total > 0.0 {
        (earned / total).clamp(0.0, 1.0)
    } else {
        1.0
    };

    FilterVerdict {
        item_id: item.id.clone(),
        passes_hard: failed_hard.is_empty(),
        failed_hard,
        violation_count: soft_outcomes.iter().filter(|o| !o.passed).count(),
        soft_outcomes,
        priority_score,
    }
}

fn criterion_passes(
    item: &CandidateItem,
    kind: &FilterKind,
    requester_tz: Tz,
    ctx: &EvaluationContext<'_>,
) -> bool {
    match kind {
        FilterKind::Category { include, exclude } => {
            let in_include =
                include.is_empty() || include.iter().any(|c| c.eq_ignore_ascii_case(&item.category));
            let in_exclude = exclude.iter().any(|c| c.eq_ignore_ascii_case(&item.category));
            in_include && !in_exclude
        }
        FilterKind::Dietary { required } => required.iter().all(|f| item.has_dietary_flag(f)),
        FilterKind::Location {
            center,
            max_distance_km,
        } => item
            .location
            .is_none_or(|loc| loc.distance_km(center) <= *max_distance_km),
        FilterKind::RecentActivity {
            subject,
            within_days,
        } => !ctx
            .activity
            .has_recent_activity(&item.id, subject, *within_days),
        FilterKind::OpeningHours { requirement } => {
            satisfies_requirement(item.hours.as_ref(), requirement, requester_tz, ctx.now)
        }
        FilterKind::Tags { required, excluded } => {
            required.iter().all(|t| item.has_tag(t)) && !excluded.iter().any(|t| item.has_tag(t))
        }
        FilterKind::Unknown => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{BusinessHours, DayHours, GeoPoint, WeeklyHours};
    use crate::core::ids::ParticipantId;
    use crate::filter::activity::{ActivitySubject, NoActivity, RecentActivitySnapshot};
    use crate::filter::criterion::OpenRequirement;
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 6, 12, 0, 0).unwrap()
    }

    fn ids(verdicts: &[FilterVerdict]) -> Vec<&str> {
        verdicts.iter().map(|v| v.item_id.as_str()).collect()
    }

    fn items() -> Vec<CandidateItem> {
        vec![
            CandidateItem::new("thai", "thai")
                .with_tags(["cozy", "spicy"])
                .with_dietary_flags(["vegetarian", "vegan"]),
            CandidateItem::new("burger", "fast_food").with_tags(["cheap"]),
            CandidateItem::new("pasta", "italian")
                .with_tags(["cozy"])
                .with_dietary_flags(["vegetarian"]),
        ]
    }

    #[test]
    fn test_no_criteria_keeps_everything_with_full_score() {
        let verdicts = evaluate(
            &items(),
            &FilterConfiguration::default(),
            &EvaluationContext::new(now(), &NoActivity),
        );
        assert_eq!(ids(&verdicts), vec!["thai", "burger", "pasta"]);
        assert!(verdicts.iter().all(|v| v.priority_score == 1.0));
    }

    #[test]
    fn test_hard_filters_exclude() {
        let config = FilterConfiguration::new(vec![
            FilterCriterion::hard(
                "no-fast-food",
                0,
                FilterKind::Category {
                    include: BTreeSet::new(),
                    exclude: set(&["FAST_FOOD"]),
                },
            ),
            FilterCriterion::hard("vegan", 1, FilterKind::Dietary { required: set(&["vegan"]) }),
        ]);
        let verdicts = evaluate(&items(), &config, &EvaluationContext::new(now(), &NoActivity));
        assert_eq!(ids(&verdicts), vec!["thai"]);

        let burger = evaluate_item(&items()[1], &config, &EvaluationContext::new(now(), &NoActivity));
        assert!(!burger.passes_hard);
        assert_eq!(burger.failed_hard, vec!["no-fast-food", "vegan"]);
    }

    #[test]
    fn test_soft_scoring_weights_by_priority() {
        // cozy weighs 1.0 (priority 0), vegetarian weighs 0.5 (priority 1)
        let config = FilterConfiguration::new(vec![
            FilterCriterion::soft(
                "vegetarian",
                1,
                FilterKind::Dietary {
                    required: set(&["vegetarian"]),
                },
            ),
            FilterCriterion::soft(
                "cozy",
                0,
                FilterKind::Tags {
                    required: set(&["cozy"]),
                    excluded: BTreeSet::new(),
                },
            ),
        ]);
        let items = vec![
            CandidateItem::new("veg-only", "x").with_dietary_flags(["vegetarian"]),
            CandidateItem::new("none", "x"),
            CandidateItem::new("cozy-only", "x").with_tags(["cozy"]),
            CandidateItem::new("both", "x")
                .with_tags(["cozy"])
                .with_dietary_flags(["vegetarian"]),
        ];

        let verdicts = evaluate(&items, &config, &EvaluationContext::new(now(), &NoActivity));
        assert_eq!(ids(&verdicts), vec!["both", "cozy-only", "veg-only", "none"]);

        let scores: Vec<f64> = verdicts.iter().map(|v| v.priority_score).collect();
        assert!((scores[0] - 1.0).abs() < 1e-9);
        assert!((scores[1] - 2.0 / 3.0).abs() < 1e-9);
        assert!((scores[2] - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(scores[3], 0.0);
        assert_eq!(verdicts[3].violation_count, 2);

        // soft outcomes are reported in evaluation order
        assert_eq!(verdicts[0].soft_outcomes[0].criterion_id, "cozy");
    }

    #[test]
    fn test_ties_broken_by_fewer_violations() {
        let config = FilterConfiguration::new(vec![
            FilterCriterion::soft(
                "a",
                0,
                FilterKind::Tags {
                    required: set(&["a"]),
                    excluded: BTreeSet::new(),
                },
            ),
            FilterCriterion::soft(
                "b",
                1,
                FilterKind::Tags {
                    required: set(&["b"]),
                    excluded: BTreeSet::new(),
                },
            ),
            FilterCriterion::soft(
                "c",
                1,
                FilterKind::Tags {
                    required: set(&["c"]),
                    excluded: BTreeSet::new(),
                },
            ),
        ]);
        // only-a: 1.0 / 2.0; b-and-c: 1.0 / 2.0 as well, but one violation instead of two
        let items = vec![
            CandidateItem::new("only-a", "x").with_tags(["a"]),
            CandidateItem::new("b-and-c", "x").with_tags(["b", "c"]),
        ];
        let verdicts = evaluate(&items, &config, &EvaluationContext::new(now(), &NoActivity));
        assert_eq!(verdicts[0].priority_score, verdicts[1].priority_score);
        assert_eq!(ids(&verdicts), vec!["b-and-c", "only-a"]);
    }

    #[test]
    fn test_location_filter() {
        let center = GeoPoint::new(52.52, 13.405);
        let config = FilterConfiguration::new(vec![FilterCriterion::hard(
            "near",
            0,
            FilterKind::Location {
                center,
                max_distance_km: 5.0,
            },
        )]);
        let items = vec![
            CandidateItem::new("close", "x").with_location(GeoPoint::new(52.53, 13.41)),
            CandidateItem::new("far", "x").with_location(GeoPoint::new(48.137, 11.575)),
            CandidateItem::new("unknown", "x"),
        ];
        let verdicts = evaluate(&items, &config, &EvaluationContext::new(now(), &NoActivity));
        assert_eq!(ids(&verdicts), vec!["close", "unknown"]);
    }

    #[test]
    fn test_recent_activity_filter() {
        let subject = ActivitySubject::User(ParticipantId::new("alice"));
        let mut snapshot = RecentActivitySnapshot::new();
        snapshot.record(ItemId::new("pasta"), subject.clone(), 14);

        let config = FilterConfiguration::new(vec![FilterCriterion::hard(
            "not-again",
            0,
            FilterKind::RecentActivity {
                subject,
                within_days: 14,
            },
        )]);
        let verdicts = evaluate(&items(), &config, &EvaluationContext::new(now(), &snapshot));
        assert_eq!(ids(&verdicts), vec!["thai", "burger"]);
    }

    #[test]
    fn test_opening_hours_filter() {
        let config = FilterConfiguration::new(vec![FilterCriterion::hard(
            "open-now",
            0,
            FilterKind::OpeningHours {
                requirement: OpenRequirement::OpenFor { minutes: 60 },
            },
        )]);
        let items = vec![
            CandidateItem::new("lunch", "x").with_hours(BusinessHours::new(
                "UTC",
                WeeklyHours::every_day(DayHours::new("11:00", "15:00")),
            )),
            CandidateItem::new("dinner", "x").with_hours(BusinessHours::new(
                "UTC",
                WeeklyHours::every_day(DayHours::new("18:00", "23:00")),
            )),
            CandidateItem::new("no-hours", "x"),
        ];
        let verdicts = evaluate(&items, &config, &EvaluationContext::new(now(), &NoActivity));
        assert_eq!(ids(&verdicts), vec!["lunch", "no-hours"]);
    }

    #[test]
    fn test_unknown_kind_passes() {
        let config = FilterConfiguration::new(vec![FilterCriterion::hard(
            "future",
            0,
            FilterKind::Unknown,
        )]);
        let verdicts = evaluate(&items(), &config, &EvaluationContext::new(now(), &NoActivity));
        assert_eq!(verdicts.len(), 3);
    }

    #[test]
    fn test_scores_always_in_unit_interval() {
        let config = FilterConfiguration::new(
            (0..6)
                .map(|p| {
                    FilterCriterion::soft(
                        format!("c{p}"),
                        p,
                        FilterKind::Tags {
                            required: set(&[format!("t{p}").as_str()]),
                            excluded: BTreeSet::new(),
                        },
                    )
                })
                .collect(),
        );
        let items: Vec<_> = (0..16)
            .map(|mask: u32| {
                let tags: Vec<String> = (0..6)
                    .filter(|bit| mask & (1 << bit) != 0)
                    .map(|bit| format!("t{bit}"))
                    .collect();
                CandidateItem::new(format!("i{mask}"), "x").with_tags(tags)
            })
            .collect();

        let verdicts = evaluate(&items, &config, &EvaluationContext::new(now(), &NoActivity));
        assert_eq!(verdicts.len(), 16);
        assert!(verdicts
            .iter()
            .all(|v| (0.0..=1.0).contains(&v.priority_score)));
        assert!(verdicts
            .windows(2)
            .all(|w| w[0].priority_score >= w[1].priority_score));
    }
}
