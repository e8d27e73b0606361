//! Filter engine domain
//!
//! Narrows a raw candidate pool with hard and soft weighted criteria.
//! Evaluation is pure: the only external input, recent activity, is supplied
//! as a read-only [`ActivityLookup`].

pub mod activity;
pub mod criterion;
pub mod engine;
pub mod opening_hours;

pub use activity::{ActivityLookup, ActivitySubject, NoActivity, RecentActivitySnapshot};
pub use criterion::{FilterConfiguration, FilterCriterion, FilterKind, OpenRequirement};
pub use engine::{EvaluationContext, FilterVerdict, SoftOutcome, evaluate, evaluate_item};
