//! Candidate items
//!
//! A read-only view of the options a group chooses between, as supplied by
//! the candidate item provider. Items carry enough metadata for every filter
//! kind: category, tags, dietary flags, location and weekly business hours.

pub mod entities;
pub mod hours;

pub use entities::{CandidateItem, GeoPoint};
pub use hours::{BusinessHours, DayHours, WeeklyHours};
