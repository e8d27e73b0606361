//! Recent-activity lookups
//!
//! The filter engine itself stays synchronous and side-effect free. Callers
//! query the activity provider up front and hand the engine a read-only
//! [`ActivityLookup`], typically a [`RecentActivitySnapshot`].

use crate::core::ids::{ItemId, ParticipantId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Whose history a recent-activity criterion looks at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivitySubject {
    User(ParticipantId),
    Tribe(String),
}

impl std::fmt::Display for ActivitySubject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivitySubject::User(id) => write!(f, "user:{}", id),
            ActivitySubject::Tribe(id) => write!(f, "tribe:{}", id),
        }
    }
}

/// Read-only answer to "has this subject visited this item recently?".
pub trait ActivityLookup {
    fn has_recent_activity(
        &self,
        item: &ItemId,
        subject: &ActivitySubject,
        within_days: u32,
    ) -> bool;
}

/// Lookup that never reports activity.
pub struct NoActivity;

impl ActivityLookup for NoActivity {
    fn has_recent_activity(&self, _: &ItemId, _: &ActivitySubject, _: u32) -> bool {
        false
    }
}

/// Pre-fetched set of positive activity answers.
#[derive(Debug, Clone, Default)]
pub struct RecentActivitySnapshot {
    hits: HashSet<(ItemId, ActivitySubject, u32)>,
}

impl RecentActivitySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, item: ItemId, subject: ActivitySubject, within_days: u32) {
        self.hits.insert((item, subject, within_days));
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

impl ActivityLookup for RecentActivitySnapshot {
    fn has_recent_activity(
        &self,
        item: &ItemId,
        subject: &ActivitySubject,
        within_days: u32,
    ) -> bool {
        self.hits.contains(&(item.clone(), subject.clone(), within_days))
    }
}
