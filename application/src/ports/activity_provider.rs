//! Activity provider port
//!
//! Answers whether a user or tribe recently visited an item. Only the
//! RecentActivity filter needs it.

use async_trait::async_trait;
use decider_domain::{ActivitySubject, ItemId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ActivityError {
    #[error("Activity lookup failed: {0}")]
    LookupFailed(String),
}

#[async_trait]
pub trait ActivityProvider: Send + Sync {
    async fn has_recent_activity(
        &self,
        item: &ItemId,
        subject: &ActivitySubject,
        since_days: u32,
    ) -> Result<bool, ActivityError>;
}

/// Provider that never reports activity.
pub struct NoActivityProvider;

#[async_trait]
impl ActivityProvider for NoActivityProvider {
    async fn has_recent_activity(
        &self,
        _item: &ItemId,
        _subject: &ActivitySubject,
        _since_days: u32,
    ) -> Result<bool, ActivityError> {
        Ok(false)
    }
}
