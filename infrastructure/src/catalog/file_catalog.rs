//! File-backed candidate catalog
//!
//! A single JSON document holds the items and the visit log:
//!
//! ```json
//! {
//!   "items": [{ "id": "sushi", "name": "Sushi Bar", "category": "japanese" }],
//!   "activity": [{ "item_id": "sushi", "subject": { "user": "ann" }, "at": "2025-03-01T19:00:00Z" }]
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use decider_application::ports::activity_provider::{ActivityError, ActivityProvider};
use decider_application::ports::candidate_provider::{CandidateProvider, CatalogError};
use decider_application::ports::clock::Clock;
use decider_domain::{ActivitySubject, CandidateItem, ItemId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// One recorded visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub item_id: ItemId,
    pub subject: ActivitySubject,
    pub at: DateTime<Utc>,
}

/// On-disk catalog layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub items: Vec<CandidateItem>,
    #[serde(default)]
    pub activity: Vec<ActivityRecord>,
}

pub struct FileCatalog {
    items: HashMap<ItemId, CandidateItem>,
    activity: Vec<ActivityRecord>,
    clock: Arc<dyn Clock>,
}

impl FileCatalog {
    pub fn new(catalog: CatalogFile, clock: Arc<dyn Clock>) -> Self {
        Self {
            items: catalog
                .items
                .into_iter()
                .map(|mut item| {
                    if item.name.is_empty() {
                        item.name = item.id.to_string();
                    }
                    (item.id.clone(), item)
                })
                .collect(),
            activity: catalog.activity,
            clock,
        }
    }

    pub async fn open(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            CatalogError::Unavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        let catalog: CatalogFile = serde_json::from_str(&content).map_err(|e| {
            CatalogError::Unavailable(format!("invalid catalog {}: {}", path.display(), e))
        })?;
        debug!(
            "Loaded catalog {} ({} items, {} visits)",
            path.display(),
            catalog.items.len(),
            catalog.activity.len()
        );
        Ok(Self::new(catalog, clock))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl CandidateProvider for FileCatalog {
    async fn items(&self, ids: &[ItemId]) -> Result<Vec<CandidateItem>, CatalogError> {
        Ok(ids.iter().filter_map(|id| self.items.get(id).cloned()).collect())
    }
}

#[async_trait]
impl ActivityProvider for FileCatalog {
    async fn has_recent_activity(
        &self,
        item: &ItemId,
        subject: &ActivitySubject,
        since_days: u32,
    ) -> Result<bool, ActivityError> {
        let now = self.clock.now();
        let since = now - TimeDelta::days(i64::from(since_days));
        Ok(self
            .activity
            .iter()
            .any(|r| &r.item_id == item && &r.subject == subject && r.at >= since && r.at <= now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use decider_domain::ParticipantId;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    const CATALOG: &str = r#"{
        "items": [
            { "id": "sushi", "name": "Sushi Bar", "category": "japanese", "tags": ["quiet"] },
            { "id": "tacos", "category": "mexican" }
        ],
        "activity": [
            { "item_id": "sushi", "subject": { "user": "ann" }, "at": "2025-03-08T19:00:00Z" },
            { "item_id": "tacos", "subject": { "tribe": "lunch" }, "at": "2025-02-01T12:00:00Z" }
        ]
    }"#;

    async fn catalog() -> FileCatalog {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, CATALOG).unwrap();
        FileCatalog::open(&path, Arc::new(FixedClock(now()))).await.unwrap()
    }

    #[tokio::test]
    async fn test_items_follow_requested_order() {
        let catalog = catalog().await;
        assert_eq!(catalog.len(), 2);

        let items = catalog
            .items(&[ItemId::new("tacos"), ItemId::new("ghost"), ItemId::new("sushi")])
            .await
            .unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["tacos", "sushi"]);
        assert_eq!(items[1].name, "Sushi Bar");
        assert!(items[1].has_tag("QUIET"));
        assert_eq!(items[0].name, "tacos");
    }

    #[tokio::test]
    async fn test_activity_window() {
        let catalog = catalog().await;
        let ann = ActivitySubject::User(ParticipantId::new("ann"));
        let lunch = ActivitySubject::Tribe("lunch".to_string());

        assert!(catalog.has_recent_activity(&ItemId::new("sushi"), &ann, 7).await.unwrap());
        assert!(!catalog.has_recent_activity(&ItemId::new("sushi"), &ann, 1).await.unwrap());
        assert!(!catalog.has_recent_activity(&ItemId::new("tacos"), &lunch, 30).await.unwrap());
        assert!(catalog.has_recent_activity(&ItemId::new("tacos"), &lunch, 60).await.unwrap());
        assert!(!catalog.has_recent_activity(&ItemId::new("tacos"), &ann, 60).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let result = FileCatalog::open("/nonexistent/catalog.json", Arc::new(FixedClock(now()))).await;
        assert!(matches!(result, Err(CatalogError::Unavailable(_))));
    }
}
