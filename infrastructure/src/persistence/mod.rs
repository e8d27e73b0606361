//! Session repository adapters

mod json_file;
mod memory;

pub use json_file::JsonFileSessionRepository;
pub use memory::InMemorySessionRepository;

#[cfg(test)]
fn test_session(id: &str) -> decider_domain::DecisionSession {
    use chrono::{TimeZone, Utc};
    use decider_domain::{
        DecisionSession, FilterConfiguration, ItemId, ParticipantId, SessionId, SessionSetup,
    };

    DecisionSession::create(
        SessionId::new(id),
        SessionSetup {
            source_item_ids: vec![ItemId::new("a"), ItemId::new("b"), ItemId::new("c")],
            filters: FilterConfiguration::default(),
            requested_k: 1,
            requested_m: 1,
            participants: vec![ParticipantId::new("ann"), ParticipantId::new("bob")],
        },
        600,
        3600,
        Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap(),
    )
    .unwrap()
}
