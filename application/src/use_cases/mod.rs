//! Use cases (application services)
//!
//! One use case per exposed session operation. All of them share
//! [`shared::SessionServices`], which serializes work per session.

pub mod create_session;
pub mod error;
pub mod get_status;
pub mod manage_session;
pub mod shared;
pub mod start_session;
pub mod take_turn;

#[cfg(test)]
mod test_support;
