//! Test helpers shared by session tests.

use chrono::{DateTime, TimeZone, Utc};

/// Rng that panics when used, to prove no draw happens.
pub(crate) struct NoDraw;

impl rand::RngCore for NoDraw {
    fn next_u32(&mut self) -> u32 {
        panic!("random draw not expected")
    }
    fn next_u64(&mut self) -> u64 {
        panic!("random draw not expected")
    }
    fn fill_bytes(&mut self, _: &mut [u8]) {
        panic!("random draw not expected")
    }
    fn try_fill_bytes(&mut self, _: &mut [u8]) -> Result<(), rand::Error> {
        panic!("random draw not expected")
    }
}

pub(crate) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap()
}
