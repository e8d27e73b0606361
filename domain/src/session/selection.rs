//! Selection resolver
//!
//! Picks the winner once the candidate set has converged.

use crate::core::ids::ItemId;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub final_selection: ItemId,
    pub runners_up: Vec<ItemId>,
}

/// Draw the final selection from the top `m` of the ranked candidates.
///
/// A single remaining candidate wins without a draw. Otherwise the winner is
/// drawn uniformly at random and the rest of the pool become runners-up, in
/// ranking order. Returns `None` for an empty candidate set.
pub fn select_final<R: Rng + ?Sized>(
    candidates: &[ItemId],
    m: u32,
    rng: &mut R,
) -> Option<Selection> {
    let pool_size = candidates.len().min(m.max(1) as usize);
    let pool = &candidates[..pool_size];

    match pool {
        [] => None,
        [only] => Some(Selection {
            final_selection: only.clone(),
            runners_up: Vec::new(),
        }),
        _ => {
            let winner = rng.gen_range(0..pool.len());
            Some(Selection {
                final_selection: pool[winner].clone(),
                runners_up: pool
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != winner)
                    .map(|(_, id)| id.clone())
                    .collect(),
            })
        }
    }
}
