//! Parameter resolver

use crate::core::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};

/// Resolved (K, N, M) for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmParameters {
    /// Eliminations per participant
    pub k: u32,
    /// Participant count
    pub n: u32,
    /// Final set size
    pub m: u32,
}

impl AlgorithmParameters {
    pub fn new(k: u32, n: u32, m: u32) -> Self {
        Self { k, n, m }
    }

    /// Number of candidates the session starts with: `K·N + M`.
    pub fn initial_count(&self) -> usize {
        required(self.k, self.m, self.n)
    }

    /// Total regular-phase turns: `K·N`.
    pub fn total_turns(&self) -> usize {
        self.k as usize * self.n as usize
    }

    /// With K = 0 there is nothing to eliminate.
    pub fn skips_elimination(&self) -> bool {
        self.k == 0
    }
}

impl std::fmt::Display for AlgorithmParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "K={} N={} M={}", self.k, self.n, self.m)
    }
}

/// A feasible (K, M) alternative offered to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSuggestion {
    pub k: u32,
    pub m: u32,
    pub initial_count: usize,
}

fn required(k: u32, m: u32, n: u32) -> usize {
    k as usize * n as usize + m as usize
}

/// Shrink (K, M) until `K·N + M ≤ available`.
///
/// Each pass applies the first applicable step, in this exact order:
/// 1. K > 2: decrement K
/// 2. M > 3: decrement M
/// 3. K > 1: decrement K
/// 4. M > 1: decrement M
/// 5. otherwise K = 0, M = available
///
/// Requests that already fit are returned unchanged.
pub fn resolve(
    requested_k: u32,
    requested_m: u32,
    n: u32,
    available: usize,
) -> DomainResult<AlgorithmParameters> {
    if n == 0 {
        return Err(DomainError::validation("at least one participant is required"));
    }
    if requested_m == 0 {
        return Err(DomainError::validation("final set size M must be at least 1"));
    }
    if available == 0 {
        return Err(DomainError::InsufficientCandidates {
            available,
            suggestions: Vec::new(),
        });
    }

    let (mut k, mut m) = (requested_k, requested_m);
    while required(k, m, n) > available {
        if k > 2 {
            k -= 1;
        } else if m > 3 {
            m -= 1;
        } else if k > 1 {
            k -= 1;
        } else if m > 1 {
            m -= 1;
        } else {
            k = 0;
            m = u32::try_from(available).unwrap_or(u32::MAX);
            break;
        }
    }

    Ok(AlgorithmParameters::new(k, n, m))
}

/// Every (K, M) with `K ∈ [0, max_k]`, `M ∈ [1, max_m]` and `K·N + M ≤ available`.
///
/// Ranked by higher K first, then lower M.
pub fn suggest(max_k: u32, max_m: u32, n: u32, available: usize) -> Vec<ParameterSuggestion> {
    let mut suggestions: Vec<ParameterSuggestion> = (0..=max_k)
        .flat_map(|k| (1..=max_m).map(move |m| (k, m)))
        .filter(|&(k, m)| required(k, m, n) <= available)
        .map(|(k, m)| ParameterSuggestion {
            k,
            m,
            initial_count: required(k, m, n),
        })
        .collect();

    suggestions.sort_by(|a, b| b.k.cmp(&a.k).then(a.m.cmp(&b.m)));
    suggestions
}
