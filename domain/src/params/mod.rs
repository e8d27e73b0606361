//! Elimination parameters
//!
//! K (eliminations per participant), N (participants) and M (final set size)
//! must satisfy `K·N + M ≤ available`. The resolver reduces over-large
//! requests deterministically, or lists the feasible alternatives.

pub mod resolver;

pub use resolver::{AlgorithmParameters, ParameterSuggestion, resolve, suggest};
