//! Turn-count policy
//!
//! How many personas respond to one message, decided by uniform draws.
//! The policy is a pure function of the draws so orchestration tests can
//! pin the outcome.

/// The shape of one multi-persona turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponsePlan {
    /// One persona responds
    Single,
    /// Two personas respond, the second reacting to the first
    Pair,
    /// Two personas respond, then the first gives a brief follow-up
    TripleFollowUp,
    /// Three distinct personas respond (first reused when no third exists)
    TriplePerspective,
}

impl ResponsePlan {
    /// Number of generation steps this plan attempts
    pub fn steps(&self) -> usize {
        match self {
            ResponsePlan::Single => 1,
            ResponsePlan::Pair => 2,
            ResponsePlan::TripleFollowUp | ResponsePlan::TriplePerspective => 3,
        }
    }
}

/// Decide the plan from a flow draw in [0,1).
///
/// - `flow <= 0.33`: single response
/// - `0.33 < flow <= 0.50`: a pair
/// - `flow > 0.50`: three steps; a second draw (taken lazily, only on this
///   branch) picks between a follow-up by the first persona and a third
///   perspective
pub fn plan_turns(flow: f64, follow: impl FnOnce() -> f64) -> ResponsePlan {
    if flow <= 0.33 {
        ResponsePlan::Single
    } else if flow <= 0.50 {
        ResponsePlan::Pair
    } else if follow() < 0.5 {
        ResponsePlan::TripleFollowUp
    } else {
        ResponsePlan::TriplePerspective
    }
}
