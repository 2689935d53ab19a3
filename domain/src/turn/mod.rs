//! Turn execution units and the turn-count policy

pub mod plan;
pub mod record;
