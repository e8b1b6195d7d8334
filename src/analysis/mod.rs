//! Analysis modules.
//!
//! Aggregation of loaded submissions into the tallies every report reads.

pub mod aggregator;

pub use aggregator::*;
