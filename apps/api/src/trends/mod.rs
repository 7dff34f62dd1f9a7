// Per-user reads: emotion trends, profile and activity stats.

pub mod aggregator;
pub mod handlers;
pub mod profile;
