//! The notification translator: Cloud Build event in, Bitbucket status out.

mod translator;

pub use translator::{RelayReport, RelayStats, RelayStatsSnapshot, RelaySummary, Translator};
