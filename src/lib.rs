pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod events;
pub mod exit;
pub mod graph;
pub mod java;
pub mod lang;
pub mod metrics;
pub mod mining;
pub mod oracle;
pub mod pipeline;
pub mod refactor;
pub mod types;
pub mod vcs;
pub mod verification;
