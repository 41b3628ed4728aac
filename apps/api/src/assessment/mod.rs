//! Candidate assessment pipeline: submission intake, asynchronous question
//! synthesis, answer scoring, and weighted aggregation.

pub mod aggregator;
pub mod capability;
pub mod extract;
pub mod handlers;
pub mod poller;
pub mod prompts;
pub mod scorer;
pub mod store;
pub mod synthesizer;
