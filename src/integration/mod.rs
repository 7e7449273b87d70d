//! Orchestrator tests against scripted stand-ins for the external tools

pub mod e2e;
pub mod fixtures;
