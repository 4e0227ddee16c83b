//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod checkpoint;
pub mod classifier;
pub mod composite_progress;
pub mod conversation_logger;
pub mod iteration_reader;
pub mod iteration_runner;
pub mod llm_gateway;
pub mod progress;
