pub mod cli;
pub mod config;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod grounding;
pub mod ingest;
pub mod pipeline;
pub mod processor;
pub mod report;
pub mod schema;
pub mod upload;
pub mod util;
