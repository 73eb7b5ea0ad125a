pub mod analyzers;
pub mod clean;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
