pub mod config;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod grid;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod schema;
