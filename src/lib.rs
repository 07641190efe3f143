pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fitness;
pub mod ngs;
pub(crate) mod utils;

pub use error::ToolError;
