mod config;

pub use config::{Config, LandscapeConfig};
