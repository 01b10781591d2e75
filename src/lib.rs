pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod prepare;
pub mod registry;
pub mod util;
