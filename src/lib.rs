pub mod app;
pub mod args;
pub mod cli;
pub mod config;
pub mod drift;
pub mod error;
pub mod logging;
pub mod report;
pub mod scheduler;
pub mod table;

pub type Result<T> = ::std::result::Result<T, Box<dyn ::std::error::Error>>;
