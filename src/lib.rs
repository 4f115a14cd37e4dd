pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod masking;
pub mod output;
pub mod server;
pub mod views;
