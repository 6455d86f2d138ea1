pub mod catalog;
pub mod clarifai;
pub mod cli;
pub mod config;
pub mod db;
mod metrics;
pub mod server;
pub mod storage;
pub mod utils;

pub use config::Opts;
