// src/lib.rs

pub mod change_ids;
pub mod cli;
pub mod client;
pub mod collector;
pub mod config;
pub mod downloader;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod model;
pub mod renderer;
pub mod window;

pub use error::{Error, Result};
