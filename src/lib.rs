pub mod chem;
pub mod client;
pub mod config;
pub mod error;
pub mod server;
pub mod service;

pub use error::{Error, ErrorKind, Result};
