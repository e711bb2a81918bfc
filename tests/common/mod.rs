#![allow(dead_code)]

pub mod mocks;
pub mod test_utils;

pub use mocks::{MockRecognizer, MockToolkit};
pub use test_utils::*;
