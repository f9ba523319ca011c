//! Common utilities for integration tests

#![allow(dead_code)]

pub mod mock_models;
pub mod test_helpers;

#[allow(unused_imports)]
pub use mock_models::{ConstantGrowth, ExponentialDecay};
#[allow(unused_imports)]
pub use test_helpers::{final_value, reference_config, relative_error};
