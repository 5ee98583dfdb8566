//! Prediction Service CLI library
//!
//! HTTP client and rendering used by the `psctl` binary.

pub mod client;
pub mod commands;
pub mod output;
