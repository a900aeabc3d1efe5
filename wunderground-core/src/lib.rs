//! Core library for the `wunderground` CLI.
//!
//! This crate defines:
//! - A client for the Wunderground current conditions endpoint
//! - The wire models, decoded leniently
//! - Configuration & credentials handling
//!
//! It is used by `wunderground-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod model;

pub use client::{ClientOptions, WeatherClient};
pub use config::Config;
pub use error::Error;
pub use model::{Conditions, Location, Observation, Temperature, Wind};
