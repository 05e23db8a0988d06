//! # procuret-core
//!
//! Core types and utilities for working with the Procuret API.
//!
//! This crate provides the shared error type, query parameter formatting, record
//! coding and endpoint configuration used by the Procuret client crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and stable error codes
//! - [`query`] - Query parameter rendering and collection
//! - [`coding`] - Decoding and encoding of API records
//! - [`config`] - Client configuration and endpoint URL assembly

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod coding;
pub mod config;
pub mod error;
pub mod query;

// Re-export commonly used types
pub use coding::Codable;
pub use error::{Error, Result};
pub use query::{QueryParameter, QueryParams, QueryValue};
