//! Human records for the Procuret API.
//!
//! Provides typed structures describing the people (agents) known to Procuret.

#![deny(missing_docs)]

pub mod models;

pub use models::HumanHeadline;
