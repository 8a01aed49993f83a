//! Core domain types
//!
//! Pure types with no I/O dependencies: samples, alignment methods,
//! model configuration and the error taxonomy shared by every stage.

pub mod config;
pub mod error;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::*;
