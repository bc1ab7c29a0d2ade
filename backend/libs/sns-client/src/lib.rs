//! Typed client for the SNS toggle endpoints
//!
//! [`SnsClient`] wraps the like and follow endpoints. [`OptimisticToggle`]
//! holds the local view of one relation: it flips immediately, then either
//! confirms or rolls back once the server answers.

mod client;
mod error;
mod toggle;

pub use client::SnsClient;
pub use error::{ClientError, Result};
pub use toggle::{OptimisticToggle, TogglePhase, ToggleIntent};
