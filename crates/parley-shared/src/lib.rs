//! Types shared between the Parley engine, client and tools: ids, the
//! session transport's event union, outbound payloads, limits and
//! validation helpers.

pub mod constants;
pub mod error;
pub mod protocol;
pub mod types;
pub mod validation;

pub use error::{ParleyError, Result};
