//! Shared foundational types used across the hardmix crates.
//!
//! This crate provides interned identifiers for tile and tag names and the
//! common result type for internal invariant violations.

#![warn(missing_docs)]

pub mod ident;
pub mod result;

pub use ident::{Ident, Interner};
pub use result::{HardmixResult, InternalError};
