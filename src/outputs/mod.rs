//! File outputs produced alongside the stored digest.
//!
//! - [`json`]: writes the day's [`Digest`](crate::models::Digest) to a dated JSON file

pub mod json;
