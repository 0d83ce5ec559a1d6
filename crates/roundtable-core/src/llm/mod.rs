//! Generation client abstraction.
//!
//! - `client`: the [`GenerationClient`](client::GenerationClient) trait
//! - `box_client`: object-safe wrapper for runtime provider selection

pub mod box_client;
pub mod client;
