//! Shared domain types for Roundtable.
//!
//! This crate contains the core domain types used across the Roundtable
//! workspace: Agent, Message, conversation status, provider request shapes,
//! events, configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod agent;
pub mod config;
pub mod conversation;
pub mod error;
pub mod event;
pub mod llm;
pub mod message;
pub mod speech;
