//! Turn scheduling engine and collaborator traits for Roundtable.
//!
//! This crate defines the "ports" (generation, speech, playback, credentials,
//! notifications) that the infrastructure layer implements, plus the
//! conversation orchestrator that drives them. It depends only on
//! `roundtable-types` -- never on `roundtable-infra` or any HTTP/IO crate.

pub mod conversation;
pub mod credential;
pub mod emotion;
pub mod event;
pub mod llm;
pub mod notify;
pub mod roster;
pub mod speech;
pub mod turn;
