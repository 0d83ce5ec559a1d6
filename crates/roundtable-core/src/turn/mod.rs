//! Speaker selection.

pub mod selector;

pub use selector::TurnSelector;
