//! Credential source implementations.
//!
//! - `env`: environment variables (highest priority)
//! - `file`: the `[credentials]` table of `roundtable.toml`
//! - `chain`: first-match-wins composition of the above
//!
//! All sources implement [`roundtable_core::credential::CredentialSource`];
//! values travel as `SecretString` and never reach logs.

pub mod chain;
pub mod env;
pub mod file;

pub use chain::{CredentialChain, build_credential_chain};
pub use env::EnvCredentialSource;
pub use file::ConfigCredentialSource;
