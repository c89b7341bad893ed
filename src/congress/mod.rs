//! Law proposals for legislative bodies.
//!
//! - Typed proposals, validated per kind at submission
//! - One member, one vote; a deciding vote is withdrawn only when its effect
//!   could not be applied
//! - Quorum is the full roster snapshotted at submission
//! - Effects applied exactly once, the moment the last vote lands
//! - Fund transfers re-check the treasury at application time

pub mod audit;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod ledger;
pub mod lifecycle;
pub mod locks;
pub mod mock;
pub mod traits;
pub mod types;
pub mod validator;

#[cfg(test)]
mod proptests;

pub use audit::ProposalQuery;
pub use command::ProposalRequest;
pub use config::GovernanceConfig;
pub use engine::Congress;
pub use error::{CongressError, CongressResult, ErrorKind, StoreError};
pub use executor::{ApplyError, EffectApplier, FRAUD_REASON};
pub use mock::MockCongressStore;
pub use traits::CongressStore;
pub use types::*;
