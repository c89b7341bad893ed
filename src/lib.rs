//! Legislature - law proposals and voting for legislative bodies
//!
//! Members of a body's congress propose typed laws (taxes, diplomacy,
//! impeachment, treasury transfers) and vote on them. Once every member
//! seated at submission has voted, the proposal's effect is applied to the
//! body's state exactly once.
//!
//! - `congress`: the proposal lifecycle engine and its collaborator traits
//! - `store`: SQLite implementation of those traits

pub mod congress;
pub mod store;
