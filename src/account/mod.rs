//! Account discovery, selection persistence and balance tracking
//!
//! - `types`: accounts and the immutable candidate list
//! - `store`: the persisted last-selected address
//! - `discovery`: wallet-extension enumeration
//! - `balance`: fetch-then-subscribe balance tracking

pub mod types;
pub mod store;
pub mod discovery;
pub mod balance;

pub use types::{Account, AccountMeta, Address, CandidateList};
pub use store::AddressStore;
pub use discovery::AccountDiscoverer;
pub use balance::{BalanceTracker, TrackedBalance};
