pub mod account;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod storage;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;

pub use session::{InteractionEvent, SelectEvent, SessionController, SessionState, SessionView};
