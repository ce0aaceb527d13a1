// Client module
pub mod ledger;
pub mod rpc_client;

pub use ledger::{Amount, BalanceCallback, LedgerClient};
pub use rpc_client::{RpcClient, RpcLedger};
