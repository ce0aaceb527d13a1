use thiserror::Error;

/// Errors from the persistent key-value capability.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Stored value is not valid UTF-8 for key {0}")]
    InvalidValue(String),
}

/// Errors from the wallet-extension capability.
#[derive(Error, Debug)]
pub enum ExtensionError {
    #[error("Extension refused access: {0}")]
    AccessDenied(String),
    #[error("Keyring read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Keyring parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors from the ledger client capability.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("RPC request failed: {0}")]
    Request(String),
    #[error("Failed to parse response: {0}")]
    Response(String),
    #[error("Node returned error: {0}")]
    Node(String),
    #[error("Subscription failed: {0}")]
    Subscription(String),
}

/// Errors the session controller returns to its callers.
///
/// Faults raised by external collaborators are logged and absorbed at the
/// boundary; only caller contract violations surface here.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session already active")]
    AlreadyActive,
    #[error("Session has no candidate accounts")]
    NotReady,
    #[error("Invalid selection: index {index} out of {len} accounts")]
    InvalidSelection { index: usize, len: usize },
}
