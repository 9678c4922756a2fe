use thiserror::Error;

use crate::ledger::StoreError;

/// Errors surfaced to callers of the contract service.
#[derive(Debug, Error)]
pub enum ContractError {
    /// Wrong number of arguments for the requested function.
    #[error("incorrect number of arguments for {function}: expecting {expected}, got {got}")]
    ArgumentCount {
        function: String,
        expected: usize,
        got: usize,
    },

    /// Delimited or JSON contract input could not be decoded.
    #[error("malformed contract input: {0}")]
    MalformedInput(String),

    /// A named field in the delimited input does not match the schema column at its position.
    #[error("field {position} should be {expected}, found {found}")]
    FieldMismatch {
        position: usize,
        expected: &'static str,
        found: String,
    },

    #[error("contract {key} was already assigned")]
    DuplicateKey { key: String },

    #[error("contract {key} not found")]
    NotFound { key: String },

    /// The caller is neither the trader nor the selected buyer of the record.
    #[error("{caller} is not allowed to read contract {key}")]
    Forbidden { key: String, caller: String },

    #[error("received unknown function invocation: {0}")]
    UnknownFunction(String),

    #[error("contract table already exists")]
    AlreadyInitialized,

    /// Opaque substrate failure, tagged with the operation and key that hit it.
    #[error("{op} failed for [{key}]")]
    Substrate {
        op: &'static str,
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl ContractError {
    pub(crate) fn substrate(op: &'static str, key: &str, source: StoreError) -> Self {
        ContractError::Substrate {
            op,
            key: key.to_string(),
            source,
        }
    }

    pub(crate) fn arity(function: &str, expected: usize, got: usize) -> Self {
        ContractError::ArgumentCount {
            function: function.to_string(),
            expected,
            got,
        }
    }
}
