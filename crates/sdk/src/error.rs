use pulse_types::{ErrorCategory, ProgramErrorCode, PulseError};
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::rpc::{RPC_BLOCK_NOT_AVAILABLE, RPC_NODE_UNHEALTHY};

// ============================================================================
// Raw Collaborator Failures
// ============================================================================

/// Failures reported by the ledger collaborators before classification
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Ledger unreachable: {reason}")]
    Unreachable { reason: String },

    #[error("Ledger request timed out: {reason}")]
    Timeout { reason: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The ledger executed and rejected a transaction
    #[error("Transaction rejected: {reason}")]
    TransactionRejected {
        reason: String,
        custom_code: Option<u32>,
        logs: Vec<String>,
    },

    #[error("Malformed ledger response: {reason}")]
    MalformedResponse { reason: String },
}

impl LedgerError {
    pub fn unreachable(reason: impl ToString) -> Self {
        Self::Unreachable {
            reason: reason.to_string(),
        }
    }

    pub fn malformed(reason: impl ToString) -> Self {
        Self::MalformedResponse {
            reason: reason.to_string(),
        }
    }
}

// ============================================================================
// Classified Errors
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SdkError {
    #[error("Transport error: {reason}")]
    Transport { reason: String },

    /// A known program error code
    #[error("Program error {}: {}", .code.code(), .code.message())]
    Program { code: ProgramErrorCode },

    /// The node answered but refused the request itself
    #[error("RPC request refused ({code}): {message}")]
    Rpc { code: i64, message: String },

    #[error("Unrecognized program error (code {code:?}): {reason}")]
    UnknownProgramError { code: Option<u32>, reason: String },

    #[error(transparent)]
    Protocol(#[from] PulseError),

    #[error("Account not found: {address}")]
    AccountNotFound { address: Pubkey },

    /// The deployed program prices shares with a different bucket width
    #[error("Incompatible program: on-chain price scale {on_chain}, client expects {expected}")]
    IncompatibleProgram { on_chain: u64, expected: u64 },

    #[error("Configuration error: {reason}")]
    Config { reason: String },

    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

pub type SdkResult<T> = Result<T, SdkError>;

impl SdkError {
    pub fn config(reason: impl ToString) -> Self {
        Self::Config {
            reason: reason.to_string(),
        }
    }

    pub fn serialization(reason: impl ToString) -> Self {
        Self::Serialization {
            reason: reason.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SdkError::Transport { .. } => ErrorCategory::Transport,
            SdkError::Program { code } => code.category(),
            SdkError::Protocol(e) => e.category(),
            SdkError::Config { .. } => ErrorCategory::Validation,
            SdkError::Rpc { .. }
            | SdkError::UnknownProgramError { .. }
            | SdkError::AccountNotFound { .. }
            | SdkError::IncompatibleProgram { .. }
            | SdkError::Serialization { .. } => ErrorCategory::Protocol,
        }
    }

    /// Whether retrying after a refresh can succeed.
    ///
    /// Transport failures and program rejections caused by concurrent writers
    /// are recoverable; invalid input and arithmetic failures are not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SdkError::Transport { .. }
            | SdkError::UnknownProgramError { .. }
            | SdkError::AccountNotFound { .. } => true,
            SdkError::Program { code } => code.category() == ErrorCategory::Protocol,
            SdkError::Protocol(e) => e.category() == ErrorCategory::Protocol,
            SdkError::Rpc { .. }
            | SdkError::IncompatibleProgram { .. }
            | SdkError::Config { .. }
            | SdkError::Serialization { .. } => false,
        }
    }
}

impl From<LedgerError> for SdkError {
    fn from(err: LedgerError) -> Self {
        classify(err)
    }
}

// ============================================================================
// Classification
// ============================================================================

const CUSTOM_ERROR_MARKER: &str = "custom program error: 0x";

/// Map a raw collaborator failure onto the caller-facing taxonomy
pub fn classify(err: LedgerError) -> SdkError {
    match err {
        LedgerError::Unreachable { reason } | LedgerError::Timeout { reason } => {
            SdkError::Transport { reason }
        }
        LedgerError::Rpc { code, message } if node_unavailable(code) => SdkError::Transport {
            reason: format!("RPC error {}: {}", code, message),
        },
        LedgerError::Rpc { code, message } => SdkError::Rpc { code, message },
        LedgerError::MalformedResponse { reason } => SdkError::Serialization { reason },
        LedgerError::TransactionRejected {
            reason,
            custom_code,
            logs,
        } => {
            let code = custom_code.or_else(|| {
                logs.iter()
                    .chain(std::iter::once(&reason))
                    .find_map(|line| parse_custom_error(line))
            });
            match code.and_then(ProgramErrorCode::from_code) {
                Some(code) => SdkError::Program { code },
                None => SdkError::UnknownProgramError { code, reason },
            }
        }
    }
}

/// Codes meaning the node could not serve the request right now: unhealthy
/// or lagging nodes, rate limiting and HTTP 5xx
fn node_unavailable(code: i64) -> bool {
    matches!(code, RPC_NODE_UNHEALTHY | RPC_BLOCK_NOT_AVAILABLE | 429 | 500..=599)
}

/// Extract the code from a `custom program error: 0x1771` log line
pub fn parse_custom_error(line: &str) -> Option<u32> {
    let start = line.find(CUSTOM_ERROR_MARKER)? + CUSTOM_ERROR_MARKER.len();
    let hex: String = line[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();
    u32::from_str_radix(&hex, 16).ok()
}
