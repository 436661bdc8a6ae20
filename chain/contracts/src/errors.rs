//! Contract-specific error types
//!
//! `CustodyError` is the stable taxonomy every escrow and swap guard reports.
//! The numeric codes are frozen: off-ledger indexers match on them.

use thiserror::Error;
use types::ids::{EscrowId, SwapId};

/// Failures raised by the escrow and swap state machines.
///
/// Every variant aborts the enclosing operation with no partial mutation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustodyError {
    #[error("Caller is not the escrow sender")]
    NotSender,

    #[error("Caller is not the escrow recipient")]
    NotRecipient,

    #[error("Caller is not the escrow arbiter")]
    NotArbiter,

    #[error("Caller is not a participant in this swap")]
    NotSwapParticipant,

    #[error("Escrow already accepted")]
    AlreadyAccepted,

    #[error("Escrow not accepted")]
    NotAccepted,

    #[error("Escrow is in dispute")]
    InDispute,

    #[error("Escrow is not in dispute")]
    NotInDispute,

    #[error("Escrow is time-locked")]
    EscrowLocked,

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Swap is not ready")]
    SwapNotReady,
}

impl CustodyError {
    /// All kinds, ordered by code.
    pub const ALL: [CustodyError; 11] = [
        CustodyError::NotSender,
        CustodyError::NotRecipient,
        CustodyError::NotArbiter,
        CustodyError::NotSwapParticipant,
        CustodyError::AlreadyAccepted,
        CustodyError::NotAccepted,
        CustodyError::InDispute,
        CustodyError::NotInDispute,
        CustodyError::EscrowLocked,
        CustodyError::InvalidAmount,
        CustodyError::SwapNotReady,
    ];

    /// Stable numeric abort code.
    pub fn code(self) -> u64 {
        match self {
            CustodyError::NotSender => 0,
            CustodyError::NotRecipient => 1,
            CustodyError::NotArbiter => 2,
            CustodyError::NotSwapParticipant => 3,
            CustodyError::AlreadyAccepted => 4,
            CustodyError::NotAccepted => 5,
            CustodyError::InDispute => 6,
            CustodyError::NotInDispute => 7,
            CustodyError::EscrowLocked => 8,
            CustodyError::InvalidAmount => 9,
            CustodyError::SwapNotReady => 10,
        }
    }

    /// Reverse of [`CustodyError::code`].
    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.code() == code)
    }

    /// Access-control failures (wrong caller).
    pub fn is_access_denied(self) -> bool {
        matches!(
            self,
            CustodyError::NotSender
                | CustodyError::NotRecipient
                | CustodyError::NotArbiter
                | CustodyError::NotSwapParticipant
        )
    }
}

/// Errors from the value-transfer primitive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoinError {
    #[error("Arithmetic overflow in coin value")]
    Overflow,

    #[error("Insufficient value: required {required}, available {available}")]
    InsufficientValue { required: u64, available: u64 },

    #[error("Coin still holds value {value}")]
    NonZero { value: u64 },
}

/// Errors raised by the in-memory ledger around the state machines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Escrow not found: {escrow_id}")]
    EscrowNotFound { escrow_id: EscrowId },

    #[error("Swap not found: {swap_id}")]
    SwapNotFound { swap_id: SwapId },

    #[error("Memo too large: {len} bytes exceeds limit of {max}")]
    MemoTooLarge { len: usize, max: usize },

    #[error("Custody error {}: {0}", .0.code())]
    Custody(#[from] CustodyError),
}

impl LedgerError {
    /// The stable custody code, if this failure came from a state machine guard.
    pub fn custody_code(&self) -> Option<u64> {
        match self {
            LedgerError::Custody(e) => Some(e.code()),
            _ => None,
        }
    }
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {reason}")]
    Invalid { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_dense_and_stable() {
        for (i, kind) in CustodyError::ALL.iter().enumerate() {
            assert_eq!(kind.code(), i as u64);
        }
        assert_eq!(CustodyError::EscrowLocked.code(), 8);
        assert_eq!(CustodyError::SwapNotReady.code(), 10);
    }

    #[test]
    fn test_from_code() {
        assert_eq!(CustodyError::from_code(9), Some(CustodyError::InvalidAmount));
        assert_eq!(CustodyError::from_code(11), None);
    }

    #[test]
    fn test_access_denied_classification() {
        assert!(CustodyError::NotArbiter.is_access_denied());
        assert!(!CustodyError::InDispute.is_access_denied());
    }

    #[test]
    fn test_coin_error_display() {
        let err = CoinError::InsufficientValue {
            required: 500,
            available: 20,
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("20"));
    }

    #[test]
    fn test_ledger_error_from_custody() {
        let err: LedgerError = CustodyError::NotRecipient.into();
        assert_eq!(err.custody_code(), Some(1));
        assert_eq!(err.to_string(), "Custody error 1: Caller is not the escrow recipient");
    }

    #[test]
    fn test_ledger_error_without_custody_code() {
        let err = LedgerError::MemoTooLarge { len: 10, max: 4 };
        assert_eq!(err.custody_code(), None);
    }
}
