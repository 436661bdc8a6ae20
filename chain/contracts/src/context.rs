//! Transaction context
//!
//! The caller identity and the current ledger time, as supplied by whatever
//! submits the transaction. Neither is validated here.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use types::ids::PartyId;
use types::time::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxContext {
    pub sender: PartyId,
    pub timestamp: Timestamp,
}

impl TxContext {
    pub fn new(sender: PartyId, timestamp: Timestamp) -> Self {
        Self { sender, timestamp }
    }

    /// Context stamped with the wall clock, in milliseconds.
    pub fn now(sender: PartyId) -> Self {
        Self::new(sender, Utc::now().timestamp_millis())
    }

    /// Same sender at a different time.
    pub fn at(self, timestamp: Timestamp) -> Self {
        Self { timestamp, ..self }
    }
}
