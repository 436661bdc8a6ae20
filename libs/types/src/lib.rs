//! Shared types for the custody contracts
//!
//! Identifiers for parties and ledger objects, plus the ledger time unit.
//!
//! # Modules
//! - `ids`: Unique identifiers (PartyId, EscrowId, SwapId)
//! - `time`: Ledger timestamps

pub mod ids;
pub mod time;

pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::time::*;
}
