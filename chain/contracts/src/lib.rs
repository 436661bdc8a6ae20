//! Escrow and Atomic Swap Custody Logic
//!
//! This crate implements the custody layer of a shared ledger: single-party
//! escrows released to a recipient, refunded to the sender, or settled by an
//! arbiter, and two-party swaps that exchange two assets all-or-nothing.
//!
//! # Modules
//! - `coin`: Non-duplicable value tokens, treasury and party wallets
//! - `errors`: Stable custody error codes and ledger errors
//! - `escrow`: Escrow state machine
//! - `swap`: Two-asset swap state machine
//! - `security`: Caller and time predicates shared by the state machines
//! - `events`: Events emitted on every committed transition
//! - `sink`: Event sinks (memory, tracing, null)
//! - `store`: Object store with per-object exclusive access
//! - `registry`: Escrow and swap registries over the store
//! - `context`: Transaction context (caller, time)
//! - `config`: Registry configuration
//!
//! # Version
//! v0.1.0

pub mod coin;
pub mod config;
pub mod context;
pub mod errors;
pub mod escrow;
pub mod events;
pub mod registry;
pub mod security;
pub mod sink;
pub mod store;
pub mod swap;

pub use coin::{Asset, Coin, Native, Payout, Treasury, Wallet};
pub use config::CustodyConfig;
pub use context::TxContext;
pub use errors::{CoinError, ConfigError, CustodyError, LedgerError};
pub use escrow::{Escrow, EscrowStatus, EscrowTerms, EscrowView};
pub use events::CustodyEvent;
pub use registry::{EscrowRegistry, SwapRegistry};
pub use sink::{EventSink, MemorySink, NullSink, TracingSink};
pub use swap::{Swap, SwapLeg, SwapOutcome, SwapRefund, SwapSettlement, SwapView};

/// Contract ABI version, frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
