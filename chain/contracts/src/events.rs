//! Contract events
//!
//! Every state transition of an escrow or swap produces exactly one record.
//! Records are consumed by off-ledger indexers and never read back by the
//! contracts.

use serde::{Deserialize, Serialize};
use types::ids::{EscrowId, PartyId, SwapId};
use types::time::Timestamp;

use crate::swap::SwapLeg;

/// Escrow created and funded by its sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowCreated {
    pub escrow_id: EscrowId,
    pub sender: PartyId,
    pub recipient: PartyId,
    pub arbiter: Option<PartyId>,
    pub asset: String,
    pub amount: u64,
    pub unlock_time: Option<Timestamp>,
    pub memo: Vec<u8>,
}

/// Recipient accepted the escrow and received the held value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowAccepted {
    pub escrow_id: EscrowId,
    pub recipient: PartyId,
    pub asset: String,
    pub amount: u64,
}

/// Sender cancelled the escrow and was refunded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowCancelled {
    pub escrow_id: EscrowId,
    pub sender: PartyId,
    pub asset: String,
    pub amount: u64,
}

/// One of the two parties froze the escrow pending arbitration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeRaised {
    pub escrow_id: EscrowId,
    pub raised_by: PartyId,
}

/// Arbiter awarded the held value to one party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeResolved {
    pub escrow_id: EscrowId,
    pub arbiter: PartyId,
    pub awarded_to: PartyId,
    pub award_to_sender: bool,
    pub asset: String,
    pub amount: u64,
}

/// Swap created by party A
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapCreated {
    pub swap_id: SwapId,
    pub party_a: PartyId,
    pub party_b: PartyId,
    pub asset_a: String,
    pub asset_b: String,
    pub amount_a: u64,
    pub amount_b: u64,
    pub expiration: Timestamp,
}

/// One leg of a swap was funded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapDeposited {
    pub swap_id: SwapId,
    pub party: PartyId,
    pub leg: SwapLeg,
    pub asset: String,
    pub amount: u64,
}

/// Both legs exchanged in one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapExecuted {
    pub swap_id: SwapId,
    pub party_a: PartyId,
    pub party_b: PartyId,
    pub asset_a: String,
    pub asset_b: String,
    /// Paid to party B
    pub amount_a: u64,
    /// Paid to party A
    pub amount_b: u64,
}

/// Swap cancelled; whatever was deposited went back to its depositor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapCancelled {
    pub swap_id: SwapId,
    pub cancelled_by: PartyId,
    pub asset_a: String,
    pub asset_b: String,
    pub refunded_a: u64,
    pub refunded_b: u64,
}

/// Enum wrapper for all custody events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CustodyEvent {
    EscrowCreated(EscrowCreated),
    EscrowAccepted(EscrowAccepted),
    EscrowCancelled(EscrowCancelled),
    DisputeRaised(DisputeRaised),
    DisputeResolved(DisputeResolved),
    SwapCreated(SwapCreated),
    SwapDeposited(SwapDeposited),
    SwapExecuted(SwapExecuted),
    SwapCancelled(SwapCancelled),
}

impl CustodyEvent {
    /// Short label for logs and metrics keys.
    pub fn label(&self) -> &'static str {
        match self {
            CustodyEvent::EscrowCreated(_) => "escrow_created",
            CustodyEvent::EscrowAccepted(_) => "escrow_accepted",
            CustodyEvent::EscrowCancelled(_) => "escrow_cancelled",
            CustodyEvent::DisputeRaised(_) => "dispute_raised",
            CustodyEvent::DisputeResolved(_) => "dispute_resolved",
            CustodyEvent::SwapCreated(_) => "swap_created",
            CustodyEvent::SwapDeposited(_) => "swap_deposited",
            CustodyEvent::SwapExecuted(_) => "swap_executed",
            CustodyEvent::SwapCancelled(_) => "swap_cancelled",
        }
    }

    /// Identity of the object the event belongs to.
    pub fn object_id(&self) -> String {
        match self {
            CustodyEvent::EscrowCreated(e) => e.escrow_id.to_string(),
            CustodyEvent::EscrowAccepted(e) => e.escrow_id.to_string(),
            CustodyEvent::EscrowCancelled(e) => e.escrow_id.to_string(),
            CustodyEvent::DisputeRaised(e) => e.escrow_id.to_string(),
            CustodyEvent::DisputeResolved(e) => e.escrow_id.to_string(),
            CustodyEvent::SwapCreated(e) => e.swap_id.to_string(),
            CustodyEvent::SwapDeposited(e) => e.swap_id.to_string(),
            CustodyEvent::SwapExecuted(e) => e.swap_id.to_string(),
            CustodyEvent::SwapCancelled(e) => e.swap_id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escrow_created_serialization() {
        let event = EscrowCreated {
            escrow_id: EscrowId::new(),
            sender: PartyId::new(),
            recipient: PartyId::new(),
            arbiter: None,
            asset: "NATIVE".to_string(),
            amount: 1000,
            unlock_time: Some(1708123456789),
            memo: b"invoice #7".to_vec(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let deser: EscrowCreated = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }

    #[test]
    fn test_custody_event_is_tagged() {
        let event = CustodyEvent::DisputeRaised(DisputeRaised {
            escrow_id: EscrowId::new(),
            raised_by: PartyId::new(),
        });
        let value: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "DisputeRaised");

        let deser: CustodyEvent = serde_json::from_value(value).unwrap();
        assert_eq!(event, deser);
    }

    #[test]
    fn test_label_and_object_id() {
        let swap_id = SwapId::new();
        let event = CustodyEvent::SwapCancelled(SwapCancelled {
            swap_id,
            cancelled_by: PartyId::new(),
            asset_a: "NATIVE".to_string(),
            asset_b: "USDC".to_string(),
            refunded_a: 500,
            refunded_b: 0,
        });
        assert_eq!(event.label(), "swap_cancelled");
        assert_eq!(event.object_id(), swap_id.to_string());
    }
}
