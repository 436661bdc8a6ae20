//! Escrow: one party's deposit held in trust for a designated recipient
//!
//! Lifecycle: `Open → {Accepted | Cancelled | Disputed → Resolved}`.
//!
//! Every operation checks all of its guards before mutating anything, and
//! every successful release drains the whole held value in a single move.
//! Once drained the escrow is dead: every further operation fails.

use serde::{Deserialize, Serialize};
use types::ids::{EscrowId, PartyId};
use types::time::Timestamp;

use crate::coin::{Asset, Coin, Payout};
use crate::errors::CustodyError;
use crate::events::{
    CustodyEvent, DisputeRaised, DisputeResolved, EscrowAccepted, EscrowCancelled, EscrowCreated,
};
use crate::security::{is_unlocked, require_any_caller, require_caller};

/// Creation parameters other than the deposit itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowTerms {
    pub recipient: PartyId,
    /// Present iff disputes may be raised.
    pub arbiter: Option<PartyId>,
    /// `accept` fails before this time.
    pub unlock_time: Option<Timestamp>,
    pub memo: Vec<u8>,
}

impl EscrowTerms {
    /// Plain terms: no arbiter, no time lock, empty memo.
    pub fn to(recipient: PartyId) -> Self {
        Self {
            recipient,
            ..Self::default()
        }
    }

    pub fn with_arbiter(mut self, arbiter: PartyId) -> Self {
        self.arbiter = Some(arbiter);
        self
    }

    pub fn with_unlock_time(mut self, unlock_time: Timestamp) -> Self {
        self.unlock_time = Some(unlock_time);
        self
    }

    pub fn with_memo(mut self, memo: impl Into<Vec<u8>>) -> Self {
        self.memo = memo.into();
        self
    }
}

/// How a drained escrow was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Release {
    Accepted,
    Cancelled,
    Resolved { award_to_sender: bool },
}

/// Lifecycle state derived from the escrow's flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscrowStatus {
    /// Funded, awaiting accept, cancel or dispute
    Open,
    /// Frozen until the arbiter resolves
    Disputed,
    /// Released to the recipient
    Accepted,
    /// Refunded to the sender
    Cancelled,
    /// Released by the arbiter
    Resolved,
}

impl EscrowStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            EscrowStatus::Accepted | EscrowStatus::Cancelled | EscrowStatus::Resolved
        )
    }
}

/// Read-only snapshot of an escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowView {
    pub escrow_id: EscrowId,
    pub sender: PartyId,
    pub recipient: PartyId,
    pub arbiter: Option<PartyId>,
    pub asset: String,
    pub held_value: u64,
    pub original_value: u64,
    pub accepted: bool,
    pub in_dispute: bool,
    pub unlock_time: Option<Timestamp>,
    pub memo: Vec<u8>,
    pub status: EscrowStatus,
}

/// An escrow object holding a deposit of asset `A`.
#[derive(Debug)]
pub struct Escrow<A: Asset> {
    id: EscrowId,
    sender: PartyId,
    recipient: PartyId,
    arbiter: Option<PartyId>,
    held: Coin<A>,
    original_value: u64,
    accepted: bool,
    in_dispute: bool,
    unlock_time: Option<Timestamp>,
    memo: Vec<u8>,
    release: Option<Release>,
}

impl<A: Asset> Escrow<A> {
    /// Create an escrow funded with the whole of `deposit`.
    ///
    /// `deposit` is drained only on success; a zero deposit is rejected with
    /// `InvalidAmount` and left as it was.
    pub fn create(
        sender: PartyId,
        deposit: &mut Coin<A>,
        terms: EscrowTerms,
    ) -> Result<(Self, CustodyEvent), CustodyError> {
        if deposit.is_zero() {
            return Err(CustodyError::InvalidAmount);
        }

        let held = deposit.take_all();
        let escrow = Self {
            id: EscrowId::new(),
            sender,
            recipient: terms.recipient,
            arbiter: terms.arbiter,
            original_value: held.value(),
            held,
            accepted: false,
            in_dispute: false,
            unlock_time: terms.unlock_time,
            memo: terms.memo,
            release: None,
        };

        let event = CustodyEvent::EscrowCreated(EscrowCreated {
            escrow_id: escrow.id,
            sender,
            recipient: escrow.recipient,
            arbiter: escrow.arbiter,
            asset: A::SYMBOL.to_string(),
            amount: escrow.original_value,
            unlock_time: escrow.unlock_time,
            memo: escrow.memo.clone(),
        });

        Ok((escrow, event))
    }

    /// Recipient takes the held value.
    pub fn accept(
        &mut self,
        caller: PartyId,
        now: Timestamp,
    ) -> Result<(Payout<A>, CustodyEvent), CustodyError> {
        require_caller(caller, self.recipient, CustodyError::NotRecipient)?;
        if self.accepted {
            return Err(CustodyError::AlreadyAccepted);
        }
        if self.in_dispute {
            return Err(CustodyError::InDispute);
        }
        self.ensure_not_drained()?;
        if !is_unlocked(now, self.unlock_time) {
            return Err(CustodyError::EscrowLocked);
        }

        self.accepted = true;
        self.release = Some(Release::Accepted);
        let payout = Payout {
            to: caller,
            coin: self.held.take_all(),
        };

        let event = CustodyEvent::EscrowAccepted(EscrowAccepted {
            escrow_id: self.id,
            recipient: caller,
            asset: A::SYMBOL.to_string(),
            amount: payout.amount(),
        });
        Ok((payout, event))
    }

    /// Sender takes the held value back.
    pub fn cancel(&mut self, caller: PartyId) -> Result<(Payout<A>, CustodyEvent), CustodyError> {
        require_caller(caller, self.sender, CustodyError::NotSender)?;
        if self.accepted {
            return Err(CustodyError::AlreadyAccepted);
        }
        if self.in_dispute {
            return Err(CustodyError::InDispute);
        }
        self.ensure_not_drained()?;

        self.release = Some(Release::Cancelled);
        let payout = Payout {
            to: self.sender,
            coin: self.held.take_all(),
        };

        let event = CustodyEvent::EscrowCancelled(EscrowCancelled {
            escrow_id: self.id,
            sender: self.sender,
            asset: A::SYMBOL.to_string(),
            amount: payout.amount(),
        });
        Ok((payout, event))
    }

    /// Either party freezes the escrow for arbitration.
    ///
    /// Reports `NotArbiter` when the escrow was created without an arbiter.
    pub fn raise_dispute(&mut self, caller: PartyId) -> Result<CustodyEvent, CustodyError> {
        require_any_caller(
            caller,
            &[self.sender, self.recipient],
            CustodyError::NotSender,
        )?;
        if self.accepted {
            return Err(CustodyError::AlreadyAccepted);
        }
        if self.arbiter.is_none() {
            return Err(CustodyError::NotArbiter);
        }
        if self.in_dispute {
            return Err(CustodyError::InDispute);
        }
        self.ensure_not_drained()?;

        self.in_dispute = true;

        Ok(CustodyEvent::DisputeRaised(DisputeRaised {
            escrow_id: self.id,
            raised_by: caller,
        }))
    }

    /// Arbiter awards the held value to the sender or the recipient.
    pub fn resolve_dispute(
        &mut self,
        caller: PartyId,
        award_to_sender: bool,
    ) -> Result<(Payout<A>, CustodyEvent), CustodyError> {
        if !self.in_dispute {
            return Err(CustodyError::NotInDispute);
        }
        let arbiter = self.arbiter.ok_or(CustodyError::NotArbiter)?;
        require_caller(caller, arbiter, CustodyError::NotArbiter)?;

        let awarded_to = if award_to_sender {
            self.sender
        } else {
            self.recipient
        };

        self.in_dispute = false;
        self.release = Some(Release::Resolved { award_to_sender });
        let payout = Payout {
            to: awarded_to,
            coin: self.held.take_all(),
        };

        let event = CustodyEvent::DisputeResolved(DisputeResolved {
            escrow_id: self.id,
            arbiter,
            awarded_to,
            award_to_sender,
            asset: A::SYMBOL.to_string(),
            amount: payout.amount(),
        });
        Ok((payout, event))
    }

    fn ensure_not_drained(&self) -> Result<(), CustodyError> {
        if self.release.is_some() || self.held.is_zero() {
            return Err(CustodyError::InvalidAmount);
        }
        Ok(())
    }

    // ───────────────────────── Accessors ─────────────────────────

    pub fn id(&self) -> EscrowId {
        self.id
    }

    pub fn sender(&self) -> PartyId {
        self.sender
    }

    pub fn recipient(&self) -> PartyId {
        self.recipient
    }

    pub fn arbiter(&self) -> Option<PartyId> {
        self.arbiter
    }

    pub fn held_value(&self) -> u64 {
        self.held.value()
    }

    pub fn accepted(&self) -> bool {
        self.accepted
    }

    pub fn in_dispute(&self) -> bool {
        self.in_dispute
    }

    pub fn unlock_time(&self) -> Option<Timestamp> {
        self.unlock_time
    }

    pub fn memo(&self) -> &[u8] {
        &self.memo
    }

    pub fn release(&self) -> Option<Release> {
        self.release
    }

    pub fn status(&self) -> EscrowStatus {
        match self.release {
            Some(Release::Accepted) => EscrowStatus::Accepted,
            Some(Release::Cancelled) => EscrowStatus::Cancelled,
            Some(Release::Resolved { .. }) => EscrowStatus::Resolved,
            None if self.in_dispute => EscrowStatus::Disputed,
            None => EscrowStatus::Open,
        }
    }

    pub fn view(&self) -> EscrowView {
        EscrowView {
            escrow_id: self.id,
            sender: self.sender,
            recipient: self.recipient,
            arbiter: self.arbiter,
            asset: A::SYMBOL.to_string(),
            held_value: self.held.value(),
            original_value: self.original_value,
            accepted: self.accepted,
            in_dispute: self.in_dispute,
            unlock_time: self.unlock_time,
            memo: self.memo.clone(),
            status: self.status(),
        }
    }

    /// Released and empty, so the object may be deleted.
    pub fn is_settled(&self) -> bool {
        self.release.is_some() && self.held.is_zero()
    }
}

#[cfg(any(test, feature = "testing"))]
impl<A: Asset> Escrow<A> {
    /// Reduced-argument constructor: no arbiter, no time lock, memo `b"test"`.
    pub fn create_for_testing(
        sender: PartyId,
        deposit: &mut Coin<A>,
        recipient: PartyId,
    ) -> Result<Self, CustodyError> {
        let terms = EscrowTerms::to(recipient).with_memo(b"test".to_vec());
        Self::create(sender, deposit, terms).map(|(escrow, _)| escrow)
    }

    /// Reclaim a released escrow. Fails with `NotAccepted` while value is still held.
    pub fn destroy_for_testing(self) -> Result<(), CustodyError> {
        if !self.is_settled() {
            return Err(CustodyError::NotAccepted);
        }
        self.held
            .destroy_zero()
            .map_err(|_| CustodyError::NotAccepted)
    }
}
