//! Swap: two-party exchange of two distinct assets
//!
//! Party A creates the swap naming party B and the exact amount each side
//! must deposit. Once both legs are funded and the swap has not expired,
//! `execute_swap` pays A's deposit to B and B's deposit to A in one step.
//! Until then either party may cancel, and each deposited leg goes back to
//! whoever funded it, independently of the other leg.

use serde::{Deserialize, Serialize};
use types::ids::{PartyId, SwapId};
use types::time::Timestamp;

use crate::coin::{Asset, Coin, Payout};
use crate::errors::CustodyError;
use crate::events::{CustodyEvent, SwapCancelled, SwapCreated, SwapDeposited, SwapExecuted};
use crate::security::{is_expired, require_any_caller, require_caller};

/// Which side of a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapLeg {
    A,
    B,
}

/// How a closed swap ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapOutcome {
    Executed,
    Cancelled,
}

/// Both legs of an executed swap. Delivered together or not at all.
#[derive(Debug)]
pub struct SwapSettlement<A: Asset, B: Asset> {
    /// Party B's deposit, now owned by party A
    pub to_party_a: Payout<B>,
    /// Party A's deposit, now owned by party B
    pub to_party_b: Payout<A>,
}

/// Refunds from a cancelled swap. A leg that was never funded refunds nothing.
#[derive(Debug)]
pub struct SwapRefund<A: Asset, B: Asset> {
    pub to_party_a: Option<Payout<A>>,
    pub to_party_b: Option<Payout<B>>,
}

impl<A: Asset, B: Asset> SwapRefund<A, B> {
    pub fn refunded_a(&self) -> u64 {
        self.to_party_a.as_ref().map_or(0, Payout::amount)
    }

    pub fn refunded_b(&self) -> u64 {
        self.to_party_b.as_ref().map_or(0, Payout::amount)
    }
}

/// Read-only snapshot of a swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapView {
    pub swap_id: SwapId,
    pub party_a: PartyId,
    pub party_b: PartyId,
    pub asset_a: String,
    pub asset_b: String,
    pub amount_a: u64,
    pub amount_b: u64,
    pub balance_a: u64,
    pub balance_b: u64,
    pub deposited_a: bool,
    pub deposited_b: bool,
    pub expiration: Timestamp,
    pub outcome: Option<SwapOutcome>,
}

/// A swap object exchanging `amount_a` of `A` for `amount_b` of `B`.
#[derive(Debug)]
pub struct Swap<A: Asset, B: Asset> {
    id: SwapId,
    party_a: PartyId,
    party_b: PartyId,
    balance_a: Coin<A>,
    balance_b: Coin<B>,
    deposited_a: bool,
    deposited_b: bool,
    amount_a: u64,
    amount_b: u64,
    expiration: Timestamp,
    outcome: Option<SwapOutcome>,
}

impl<A: Asset, B: Asset> Swap<A, B> {
    /// Create an unfunded swap. The caller becomes party A.
    pub fn create_swap(
        caller: PartyId,
        party_b: PartyId,
        amount_a: u64,
        amount_b: u64,
        expiration: Timestamp,
    ) -> Result<(Self, CustodyEvent), CustodyError> {
        if amount_a == 0 || amount_b == 0 {
            return Err(CustodyError::InvalidAmount);
        }

        let swap = Self {
            id: SwapId::new(),
            party_a: caller,
            party_b,
            balance_a: Coin::zero(),
            balance_b: Coin::zero(),
            deposited_a: false,
            deposited_b: false,
            amount_a,
            amount_b,
            expiration,
            outcome: None,
        };

        let event = CustodyEvent::SwapCreated(SwapCreated {
            swap_id: swap.id,
            party_a: caller,
            party_b,
            asset_a: A::SYMBOL.to_string(),
            asset_b: B::SYMBOL.to_string(),
            amount_a,
            amount_b,
            expiration,
        });

        Ok((swap, event))
    }

    /// Party A funds its leg with exactly `amount_a`.
    pub fn deposit_a(
        &mut self,
        caller: PartyId,
        payment: &mut Coin<A>,
    ) -> Result<CustodyEvent, CustodyError> {
        require_caller(caller, self.party_a, CustodyError::NotSwapParticipant)?;
        self.ensure_open()?;
        fund_leg(
            &mut self.balance_a,
            &mut self.deposited_a,
            self.amount_a,
            payment,
        )?;

        Ok(CustodyEvent::SwapDeposited(SwapDeposited {
            swap_id: self.id,
            party: caller,
            leg: SwapLeg::A,
            asset: A::SYMBOL.to_string(),
            amount: self.amount_a,
        }))
    }

    /// Party B funds its leg with exactly `amount_b`.
    pub fn deposit_b(
        &mut self,
        caller: PartyId,
        payment: &mut Coin<B>,
    ) -> Result<CustodyEvent, CustodyError> {
        require_caller(caller, self.party_b, CustodyError::NotSwapParticipant)?;
        self.ensure_open()?;
        fund_leg(
            &mut self.balance_b,
            &mut self.deposited_b,
            self.amount_b,
            payment,
        )?;

        Ok(CustodyEvent::SwapDeposited(SwapDeposited {
            swap_id: self.id,
            party: caller,
            leg: SwapLeg::B,
            asset: B::SYMBOL.to_string(),
            amount: self.amount_b,
        }))
    }

    /// Exchange both legs. Anyone may trigger it once both legs are funded.
    ///
    /// An expired swap reports `EscrowLocked`.
    pub fn execute_swap(
        &mut self,
        now: Timestamp,
    ) -> Result<(SwapSettlement<A, B>, CustodyEvent), CustodyError> {
        self.ensure_open()?;
        if !self.is_fully_funded() {
            return Err(CustodyError::SwapNotReady);
        }
        if is_expired(now, self.expiration) {
            return Err(CustodyError::EscrowLocked);
        }

        let settlement = SwapSettlement {
            to_party_a: Payout {
                to: self.party_a,
                coin: self.balance_b.take_all(),
            },
            to_party_b: Payout {
                to: self.party_b,
                coin: self.balance_a.take_all(),
            },
        };
        self.deposited_a = false;
        self.deposited_b = false;
        self.outcome = Some(SwapOutcome::Executed);

        let event = CustodyEvent::SwapExecuted(SwapExecuted {
            swap_id: self.id,
            party_a: self.party_a,
            party_b: self.party_b,
            asset_a: A::SYMBOL.to_string(),
            asset_b: B::SYMBOL.to_string(),
            amount_a: settlement.to_party_b.amount(),
            amount_b: settlement.to_party_a.amount(),
        });
        Ok((settlement, event))
    }

    /// Either party closes the swap and refunds whatever was deposited.
    ///
    /// Allowed once expired, or at any time while not fully funded.
    pub fn cancel_swap(
        &mut self,
        caller: PartyId,
        now: Timestamp,
    ) -> Result<(SwapRefund<A, B>, CustodyEvent), CustodyError> {
        require_any_caller(
            caller,
            &[self.party_a, self.party_b],
            CustodyError::NotSwapParticipant,
        )?;
        self.ensure_open()?;
        if self.is_fully_funded() && !is_expired(now, self.expiration) {
            return Err(CustodyError::SwapNotReady);
        }

        let to_party_a = if self.balance_a.is_zero() {
            None
        } else {
            self.deposited_a = false;
            Some(Payout {
                to: self.party_a,
                coin: self.balance_a.take_all(),
            })
        };
        let to_party_b = if self.balance_b.is_zero() {
            None
        } else {
            self.deposited_b = false;
            Some(Payout {
                to: self.party_b,
                coin: self.balance_b.take_all(),
            })
        };
        self.outcome = Some(SwapOutcome::Cancelled);

        let refund = SwapRefund {
            to_party_a,
            to_party_b,
        };
        let event = CustodyEvent::SwapCancelled(SwapCancelled {
            swap_id: self.id,
            cancelled_by: caller,
            asset_a: A::SYMBOL.to_string(),
            asset_b: B::SYMBOL.to_string(),
            refunded_a: refund.refunded_a(),
            refunded_b: refund.refunded_b(),
        });
        Ok((refund, event))
    }

    fn ensure_open(&self) -> Result<(), CustodyError> {
        if self.outcome.is_some() {
            return Err(CustodyError::SwapNotReady);
        }
        Ok(())
    }

    // ───────────────────────── Accessors ─────────────────────────

    pub fn id(&self) -> SwapId {
        self.id
    }

    pub fn party_a(&self) -> PartyId {
        self.party_a
    }

    pub fn party_b(&self) -> PartyId {
        self.party_b
    }

    pub fn balance_a(&self) -> u64 {
        self.balance_a.value()
    }

    pub fn balance_b(&self) -> u64 {
        self.balance_b.value()
    }

    pub fn deposited_a(&self) -> bool {
        self.deposited_a
    }

    pub fn deposited_b(&self) -> bool {
        self.deposited_b
    }

    pub fn amount_a(&self) -> u64 {
        self.amount_a
    }

    pub fn amount_b(&self) -> u64 {
        self.amount_b
    }

    pub fn expiration(&self) -> Timestamp {
        self.expiration
    }

    pub fn outcome(&self) -> Option<SwapOutcome> {
        self.outcome
    }

    pub fn is_fully_funded(&self) -> bool {
        self.deposited_a && self.deposited_b
    }

    /// Closed and empty, so the object may be deleted.
    pub fn is_settled(&self) -> bool {
        self.outcome.is_some() && self.balance_a.is_zero() && self.balance_b.is_zero()
    }

    pub fn view(&self) -> SwapView {
        SwapView {
            swap_id: self.id,
            party_a: self.party_a,
            party_b: self.party_b,
            asset_a: A::SYMBOL.to_string(),
            asset_b: B::SYMBOL.to_string(),
            amount_a: self.amount_a,
            amount_b: self.amount_b,
            balance_a: self.balance_a.value(),
            balance_b: self.balance_b.value(),
            deposited_a: self.deposited_a,
            deposited_b: self.deposited_b,
            expiration: self.expiration,
            outcome: self.outcome,
        }
    }
}

/// Move exactly `required` from `payment` into an unfunded leg.
fn fund_leg<T: Asset>(
    balance: &mut Coin<T>,
    deposited: &mut bool,
    required: u64,
    payment: &mut Coin<T>,
) -> Result<(), CustodyError> {
    if *deposited || payment.value() != required {
        return Err(CustodyError::InvalidAmount);
    }
    balance
        .join(payment)
        .map_err(|_| CustodyError::InvalidAmount)?;
    *deposited = true;
    Ok(())
}
