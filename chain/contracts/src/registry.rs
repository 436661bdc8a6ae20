//! Registries: escrow and swap objects on the shared ledger
//!
//! A registry owns every live object of one kind. Each operation locks the
//! target object, runs the state machine, and publishes the resulting event
//! before the lock is released, so events for one object reach the sink in
//! the order their transitions committed. Released value is handed back to
//! the caller as a [`Payout`] and never stays in the registry.

use std::sync::Arc;

use tracing::{debug, info, warn};
use types::ids::{EscrowId, PartyId, SwapId};
use types::time::Timestamp;

use crate::coin::{Asset, Coin, Payout};
use crate::config::CustodyConfig;
use crate::context::TxContext;
use crate::errors::{CustodyError, LedgerError};
use crate::escrow::{Escrow, EscrowTerms, EscrowView};
use crate::events::CustodyEvent;
use crate::sink::{EventSink, NullSink, TracingSink};
use crate::store::ObjectStore;
use crate::swap::{Swap, SwapRefund, SwapSettlement, SwapView};

/// Delivers events to the configured sink, mirrored to `tracing` if enabled.
#[derive(Clone)]
struct Publisher {
    sink: Arc<dyn EventSink>,
    mirror_to_tracing: bool,
}

impl Publisher {
    fn new(sink: Arc<dyn EventSink>, config: &CustodyConfig) -> Self {
        Self {
            sink,
            mirror_to_tracing: config.emit_tracing,
        }
    }

    fn publish(&self, event: &CustodyEvent) {
        self.sink.emit(event);
        if self.mirror_to_tracing {
            TracingSink.emit(event);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// Escrows
// ═══════════════════════════════════════════════════════════════════

/// All live escrows holding asset `A`.
pub struct EscrowRegistry<A: Asset> {
    escrows: ObjectStore<EscrowId, Escrow<A>>,
    publisher: Publisher,
    config: CustodyConfig,
}

impl<A: Asset> EscrowRegistry<A> {
    pub fn new(config: CustodyConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            escrows: ObjectStore::new(),
            publisher: Publisher::new(sink, &config),
            config,
        }
    }

    /// Default configuration, events only in the `tracing` log.
    pub fn with_defaults() -> Self {
        Self::new(CustodyConfig::default(), Arc::new(NullSink))
    }

    /// Create an escrow funded with the whole of `deposit`.
    ///
    /// `deposit` is drained only if the escrow is created.
    pub fn create(
        &self,
        ctx: &TxContext,
        deposit: &mut Coin<A>,
        terms: EscrowTerms,
    ) -> Result<EscrowId, LedgerError> {
        if deposit.value() < self.config.min_deposit {
            warn!(
                sender = %ctx.sender,
                amount = deposit.value(),
                min_deposit = self.config.min_deposit,
                "escrow deposit below minimum"
            );
            return Err(CustodyError::InvalidAmount.into());
        }
        if terms.memo.len() > self.config.max_memo_bytes {
            return Err(LedgerError::MemoTooLarge {
                len: terms.memo.len(),
                max: self.config.max_memo_bytes,
            });
        }

        let (escrow, event) = Escrow::create(ctx.sender, deposit, terms)?;
        let escrow_id = escrow.id();
        let amount = escrow.held_value();
        // Unreachable by id until inserted, so the creation event is first.
        self.publisher.publish(&event);
        self.escrows.insert(escrow_id, escrow);

        info!(
            escrow_id = %escrow_id,
            sender = %ctx.sender,
            asset = A::SYMBOL,
            amount,
            "escrow created"
        );
        Ok(escrow_id)
    }

    /// Recipient takes the held value.
    pub fn accept(&self, ctx: &TxContext, escrow_id: EscrowId) -> Result<Payout<A>, LedgerError> {
        let payout = self.transact("accept", ctx, escrow_id, |escrow| {
            escrow.accept(ctx.sender, ctx.timestamp)
        })?;
        info!(
            escrow_id = %escrow_id,
            recipient = %payout.to,
            amount = payout.amount(),
            "escrow accepted"
        );
        Ok(payout)
    }

    /// Sender takes the held value back.
    pub fn cancel(&self, ctx: &TxContext, escrow_id: EscrowId) -> Result<Payout<A>, LedgerError> {
        let payout = self.transact("cancel", ctx, escrow_id, |escrow| {
            escrow.cancel(ctx.sender)
        })?;
        info!(
            escrow_id = %escrow_id,
            sender = %payout.to,
            amount = payout.amount(),
            "escrow cancelled"
        );
        Ok(payout)
    }

    pub fn raise_dispute(&self, ctx: &TxContext, escrow_id: EscrowId) -> Result<(), LedgerError> {
        self.transact("raise_dispute", ctx, escrow_id, |escrow| {
            escrow.raise_dispute(ctx.sender).map(|event| ((), event))
        })?;
        info!(escrow_id = %escrow_id, raised_by = %ctx.sender, "dispute raised");
        Ok(())
    }

    pub fn resolve_dispute(
        &self,
        ctx: &TxContext,
        escrow_id: EscrowId,
        award_to_sender: bool,
    ) -> Result<Payout<A>, LedgerError> {
        let payout = self.transact("resolve_dispute", ctx, escrow_id, |escrow| {
            escrow.resolve_dispute(ctx.sender, award_to_sender)
        })?;
        info!(
            escrow_id = %escrow_id,
            awarded_to = %payout.to,
            award_to_sender,
            amount = payout.amount(),
            "dispute resolved"
        );
        Ok(payout)
    }

    pub fn view(&self, escrow_id: EscrowId) -> Result<EscrowView, LedgerError> {
        debug!(escrow_id = %escrow_id, "escrow lookup");
        self.escrows
            .with(&escrow_id, Escrow::view)
            .ok_or(LedgerError::EscrowNotFound { escrow_id })
    }

    /// Delete a released escrow. Fails with `NotAccepted` while it still holds value.
    pub fn remove_settled(&self, escrow_id: EscrowId) -> Result<(), LedgerError> {
        match self.escrows.remove_if(&escrow_id, Escrow::is_settled) {
            Some(_) => {
                debug!(escrow_id = %escrow_id, "settled escrow removed");
                Ok(())
            }
            None if self.escrows.contains(&escrow_id) => Err(CustodyError::NotAccepted.into()),
            None => Err(LedgerError::EscrowNotFound { escrow_id }),
        }
    }

    pub fn ids(&self) -> Vec<EscrowId> {
        self.escrows.ids()
    }

    pub fn len(&self) -> usize {
        self.escrows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.escrows.is_empty()
    }

    pub fn config(&self) -> &CustodyConfig {
        &self.config
    }

    fn transact<R>(
        &self,
        op: &'static str,
        ctx: &TxContext,
        escrow_id: EscrowId,
        f: impl FnOnce(&mut Escrow<A>) -> Result<(R, CustodyEvent), CustodyError>,
    ) -> Result<R, LedgerError> {
        let outcome = self
            .escrows
            .with_mut(&escrow_id, |escrow| {
                let (value, event) = f(escrow)?;
                self.publisher.publish(&event);
                Ok::<R, CustodyError>(value)
            })
            .ok_or(LedgerError::EscrowNotFound { escrow_id })?;

        outcome.map_err(|err| {
            warn!(
                op,
                escrow_id = %escrow_id,
                caller = %ctx.sender,
                code = err.code(),
                error = %err,
                "escrow operation rejected"
            );
            err.into()
        })
    }
}

// ═══════════════════════════════════════════════════════════════════
// Swaps
// ═══════════════════════════════════════════════════════════════════

/// All live swaps exchanging `A` for `B`.
pub struct SwapRegistry<A: Asset, B: Asset> {
    swaps: ObjectStore<SwapId, Swap<A, B>>,
    publisher: Publisher,
    config: CustodyConfig,
}

impl<A: Asset, B: Asset> SwapRegistry<A, B> {
    pub fn new(config: CustodyConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            swaps: ObjectStore::new(),
            publisher: Publisher::new(sink, &config),
            config,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(CustodyConfig::default(), Arc::new(NullSink))
    }

    /// Create an unfunded swap. The caller becomes party A.
    pub fn create_swap(
        &self,
        ctx: &TxContext,
        party_b: PartyId,
        amount_a: u64,
        amount_b: u64,
        expiration: Timestamp,
    ) -> Result<SwapId, LedgerError> {
        let (swap, event) = Swap::create_swap(ctx.sender, party_b, amount_a, amount_b, expiration)
            .map_err(|err| {
                warn!(
                    party_a = %ctx.sender,
                    amount_a,
                    amount_b,
                    code = err.code(),
                    "swap rejected"
                );
                err
            })?;
        let swap_id = swap.id();
        self.publisher.publish(&event);
        self.swaps.insert(swap_id, swap);

        info!(
            swap_id = %swap_id,
            party_a = %ctx.sender,
            party_b = %party_b,
            amount_a,
            amount_b,
            expiration,
            "swap created"
        );
        Ok(swap_id)
    }

    /// Party A funds its leg. `payment` is drained only on success.
    pub fn deposit_a(
        &self,
        ctx: &TxContext,
        swap_id: SwapId,
        payment: &mut Coin<A>,
    ) -> Result<(), LedgerError> {
        self.transact("deposit_a", ctx, swap_id, |swap| {
            swap.deposit_a(ctx.sender, payment).map(|event| ((), event))
        })?;
        info!(swap_id = %swap_id, party = %ctx.sender, asset = A::SYMBOL, "swap leg A funded");
        Ok(())
    }

    /// Party B funds its leg. `payment` is drained only on success.
    pub fn deposit_b(
        &self,
        ctx: &TxContext,
        swap_id: SwapId,
        payment: &mut Coin<B>,
    ) -> Result<(), LedgerError> {
        self.transact("deposit_b", ctx, swap_id, |swap| {
            swap.deposit_b(ctx.sender, payment).map(|event| ((), event))
        })?;
        info!(swap_id = %swap_id, party = %ctx.sender, asset = B::SYMBOL, "swap leg B funded");
        Ok(())
    }

    /// Exchange both legs. Any caller may trigger it.
    pub fn execute_swap(
        &self,
        ctx: &TxContext,
        swap_id: SwapId,
    ) -> Result<SwapSettlement<A, B>, LedgerError> {
        let settlement = self.transact("execute_swap", ctx, swap_id, |swap| {
            swap.execute_swap(ctx.timestamp)
        })?;
        info!(
            swap_id = %swap_id,
            triggered_by = %ctx.sender,
            amount_a = settlement.to_party_b.amount(),
            amount_b = settlement.to_party_a.amount(),
            "swap executed"
        );
        Ok(settlement)
    }

    /// Either party closes the swap and takes back whatever it deposited.
    pub fn cancel_swap(
        &self,
        ctx: &TxContext,
        swap_id: SwapId,
    ) -> Result<SwapRefund<A, B>, LedgerError> {
        let refund = self.transact("cancel_swap", ctx, swap_id, |swap| {
            swap.cancel_swap(ctx.sender, ctx.timestamp)
        })?;
        info!(
            swap_id = %swap_id,
            cancelled_by = %ctx.sender,
            refunded_a = refund.refunded_a(),
            refunded_b = refund.refunded_b(),
            "swap cancelled"
        );
        Ok(refund)
    }

    pub fn view(&self, swap_id: SwapId) -> Result<SwapView, LedgerError> {
        debug!(swap_id = %swap_id, "swap lookup");
        self.swaps
            .with(&swap_id, Swap::view)
            .ok_or(LedgerError::SwapNotFound { swap_id })
    }

    /// Delete a closed, empty swap. Fails with `SwapNotReady` while it is open.
    pub fn remove_settled(&self, swap_id: SwapId) -> Result<(), LedgerError> {
        match self.swaps.remove_if(&swap_id, Swap::is_settled) {
            Some(_) => {
                debug!(swap_id = %swap_id, "settled swap removed");
                Ok(())
            }
            None if self.swaps.contains(&swap_id) => Err(CustodyError::SwapNotReady.into()),
            None => Err(LedgerError::SwapNotFound { swap_id }),
        }
    }

    pub fn ids(&self) -> Vec<SwapId> {
        self.swaps.ids()
    }

    pub fn len(&self) -> usize {
        self.swaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swaps.is_empty()
    }

    pub fn config(&self) -> &CustodyConfig {
        &self.config
    }

    fn transact<R>(
        &self,
        op: &'static str,
        ctx: &TxContext,
        swap_id: SwapId,
        f: impl FnOnce(&mut Swap<A, B>) -> Result<(R, CustodyEvent), CustodyError>,
    ) -> Result<R, LedgerError> {
        let outcome = self
            .swaps
            .with_mut(&swap_id, |swap| {
                let (value, event) = f(swap)?;
                self.publisher.publish(&event);
                Ok::<R, CustodyError>(value)
            })
            .ok_or(LedgerError::SwapNotFound { swap_id })?;

        outcome.map_err(|err| {
            warn!(
                op,
                swap_id = %swap_id,
                caller = %ctx.sender,
                code = err.code(),
                error = %err,
                "swap operation rejected"
            );
            err.into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coin::{Native, Treasury};
    use crate::escrow::EscrowStatus;
    use crate::sink::MemorySink;
    use crate::swap::SwapOutcome;

    #[derive(Debug)]
    struct Usdc;
    impl Asset for Usdc {
        const SYMBOL: &'static str = "USDC";
    }

    fn quiet() -> CustodyConfig {
        CustodyConfig {
            emit_tracing: false,
            ..CustodyConfig::default()
        }
    }

    fn escrow_registry() -> (EscrowRegistry<Native>, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (EscrowRegistry::new(quiet(), sink.clone()), sink)
    }

    fn swap_registry() -> (SwapRegistry<Native, Usdc>, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (SwapRegistry::new(quiet(), sink.clone()), sink)
    }

    // ─── Escrows ───

    #[test]
    fn test_create_and_accept() {
        let (registry, sink) = escrow_registry();
        let mut treasury = Treasury::<Native>::new();
        let sender = PartyId::new();
        let recipient = PartyId::new();

        let mut deposit = treasury.mint(1000).unwrap();
        let id = registry
            .create(&TxContext::new(sender, 0), &mut deposit, EscrowTerms::to(recipient))
            .unwrap();
        assert!(deposit.is_zero());
        assert_eq!(registry.view(id).unwrap().held_value, 1000);

        let payout = registry.accept(&TxContext::new(recipient, 1), id).unwrap();
        assert_eq!(payout.to, recipient);
        assert_eq!(payout.amount(), 1000);
        assert_eq!(registry.view(id).unwrap().status, EscrowStatus::Accepted);

        let labels: Vec<_> = sink.events().iter().map(CustodyEvent::label).collect();
        assert_eq!(labels, vec!["escrow_created", "escrow_accepted"]);
    }

    #[test]
    fn test_rejection_emits_nothing() {
        let (registry, sink) = escrow_registry();
        let sender = PartyId::new();
        let mut deposit = Treasury::<Native>::new().mint(10).unwrap();
        let id = registry
            .create(&TxContext::new(sender, 0), &mut deposit, EscrowTerms::to(PartyId::new()))
            .unwrap();
        sink.drain();

        let err = registry.accept(&TxContext::new(sender, 0), id).unwrap_err();
        assert_eq!(err, LedgerError::Custody(CustodyError::NotRecipient));
        assert_eq!(err.custody_code(), Some(1));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_below_min_deposit_keeps_coin() {
        let sink = Arc::new(MemorySink::new());
        let config = CustodyConfig {
            min_deposit: 100,
            ..quiet()
        };
        let registry = EscrowRegistry::<Native>::new(config, sink);
        let mut deposit = Treasury::<Native>::new().mint(99).unwrap();

        let err = registry
            .create(
                &TxContext::new(PartyId::new(), 0),
                &mut deposit,
                EscrowTerms::to(PartyId::new()),
            )
            .unwrap_err();
        assert_eq!(err, LedgerError::Custody(CustodyError::InvalidAmount));
        assert_eq!(deposit.value(), 99);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_memo_limit() {
        let (registry, _) = escrow_registry();
        let mut deposit = Treasury::<Native>::new().mint(5).unwrap();
        let terms = EscrowTerms::to(PartyId::new()).with_memo(vec![0u8; 1025]);

        let err = registry
            .create(&TxContext::new(PartyId::new(), 0), &mut deposit, terms)
            .unwrap_err();
        assert_eq!(err, LedgerError::MemoTooLarge { len: 1025, max: 1024 });
        assert_eq!(deposit.value(), 5);
    }

    #[test]
    fn test_unknown_escrow() {
        let (registry, _) = escrow_registry();
        let id = EscrowId::new();
        let ctx = TxContext::new(PartyId::new(), 0);
        assert_eq!(
            registry.accept(&ctx, id).unwrap_err(),
            LedgerError::EscrowNotFound { escrow_id: id }
        );
        assert_eq!(
            registry.view(id).unwrap_err(),
            LedgerError::EscrowNotFound { escrow_id: id }
        );
    }

    #[test]
    fn test_dispute_flow() {
        let (registry, sink) = escrow_registry();
        let sender = PartyId::new();
        let recipient = PartyId::new();
        let arbiter = PartyId::new();
        let mut deposit = Treasury::<Native>::new().mint(300).unwrap();
        let id = registry
            .create(
                &TxContext::new(sender, 0),
                &mut deposit,
                EscrowTerms::to(recipient).with_arbiter(arbiter),
            )
            .unwrap();

        registry.raise_dispute(&TxContext::new(recipient, 1), id).unwrap();
        assert_eq!(
            registry.cancel(&TxContext::new(sender, 2), id).unwrap_err(),
            LedgerError::Custody(CustodyError::InDispute)
        );

        let payout = registry
            .resolve_dispute(&TxContext::new(arbiter, 3), id, true)
            .unwrap();
        assert_eq!(payout.to, sender);
        assert_eq!(payout.amount(), 300);

        let labels: Vec<_> = sink.events().iter().map(CustodyEvent::label).collect();
        assert_eq!(labels, vec!["escrow_created", "dispute_raised", "dispute_resolved"]);
    }

    #[test]
    fn test_remove_settled_escrow() {
        let (registry, _) = escrow_registry();
        let sender = PartyId::new();
        let mut deposit = Treasury::<Native>::new().mint(10).unwrap();
        let id = registry
            .create(&TxContext::new(sender, 0), &mut deposit, EscrowTerms::to(PartyId::new()))
            .unwrap();

        assert_eq!(
            registry.remove_settled(id).unwrap_err(),
            LedgerError::Custody(CustodyError::NotAccepted)
        );

        registry.cancel(&TxContext::new(sender, 0), id).unwrap();
        registry.remove_settled(id).unwrap();
        assert!(registry.is_empty());
        assert_eq!(
            registry.remove_settled(id).unwrap_err(),
            LedgerError::EscrowNotFound { escrow_id: id }
        );
    }

    // ─── Swaps ───

    #[test]
    fn test_swap_round_trip() {
        let (registry, sink) = swap_registry();
        let a = PartyId::new();
        let b = PartyId::new();
        let id = registry
            .create_swap(&TxContext::new(a, 0), b, 500, 1000, 10_000)
            .unwrap();

        let mut pay_a = Treasury::<Native>::new().mint(500).unwrap();
        let mut pay_b = Treasury::<Usdc>::new().mint(1000).unwrap();
        registry.deposit_a(&TxContext::new(a, 1), id, &mut pay_a).unwrap();
        registry.deposit_b(&TxContext::new(b, 2), id, &mut pay_b).unwrap();

        let settlement = registry
            .execute_swap(&TxContext::new(PartyId::new(), 3), id)
            .unwrap();
        assert_eq!(settlement.to_party_a.to, a);
        assert_eq!(settlement.to_party_a.amount(), 1000);
        assert_eq!(settlement.to_party_b.to, b);
        assert_eq!(settlement.to_party_b.amount(), 500);
        assert_eq!(registry.view(id).unwrap().outcome, Some(SwapOutcome::Executed));

        let labels: Vec<_> = sink.events().iter().map(CustodyEvent::label).collect();
        assert_eq!(
            labels,
            vec!["swap_created", "swap_deposited", "swap_deposited", "swap_executed"]
        );

        registry.remove_settled(id).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_swap_inexact_deposit_keeps_coin() {
        let (registry, _) = swap_registry();
        let a = PartyId::new();
        let id = registry
            .create_swap(&TxContext::new(a, 0), PartyId::new(), 500, 1000, 10_000)
            .unwrap();

        let mut payment = Treasury::<Native>::new().mint(501).unwrap();
        assert_eq!(
            registry.deposit_a(&TxContext::new(a, 0), id, &mut payment).unwrap_err(),
            LedgerError::Custody(CustodyError::InvalidAmount)
        );
        assert_eq!(payment.value(), 501);
    }

    #[test]
    fn test_swap_cancel_and_remove() {
        let (registry, _) = swap_registry();
        let a = PartyId::new();
        let b = PartyId::new();
        let id = registry
            .create_swap(&TxContext::new(a, 0), b, 5, 7, 100)
            .unwrap();
        assert_eq!(
            registry.remove_settled(id).unwrap_err(),
            LedgerError::Custody(CustodyError::SwapNotReady)
        );

        let mut pay_b = Treasury::<Usdc>::new().mint(7).unwrap();
        registry.deposit_b(&TxContext::new(b, 1), id, &mut pay_b).unwrap();

        let refund = registry.cancel_swap(&TxContext::new(a, 2), id).unwrap();
        assert_eq!(refund.refunded_a(), 0);
        assert_eq!(refund.refunded_b(), 7);
        registry.remove_settled(id).unwrap();
    }

    #[test]
    fn test_unknown_swap() {
        let (registry, _) = swap_registry();
        let id = SwapId::new();
        assert_eq!(
            registry
                .execute_swap(&TxContext::new(PartyId::new(), 0), id)
                .unwrap_err(),
            LedgerError::SwapNotFound { swap_id: id }
        );
    }
}
