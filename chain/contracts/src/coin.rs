//! Coin: the value-transfer primitive
//!
//! A `Coin<A>` is an owned amount of asset `A`. It is not `Clone`, so value
//! can only be moved, split or joined, never duplicated. Minting and burning
//! happen only through a `Treasury<A>`, which keeps a running total supply so
//! conservation can be checked from the outside.
//!
//! Operations that accept payment borrow the payer's coin mutably and drain
//! it only on success, so a rejected operation never consumes value.
//!
//! `Wallet<A>` is a per-party account book for holding payouts, with the
//! same overflow/underflow checks as a custody vault.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use types::ids::PartyId;

use crate::errors::CoinError;

/// Marker for a kind of value (platform coin, custom token).
pub trait Asset: fmt::Debug + Send + Sync + 'static {
    /// Ticker used in events and logs.
    const SYMBOL: &'static str;
}

/// The platform's native coin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Native;

impl Asset for Native {
    const SYMBOL: &'static str = "NATIVE";
}

/// An owned amount of asset `A`.
pub struct Coin<A: Asset> {
    value: u64,
    _asset: PhantomData<fn() -> A>,
}

impl<A: Asset> Coin<A> {
    fn from_value(value: u64) -> Self {
        Self {
            value,
            _asset: PhantomData,
        }
    }

    /// An empty coin.
    pub fn zero() -> Self {
        Self::from_value(0)
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    /// Split `amount` off into a new coin.
    pub fn split(&mut self, amount: u64) -> Result<Coin<A>, CoinError> {
        if amount > self.value {
            return Err(CoinError::InsufficientValue {
                required: amount,
                available: self.value,
            });
        }
        self.value -= amount;
        Ok(Self::from_value(amount))
    }

    /// Move all of `other` into this coin, leaving `other` at zero.
    ///
    /// On overflow neither coin is modified.
    pub fn join(&mut self, other: &mut Coin<A>) -> Result<(), CoinError> {
        let total = self
            .value
            .checked_add(other.value)
            .ok_or(CoinError::Overflow)?;
        self.value = total;
        other.value = 0;
        Ok(())
    }

    /// Drain this coin to zero, returning what it held.
    pub fn take_all(&mut self) -> Coin<A> {
        Self::from_value(std::mem::take(&mut self.value))
    }

    /// Consume an empty coin.
    pub fn destroy_zero(self) -> Result<(), CoinError> {
        if self.value != 0 {
            return Err(CoinError::NonZero { value: self.value });
        }
        Ok(())
    }
}

impl<A: Asset> fmt::Debug for Coin<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coin<{}>({})", A::SYMBOL, self.value)
    }
}

impl<A: Asset> PartialEq for Coin<A> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<A: Asset> Eq for Coin<A> {}

/// Value released by a contract, addressed to its new owner.
#[derive(Debug)]
pub struct Payout<A: Asset> {
    pub to: PartyId,
    pub coin: Coin<A>,
}

impl<A: Asset> Payout<A> {
    pub fn amount(&self) -> u64 {
        self.coin.value()
    }
}

/// Mint authority for asset `A`.
#[derive(Debug)]
pub struct Treasury<A: Asset> {
    total_supply: u64,
    _asset: PhantomData<fn() -> A>,
}

impl<A: Asset> Treasury<A> {
    pub fn new() -> Self {
        Self {
            total_supply: 0,
            _asset: PhantomData,
        }
    }

    /// Mint `amount` new units.
    pub fn mint(&mut self, amount: u64) -> Result<Coin<A>, CoinError> {
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(CoinError::Overflow)?;
        Ok(Coin::from_value(amount))
    }

    /// Burn a coin, shrinking the supply.
    ///
    /// `coin` is drained only on success; a coin larger than the supply is
    /// left as it was.
    pub fn burn(&mut self, coin: &mut Coin<A>) -> Result<u64, CoinError> {
        self.total_supply = self.total_supply.checked_sub(coin.value).ok_or(
            CoinError::InsufficientValue {
                required: coin.value,
                available: self.total_supply,
            },
        )?;
        Ok(coin.take_all().value)
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }
}

impl<A: Asset> Default for Treasury<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-party balances of a single asset.
#[derive(Debug)]
pub struct Wallet<A: Asset> {
    balances: HashMap<PartyId, Coin<A>>,
}

impl<A: Asset> Wallet<A> {
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    /// Credit the whole of `coin` to `party`, leaving `coin` at zero.
    pub fn credit(&mut self, party: PartyId, coin: &mut Coin<A>) -> Result<(), CoinError> {
        self.balances.entry(party).or_insert_with(Coin::zero).join(coin)
    }

    /// Withdraw `amount` from `party` as a coin.
    pub fn withdraw(&mut self, party: &PartyId, amount: u64) -> Result<Coin<A>, CoinError> {
        match self.balances.get_mut(party) {
            Some(coin) => coin.split(amount),
            None => Err(CoinError::InsufficientValue {
                required: amount,
                available: 0,
            }),
        }
    }

    pub fn balance(&self, party: &PartyId) -> u64 {
        self.balances.get(party).map_or(0, Coin::value)
    }

    /// Sum of all balances.
    pub fn total(&self) -> u64 {
        self.balances.values().map(Coin::value).sum()
    }
}

impl<A: Asset> Default for Wallet<A> {
    fn default() -> Self {
        Self::new()
    }
}
