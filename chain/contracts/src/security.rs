//! Shared access-control and time predicates
//!
//! Both state machines run every guard through these helpers before touching
//! any state, so a failed check can never leave a partial mutation behind.

use types::ids::PartyId;
use types::time::Timestamp;

use crate::errors::CustodyError;

/// Require `caller` to be exactly `expected`.
pub fn require_caller(
    caller: PartyId,
    expected: PartyId,
    err: CustodyError,
) -> Result<(), CustodyError> {
    if caller != expected {
        return Err(err);
    }
    Ok(())
}

/// Require `caller` to be one of `allowed`.
pub fn require_any_caller(
    caller: PartyId,
    allowed: &[PartyId],
    err: CustodyError,
) -> Result<(), CustodyError> {
    if !allowed.contains(&caller) {
        return Err(err);
    }
    Ok(())
}

/// An absent time lock is always open; otherwise `now` must have reached it.
pub fn is_unlocked(now: Timestamp, unlock_time: Option<Timestamp>) -> bool {
    unlock_time.map_or(true, |t| now >= t)
}

/// Expiration is inclusive: at `expiration` the object is already expired.
pub fn is_expired(now: Timestamp, expiration: Timestamp) -> bool {
    now >= expiration
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_caller() {
        let alice = PartyId::new();
        let bob = PartyId::new();
        assert!(require_caller(alice, alice, CustodyError::NotSender).is_ok());
        assert_eq!(
            require_caller(bob, alice, CustodyError::NotSender),
            Err(CustodyError::NotSender)
        );
    }

    #[test]
    fn test_require_any_caller() {
        let alice = PartyId::new();
        let bob = PartyId::new();
        let eve = PartyId::new();
        let parties = [alice, bob];
        assert!(require_any_caller(bob, &parties, CustodyError::NotSwapParticipant).is_ok());
        assert_eq!(
            require_any_caller(eve, &parties, CustodyError::NotSwapParticipant),
            Err(CustodyError::NotSwapParticipant)
        );
    }

    #[test]
    fn test_is_unlocked() {
        assert!(is_unlocked(0, None));
        assert!(!is_unlocked(999, Some(1000)));
        assert!(is_unlocked(1000, Some(1000)));
        assert!(is_unlocked(1001, Some(1000)));
    }

    #[test]
    fn test_is_expired_boundary() {
        assert!(!is_expired(1999, 2000));
        assert!(is_expired(2000, 2000));
    }
}
