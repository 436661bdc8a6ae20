//! Ledger time
//!
//! Time is supplied by the invoking transaction context and is never tracked
//! internally by the contracts.

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// One second in ledger time units.
pub const MILLIS_PER_SECOND: Timestamp = 1_000;

/// Convert whole seconds into ledger time units, saturating on overflow.
pub fn seconds(secs: i64) -> Timestamp {
    secs.saturating_mul(MILLIS_PER_SECOND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_conversion() {
        assert_eq!(seconds(3), 3_000);
        assert_eq!(seconds(i64::MAX), i64::MAX);
    }
}
