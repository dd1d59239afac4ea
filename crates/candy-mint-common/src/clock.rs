//! Wall clock readings compared against on-chain timestamps
//!
//! Go-live dates and gating expiries are unix seconds stored as `i64`.

use web_time::{SystemTime, UNIX_EPOCH};

/// Seconds since the unix epoch, zero if the clock is before it
pub fn unix_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// [`unix_time`] in the signed form the machine account uses
pub fn ledger_now() -> i64 {
    i64::try_from(unix_time()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_now_tracks_unix_time() {
        let before = unix_time();
        let now = ledger_now();
        let after = unix_time();

        assert!(now >= before as i64 && now <= after as i64);
        // 2021-09-01, older than any Candy Machine v2 drop
        assert!(now > 1_630_454_400);
    }
}
