use time::{Duration, PrimitiveDateTime};

use crate::core::time::seconds_until;

/// A zero time limit still gives the student one minute.
pub(crate) fn compute_expiration(started_at: PrimitiveDateTime, time_limit_minutes: u32) -> PrimitiveDateTime {
    let limit = Duration::minutes(i64::from(time_limit_minutes.max(1)));
    started_at.checked_add(limit).unwrap_or(PrimitiveDateTime::MAX)
}

/// Last moment a manual submit keeps the answers it posts.
pub(crate) fn submit_deadline(expires_at: PrimitiveDateTime, grace_seconds: u64) -> PrimitiveDateTime {
    expires_at.checked_add(grace(grace_seconds)).unwrap_or(PrimitiveDateTime::MAX)
}

pub(crate) fn is_past_deadline(
    expires_at: PrimitiveDateTime,
    grace_seconds: u64,
    now: PrimitiveDateTime,
) -> bool {
    now > submit_deadline(expires_at, grace_seconds)
}

/// Attempts that expired before this instant are no longer inside the grace window.
pub(crate) fn sweep_cutoff(now: PrimitiveDateTime, grace_seconds: u64) -> PrimitiveDateTime {
    now.checked_sub(grace(grace_seconds)).unwrap_or(PrimitiveDateTime::MIN)
}

/// Out-of-range values saturate at the calendar bounds in the callers above.
fn grace(grace_seconds: u64) -> Duration {
    Duration::seconds(i64::try_from(grace_seconds).unwrap_or(i64::MAX))
}

pub(crate) fn remaining_seconds(expires_at: PrimitiveDateTime, now: PrimitiveDateTime) -> i64 {
    seconds_until(now, expires_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn expiration_adds_time_limit() {
        let start = datetime!(2026-03-01 09:00);
        assert_eq!(compute_expiration(start, 10), datetime!(2026-03-01 09:10));
        assert_eq!(compute_expiration(start, 0), datetime!(2026-03-01 09:01));
    }

    #[test]
    fn grace_window_is_inclusive() {
        let expires = datetime!(2026-03-01 09:10);
        assert!(!is_past_deadline(expires, 30, datetime!(2026-03-01 09:10:30)));
        assert!(is_past_deadline(expires, 30, datetime!(2026-03-01 09:10:31)));
        assert!(is_past_deadline(expires, 0, datetime!(2026-03-01 09:10:00.5)));
    }

    #[test]
    fn sweep_cutoff_trails_now_by_grace() {
        assert_eq!(
            sweep_cutoff(datetime!(2026-03-01 09:10:30), 30),
            datetime!(2026-03-01 09:10)
        );
    }

    #[test]
    fn extreme_limits_saturate_instead_of_overflowing() {
        let start = datetime!(2026-03-01 09:00);
        assert_eq!(compute_expiration(start, u32::MAX), PrimitiveDateTime::MAX);
        assert_eq!(submit_deadline(start, u64::MAX), PrimitiveDateTime::MAX);
        assert_eq!(sweep_cutoff(start, u64::MAX), PrimitiveDateTime::MIN);
        assert!(!is_past_deadline(start, u64::MAX, datetime!(2100-01-01 00:00)));
    }

    #[test]
    fn remaining_seconds_clamps_at_zero() {
        let expires = datetime!(2026-03-01 09:10);
        assert_eq!(remaining_seconds(expires, datetime!(2026-03-01 09:09)), 60);
        assert_eq!(remaining_seconds(expires, datetime!(2026-03-01 09:11)), 0);
    }
}
