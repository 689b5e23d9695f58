//! Jittered exponential backoff for retry scheduling.

use std::time::Duration;

use rand::Rng;

/// Computes the delay before retry number `attempt` (zero-based).
///
/// The exponential delay `base * 2^attempt` is capped at `max`, then
/// jittered uniformly over its upper half so competing writers do not
/// retry in lockstep.
#[must_use]
pub fn backoff_with_jitter(base: Duration, max: Duration, attempt: u32) -> Duration {
    let exp = base.saturating_mul(2u32.saturating_pow(attempt.min(16)));
    let capped = exp.min(max);
    let millis = capped.as_millis().min(u128::from(u64::MAX)) as u64;
    if millis < 2 {
        return capped;
    }
    let jittered = rand::thread_rng().gen_range(millis / 2..=millis);
    Duration::from_millis(jittered)
}
