//! Rotation policy evaluation.
//!
//! Pure functions over a typed [`DecoySpec`] and an explicit `now`, so the
//! scheduling rules are unit-testable independent of the store and the
//! clock.

use std::time::Duration;

use chrono::{DateTime, Utc};
use snare_secrets::DecoySpec;

/// Floor for the next-check delay.
///
/// Keeps clock skew or a nearly-elapsed interval from turning into a tight
/// reconcile storm.
pub const MIN_CHECK_DELAY: Duration = Duration::from_secs(60);

/// Decides whether an object is due for rotation.
///
/// An object with no recorded (or unparsable) last rotation is always due:
/// an ungoverned secret is a weaker decoy than a freshly rotated one.
#[must_use]
pub fn needs_rotation(spec: &DecoySpec, now: DateTime<Utc>) -> bool {
    let Some(last) = spec.last_rotation else {
        return true;
    };
    let Ok(interval) = chrono::Duration::from_std(spec.interval) else {
        // Interval too large to represent; rotate rather than stall
        return true;
    };
    now.signed_duration_since(last) > interval
}

/// Computes how long to wait before the next check of an object.
///
/// When rotation is due (or has just happened), the full effective interval
/// applies. Otherwise the remaining time is used, floored at
/// [`MIN_CHECK_DELAY`]. A last-rotation in the future counts as zero
/// elapsed time.
#[must_use]
pub fn next_check_delay(spec: &DecoySpec, now: DateTime<Utc>) -> Duration {
    if needs_rotation(spec, now) {
        return spec.interval;
    }
    let Some(last) = spec.last_rotation else {
        return spec.interval;
    };
    let elapsed = now
        .signed_duration_since(last)
        .to_std()
        .unwrap_or(Duration::ZERO);
    spec.interval.saturating_sub(elapsed).max(MIN_CHECK_DELAY)
}
