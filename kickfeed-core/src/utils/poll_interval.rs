use std::time::Duration;

/// Time left to sleep after a round that took `elapsed`, so rounds start
/// no closer than `interval` apart. A round that overran starts the next one
/// immediately.
pub fn remaining_interval(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}
