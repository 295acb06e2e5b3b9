//! Era arithmetic
//!
//! Logs are partitioned into fixed-length eras; an era is named by its first second.

use crate::settings::FeedConfig;

/// Era containing `time`.
pub fn compute_era(time: i64, era_seconds: i64) -> i64 {
    time - time.rem_euclid(era_seconds)
}

/// Every era overlapping `[start, end]`, newest first.
pub fn eras_between(start: i64, end: i64, era_seconds: i64) -> Vec<i64> {
    let first = compute_era(start, era_seconds);
    let mut era = compute_era(end, era_seconds);
    let mut eras = Vec::new();
    while era >= first {
        eras.push(era);
        era -= era_seconds;
    }
    eras
}

/// Default start of a feed window ending at `end`: the era `lookback` seconds back.
pub fn lookback_start(end: i64, lookback: i64, era_seconds: i64) -> i64 {
    compute_era(end - lookback, era_seconds)
}

/// Resolve the `[start, end]` window a feed covers.
///
/// `end` defaults to the end of the era containing `now`, and `start` to the era
/// `lookback_seconds` before `end`. Both are clamped to `oldest_era`, and `end` never
/// precedes `start`.
pub fn feed_window(
    start: Option<i64>,
    end: Option<i64>,
    now: i64,
    feed: &FeedConfig,
) -> (i64, i64) {
    let era = feed.era_seconds;
    let end = end.unwrap_or_else(|| compute_era(now + era, era));
    let start = start.unwrap_or_else(|| lookback_start(end, feed.lookback_seconds, era));

    let start = start.max(feed.oldest_era);
    let end = end.max(feed.oldest_era).max(start);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed() -> FeedConfig {
        FeedConfig {
            base_repo: "robotzilla/histoire".into(),
            lookback_seconds: 2_419_200,
            era_seconds: ERA,
            oldest_era: 1_538_000_000,
        }
    }

    const ERA: i64 = 1_000_000;

    #[test]
    fn test_compute_era() {
        assert_eq!(compute_era(1_538_123_456, ERA), 1_538_000_000);
        assert_eq!(compute_era(1_538_000_000, ERA), 1_538_000_000);
    }

    #[test]
    fn test_eras_between_newest_first() {
        assert_eq!(
            eras_between(1_538_500_000, 1_540_100_000, ERA),
            vec![1_540_000_000, 1_539_000_000, 1_538_000_000]
        );
    }

    #[test]
    fn test_eras_between_same_era() {
        assert_eq!(eras_between(10, 20, ERA), vec![0]);
    }

    #[test]
    fn test_eras_between_reversed_window_is_empty() {
        assert!(eras_between(3 * ERA, ERA, ERA).is_empty());
    }

    #[test]
    fn test_lookback_start() {
        assert_eq!(lookback_start(1_540_500_000, 2_419_200, ERA), 1_538_000_000);
    }

    #[test]
    fn test_feed_window_defaults() {
        // now sits in era 1_541_000_000, so the window ends where the next era begins.
        assert_eq!(
            feed_window(None, None, 1_541_234_567, &feed()),
            (1_539_000_000, 1_542_000_000)
        );
    }

    #[test]
    fn test_feed_window_clamps_to_oldest_era() {
        assert_eq!(feed_window(Some(5), Some(10), 0, &feed()), (1_538_000_000, 1_538_000_000));
        assert_eq!(
            feed_window(Some(1_540_000_000), Some(1_539_000_000), 0, &feed()),
            (1_540_000_000, 1_540_000_000)
        );
    }
}
