//! Reconstruction of the two clocks carried by a scaler stream
//!
//! Every read carries a host wall-clock stamp: absolute but imprecise. The
//! reference channel's increments give a second clock: precise but relative
//! to the first read. Rates use the counter clock for spacing and the host
//! clock only to anchor results to the epoch.

use chrono::{DateTime, Utc};
use itertools::Itertools;

/// Number of stale reads at the head of an acquisition stream.
///
/// At startup the acquisition logs its pre-allocated ring buffer before
/// overwriting it, leaving out-of-order host timestamps at the head of the
/// stream. A stable argsort of the host clock is the identity from some
/// index K onward; K is the number of reads to discard. Sorted input gives 0.
pub fn leading_corruption_offset(host_time: &[f64]) -> usize {
    let mut perm: Vec<usize> = (0..host_time.len()).collect();
    perm.sort_by(|&a, &b| host_time[a].total_cmp(&host_time[b]));
    match perm.iter().enumerate().rposition(|(i, &p)| p != i) {
        Some(i) => i + 1,
        None => 0,
    }
}

/// Elapsed seconds since the first read: 0-prepended running sum of the
/// per-interval elapsed times.
pub fn relative_time(delta_time: &[f64]) -> Vec<f64> {
    let mut t = Vec::with_capacity(delta_time.len() + 1);
    t.push(0.0);
    let mut acc = 0.0;
    for &dt in delta_time {
        acc += dt;
        t.push(acc);
    }
    t
}

/// Midpoints of consecutive entries. Rates describe intervals, not instants,
/// so this is the axis to plot them against.
pub fn middles(time: &[f64]) -> Vec<f64> {
    time.iter()
        .copied()
        .tuple_windows()
        .map(|(a, b)| a + (b - a) / 2.0)
        .collect()
}

/// Epoch-second stamps as calendar datetimes.
pub fn datetimes(epoch: &[f64]) -> Vec<DateTime<Utc>> {
    epoch
        .iter()
        .map(|&s| {
            let secs = s.floor();
            let nanos = ((s - secs) * 1e9).round() as u32;
            DateTime::from_timestamp(secs as i64, nanos.min(999_999_999)).unwrap_or_default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsorted_head_detected() {
        let t = [5.0, 4.0, 3.0, 2.0, 1.0, 10.0, 11.0, 12.0];
        assert_eq!(leading_corruption_offset(&t), 5);
    }

    #[test]
    fn sorted_input_keeps_everything() {
        assert_eq!(leading_corruption_offset(&[1.0, 2.0, 3.0]), 0);
        assert_eq!(leading_corruption_offset(&[]), 0);
        assert_eq!(leading_corruption_offset(&[7.0]), 0);
        // Equal stamps are in order as far as the host clock can tell
        assert_eq!(leading_corruption_offset(&[1.0, 1.0, 2.0]), 0);
    }

    #[test]
    fn fully_unsorted_discards_everything() {
        assert_eq!(leading_corruption_offset(&[3.0, 2.0, 1.0]), 3);
    }

    #[test]
    fn relative_time_starts_at_zero() {
        let t = relative_time(&[0.5, 0.5, 1.0]);
        assert_eq!(t, vec![0.0, 0.5, 1.0, 2.0]);
        assert_eq!(relative_time(&[]), vec![0.0]);
    }

    #[test]
    fn interval_midpoints() {
        assert_eq!(middles(&[0.0, 1.0, 3.0]), vec![0.5, 2.0]);
        assert!(middles(&[4.2]).is_empty());
    }

    #[test]
    fn epoch_to_datetime() {
        let dt = datetimes(&[0.0, 1_600_000_000.5]);
        assert_eq!(dt[0], DateTime::UNIX_EPOCH);
        assert_eq!(dt[1].timestamp(), 1_600_000_000);
        assert_eq!(dt[1].timestamp_subsec_millis(), 500);
    }
}
