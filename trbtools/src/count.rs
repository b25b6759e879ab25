//! Decoding of raw scaler reads into per-interval counts and rates

use crate::err::ScalerError;
use crate::COUNTER_WRAP;
use itertools::Itertools;
use num_traits::{PrimInt, Unsigned};

/// Split one raw read into its true counter magnitude and the active flag.
///
/// Reinterpreted as a signed 32-bit integer, a negative read means the
/// channel's active bit was latched during the read; adding back 2^31
/// recovers the counter value.
#[inline]
pub fn strip_active(raw: u32) -> (u32, bool) {
    let signed = raw as i32;
    if signed.is_negative() {
        ((signed as i64 + COUNTER_WRAP) as u32, true)
    } else {
        (raw, false)
    }
}

/// Correct one channel of raw reads for the active bit and counter overflow.
///
/// Returns the per-interval increments (length N-1) and the per-read active
/// flags (length N). A zero increment is valid data: the channel simply saw
/// no events that interval.
pub fn channel_dcounts(raw: &[u32]) -> (Vec<u32>, Vec<bool>) {
    let mut values = Vec::with_capacity(raw.len());
    let mut active = Vec::with_capacity(raw.len());
    for &r in raw {
        let (v, a) = strip_active(r);
        values.push(v as i64);
        active.push(a);
    }
    let mut deltas = Vec::with_capacity(raw.len().saturating_sub(1));
    for (a, b) in values.iter().copied().tuple_windows() {
        let mut d = b - a;
        // A negative difference means the 31-bit counter wrapped between reads
        if d < 0 {
            d += COUNTER_WRAP;
        }
        deltas.push(d as u32);
    }
    (deltas, active)
}

/// Correct all channels of a read set, checking that they line up.
///
/// Returns the corrected increments, one row per channel, and the per-interval
/// active flags for every channel after the reference (channel 0 carries no
/// flag of its own). An interval takes the flag of the read at its *later*
/// endpoint.
pub fn dcounts(raw: &[Vec<u32>]) -> Result<(Vec<Vec<u32>>, Vec<Vec<bool>>), ScalerError> {
    let expected = match raw.first() {
        Some(ch) => ch.len(),
        None => return Err(ScalerError::NoChannels),
    };
    for (channel, ch) in raw.iter().enumerate() {
        if ch.len() != expected {
            return Err(ScalerError::ChannelLengthMismatch {
                channel,
                len: ch.len(),
                expected,
            });
        }
    }
    let mut dc = Vec::with_capacity(raw.len());
    let mut ar = Vec::with_capacity(raw.len().saturating_sub(1));
    for (channel, ch) in raw.iter().enumerate() {
        let (deltas, active) = channel_dcounts(ch);
        dc.push(deltas);
        if channel > 0 {
            ar.push(active.get(1..).unwrap_or(&[]).to_vec());
        }
    }
    Ok((dc, ar))
}

/// Reconstruct cumulative counts from per-interval increments: the 0-seeded
/// exact prefix sum, the inverse of differencing. Sums accumulate in u64 so
/// whole runs of near-wrap increments cannot overflow.
pub fn counts<T>(dcounts: &[Vec<T>]) -> Vec<Vec<u64>>
where
    T: PrimInt + Unsigned + Into<u64>,
{
    dcounts
        .iter()
        .map(|ch| {
            let mut acc = 0u64;
            let mut cc = Vec::with_capacity(ch.len() + 1);
            cc.push(0);
            for &d in ch {
                acc += d.into();
                cc.push(acc);
            }
            cc
        })
        .collect()
}

/// Convert increments to rates against the reference channel's clock.
///
/// `delta_time[i] = dcounts_time[i] / frequency` is the elapsed seconds of
/// interval i, taken from the reference counter rather than the host clock
/// since the counter is the more precise of the two. Returns the elapsed
/// times, the per-channel rates in Hz, and a stall mask: where the reference
/// did not advance no rate exists, so the value is held at zero and flagged
/// instead of dividing through to an infinity.
pub fn rates(
    frequency: f64,
    dcounts_time: &[u32],
    dcounts_arr: &[Vec<u32>],
) -> (Vec<f64>, Vec<Vec<f64>>, Vec<bool>) {
    let delta_time: Vec<f64> = dcounts_time.iter().map(|&d| d as f64 / frequency).collect();
    let stalled: Vec<bool> = dcounts_time.iter().map(|&d| d == 0).collect();
    let n_stalled = stalled.iter().filter(|&&s| s).count();
    if n_stalled > 0 {
        log::warn!(
            "reference channel stalled for {} of {} intervals; their rates are masked",
            n_stalled,
            stalled.len()
        );
    }
    let rate = dcounts_arr
        .iter()
        .map(|ch| {
            ch.iter()
                .zip(&delta_time)
                .map(|(&d, &dt)| if dt > 0.0 { d as f64 / dt } else { 0.0 })
                .collect()
        })
        .collect();
    (delta_time, rate, stalled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_bit_stripped() {
        assert_eq!(strip_active(42), (42, false));
        assert_eq!(strip_active(42 | 1 << 31), (42, true));
        assert_eq!(strip_active(0), (0, false));
        assert_eq!(strip_active(1 << 31), (0, true));
    }

    #[test]
    fn wrap_corrected() {
        let near_wrap = (COUNTER_WRAP - 5) as u32;
        let (deltas, _) = channel_dcounts(&[near_wrap, 0, 4]);
        assert_eq!(deltas, vec![5, 4]);
    }

    #[test]
    fn zero_increment_is_data() {
        let (deltas, _) = channel_dcounts(&[7, 7, 7]);
        assert_eq!(deltas, vec![0, 0]);
    }

    #[test]
    fn active_flag_attributed_to_closing_read() {
        let raw = vec![
            vec![0, 10, 20, 30],
            vec![0, 1 | 1 << 31, 2, 3 | 1 << 31],
        ];
        let (_, active) = dcounts(&raw).unwrap();
        assert_eq!(active, vec![vec![true, false, true]]);
    }

    #[test]
    fn mismatched_channels_rejected() {
        let raw = vec![vec![0, 10, 20], vec![0, 1]];
        assert_eq!(
            dcounts(&raw),
            Err(ScalerError::ChannelLengthMismatch {
                channel: 1,
                len: 2,
                expected: 3,
            })
        );
        assert_eq!(dcounts(&[]), Err(ScalerError::NoChannels));
    }

    #[test]
    fn stalled_interval_masked_not_infinite() {
        let (delta_time, rate, stalled) = rates(100.0, &[100, 0, 100], &[vec![5, 5, 5]]);
        assert_eq!(delta_time, vec![1.0, 0.0, 1.0]);
        assert_eq!(stalled, vec![false, true, false]);
        assert_eq!(rate, vec![vec![5.0, 0.0, 5.0]]);
        assert!(rate[0].iter().all(|r| r.is_finite()));
    }
}
