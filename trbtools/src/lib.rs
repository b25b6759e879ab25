pub mod cfg;
pub mod count;
pub mod de;
pub mod err;
pub mod freq;
pub mod resample;
pub mod scalers;
pub mod ser;
pub mod source;
pub mod time;

pub use err::ScalerError;
pub use scalers::Scalers;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Modulus of one scaler channel: counters hold 31 bits of count, with the
/// momentary "active" status of the channel latched into bit 31 of each read.
pub const COUNTER_WRAP: i64 = 1 << 31;

/// Counting frequency every deployed board is configured with, used when the
/// acquisition never logged one.
pub const DEFAULT_DAQ_FREQUENCY: f64 = 10_000.0;

/// A numeric series paired with a no-data mask.
///
/// A set mask entry means no raw reads back the value at that index. The raw
/// value is kept finite (zero) under the mask so the array stays safe for
/// arithmetic; a masked bin is therefore distinguishable from a bin whose
/// rate is legitimately zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaskedSeries {
    pub values: Vec<f64>,
    pub mask: Vec<bool>,
}

impl MaskedSeries {
    pub fn new(values: Vec<f64>, mask: Vec<bool>) -> Self {
        debug_assert_eq!(values.len(), mask.len());
        MaskedSeries { values, mask }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at index `i`, or `None` where masked or out of range.
    pub fn get(&self, i: usize) -> Option<f64> {
        match self.mask.get(i) {
            Some(false) => Some(self.values[i]),
            _ => None,
        }
    }
}

/// One resampled rate series as it is laid out on disk: three aligned
/// datasets plus the attributes needed to interpret them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateFile {
    /// Probe-grid frequency the series was resampled at, in Hz
    pub interpolated_frequency: f64,
    /// Wall clock of the first unmasked bin, seconds since the epoch
    pub file_start: f64,
    /// Wall clock of the last unmasked bin, seconds since the epoch
    pub file_end: f64,
    /// Bin-center wall clock, seconds since the epoch
    pub time: Vec<f64>,
    /// Per-channel rates in Hz, one row per event channel
    pub rate: Vec<Vec<f64>>,
    /// No-data mask shared by every row of `rate` and by `time`
    pub mask: Vec<bool>,
}

impl RateFile {
    /// Package a resampled series for storage.
    pub fn from_resampled(frequency: f64, resampled: &resample::Resampled) -> Self {
        let time = resampled.time.values.clone();
        let mask = resampled.time.mask.clone();
        let rate = resampled.rate.iter().map(|ch| ch.values.clone()).collect();
        let mut unmasked = time
            .iter()
            .zip(&mask)
            .filter(|(_, &m)| !m)
            .map(|(&t, _)| t);
        let file_start = unmasked.next().unwrap_or(0.0);
        let file_end = unmasked.last().unwrap_or(file_start);
        RateFile {
            interpolated_frequency: frequency,
            file_start,
            file_end,
            time,
            rate,
            mask,
        }
    }

    /// Fraction of wall-clock time the instrument was alive in each reporting
    /// bin. Consecutive unmasked samples closer than `max_gap` seconds count
    /// as alive for the span between them; a larger gap contributes nothing
    /// to the numerator but its full duration to the elapsed denominator.
    pub fn active_fraction(&self, bin_edges: &[f64], max_gap: f64) -> Vec<f64> {
        let valid: Vec<f64> = self
            .time
            .iter()
            .zip(&self.mask)
            .filter(|(_, &m)| !m)
            .map(|(&t, _)| t)
            .collect();
        let mut fractions = Vec::with_capacity(bin_edges.len().saturating_sub(1));
        for (e0, e1) in bin_edges.iter().copied().tuple_windows() {
            let width = e1 - e0;
            if width <= 0.0 {
                fractions.push(0.0);
                continue;
            }
            let mut alive = 0.0;
            for (a, b) in valid.iter().copied().tuple_windows() {
                if b - a > max_gap {
                    continue;
                }
                let lo = a.max(e0);
                let hi = b.min(e1);
                if hi > lo {
                    alive += hi - lo;
                }
            }
            fractions.push(alive / width);
        }
        fractions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masked_get() {
        let s = MaskedSeries::new(vec![1.0, 2.0, 3.0], vec![false, true, false]);
        assert_eq!(s.get(0), Some(1.0));
        assert_eq!(s.get(1), None);
        assert_eq!(s.get(2), Some(3.0));
        assert_eq!(s.get(3), None);
    }

    fn fixture(time: Vec<f64>, mask: Vec<bool>) -> RateFile {
        let n = time.len();
        RateFile {
            interpolated_frequency: 1.0,
            file_start: time.first().copied().unwrap_or(0.0),
            file_end: time.last().copied().unwrap_or(0.0),
            time,
            rate: vec![vec![0.0; n]],
            mask,
        }
    }

    #[test]
    fn active_fraction_counts_only_small_gaps() {
        let f = fixture(vec![0.0, 1.0, 2.0, 10.0, 11.0], vec![false; 5]);
        let frac = f.active_fraction(&[0.0, 11.0], 2.0);
        // 0-1, 1-2, 10-11 are alive; the 2-10 gap is dead time
        assert_eq!(frac, vec![3.0 / 11.0]);
    }

    #[test]
    fn active_fraction_splits_across_bins() {
        let f = fixture(vec![0.0, 1.0, 2.0, 10.0, 11.0], vec![false; 5]);
        let frac = f.active_fraction(&[0.0, 5.0, 11.0], 2.0);
        assert_eq!(frac, vec![2.0 / 5.0, 1.0 / 6.0]);
    }

    #[test]
    fn active_fraction_skips_masked_samples() {
        let f = fixture(
            vec![0.0, 1.0, 2.0, 10.0, 11.0],
            vec![false, false, true, false, false],
        );
        // With t = 2 masked the 1-10 spacing exceeds the gap threshold
        let frac = f.active_fraction(&[0.0, 5.0, 11.0], 2.0);
        assert_eq!(frac, vec![1.0 / 5.0, 1.0 / 6.0]);
    }
}
