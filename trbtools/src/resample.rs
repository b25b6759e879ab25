//! Resampling of reconstructed rates onto a virtual probe clock
//!
//! Scaler reads arrive whenever the acquisition gets around to polling, so
//! two channels of two different boards never share a time axis. Resampling
//! puts every channel on one caller-chosen grid. The cumulative counts are
//! interpolated at the probe instants and differentiated afterward; this
//! conserves the total number of events, which interpolating the
//! instantaneous rates would not. Probe bins backed by no reads are masked
//! in every output so a gap can never be mistaken for a quiet detector.

use crate::err::ScalerError;
use crate::MaskedSeries;
use itertools::Itertools;

/// One resampled scaler stream: per-bin rates, bin-center wall-clock time,
/// and the fraction of reads in each bin flagged active, all sharing one
/// no-data mask.
#[derive(Clone, Debug, PartialEq)]
pub struct Resampled {
    pub time: MaskedSeries,
    pub rate: Vec<MaskedSeries>,
    pub active_ratio: Vec<MaskedSeries>,
}

/// Evenly spaced probe instants over `[start, stop)` at the given frequency.
pub fn probe_grid(start: f64, stop: f64, frequency: f64) -> Vec<f64> {
    if !(frequency > 0.0) {
        return Vec::new();
    }
    let step = 1.0 / frequency;
    let mut grid = Vec::new();
    let mut i = 0usize;
    loop {
        let t = start + i as f64 * step;
        if t >= stop {
            break;
        }
        grid.push(t);
        i += 1;
    }
    grid
}

/// Piecewise-linear interpolation of the samples `(xp, fp)` at the points
/// `x`, clamping to the boundary values outside the sampled span. `xp` must
/// be non-decreasing and non-empty.
pub fn interp(x: &[f64], xp: &[f64], fp: &[f64]) -> Vec<f64> {
    debug_assert_eq!(xp.len(), fp.len());
    debug_assert!(!xp.is_empty());
    let last = xp.len() - 1;
    x.iter()
        .map(|&xi| {
            if xi <= xp[0] {
                return fp[0];
            }
            if xi >= xp[last] {
                return fp[last];
            }
            let j = xp.partition_point(|&p| p <= xi);
            let (x0, x1) = (xp[j - 1], xp[j]);
            let (f0, f1) = (fp[j - 1], fp[j]);
            f0 + (f1 - f0) * (xi - x0) / (x1 - x0)
        })
        .collect()
}

/// Sum and count of the samples `(x, values)` falling in each bin of the
/// grid. Bins are closed on the left; the final bin is also closed on the
/// right, as in a standard binned statistic. Samples outside the grid are
/// dropped.
pub fn binned_sum_count(x: &[f64], values: &[f64], edges: &[f64]) -> (Vec<f64>, Vec<u64>) {
    debug_assert_eq!(x.len(), values.len());
    let bins = edges.len().saturating_sub(1);
    let mut sum = vec![0.0; bins];
    let mut count = vec![0u64; bins];
    if bins == 0 {
        return (sum, count);
    }
    for (&xi, &v) in x.iter().zip(values) {
        if xi < edges[0] || xi > edges[bins] {
            continue;
        }
        let j = edges.partition_point(|&e| e <= xi);
        let bin = if j > bins { bins - 1 } else { j - 1 };
        sum[bin] += v;
        count[bin] += 1;
    }
    (sum, count)
}

/// Resample cumulative counts onto the probe grid and differentiate.
///
/// `sample_time` holds the positions of the N reads on the axis the probe
/// grid is expressed in, `absolute_time` their wall-clock stamps, `counts`
/// the 0-seeded cumulative counts of the event channels, and `active_read`
/// the per-interval flags of those channels. Produces `probe.len() - 1`
/// output bins. A bin is masked when no read interval closes inside it, or
/// when the interpolated wall clock does not advance across it (both ends
/// clamped outside the sampled span); masked values are held at zero.
pub fn interpolate_rate(
    sample_time: &[f64],
    absolute_time: &[f64],
    counts: &[Vec<u64>],
    active_read: &[Vec<bool>],
    probe: &[f64],
) -> Result<Resampled, ScalerError> {
    if sample_time.is_empty() || probe.len() < 2 {
        return Err(ScalerError::EmptyTimeBase);
    }
    let bins = probe.len() - 1;

    // Each interval sits at the read that closes it, matching the convention
    // for its active flag.
    let interval_pos = sample_time.get(1..).unwrap_or(&[]);
    let ones = vec![1.0; interval_pos.len()];
    let (_, sample_count) = binned_sum_count(interval_pos, &ones, probe);

    let abs = interp(probe, sample_time, absolute_time);
    let mut mask = Vec::with_capacity(bins);
    let mut dts = Vec::with_capacity(bins);
    let mut time_vals = Vec::with_capacity(bins);
    for (j, (a, b)) in abs.iter().copied().tuple_windows().enumerate() {
        let dt = b - a;
        let masked = sample_count[j] == 0 || dt <= 0.0;
        dts.push(dt);
        time_vals.push(if masked { 0.0 } else { a + dt / 2.0 });
        mask.push(masked);
    }

    let mut rate = Vec::with_capacity(counts.len());
    for cc in counts {
        let ccf: Vec<f64> = cc.iter().map(|&c| c as f64).collect();
        let ci = interp(probe, sample_time, &ccf);
        let r: Vec<f64> = ci
            .iter()
            .copied()
            .tuple_windows()
            .enumerate()
            .map(|(j, (a, b))| if mask[j] { 0.0 } else { (b - a) / dts[j] })
            .collect();
        rate.push(MaskedSeries::new(r, mask.clone()));
    }

    let mut active_ratio = Vec::with_capacity(active_read.len());
    for flags in active_read {
        let vals: Vec<f64> = flags.iter().map(|&f| if f { 1.0 } else { 0.0 }).collect();
        let (flag_sum, flag_count) = binned_sum_count(interval_pos, &vals, probe);
        let ratio: Vec<f64> = flag_sum
            .iter()
            .zip(&flag_count)
            .zip(&mask)
            .map(|((&s, &c), &m)| if m || c == 0 { 0.0 } else { s / c as f64 })
            .collect();
        active_ratio.push(MaskedSeries::new(ratio, mask.clone()));
    }

    Ok(Resampled {
        time: MaskedSeries::new(time_vals, mask),
        rate,
        active_ratio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_spans_half_open_interval() {
        let g = probe_grid(0.0, 5.0, 1.0);
        assert_eq!(g, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert!(probe_grid(0.0, 0.0, 1.0).is_empty());
        assert!(probe_grid(0.0, 5.0, 0.0).is_empty());
        assert!(probe_grid(0.0, 5.0, -2.0).is_empty());
    }

    #[test]
    fn interp_matches_hand_values() {
        let xp = [0.0, 1.0, 3.0];
        let fp = [0.0, 10.0, 30.0];
        assert_eq!(
            interp(&[0.5, 1.0, 2.0, 2.5], &xp, &fp),
            vec![5.0, 10.0, 20.0, 25.0]
        );
    }

    #[test]
    fn interp_clamps_outside_span() {
        let xp = [1.0, 2.0];
        let fp = [10.0, 20.0];
        assert_eq!(interp(&[0.0, 3.0], &xp, &fp), vec![10.0, 20.0]);
        // A single sample clamps everywhere
        assert_eq!(interp(&[0.0, 5.0], &[2.0], &[7.0]), vec![7.0, 7.0]);
    }

    #[test]
    fn binning_includes_right_edge_of_last_bin() {
        let x = [0.0, 0.5, 1.0, 2.0, 2.5];
        let v = [1.0; 5];
        let (sum, count) = binned_sum_count(&x, &v, &[0.0, 1.0, 2.0]);
        // 2.0 lands in the final closed bin; 2.5 is out of range
        assert_eq!(count, vec![2, 2]);
        assert_eq!(sum, vec![2.0, 2.0]);
        assert_eq!(count.len(), 2);
    }

    #[test]
    fn empty_grid_is_fatal() {
        let err = interpolate_rate(&[0.0, 1.0], &[5.0, 6.0], &[vec![0, 1]], &[vec![false]], &[]);
        assert_eq!(err, Err(ScalerError::EmptyTimeBase));
        let err = interpolate_rate(&[], &[], &[], &[], &[0.0, 1.0]);
        assert_eq!(err, Err(ScalerError::EmptyTimeBase));
    }
}
