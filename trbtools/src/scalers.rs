//! The central scaler stream: raw reads plus every derived data product

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;

use crate::count;
use crate::err::ScalerError;
use crate::freq::FrequencyReadout;
use crate::resample::{self, Resampled};
use crate::source::RawCounterSource;
use crate::time;

/// How to choose the probe grid when resampling.
#[derive(Clone, Debug, PartialEq)]
pub enum Probe {
    /// Evenly spaced at the given frequency in Hz over the span of the data
    Frequency(f64),
    /// Explicit probe instants, in seconds on the relative clock
    Grid(Vec<f64>),
}

struct Decoded {
    dcounts: Vec<Vec<u32>>,
    active_read: Vec<Vec<bool>>,
}

struct RateData {
    delta_time: Vec<f64>,
    rate: Vec<Vec<f64>>,
    stalled: Vec<bool>,
}

/// One acquisition's scaler channels, with the reference clock in channel 0.
///
/// The raw reads never change after construction; derived products are
/// computed on first access and cached for the life of the value. A new
/// acquisition means a new `Scalers`, which is what keeps every cache
/// consistent with every other.
pub struct Scalers {
    raw: Vec<Vec<u32>>,
    host_time: Vec<f64>,
    frequency: f64,
    offset: OnceCell<usize>,
    decoded: OnceCell<Decoded>,
    counts: OnceCell<Vec<Vec<u64>>>,
    rates: OnceCell<RateData>,
    relative: OnceCell<Vec<f64>>,
}

impl Scalers {
    /// Validate and take ownership of one acquisition's reads.
    ///
    /// Every channel must have one read per host-clock stamp; the frequency
    /// readout is resolved here, once, so nothing downstream ever sees a
    /// sentinel.
    pub fn new(
        raw: Vec<Vec<u32>>,
        host_time: Vec<f64>,
        frequency: FrequencyReadout,
    ) -> Result<Self, ScalerError> {
        if raw.is_empty() {
            return Err(ScalerError::NoChannels);
        }
        let expected = host_time.len();
        for (channel, ch) in raw.iter().enumerate() {
            if ch.len() != expected {
                return Err(ScalerError::ChannelLengthMismatch {
                    channel,
                    len: ch.len(),
                    expected,
                });
            }
        }
        let frequency = frequency.resolve()?;
        Ok(Scalers {
            raw,
            host_time,
            frequency,
            offset: OnceCell::new(),
            decoded: OnceCell::new(),
            counts: OnceCell::new(),
            rates: OnceCell::new(),
            relative: OnceCell::new(),
        })
    }

    /// Build from any counter-bearing sensor readout.
    pub fn from_source(source: &dyn RawCounterSource) -> Result<Self, ScalerError> {
        Self::new(
            source.raw_counts().to_vec(),
            source.host_time().to_vec(),
            source.daq_frequency(),
        )
    }

    pub fn channels(&self) -> usize {
        self.raw.len()
    }

    /// Reads retained after discarding the stale buffer head.
    pub fn len(&self) -> usize {
        self.host_time.len() - self.leading_corruption_offset()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolved reference-channel frequency in Hz.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Stale reads at the head of the stream, detected from host-clock order
    /// and skipped by every derived product.
    pub fn leading_corruption_offset(&self) -> usize {
        *self.offset.get_or_init(|| {
            let k = time::leading_corruption_offset(&self.host_time);
            if k > 0 {
                log::warn!("discarding {} stale leading reads", k);
            }
            k
        })
    }

    fn decoded(&self) -> &Decoded {
        self.decoded.get_or_init(|| {
            let k = self.leading_corruption_offset();
            let mut dcounts = Vec::with_capacity(self.raw.len());
            let mut active_read = Vec::with_capacity(self.raw.len() - 1);
            for (channel, ch) in self.raw.iter().enumerate() {
                let (deltas, active) = count::channel_dcounts(&ch[k..]);
                dcounts.push(deltas);
                if channel > 0 {
                    active_read.push(active.get(1..).unwrap_or(&[]).to_vec());
                }
            }
            Decoded {
                dcounts,
                active_read,
            }
        })
    }

    /// Corrected per-interval increments, one row per channel.
    pub fn dcounts(&self) -> &[Vec<u32>] {
        &self.decoded().dcounts
    }

    /// Reference-channel increments: elapsed ticks per interval.
    pub fn dcounts_time(&self) -> &[u32] {
        &self.decoded().dcounts[0]
    }

    /// Whether each interval's closing read carried the active flag, one row
    /// per event channel.
    pub fn active_read(&self) -> &[Vec<bool>] {
        &self.decoded().active_read
    }

    /// Cumulative counts, 0-seeded, one row per channel.
    pub fn counts(&self) -> &[Vec<u64>] {
        self.counts.get_or_init(|| count::counts(self.dcounts()))
    }

    /// Cumulative reference-channel ticks at each read.
    pub fn counts_time(&self) -> &[u64] {
        &self.counts()[0]
    }

    fn rate_data(&self) -> &RateData {
        self.rates.get_or_init(|| {
            let decoded = self.decoded();
            let (delta_time, rate, stalled) =
                count::rates(self.frequency, &decoded.dcounts[0], &decoded.dcounts[1..]);
            RateData {
                delta_time,
                rate,
                stalled,
            }
        })
    }

    /// Event-channel rates in Hz, one row per channel after the reference.
    pub fn rate(&self) -> &[Vec<f64>] {
        &self.rate_data().rate
    }

    /// Elapsed seconds of each interval, from the reference clock.
    pub fn rate_delta_time(&self) -> &[f64] {
        &self.rate_data().delta_time
    }

    /// Intervals in which the reference counter did not advance. Their rates
    /// carry no information and are held at zero.
    pub fn stalled(&self) -> &[bool] {
        &self.rate_data().stalled
    }

    /// The relative clock: elapsed seconds since the first retained read.
    pub fn rate_time(&self) -> &[f64] {
        self.relative
            .get_or_init(|| time::relative_time(self.rate_delta_time()))
    }

    /// Interval midpoints on the relative clock.
    pub fn rate_time_middle(&self) -> Vec<f64> {
        time::middles(self.rate_time())
    }

    /// Host wall-clock stamps of the retained reads, seconds since the epoch.
    pub fn absolute_time(&self) -> &[f64] {
        &self.host_time[self.leading_corruption_offset()..]
    }

    /// Host wall-clock stamps as calendar datetimes.
    pub fn datetimes(&self) -> Vec<DateTime<Utc>> {
        time::datetimes(self.absolute_time())
    }

    /// Resample the event-channel rates onto a virtual probe clock.
    ///
    /// Cumulative counts, not instantaneous rates, are interpolated at the
    /// probe instants and differentiated afterward, so the resampling
    /// conserves every counted event. Probe bins containing no reads come
    /// back masked in all three outputs. When the reference counter never
    /// advanced the grid falls back to the host clock, rebased to zero so
    /// both modes share one axis.
    pub fn interpolate_rate(&self, probe: &Probe) -> Result<Resampled, ScalerError> {
        let rebased_host: Vec<f64>;
        let relative = self.rate_time();
        let degenerate = relative.last().map_or(true, |&t| t == 0.0);
        let axis: &[f64] = if degenerate {
            log::warn!("reference counter never advanced; resampling on the host clock");
            let abs = self.absolute_time();
            let t0 = abs.first().copied().unwrap_or(0.0);
            rebased_host = abs.iter().map(|&t| t - t0).collect();
            &rebased_host
        } else {
            relative
        };
        if axis.is_empty() {
            return Err(ScalerError::EmptyTimeBase);
        }
        let generated;
        let grid: &[f64] = match probe {
            Probe::Grid(g) => g,
            Probe::Frequency(f) => {
                let start = axis[0];
                let stop = axis[axis.len() - 1];
                generated = resample::probe_grid(start, stop, *f);
                &generated
            }
        };
        resample::interpolate_rate(
            axis,
            self.absolute_time(),
            &self.counts()[1..],
            self.active_read(),
            grid,
        )
    }
}
