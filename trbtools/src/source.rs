//! Sensor-facing readout interface
//!
//! Per-sensor file readers live with their sensors; the decoding core only
//! needs the three things every counter-bearing readout can produce. Each
//! sensor family wraps its arrays in one of the variants below and hands it
//! to [`crate::Scalers::from_source`].

use crate::freq::FrequencyReadout;

/// What every counter-bearing readout exposes: equal-length raw channel
/// arrays with the reference clock in channel 0, the host wall-clock stamp
/// of each read, and whatever the acquisition knows about its own counting
/// frequency.
pub trait RawCounterSource {
    fn raw_counts(&self) -> &[Vec<u32>];
    fn host_time(&self) -> &[f64];
    fn daq_frequency(&self) -> FrequencyReadout;
}

/// Readout of a lidar detector's photon counters. The frequency is logged
/// with every read, with gaps where the acquisition failed to report it.
pub struct LidarCounters {
    pub raw: Vec<Vec<u32>>,
    pub host_time: Vec<f64>,
    pub frequency_readout: Vec<f64>,
}

impl RawCounterSource for LidarCounters {
    fn raw_counts(&self) -> &[Vec<u32>] {
        &self.raw
    }

    fn host_time(&self) -> &[f64] {
        &self.host_time
    }

    fn daq_frequency(&self) -> FrequencyReadout {
        FrequencyReadout::PerSample(self.frequency_readout.clone())
    }
}

/// Readout of a PMT spectrometer's pulse counters. The frequency is part of
/// the instrument configuration rather than the data stream.
pub struct PmtSpecCounters {
    pub raw: Vec<Vec<u32>>,
    pub host_time: Vec<f64>,
    pub frequency: f64,
}

impl RawCounterSource for PmtSpecCounters {
    fn raw_counts(&self) -> &[Vec<u32>] {
        &self.raw
    }

    fn host_time(&self) -> &[f64] {
        &self.host_time
    }

    fn daq_frequency(&self) -> FrequencyReadout {
        FrequencyReadout::Scalar(self.frequency)
    }
}

/// Readout of a secondary optical module's counters, logged like the lidar's
/// but from a different board revision.
pub struct SdomCounters {
    pub raw: Vec<Vec<u32>>,
    pub host_time: Vec<f64>,
    pub frequency_readout: Vec<f64>,
}

impl RawCounterSource for SdomCounters {
    fn raw_counts(&self) -> &[Vec<u32>] {
        &self.raw
    }

    fn host_time(&self) -> &[f64] {
        &self.host_time
    }

    fn daq_frequency(&self) -> FrequencyReadout {
        FrequencyReadout::PerSample(self.frequency_readout.clone())
    }
}

/// Readout of a muon tracker's trigger counters. Older deployments never
/// recorded the frequency at all.
pub struct MuonTrackerCounters {
    pub raw: Vec<Vec<u32>>,
    pub host_time: Vec<f64>,
    pub frequency: Option<f64>,
}

impl RawCounterSource for MuonTrackerCounters {
    fn raw_counts(&self) -> &[Vec<u32>] {
        &self.raw
    }

    fn host_time(&self) -> &[f64] {
        &self.host_time
    }

    fn daq_frequency(&self) -> FrequencyReadout {
        match self.frequency {
            Some(f) => FrequencyReadout::Scalar(f),
            None => FrequencyReadout::Unlogged,
        }
    }
}
