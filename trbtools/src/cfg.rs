//! Configuration tools: formats for declaring and recording decode jobs

use crate::freq::FrequencyReadout;
use chrono::{offset::Local, DateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Offline decode-job specification, for both declaring and recording runs
/// in text files (JSON for concreteness).
///
/// ## Declaring a job
///
/// A job file names a raw scaler dump and says how to resample it. All
/// fields beyond `name` are optional: specify only what makes sense. A
/// missing `frequency` defers to the readout embedded in the data; a missing
/// `probe_frequency` resamples at 1 Hz.
///
/// ## Recording a job
///
/// A completed job is recorded in the same format with `timestamp` filled
/// in, so the record doubles as a re-runnable declaration.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct Job {
    pub name:               String,
    pub timestamp:          Option<DateTime<Local>>,
    pub input:              Option<PathBuf>,
    pub output:             Option<PathBuf>,
    /// Probe-grid frequency for resampling, in Hz
    pub probe_frequency:    Option<f64>,
    /// Declared counting frequency, overriding the readout in the data
    pub frequency:          Option<FrequencyReadout>,
    /// Largest sample spacing still counted as live instrument coverage,
    /// parsed as in humantime, e.g. `90s` or `5min`
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub max_gap:            Option<Duration>,
    #[serde(default = "emptyvec", skip_serializing_if = "Vec::is_empty")]
    pub channel_labels:     Vec<String>,
}

fn emptyvec<T>() -> Vec<T> {
    Vec::new()
}

/// Creates an empty Job. Specific defaults should be implementation-dependent.
impl Default for Job {
    fn default() -> Self {
        Job {
            name:               String::new(),
            timestamp:          None,
            input:              None,
            output:             None,
            probe_frequency:    None,
            frequency:          None,
            max_gap:            None,
            channel_labels:     Vec::new(),
        }
    }
}
