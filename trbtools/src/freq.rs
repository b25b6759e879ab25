//! Resolution of the reference-channel counting frequency

use crate::err::ScalerError;
use crate::DEFAULT_DAQ_FREQUENCY;
use serde::{Deserialize, Serialize};

/// Sentinel the acquisition writes when the frequency was not logged.
const UNLOGGED: f64 = -1.0;

/// The reference-channel frequency as reported by the acquisition: either
/// configured as a constant, logged once per read (with unlogged entries
/// marked by a sentinel), or absent entirely.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyReadout {
    Scalar(f64),
    PerSample(Vec<f64>),
    Unlogged,
}

impl FrequencyReadout {
    /// Collapse the readout to the one frequency the board ran at.
    ///
    /// Sentinel entries are discarded here and nowhere else. A readout with
    /// no logged value falls back to the 10 kHz every deployed board is
    /// configured with. Two distinct logged values mean the acquisition was
    /// misconfigured and no rate derived from it can be trusted, so that is
    /// an error rather than an average.
    pub fn resolve(&self) -> Result<f64, ScalerError> {
        let entries = match self {
            FrequencyReadout::Scalar(f) => std::slice::from_ref(f),
            FrequencyReadout::PerSample(fs) => fs.as_slice(),
            FrequencyReadout::Unlogged => &[],
        };
        let mut known: Option<f64> = None;
        for &f in entries {
            if f == UNLOGGED {
                continue;
            }
            match known {
                None => known = Some(f),
                Some(k) if k != f => {
                    return Err(ScalerError::InconsistentFrequency {
                        first: k,
                        second: f,
                    })
                }
                Some(_) => {}
            }
        }
        Ok(known.unwrap_or_else(|| {
            log::info!(
                "frequency readout empty; assuming {} Hz",
                DEFAULT_DAQ_FREQUENCY
            );
            DEFAULT_DAQ_FREQUENCY
        }))
    }
}
