//! Error taxonomy for scaler decoding

use thiserror::Error;

/// Unrecoverable defects in a scaler stream.
///
/// Corruption local to a bounded run of reads (the stale buffer head, a
/// single stalled interval) is trimmed or masked where it occurs; these
/// errors are the global kind that invalidate every downstream rate and must
/// abort the computation instead of being patched around.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ScalerError {
    #[error("no counter channels supplied")]
    NoChannels,
    #[error("channel {channel} has {len} reads, expected {expected}")]
    ChannelLengthMismatch {
        channel: usize,
        len: usize,
        expected: usize,
    },
    #[error("conflicting reference frequencies in readout: {first} Hz and {second} Hz")]
    InconsistentFrequency { first: f64, second: f64 },
    #[error("resampling grid is empty: the counters never advanced and the host clock span is degenerate")]
    EmptyTimeBase,
}
