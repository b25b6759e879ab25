//! Serialization of scaler data products, supporting `.rates.zst` and `.tsv`

use crate::RateFile;
use anyhow::{bail, Result};
use std::io::Write;
use zstd::stream;

/// Serialize to .rates.zst format: a zstd-compressed JSON rate series.
///
/// The whole series goes through one encoder in one scoped operation, so a
/// reader never observes a partially written store.
pub fn rates(wtr: &mut impl Write, file: &RateFile) -> Result<()> {
    let mut zwtr = stream::write::Encoder::new(wtr, 0)?;
    rates_uncompressed(&mut zwtr, file)?;
    zwtr.finish()?;
    Ok(())
}

/// Serialize to uncompressed JSON.
///
/// Floats are written in their shortest round-tripping form, so a value read
/// back is bit-for-bit the value written.
pub fn rates_uncompressed(wtr: &mut impl Write, file: &RateFile) -> Result<()> {
    serde_json::to_writer(wtr, file)?;
    Ok(())
}

/// Serialize raw scaler reads to tab-separated values: one row per read,
/// host time first, then one column per channel.
pub fn scalers_tsv(
    wtr: &mut csv::Writer<impl Write>,
    host_time: &[f64],
    raw: &[Vec<u32>],
) -> Result<()> {
    for ch in raw {
        if ch.len() != host_time.len() {
            bail!(
                "channel with {} reads does not match {} host stamps",
                ch.len(),
                host_time.len()
            );
        }
    }
    for (i, &t) in host_time.iter().enumerate() {
        let mut record = Vec::with_capacity(1 + raw.len());
        record.push(t.to_string());
        for ch in raw {
            record.push(ch[i].to_string());
        }
        wtr.write_record(&record)?;
    }
    Ok(())
}
