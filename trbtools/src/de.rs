//! Deserialization of scaler data products, supporting `.rates.zst` and `.tsv`

use crate::RateFile;
use anyhow::{bail, Result};
use std::io::Read;
use zstd::stream;

/// Deserialize from .rates.zst format: a zstd-compressed JSON rate series
pub fn rates(rdr: impl Read) -> Result<RateFile> {
    let zrdr = stream::read::Decoder::new(rdr)?;
    rates_uncompressed(zrdr)
}

/// Deserialize from uncompressed JSON
pub fn rates_uncompressed(rdr: impl Read) -> Result<RateFile> {
    let file = serde_json::from_reader(rdr)?;
    Ok(file)
}

/// Deserialize raw scaler reads from tab-separated values: one row per read,
/// host time first, then one column per channel.
pub fn scalers_tsv(rdr: &mut csv::Reader<impl Read>) -> Result<(Vec<f64>, Vec<Vec<u32>>)> {
    let mut host_time = Vec::new();
    let mut raw: Vec<Vec<u32>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.len() < 2 {
            bail!("scaler record needs a host time and at least one channel");
        }
        if raw.is_empty() {
            raw = vec![Vec::new(); record.len() - 1];
        } else if record.len() - 1 != raw.len() {
            bail!(
                "scaler record has {} channels, expected {}",
                record.len() - 1,
                raw.len()
            );
        }
        host_time.push(record[0].parse::<f64>()?);
        for (ch, field) in raw.iter_mut().zip(record.iter().skip(1)) {
            ch.push(field.parse::<u32>()?);
        }
    }
    Ok((host_time, raw))
}
