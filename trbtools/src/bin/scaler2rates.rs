//! `scaler2rates [INPUT]`
//!
//! Decode a tab-separated raw scaler dump, resample the event-channel rates
//! onto an even probe grid, and write the series in .rates.zst compressed
//! format to standard output. Most likely, you want the shell one-liner
//!
//!     scaler2rates -f 1 mydata.tsv > mydata.rates.zst
//!
//! to put one acquisition on a 1 Hz virtual clock.

use anyhow::{bail, Result};
use argh::FromArgs;
use std::fs::{self, File};
use std::io::{stdin, stdout, BufReader, Read, Write};

use trbtools::freq::FrequencyReadout;
use trbtools::scalers::{Probe, Scalers};
use trbtools::{de, ser, RateFile};

const GIT_VERSION: &str = git_version::git_version!(fallback = "unknown");

#[derive(Debug, FromArgs, Clone)]
/// Decode raw scaler reads and print a resampled .rates.zst series to
/// standard output.
pub struct CliArgs {
    /// print version information
    #[argh(switch, short = 'v')]
    pub version: bool,
    /// probe frequency in Hz for the resampled series
    #[argh(option, short = 'f', default = "1.0")]
    pub frequency: f64,
    /// counting frequency of the reference channel, if the dump carries none
    #[argh(option)]
    pub daq_frequency: Option<f64>,
    /// with no input or when input is '-', read from standard input
    #[argh(positional)]
    pub input: Option<String>,
}

fn main() -> Result<()> {
    let args: CliArgs = argh::from_env();
    if args.version {
        println!(concat!(env!("CARGO_BIN_NAME"), " ", "{}"), GIT_VERSION);
        return Ok(());
    }

    let rdr: Box<dyn Read> = match args.input.as_deref() {
        None | Some("-") => Box::new(stdin()),
        Some(path) => {
            match fs::metadata(path) {
                Ok(m) if m.is_file() => {}
                Ok(_) => bail!("{} is not a file", path),
                Err(e) => bail!(e),
            }
            Box::new(File::open(path)?)
        }
    };
    let mut crdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .from_reader(BufReader::new(rdr));
    let (host_time, raw) = de::scalers_tsv(&mut crdr)?;

    let freq = match args.daq_frequency {
        Some(f) => FrequencyReadout::Scalar(f),
        None => FrequencyReadout::Unlogged,
    };
    let scalers = Scalers::new(raw, host_time, freq)?;
    let resampled = scalers.interpolate_rate(&Probe::Frequency(args.frequency))?;
    let file = RateFile::from_resampled(args.frequency, &resampled);

    let stdout = stdout();
    let mut wtr = stdout.lock();
    ser::rates(&mut wtr, &file)?;
    wtr.flush()?;
    Ok(())
}
