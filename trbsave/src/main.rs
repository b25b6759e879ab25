use anyhow::{bail, Context, Result};
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use trbsave::CliArgs;
use trbtools::cfg;
use trbtools::freq::FrequencyReadout;
use trbtools::scalers::{Probe, Scalers};
use trbtools::{de, ser, RateFile};

const GIT_VERSION: &str = git_version::git_version!(fallback = "unknown");

fn main() -> Result<()> {
    // Parse command line arguments
    let args: CliArgs = argh::from_env();

    if args.version {
        println!(concat!(env!("CARGO_BIN_NAME"), " ", "{}"), GIT_VERSION);
        return Ok(());
    }

    let level = args
        .log_level
        .parse()
        .unwrap_or(log::LevelFilter::Info);
    trbsave::setup_logger(level)?;

    // Load the job file
    let cfg_path = match args.config {
        Some(c) => PathBuf::from(c),
        None => bail!("no job file provided"),
    };
    let f = File::open(cfg_path.as_path())
        .with_context(|| format!("cannot open {}", cfg_path.display()))?;
    let job: cfg::Job = serde_json::from_reader(BufReader::new(f))?;

    let input = match &job.input {
        Some(p) => p.clone(),
        None => bail!("job {:?} declares no input", job.name),
    };
    let output = match &job.output {
        Some(p) => p.clone(),
        None => input.with_extension("rates.zst"),
    };
    let probe_frequency = job.probe_frequency.unwrap_or(1.0);

    // Decode the raw dump
    log::info!("decoding {}", input.display());
    let f = File::open(&input).with_context(|| format!("cannot open {}", input.display()))?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .from_reader(BufReader::new(f));
    let (host_time, raw) = de::scalers_tsv(&mut rdr)?;

    let frequency = job.frequency.clone().unwrap_or(FrequencyReadout::Unlogged);
    let scalers = Scalers::new(raw, host_time, frequency)?;
    log::info!(
        "{} channels, {} reads at {} Hz",
        scalers.channels(),
        scalers.len(),
        scalers.frequency()
    );

    // Resample and store
    let resampled = scalers.interpolate_rate(&Probe::Frequency(probe_frequency))?;
    let rate_file = RateFile::from_resampled(probe_frequency, &resampled);
    {
        let f = File::create(&output)
            .with_context(|| format!("cannot create {}", output.display()))?;
        let mut wtr = BufWriter::new(f);
        ser::rates(&mut wtr, &rate_file)?;
        wtr.flush()?;
    }
    log::info!(
        "wrote {} bins across {} channels to {}",
        rate_file.time.len(),
        rate_file.rate.len(),
        output.display()
    );

    if let Some(gap) = job.max_gap {
        let edges = [rate_file.file_start, rate_file.file_end];
        if let Some(&frac) = rate_file
            .active_fraction(&edges, gap.as_secs_f64())
            .first()
        {
            log::info!("instrument alive {:.1}% of the run", 100.0 * frac);
        }
    }

    // Now record the job record to disk
    let record = cfg::Job {
        timestamp: Some(Local::now()),
        output: Some(output),
        ..job
    };
    let json_record = serde_json::to_string_pretty(&record)?;

    let ts = Local::now();
    let mut rcd_stem = cfg_path
        .as_path()
        .file_stem()
        .unwrap_or_else(|| std::ffi::OsStr::new("job"))
        .to_string_lossy()
        .to_string();
    rcd_stem.push('_');
    rcd_stem.push_str(&ts.format("%F_%H-%M-%S").to_string());
    let mut rcd_path = cfg_path.with_file_name(rcd_stem);
    rcd_path.set_extension("json");
    {
        let f = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&rcd_path)
            .with_context(|| format!("cannot create {}", rcd_path.display()))?;
        let mut wtr = BufWriter::new(f);
        wtr.write_all(json_record.as_bytes())?;
    }
    log::info!("recorded job to {}", rcd_path.display());

    Ok(())
}
