use trbtools::freq::FrequencyReadout;
use trbtools::scalers::{Probe, Scalers};
use trbtools::{de, ser, RateFile};

fn sample_file() -> RateFile {
    RateFile {
        interpolated_frequency: 1.0,
        file_start: 1_600_000_000.5,
        file_end: 1_600_000_003.5,
        time: vec![1_600_000_000.5, 1_600_000_001.5, 0.0, 1_600_000_003.5],
        rate: vec![
            vec![12.25, 0.0, 0.0, 7.125],
            vec![0.1 + 0.2, 1e-308, 0.0, 1e17],
        ],
        mask: vec![false, false, true, false],
    }
}

/// Write then read reproduces every dataset and attribute exactly.
#[test]
fn rates_round_trip() {
    let file = sample_file();
    let mut b: Vec<u8> = Vec::new();
    ser::rates(&mut b, &file).unwrap();
    let file2 = de::rates(&*b).unwrap();
    assert_eq!(file, file2);
}

#[test]
fn rates_round_trip_uncompressed() {
    let file = sample_file();
    let mut b: Vec<u8> = Vec::new();
    ser::rates_uncompressed(&mut b, &file).unwrap();
    let file2 = de::rates_uncompressed(&*b).unwrap();
    assert_eq!(file, file2);
}

/// A resampled stream survives the trip to disk and back.
#[test]
fn resampled_stream_round_trip() {
    let ch0: Vec<u32> = (0..10).map(|i| i * 100).collect();
    let ch1: Vec<u32> = (0..10).map(|i| i * i).collect();
    let host: Vec<f64> = (0..10).map(|i| 1_000.0 + i as f64).collect();
    let s = Scalers::new(vec![ch0, ch1], host, FrequencyReadout::Scalar(100.0)).unwrap();
    let r = s.interpolate_rate(&Probe::Frequency(0.5)).unwrap();
    let file = RateFile::from_resampled(0.5, &r);

    let mut b: Vec<u8> = Vec::new();
    ser::rates(&mut b, &file).unwrap();
    let file2 = de::rates(&*b).unwrap();
    assert_eq!(file.time, file2.time);
    assert_eq!(file.rate, file2.rate);
    assert_eq!(file.mask, file2.mask);
    assert_eq!(file.interpolated_frequency, file2.interpolated_frequency);
}

/// Raw dumps survive the TSV round trip.
#[test]
fn scalers_tsv_round_trip() {
    let host = vec![1_000.5, 1_001.25, 1_002.125];
    let raw = vec![vec![0u32, 100, 200], vec![5, 9, 2_147_483_647]];

    let mut b: Vec<u8> = Vec::new();
    {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .delimiter(b'\t')
            .from_writer(&mut b);
        ser::scalers_tsv(&mut wtr, &host, &raw).unwrap();
    }
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .from_reader(&*b);
    let (host2, raw2) = de::scalers_tsv(&mut rdr).unwrap();
    assert_eq!(host, host2);
    assert_eq!(raw, raw2);
}

/// Ragged rows are rejected rather than guessed around.
#[test]
fn ragged_tsv_rejected() {
    let data = b"1000.0\t1\t2\n1001.0\t3\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(&data[..]);
    assert!(de::scalers_tsv(&mut rdr).is_err());
}
