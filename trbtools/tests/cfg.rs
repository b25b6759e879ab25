use std::path::PathBuf;
use std::time::Duration;
use trbtools::cfg::Job;
use trbtools::freq::FrequencyReadout;

fn serialize_config(config: &Job) -> String {
    let ser = serde_json::to_string(config).unwrap();
    return ser;
}

fn deserialize_config(config: &str) -> Job {
    let de: Job = serde_json::from_str(config).unwrap();
    return de;
}

#[test]
fn serde_roundtrip() {
    let config = Job {
        name: String::from("test_job_serde"),
        timestamp: None,
        input: Some(PathBuf::from("night_2024-03-01.tsv")),
        output: None,
        probe_frequency: Some(1.0),
        frequency: Some(FrequencyReadout::Scalar(10_000.0)),
        max_gap: Some(Duration::from_secs(90)),
        channel_labels: vec![String::from("reference"), String::from("photons")],
    };
    let serconfig = serialize_config(&config);
    let deconfig = deserialize_config(&serconfig);
    assert_eq!(config, deconfig);
}

#[test]
fn de_simple() {
    let x = r#"{
            "name": "nightly lidar rates",
            "input": "night.tsv",
            "probe_frequency": 1.0,
            "frequency": {"scalar": 10000.0},
            "max_gap": "1min 30s",
            "channel_labels": ["reference", "photons"]
        }"#;

    let de: Job = serde_json::from_str(x).unwrap();

    let r = Job {
        name: String::from("nightly lidar rates"),
        input: Some(PathBuf::from("night.tsv")),
        probe_frequency: Some(1.0),
        frequency: Some(FrequencyReadout::Scalar(10_000.0)),
        max_gap: Some("1min 30s".parse::<humantime::Duration>().unwrap().into()),
        channel_labels: vec![String::from("reference"), String::from("photons")],
        ..Default::default()
    };

    assert_eq!(r, de);
}

#[test]
fn de_minimal() {
    let x = r#"{ "name": "bare" }"#;
    let de: Job = serde_json::from_str(x).unwrap();
    let r = Job {
        name: String::from("bare"),
        ..Default::default()
    };
    assert_eq!(r, de);
}
