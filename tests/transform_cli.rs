use std::fs;
use std::process::Command;

use symtext::AnnotatedSample;

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_transform_dataset"))
        .args(args)
        .output()
        .expect("run CLI")
}

#[test]
fn cli_transforms_record_array() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("raw.json");
    let output = dir.path().join("coded.json");
    fs::write(
        &input,
        r#"[{"sentences": ["hi", "bye"], "codes": [1, 2], "other": "x"}]"#,
    )
    .expect("write input");

    let result = run(&[
        "--input",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
        "--seed",
        "1",
    ]);
    assert!(
        result.status.success(),
        "cli exited with {}: {}",
        result.status,
        String::from_utf8_lossy(&result.stderr)
    );
    assert!(String::from_utf8_lossy(&result.stdout).contains("Data successfully saved"));

    let body = fs::read_to_string(&output).expect("read output");
    let samples: Vec<AnnotatedSample> = serde_json::from_str(&body).expect("parse output");
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].sections, vec!["hi", "bye"]);
    assert_eq!(samples[0].section_names, vec!["1", "2"]);
    assert_eq!(samples[0].predicted_section_names, None);
    assert!(!body.contains("other"));
}

#[test]
fn cli_reports_keys_for_object_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("raw.json");
    let output = dir.path().join("coded.json");
    fs::write(&input, r#"{"train": [1], "val": [2]}"#).expect("write input");

    let result = run(&[
        "--input",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ]);
    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("Keys in the JSON file:"));
    assert!(stdout.contains("train"));
    assert!(stdout.contains("val"));
    // Object inputs are reported, never transformed.
    assert!(!output.exists());
}

#[test]
fn cli_rejects_unsupported_shapes_without_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("raw.json");
    let output = dir.path().join("coded.json");
    fs::write(&input, r#""just a string""#).expect("write input");

    let result = run(&[
        "--input",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("unsupported JSON format"));
    assert!(!output.exists());
}

#[test]
fn cli_aborts_on_missing_field_without_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("raw.json");
    let output = dir.path().join("coded.json");
    fs::write(&input, r#"[{"sentences": ["only text, no codes"]}]"#).expect("write input");

    let result = run(&[
        "--input",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("missing 'codes'"));
    assert!(!output.exists());
}

#[test]
fn cli_subsamples_reproducibly_with_seed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("raw.json");
    fs::write(
        &input,
        r#"[
            {"sentences": ["a"], "codes": [0]},
            {"sentences": ["b"], "codes": [1]},
            {"sentences": ["c"], "codes": [2]},
            {"sentences": ["d"], "codes": [3]}
        ]"#,
    )
    .expect("write input");

    let mut outputs = Vec::new();
    for name in ["first.json", "second.json"] {
        let output = dir.path().join(name);
        let result = run(&[
            "--input",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--subsample",
            "2",
            "--seed",
            "9",
        ]);
        assert!(result.status.success());
        outputs.push(fs::read_to_string(&output).expect("read output"));
    }
    assert_eq!(outputs[0], outputs[1]);

    let samples: Vec<AnnotatedSample> = serde_json::from_str(&outputs[0]).expect("parse");
    assert_eq!(samples.len(), 2);
}
