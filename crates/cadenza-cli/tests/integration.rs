//! Integration tests for cadenza-cli.
//!
//! Every invocation points `--config` into a temp dir so the user's own
//! config never leaks into the results.

use cadenza_io::{WavSpec, read_wav, write_wav};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to get the path to the `cadenza` binary built by cargo.
fn cadenza(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cadenza"));
    cmd.arg("--config").arg(dir.join("config.toml"));
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn sine_file(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("sine.wav");
    let samples: Vec<f32> = (0..4410)
        .map(|i| 0.1 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin())
        .collect();
    write_wav(&path, &samples, WavSpec::mono(44100)).unwrap();
    path
}

// ---------------------------------------------------------------------------
// `cadenza effects`
// ---------------------------------------------------------------------------

#[test]
fn cli_effects_lists_all_effects() {
    let dir = TempDir::new().unwrap();
    let output = cadenza(dir.path())
        .arg("effects")
        .output()
        .expect("failed to run cadenza effects");
    assert!(output.status.success(), "cadenza effects failed");

    let text = stdout(&output);
    assert!(text.contains("Available Effects"));
    for effect in [
        "reverb",
        "delay",
        "distortion",
        "filter",
        "compression",
        "chorus",
        "flanger",
        "phaser",
        "normalize",
        "equalizer",
    ] {
        assert!(text.contains(effect), "listing should contain '{effect}'");
    }
}

#[test]
fn cli_effects_detail_shows_parameters() {
    let dir = TempDir::new().unwrap();
    let output = cadenza(dir.path())
        .args(["effects", "distortion"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("Parameters"));
    assert!(text.contains("drive"));
    assert!(text.contains("tone"));
}

#[test]
fn cli_effects_unknown_fails() {
    let dir = TempDir::new().unwrap();
    let output = cadenza(dir.path())
        .args(["effects", "wobble"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// `cadenza process`
// ---------------------------------------------------------------------------

#[test]
fn cli_process_single_effect() {
    let dir = TempDir::new().unwrap();
    let input = sine_file(&dir);
    let out = dir.path().join("out.wav");

    let output = cadenza(dir.path())
        .arg("process")
        .arg(&input)
        .arg(&out)
        .args(["--effect", "normalize", "--param", "target_level=-3dB"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let (samples, spec) = read_wav(&out).unwrap();
    assert_eq!(samples.len(), 4410);
    assert_eq!(spec.bits_per_sample, 32);
    let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    assert!((peak - 0.708).abs() < 0.01, "peak {}", peak);
}

#[test]
fn cli_process_chain_keeps_length() {
    let dir = TempDir::new().unwrap();
    let input = sine_file(&dir);
    let out = dir.path().join("chain.wav");

    let output = cadenza(dir.path())
        .arg("process")
        .arg(&input)
        .arg(&out)
        .args(["--chain", "filter:cutoff=2kHz,type=lowpass|delay:delay_time=20ms|normalize"])
        .args(["--bit-depth", "16"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(read_wav(&out).unwrap().0.len(), 4410);
}

#[test]
fn cli_process_rejects_out_of_range_parameter() {
    let dir = TempDir::new().unwrap();
    let input = sine_file(&dir);
    let out = dir.path().join("bad.wav");

    let output = cadenza(dir.path())
        .arg("process")
        .arg(&input)
        .arg(&out)
        .args(["--effect", "delay", "--param", "feedback=1.5"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!out.exists());
}

// ---------------------------------------------------------------------------
// `cadenza analyze`, `cadenza config`, `cadenza files`
// ---------------------------------------------------------------------------

#[test]
fn cli_analyze_json() {
    let dir = TempDir::new().unwrap();
    let input = sine_file(&dir);
    let output = cadenza(dir.path())
        .arg("analyze")
        .arg(&input)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let peak = value["peak"].as_f64().unwrap();
    assert!((peak - 0.1).abs() < 0.01);
    assert!((value["duration_seconds"].as_f64().unwrap() - 0.1).abs() < 1e-6);
}

#[test]
fn cli_analyze_features_json() {
    let dir = TempDir::new().unwrap();
    let input = sine_file(&dir);
    let output = cadenza(dir.path())
        .arg("analyze")
        .arg(&input)
        .args(["--features", "chroma", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["kind"], "chroma");
    assert!(value.get("mfcc").is_none());
    let chroma = value["chroma"]["mean"].as_array().unwrap();
    assert_eq!(chroma.len(), 12);
    // 440 Hz is an A
    assert!((chroma[9].as_f64().unwrap() - 1.0).abs() < 1e-3);

    let bad = cadenza(dir.path())
        .arg("analyze")
        .arg(&input)
        .args(["--features", "timbre"])
        .output()
        .unwrap();
    assert!(!bad.status.success());
}

#[test]
fn cli_config_init_then_show() {
    let dir = TempDir::new().unwrap();
    let init = cadenza(dir.path()).args(["config", "init"]).output().unwrap();
    assert!(init.status.success());
    assert!(dir.path().join("config.toml").exists());

    let again = cadenza(dir.path()).args(["config", "init"]).output().unwrap();
    assert!(!again.status.success());

    let show = cadenza(dir.path()).args(["config", "show"]).output().unwrap();
    assert!(stdout(&show).contains("sample_rate = 44100"));
}

#[test]
fn cli_files_add_list_remove() {
    let dir = TempDir::new().unwrap();
    let input = sine_file(&dir);
    let store = dir.path().join("files.json");

    let add = cadenza(dir.path())
        .arg("files")
        .arg("--store")
        .arg(&store)
        .arg("add")
        .arg(&input)
        .args(["--tag", "test"])
        .output()
        .unwrap();
    assert!(add.status.success());
    assert!(stdout(&add).contains("Added sine"));

    let list = cadenza(dir.path())
        .arg("files")
        .arg("--store")
        .arg(&store)
        .arg("list")
        .output()
        .unwrap();
    let text = stdout(&list);
    assert!(text.contains("1 file(s)"));
    assert!(text.contains("sine.wav"));

    let remove = cadenza(dir.path())
        .arg("files")
        .arg("--store")
        .arg(&store)
        .args(["remove", "sine"])
        .output()
        .unwrap();
    assert!(remove.status.success());

    let missing = cadenza(dir.path())
        .arg("files")
        .arg("--store")
        .arg(&store)
        .args(["remove", "sine"])
        .output()
        .unwrap();
    assert!(!missing.status.success());
}
