mod fixtures;

use std::io::Write;
use std::process::Command;

use emit_rs::util::hex::encode_hex;
use fixtures::*;
use serde_json::Value;
use tempfile::NamedTempFile;

fn run_cli(args: &[&str]) -> Vec<Value> {
    let output = Command::new(env!("CARGO_BIN_EXE_emit-cli"))
        .args(args)
        .output()
        .expect("run emit-cli");
    assert!(
        output.status.success(),
        "emit-cli failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_decode_raw_capture() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&scramble250(&card_208560())).unwrap();
    file.write_all(&scramble250(&card_206853())).unwrap();

    let path = file.path().to_str().unwrap();
    let records = run_cli(&["decode", "--protocol", "emit250", path]);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["ecard_number"], 208_560);
    assert_eq!(records[1]["ecard_number"], 206_853);
    assert_eq!(records[1]["valid_transfer_check"], true);
}

#[test]
fn test_decode_hex_capture_with_metadata() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", encode_hex(&scramble250(&card_206853()))).unwrap();

    let path = file.path().to_str().unwrap();
    let records = run_cli(&["decode", "--protocol", "emit250", "--metadata", "--hex", path]);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["finished_reading"], false);
    assert_eq!(records[1]["finished_reading"], true);
}

#[test]
fn test_decode_mtr4_status() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(MTR4_STATUS_HEX.as_bytes()).unwrap();

    let path = file.path().to_str().unwrap();
    let records = run_cli(&["decode", "--protocol", "mtr4", "--hex", path]);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["type"], "Status");
    assert_eq!(records[0]["mtr_id"], 14_209);
    assert_eq!(records[0]["battery_status"], "Ok");
}

#[test]
fn test_missing_file_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_emit-cli"))
        .args(["decode", "--protocol", "escan", "/nonexistent/capture.bin"])
        .env("RUST_LOG", "error")
        .output()
        .unwrap();
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR"), "{stderr}");
    assert!(stderr.contains("/nonexistent/capture.bin"), "{stderr}");
}

#[test]
fn test_discarded_frames_are_reported() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&scramble250(&card_208560()[..100])).unwrap();
    file.write_all(&scramble250(&card_206853())).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_emit-cli"))
        .args(["decode", "--protocol", "emit250"])
        .arg(file.path())
        .env("RUST_LOG", "warn")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("EMIT 250: 1 frames discarded"), "{stderr}");
}
