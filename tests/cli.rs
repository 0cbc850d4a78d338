use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

fn run(args: &[&str], backend: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_analyze_face"))
        .args(args)
        .env_remove("FACE_ANALYSIS_CONFIG")
        .env_remove("FACE_ANALYSIS_PRESENCE_THRESHOLD")
        .env("FACE_ANALYSIS_BACKEND", backend)
        .env("RUST_LOG", "off")
        .output()
        .expect("spawn analyze_face")
}

fn stdout_json(output: &Output) -> Value {
    let stdout = String::from_utf8(output.stdout.clone()).expect("utf-8 stdout");
    assert_eq!(stdout.lines().count(), 1, "stdout was {:?}", stdout);
    serde_json::from_str(stdout.trim_end()).expect("stdout is JSON")
}

fn write_png(path: &Path) {
    image::RgbImage::from_fn(64, 48, |x, y| image::Rgb([(x * 4) as u8, (y * 5) as u8, 128]))
        .save(path)
        .expect("write png");
}

#[test]
fn no_arguments_exit_one() {
    let output = run(&[], "stub");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim_end(),
        r#"{"error":"Missing arguments"}"#
    );
}

#[test]
fn single_argument_exit_one() {
    let output = run(&["/tmp/frame.jpg"], "stub");
    assert_eq!(output.status.code(), Some(1));
    let value = stdout_json(&output);
    assert_eq!(value["error"], "Missing arguments");
    assert!(value.get("session_id").is_none());
}

#[test]
fn nonexistent_image_reports_in_band() {
    let output = run(&["/nonexistent/nova_face.jpg", "sess-42"], "stub");
    assert_eq!(output.status.code(), Some(0));
    let value = stdout_json(&output);
    assert!(!value["error"].as_str().unwrap().is_empty());
    assert_eq!(value["session_id"], "sess-42");
    assert!(value.get("emotion").is_none());
}

#[test]
fn zero_byte_image_reports_in_band() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.jpg");
    std::fs::write(&path, b"").unwrap();
    let output = run(&[path.to_str().unwrap(), "sess-0"], "stub");
    assert_eq!(output.status.code(), Some(0));
    let value = stdout_json(&output);
    assert!(value["error"].as_str().unwrap().starts_with("Invalid image path"));
    assert_eq!(value["session_id"], "sess-0");
}

#[test]
fn stub_backend_full_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    write_png(&path);

    let output = run(&[path.to_str().unwrap(), "abcd-1234"], "stub");
    assert_eq!(output.status.code(), Some(0));
    let value = stdout_json(&output);

    assert_eq!(value["emotion"], "neutral");
    assert_eq!(value["confidence"], 0.8);
    assert_eq!(value["emotion_scores"]["neutral"], 80.0);
    assert_eq!(value["emotion_scores"].as_object().unwrap().len(), 7);
    assert_eq!(value["gaze_direction"], "center");
    assert_eq!(value["eye_contact"], 100.0);
    assert_eq!(value["gaze_stability"], 100.0);
    assert_eq!(value["posture_score"], 100.0);
    assert_eq!(value["session_id"], "abcd-1234");
    assert!(value.get("error").is_none());
}

#[test]
fn repeated_invocations_are_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    write_png(&path);
    let args = [path.to_str().unwrap(), "same"];
    assert_eq!(run(&args, "stub").stdout, run(&args, "stub").stdout);
}

#[test]
fn extra_arguments_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    write_png(&path);
    let output = run(&[path.to_str().unwrap(), "s-1", "extra", "--flag"], "stub");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_json(&output)["session_id"], "s-1");
}

#[test]
fn flag_like_session_ids_pass_through() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    write_png(&path);
    for sid in ["-5", "-abc", "--help", "-V", "--"] {
        let output = run(&[path.to_str().unwrap(), sid], "stub");
        assert_eq!(output.status.code(), Some(0), "session id {:?}", sid);
        let value = stdout_json(&output);
        assert_eq!(value["session_id"], sid);
        assert_eq!(value["emotion"], "neutral");
    }
}

#[test]
fn lone_help_flag_counts_as_one_argument() {
    let output = run(&["--help"], "stub");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_json(&output)["error"], "Missing arguments");
}

#[test]
fn invalid_backend_reported_in_band() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    write_png(&path);
    let output = run(&[path.to_str().unwrap(), "s-2"], "opencv");
    assert_eq!(output.status.code(), Some(0));
    let value = stdout_json(&output);
    assert!(value["error"].as_str().unwrap().contains("unknown backend"));
    assert_eq!(value["session_id"], "s-2");
}

#[cfg(feature = "backend-tract")]
#[test]
fn missing_model_files_reported_in_band() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    write_png(&path);
    let output = Command::new(env!("CARGO_BIN_EXE_analyze_face"))
        .args([path.to_str().unwrap(), "s-3"])
        .env_remove("FACE_ANALYSIS_CONFIG")
        .env("FACE_ANALYSIS_BACKEND", "tract")
        .env("FACE_ANALYSIS_EMOTION_MODEL", dir.path().join("missing.onnx"))
        .env("RUST_LOG", "off")
        .output()
        .expect("spawn analyze_face");
    assert_eq!(output.status.code(), Some(0));
    let value = stdout_json(&output);
    assert!(value["error"].as_str().unwrap().contains("missing.onnx"));
    assert_eq!(value["session_id"], "s-3");
}
