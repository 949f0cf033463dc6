//! 1回だけ実行するプロセスモードのエンドツーエンドテスト

mod common;

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use pinn_bridge::InferenceBackend;
use pinn_bridge::inference::Predictor;
use pinn_bridge::loader::ModelLoader;
use pinn_bridge::model::ModelConfig;

use common::save_checkpoint;

fn run_bridge(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pinn-bridge"))
        .args(args)
        .env_remove("PINN_MODEL_PATH")
        .env_remove("PINN_OUTPUT_PATH")
        .env_remove("RUST_LOG")
        .output()
        .expect("バイナリを起動できません")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("一時パスはUTF-8のはずです")
}

#[test]
fn test_process_mode_matches_library_mode() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = save_checkpoint(dir.path(), "pinn_model.mpk", &ModelConfig::new());
    let output_path = dir.path().join("pinn_output.txt");

    let out = run_bridge(&[
        "2.5",
        "--model",
        path_arg(&model_path),
        "--output",
        path_arg(&output_path),
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let written: f32 = fs::read_to_string(&output_path)
        .unwrap()
        .trim()
        .parse()
        .expect("出力ファイルには10進数が1つだけ入るはずです");

    let model = ModelLoader::<InferenceBackend>::new(ModelConfig::new(), Default::default())
        .load(&model_path)
        .unwrap();
    let expected = Predictor::new(model).predict(2.5).unwrap();
    assert!((written - expected).abs() <= 1e-6, "{written} vs {expected}");
}

#[test]
fn test_two_processes_write_identical_values() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = save_checkpoint(dir.path(), "pinn_model.mpk", &ModelConfig::new());
    let first = dir.path().join("first.txt");
    let second = dir.path().join("second.txt");

    for output in [&first, &second] {
        let out = run_bridge(&[
            "-0.75",
            "-m",
            path_arg(&model_path),
            "-o",
            path_arg(output),
            "--write-mode",
            "atomic",
        ]);
        assert!(out.status.success());
    }
    assert_eq!(
        fs::read_to_string(&first).unwrap(),
        fs::read_to_string(&second).unwrap()
    );
}

#[test]
fn test_print_echoes_the_written_value() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = save_checkpoint(dir.path(), "pinn_model.mpk", &ModelConfig::new());
    let output_path = dir.path().join("out.txt");

    let out = run_bridge(&[
        "1",
        "-m",
        path_arg(&model_path),
        "-o",
        path_arg(&output_path),
        "--print",
    ]);
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout.trim(), fs::read_to_string(&output_path).unwrap());
}

#[test]
fn test_non_numeric_input_leaves_output_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = save_checkpoint(dir.path(), "pinn_model.mpk", &ModelConfig::new());
    let output_path = dir.path().join("out.txt");
    fs::write(&output_path, "previous").unwrap();

    let out = run_bridge(&[
        "abc",
        "-m",
        path_arg(&model_path),
        "-o",
        path_arg(&output_path),
    ]);
    assert_eq!(out.status.code(), Some(2));
    assert!(!out.stderr.is_empty());
    assert_eq!(fs::read_to_string(&output_path).unwrap(), "previous");
}

#[test]
fn test_input_is_checked_before_the_model() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("out.txt");

    let out = run_bridge(&[
        "abc",
        "-m",
        path_arg(&dir.path().join("missing.mpk")),
        "-o",
        path_arg(&output_path),
    ]);
    assert_eq!(out.status.code(), Some(2));
    assert!(!output_path.exists());
}

#[test]
fn test_missing_model_fails_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("out.txt");

    let out = run_bridge(&[
        "2.5",
        "-m",
        path_arg(&dir.path().join("missing.mpk")),
        "-o",
        path_arg(&output_path),
    ]);
    assert_eq!(out.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("missing.mpk"), "stderr: {stderr}");
    assert!(!output_path.exists());
}

#[test]
fn test_unwritable_output_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = save_checkpoint(dir.path(), "pinn_model.mpk", &ModelConfig::new());
    let output_path = dir.path().join("no_such_dir").join("out.txt");

    let out = run_bridge(&[
        "2.5",
        "-m",
        path_arg(&model_path),
        "-o",
        path_arg(&output_path),
    ]);
    assert_eq!(out.status.code(), Some(5));
}

#[test]
fn test_foreign_extension_is_reported_on_stderr() {
    let dir = tempfile::tempdir().unwrap();
    save_checkpoint(dir.path(), "model_trial.mpk", &ModelConfig::new());
    let output_path = dir.path().join("out.txt");

    let out = run_bridge(&[
        "0.5",
        "-m",
        path_arg(&dir.path().join("model_trial.pt")),
        "-o",
        path_arg(&output_path),
    ]);
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("model_trial.mpk"), "stderr: {stderr}");
    assert!(output_path.exists());
}
