use std::process::{Command, Output};

use memres_logging::{HEADER, LOG_FILE_ENV_VAR};
use memres_testkit::dirs::temp_log_dir;

fn memres_cmd(args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_memres-cmd"));
    cmd.args(args).env_remove(LOG_FILE_ENV_VAR);
    cmd
}

fn run(cmd: &mut Command) -> Output {
    let output = cmd.output().expect("failed to launch memres-cmd");
    assert!(
        output.status.success(),
        "memres-cmd failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

#[test]
fn test_trace_to_stdout() {
    let output = run(&mut memres_cmd(&["trace", "--stdout", "--count", "2"]));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines = stdout.lines().collect::<Vec<_>>();
    assert_eq!(lines[0], "Time,Action,Pointer,Size,Stream");
    assert_eq!(lines.len(), 5);
    assert!(lines[1].contains(",allocate,0x100,100,0x0"));
    assert!(lines[2].contains(",free,0x100,100,0x0"));
}

#[test]
fn test_trace_to_stderr() {
    let output = run(&mut memres_cmd(&["trace", "--stderr"]));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert_eq!(stderr.lines().next(), Some(HEADER));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_trace_without_target_fails() {
    let output = memres_cmd(&["trace"]).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(LOG_FILE_ENV_VAR), "{stderr}");
}

#[test]
fn test_trace_to_env_file_and_summarize() {
    let dir = temp_log_dir().unwrap();
    let path = dir.path().join("env").join("trace.csv");

    run(memres_cmd(&["trace", "--count", "5", "--size", "300", "--stream", "9", "--leak"])
        .env(LOG_FILE_ENV_VAR, &path));
    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().next(), Some(HEADER));
    assert_eq!(contents.lines().count(), 1 + 5 + 3);

    let output = run(&mut memres_cmd(&["summarize", path.to_str().unwrap()]));
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["allocations"], 5);
    assert_eq!(summary["frees"], 3);
    assert_eq!(summary["bytes_allocated"], 1500);
    let outstanding = summary["outstanding"].as_array().unwrap();
    assert_eq!(outstanding.len(), 2);
    assert_eq!(outstanding[0]["address"], "0x300");
    assert_eq!(outstanding[0]["stream"], 9);
}

#[test]
fn test_summarize_rejects_non_log() {
    let dir = temp_log_dir().unwrap();
    let path = dir.path().join("not_a_log.csv");
    std::fs::write(&path, "a,b,c\n").unwrap();
    let output = memres_cmd(&["summarize", path.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
