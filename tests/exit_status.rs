use std::process::{Command, Output};

fn lbsolid(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lbsolid"))
        .args(["--resolution", "8", "--no-output"])
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_short_stable_run_exits_with_zero() {
    // about 3 steps of 310 s each
    let output = lbsolid(&["--tau", "0.8", "--inlet-velocity", "1.6e-6", "--max-time", "1000"]);
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn test_diverging_run_exits_with_one() {
    // lattice inlet speed of about 4 at tau = 0.51
    let output = lbsolid(&["--inlet-velocity", "0.01", "--max-time", "40000"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("diverged"), "{stderr}");
}

#[test]
fn test_invalid_arguments_exit_with_one() {
    let output = lbsolid(&["--tau", "0.4"]);
    assert_eq!(output.status.code(), Some(1));
}
