use std::fs;
use verhash_core::{Event, GenError, ManifestGenerator, Outcome, RunRequest, RunState};

#[test]
fn invalid_input_is_synchronous_and_keeps_idle() {
    let gen = ManifestGenerator::new();
    let td = tempfile::tempdir().unwrap();
    let err = gen.start(&RunRequest::new(td.path()).with_version("")).err().unwrap();
    assert!(matches!(err, GenError::InvalidInput(_)));
    assert_eq!(gen.state(), RunState::Idle);
}

#[test]
fn terminal_state_follows_outcome_and_allows_restart() {
    let gen = ManifestGenerator::new();
    let root = tempfile::tempdir().unwrap();
    fs::write(root.path().join("x"), b"x").unwrap();
    let out = tempfile::tempdir().unwrap();
    let req = RunRequest::new(root.path()).with_version("v1").with_output_dir(out.path());

    let outcome = gen.run_to_completion(&req, |_| {}).unwrap();
    assert_eq!(outcome, Outcome::Completed { entry_count: 1 });
    assert_eq!(gen.state(), RunState::Completed);

    let bad = RunRequest::new(root.path())
        .with_version("v1")
        .with_output_dir(out.path().join("missing"));
    let outcome = gen.run_to_completion(&bad, |_| {}).unwrap();
    assert!(matches!(outcome, Outcome::Failed { .. }));
    assert_eq!(gen.state(), RunState::Failed);

    let outcome = gen.run_to_completion(&req, |_| {}).unwrap();
    assert!(outcome.is_success());
    assert!(gen.state().is_terminal());
}

#[test]
fn handle_exposes_output_and_event_stream() {
    let gen = ManifestGenerator::new();
    let root = tempfile::tempdir().unwrap();
    fs::write(root.path().join("x"), b"x").unwrap();
    let out = tempfile::tempdir().unwrap();
    let handle = gen
        .start(&RunRequest::new(root.path()).with_version("v1").with_output_dir(out.path()))
        .unwrap();
    assert_eq!(handle.output(), out.path().join("file_hashes.txt").as_path());
    let events: Vec<Event> = handle.events().iter().collect();
    assert!(events.last().unwrap().is_terminal());
    assert!(handle.wait().is_success());
}

// A FIFO blocks `open` until a writer shows up, which pins the worker in Running.
#[cfg(target_family = "unix")]
#[test]
fn second_start_while_running_is_rejected() {
    let root = tempfile::tempdir().unwrap();
    let fifo = root.path().join("pipe");
    let status = std::process::Command::new("mkfifo").arg(&fifo).status().unwrap();
    assert!(status.success());
    let out = tempfile::tempdir().unwrap();
    let req = RunRequest::new(root.path()).with_version("v1").with_output_dir(out.path());

    let gen = ManifestGenerator::new();
    let handle = gen.start(&req).unwrap();
    assert_eq!(gen.state(), RunState::Running);
    assert!(matches!(gen.start(&req), Err(GenError::AlreadyRunning)));
    assert!(matches!(gen.clone().start(&req), Err(GenError::AlreadyRunning)));

    gen.cancel(&handle);
    // Unblock the worker's open(); it finishes this file then sees the flag.
    drop(fs::OpenOptions::new().write(true).open(&fifo).unwrap());
    let outcome = handle.wait();
    assert!(matches!(outcome, Outcome::Completed { entry_count: 1 } | Outcome::Cancelled { .. }));
    assert!(gen.state().is_terminal());
}
