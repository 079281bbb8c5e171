//! Integration tests for frameworks_epoll_demo crate
//!
//! These tests run the socket scenarios against the real kernel, without
//! the checker loaded, and check what epoll reported.

use frameworks_epoll_demo::*;

#[test]
fn test_undrained_rearm() {
    let report = run(Scenario::UndrainedRearm).unwrap();
    assert_eq!(report.scenario, "undrained-rearm");
    assert_eq!(report.ready_events, 1);
    assert_eq!(report.bytes_read, 0);
}

#[test]
fn test_drained_rearm() {
    let report = run(Scenario::DrainedRearm).unwrap();
    // readable once, then writable once
    assert_eq!(report.ready_events, 2);
    assert_eq!(report.bytes_read, 4);
}

#[test]
fn test_one_shot_fires_once() {
    let report = run(Scenario::OneShot).unwrap();
    assert_eq!(report.ready_events, 1);
    assert_eq!(report.bytes_read, 4);
}

mod preloaded {
    //! Runs the demo binary with `libepoll_checker.so` preloaded, when the
    //! library has been built into the same target directory.

    use std::path::PathBuf;
    use std::process::{Command, Output};

    const UNDRAINED_READ: &str = "no longer monitored for input";

    fn checker_library() -> Option<PathBuf> {
        let demo = PathBuf::from(env!("CARGO_BIN_EXE_epoll-demo"));
        let library = demo.parent()?.join("libepoll_checker.so");
        if library.exists() {
            Some(library)
        } else {
            eprintln!("skipping: {} not built", library.display());
            None
        }
    }

    fn run_preloaded(library: &PathBuf, scenario: &str) -> Output {
        Command::new(env!("CARGO_BIN_EXE_epoll-demo"))
            .arg(scenario)
            .env("LD_PRELOAD", library)
            .env("EPOLL_CHECKER_LOG", "warn")
            .env("EPOLL_CHECKER_STRICT", "1")
            .env_remove("EPOLL_CHECKER_DISABLE")
            .output()
            .unwrap()
    }

    #[test]
    fn test_undrained_rearm_is_reported() {
        let Some(library) = checker_library() else {
            return;
        };
        let output = run_preloaded(&library, "undrained-rearm");
        let stderr = String::from_utf8_lossy(&output.stderr);

        // A clobbered errno would turn EAGAIN into a failed scenario
        assert!(output.status.success(), "{}", stderr);
        assert_eq!(stderr.matches(UNDRAINED_READ).count(), 1, "{}", stderr);
        assert!(stderr.contains("fd 4"), "{}", stderr);
    }

    #[test]
    fn test_clean_scenarios_report_nothing() {
        let Some(library) = checker_library() else {
            return;
        };
        for scenario in ["drained-rearm", "one-shot"] {
            let output = run_preloaded(&library, scenario);
            let stderr = String::from_utf8_lossy(&output.stderr);
            assert!(output.status.success(), "{}: {}", scenario, stderr);
            assert!(!stderr.contains("no longer monitored"), "{}: {}", scenario, stderr);
        }
    }

    #[test]
    fn test_disabled_checker_stays_silent() {
        let Some(library) = checker_library() else {
            return;
        };
        let output = Command::new(env!("CARGO_BIN_EXE_epoll-demo"))
            .arg("undrained-rearm")
            .env("LD_PRELOAD", &library)
            .env("EPOLL_CHECKER_DISABLE", "1")
            .output()
            .unwrap();
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(output.status.success(), "{}", stderr);
        assert!(!stderr.contains(UNDRAINED_READ), "{}", stderr);
    }
}
