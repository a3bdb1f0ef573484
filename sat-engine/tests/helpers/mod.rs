//! Helpers to run the `sat-engine` binary on DIMACS instances and check what it reports.
#![allow(
    dead_code,
    reason = "is used in integration tests but unable to find a way to silence these warnings"
)]

use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;
use std::time::Duration;

use regex::Regex;
use wait_timeout::ChildExt;

const TEST_TIMEOUT: Duration = Duration::from_secs(60);

/// What the binary wrote and the code it exited with.
#[derive(Debug)]
pub(crate) struct Run {
    pub(crate) exit_code: i32,
    pub(crate) stdout: String,
    pub(crate) stderr: String,
}

impl Run {
    /// The status reported on the `s` line, if any.
    pub(crate) fn status(&self) -> Option<&str> {
        self.stdout
            .lines()
            .find_map(|line| line.strip_prefix("s "))
            .map(str::trim)
    }

    /// The literals of the `v` lines, without the terminating `0`.
    pub(crate) fn model(&self) -> Vec<i32> {
        let literal = Regex::new(r"-?\d+").expect("valid regex");
        let mut model = self
            .stdout
            .lines()
            .filter_map(|line| line.strip_prefix("v "))
            .flat_map(|line| literal.find_iter(line))
            .map(|code| code.as_str().parse::<i32>().expect("matched an integer"))
            .collect::<Vec<_>>();

        assert_eq!(Some(0), model.pop(), "the model is terminated by 0");
        model
    }

    pub(crate) fn model_lines(&self) -> Vec<&str> {
        self.stdout
            .lines()
            .filter(|line| line.starts_with("v "))
            .collect()
    }
}

pub(crate) fn instance(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("instances")
        .join(name)
}

pub(crate) fn run_solver(instance_path: impl AsRef<Path>) -> Run {
    run_solver_with_options(instance_path, std::iter::empty())
}

pub(crate) fn run_solver_with_options(
    instance_path: impl AsRef<Path>,
    args: impl IntoIterator<Item = String>,
) -> Run {
    let solver = PathBuf::from(env!("CARGO_BIN_EXE_sat-engine"));

    let mut command = Command::new(solver);
    for arg in args {
        let _ = command.arg(arg);
    }

    let mut child = command
        .arg(instance_path.as_ref())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(Stdio::null())
        .spawn()
        .expect("Failed to run solver.");

    let status = match child.wait_timeout(TEST_TIMEOUT) {
        Ok(None) => panic!("solver took more than {} seconds", TEST_TIMEOUT.as_secs()),
        Ok(Some(status)) => status,
        Err(e) => panic!("error starting solver: {e}"),
    };

    let output = child.wait_with_output().expect("the solver has exited");
    Run {
        exit_code: status.code().expect("the solver exited normally"),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}

/// Parse the clauses of a DIMACS file, ignoring comments and the header.
pub(crate) fn read_clauses(instance_path: impl AsRef<Path>) -> Vec<Vec<i32>> {
    let contents = std::fs::read_to_string(instance_path).expect("readable instance");

    let codes = contents
        .lines()
        .filter(|line| !line.starts_with('c') && !line.starts_with('p'))
        .flat_map(str::split_whitespace)
        .map(|code| code.parse::<i32>().expect("the instance is well formed"));

    let mut clauses = vec![];
    let mut clause = vec![];
    for code in codes {
        if code == 0 {
            clauses.push(std::mem::take(&mut clause));
        } else {
            clause.push(code);
        }
    }
    clauses
}

/// Assert that `model` assigns every variable once and satisfies every clause of the instance.
pub(crate) fn verify_model(instance_path: impl AsRef<Path>, model: &[i32]) {
    for clause in read_clauses(instance_path) {
        assert!(
            clause.iter().any(|literal| model.contains(literal)),
            "clause {clause:?} is falsified by the model"
        );
    }

    let mut variables = model.iter().map(|literal| literal.abs()).collect::<Vec<_>>();
    variables.sort_unstable();
    let num_variables = variables.len();
    variables.dedup();
    assert_eq!(num_variables, variables.len(), "a variable is assigned twice");
}
