#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use helpers::instance;
use helpers::run_solver;
use helpers::run_solver_with_options;
use helpers::verify_model;

#[test]
fn satisfiable_instance_reports_a_model() {
    let path = instance("simple_sat.cnf");

    let run = run_solver(&path);

    assert_eq!(10, run.exit_code);
    assert_eq!(Some("SATISFIABLE"), run.status());
    let model = run.model();
    assert_eq!(5, model.len());
    verify_model(&path, &model);
}

#[test]
fn pigeonhole_is_unsatisfiable() {
    let run = run_solver(instance("pigeonhole_3.cnf"));

    assert_eq!(20, run.exit_code);
    assert_eq!(Some("UNSATISFIABLE"), run.status());
    assert!(run.model_lines().is_empty());
}

#[test]
fn conflicting_units_are_unsatisfiable() {
    let run = run_solver(instance("unit_conflict.cnf"));

    assert_eq!(20, run.exit_code);
    assert_eq!(Some("UNSATISFIABLE"), run.status());
}

#[test]
fn long_models_are_wrapped() {
    let path = instance("wide_sat.cnf");

    let run = run_solver(&path);

    assert_eq!(10, run.exit_code);
    let lines = run.model_lines();
    assert!(lines.len() > 1);
    assert!(lines.iter().all(|line| line.len() <= 80));
    assert!(lines.last().is_some_and(|line| line.ends_with(" 0")));
    verify_model(&path, &run.model());
}

#[test]
fn options_do_not_change_the_answer() {
    let options = [
        "--restart-sequence=constant",
        "--restart-initial-conflicts=1",
        "--forget-interval=1",
        "--clause-stores=watched",
        "--random-seed=7",
    ]
    .map(String::from);

    let run = run_solver_with_options(instance("pigeonhole_3.cnf"), options.clone());
    assert_eq!(20, run.exit_code);

    let path = instance("simple_sat.cnf");
    let run = run_solver_with_options(&path, options);
    assert_eq!(10, run.exit_code);
    verify_model(&path, &run.model());
}

#[test]
fn statistics_are_logged_as_comments() {
    let run = run_solver_with_options(
        instance("pigeonhole_3.cnf"),
        ["--log-statistics".to_owned()],
    );

    assert_eq!(20, run.exit_code);
    assert!(run
        .stdout
        .lines()
        .any(|line| line.starts_with("c STAT") && line.contains("conflicts")));
}

#[test]
fn malformed_instance_is_an_error() {
    let run = run_solver(instance("malformed.cnf"));

    assert_eq!(1, run.exit_code);
    assert_eq!(None, run.status());
}

#[test]
fn instance_without_header_is_an_error() {
    let run = run_solver(instance("missing_header.cnf"));

    assert_eq!(1, run.exit_code);
}

#[test]
fn missing_file_is_an_error() {
    let run = run_solver(instance("does_not_exist.cnf"));

    assert_eq!(1, run.exit_code);
}
