use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use std::fs;

fn setup_test_env() -> (TempDir, std::sync::MutexGuard<'static, ()>) {
    let guard = test_env::lock_test_env();
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let config_dir = temp_dir.path().join(".stageboard");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("rc"), format!("data.location={}\n", db_path.display())).unwrap();
    std::env::set_var("HOME", temp_dir.path().to_str().unwrap());
    (temp_dir, guard)
}

fn get_cmd(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stageboard").unwrap();
    cmd.env("HOME", temp_dir.path());
    cmd
}

fn seed_leads(temp_dir: &TempDir) {
    get_cmd(temp_dir).args(["add", "leads", "Acme", "status=New Lead"]).assert().success();
    get_cmd(temp_dir).args(["add", "leads", "Globex", "status=Prospect"]).assert().success();
}

#[test]
fn test_move_to_other_column() {
    let (temp_dir, _guard) = setup_test_env();
    seed_leads(&temp_dir);

    get_cmd(&temp_dir).args(["move", "leads", "1", "working_on_it"]).assert()
        .success()
        .stdout(predicate::str::contains("Moved lead 1 to Working on it."));

    let output = get_cmd(&temp_dir).args(["board", "leads", "--json"]).assert().success();
    let json: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(json["columns"][0]["count"], 0);
    assert_eq!(json["columns"][1]["items"][0]["id"], 1);
    assert_eq!(json["columns"][1]["items"][0]["status"], "Working on it");

    get_cmd(&temp_dir).args(["history", "leads", "1"]).assert()
        .success()
        .stdout(predicate::str::contains("New Lead -> Working on it"));

    drop(temp_dir);
}

#[test]
fn test_move_by_label() {
    let (temp_dir, _guard) = setup_test_env();
    seed_leads(&temp_dir);

    get_cmd(&temp_dir).args(["move", "leads", "2", "New Leads"]).assert()
        .success()
        .stdout(predicate::str::contains("Moved lead 2 to New Leads."));

    // The first lead column writes the backend's own vocabulary
    get_cmd(&temp_dir).args(["history", "leads", "2"]).assert()
        .success()
        .stdout(predicate::str::contains("Prospect -> New Lead\n"));

    drop(temp_dir);
}

#[test]
fn test_move_into_own_column_is_noop() {
    let (temp_dir, _guard) = setup_test_env();
    seed_leads(&temp_dir);

    get_cmd(&temp_dir).args(["move", "leads", "2", "prospect"]).assert()
        .success()
        .stdout(predicate::str::contains("Lead 2 is already in Prospect."));

    // "New Lead" already places lead 1 in new_leads
    get_cmd(&temp_dir).args(["move", "leads", "1", "new_leads"]).assert()
        .success()
        .stdout(predicate::str::contains("already in New Leads"));

    get_cmd(&temp_dir).args(["history", "leads", "2"]).assert()
        .success()
        .stdout(predicate::str::contains("No moves recorded for lead 2."));

    drop(temp_dir);
}

#[test]
fn test_move_excluded_record_into_column() {
    let (temp_dir, _guard) = setup_test_env();

    get_cmd(&temp_dir).args(["add", "opportunities", "Depot", "stage=archived"]).assert().success();
    get_cmd(&temp_dir).args(["move", "opportunity", "1", "won"]).assert()
        .success()
        .stdout(predicate::str::contains("Moved opportunity 1 to Won."));

    get_cmd(&temp_dir).args(["board", "opportunities"]).assert()
        .success()
        .stdout(predicate::str::contains("not shown").not());

    drop(temp_dir);
}

#[test]
fn test_repeated_moves_build_history() {
    let (temp_dir, _guard) = setup_test_env();

    get_cmd(&temp_dir).args(["add", "deals", "Roof"]).assert().success();
    get_cmd(&temp_dir).args(["move", "deals", "1", "preparing_proposal"]).assert().success();
    get_cmd(&temp_dir).args(["move", "deals", "1", "closed_won"]).assert().success();

    let output = get_cmd(&temp_dir).args(["history", "deals", "1"]).assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("Prospects -> Preparing proposal"));
    assert!(lines[1].ends_with("Preparing proposal -> Closed Won"));

    drop(temp_dir);
}
