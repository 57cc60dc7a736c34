//! The `ormkit` binary.

use assert_cmd::Command;
use predicates::prelude::*;

use crate::common::{FULL_SETUP, SetupProject};

fn ormkit() -> Command {
    let mut cmd = Command::cargo_bin("ormkit").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("ORMKIT_SETUP").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_plan_prints_order_and_connectors() {
    let project = SetupProject::new(FULL_SETUP);

    ormkit()
        .arg("plan")
        .arg(project.setup_path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Build order:"))
        .stdout(predicate::str::contains("gateways.default"))
        .stdout(predicate::str::contains("mappers.users.entity"))
        .stdout(predicate::str::contains("needs gateways.default"))
        .stdout(predicate::str::contains("users_X_tasks__tasks"))
        .stdout(predicate::str::contains("6 components, 2 connectors"));
}

#[test]
fn test_plan_uses_setup_in_working_directory() {
    let project = SetupProject::new(FULL_SETUP);

    ormkit()
        .current_dir(project.dir())
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("relations.tasks"));
}

#[test]
fn test_plan_json() {
    let project = SetupProject::new(FULL_SETUP);

    let output = ormkit()
        .args(["plan", "--format", "json"])
        .arg(project.setup_path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let order = report["order"].as_array().unwrap();
    assert_eq!(order.len(), 6);
    assert_eq!(order[0]["path"], "gateways.default");
    assert_eq!(order[0]["tier"], 0);
    assert_eq!(order[1]["depends_on"], serde_json::json!(["gateways.default"]));
    assert_eq!(order[2]["kind"], "relation");
    assert_eq!(
        report["connectors"],
        serde_json::json!(["tasks_X_users__owner", "users_X_tasks__tasks"])
    );
}

#[test]
fn test_plan_reports_duplicate_connector() {
    let project = SetupProject::new(
        r#"
        [relations.users]
        relationships = [
            { name = "tasks", target = "tasks" },
            { name = "tasks", target = "tasks", kind = "one-to-one" },
        ]

        [relations.tasks]
        "#,
    );

    ormkit()
        .arg("plan")
        .arg(project.setup_path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate connector 'users_X_tasks__tasks'"));
}

#[test]
fn test_plan_reports_missing_dependency() {
    let project = SetupProject::new(
        r#"
        [schemas.users]
        dataset = "people"
        "#,
    );

    ormkit()
        .arg("plan")
        .arg(project.setup_path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("dataset 'people' which was never declared"));
}

#[test]
fn test_plan_missing_file() {
    let project = SetupProject::new("");

    ormkit()
        .arg("plan")
        .arg(project.dir().join("absent.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.toml"));
}

#[test]
fn test_name_with_namespace() {
    ormkit()
        .args(["name", "relations/users.rb", "--namespace", "Persistence"])
        .assert()
        .success()
        .stdout(predicate::str::contains("relations/users.rb\tPersistence::Users"));
}

#[test]
fn test_name_with_root() {
    ormkit()
        .args(["name", "lib/persistence/user_tasks.rb", "--root", "lib"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Persistence::UserTasks"));
}

#[test]
fn test_verbose_and_quiet_conflict() {
    ormkit().args(["-v", "-q", "name", "users.rb"]).assert().failure();
}
