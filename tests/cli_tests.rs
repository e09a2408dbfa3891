//! End-to-end tests for the vpcplan binary

use assert_cmd::Command;
use predicates::prelude::*;

fn vpcplan() -> Command {
    // Point the user config locations at a directory that holds no config
    let home = std::env::temp_dir().join("vpcplan-cli-tests-home");
    let mut cmd = Command::cargo_bin("vpcplan").unwrap();
    cmd.env_remove("VPCPLAN_CONFIG")
        .env("HOME", &home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("VPCPLAN_AVAILABILITY_ZONES")
        .env_remove("VPCPLAN_CIDR_BLOCK")
        .env_remove("VPCPLAN_SUBNET_MASK");
    cmd
}

#[test]
fn test_allocate_prints_block() {
    vpcplan()
        .args(["allocate", "10.0.0.0/16", "3"])
        .assert()
        .success()
        .stdout("10.0.3.0/28\n");
}

#[test]
fn test_allocate_with_mask_and_strategy() {
    vpcplan()
        .args(["allocate", "10.0.0.0/16", "2", "--mask", "20", "--strategy", "bitwise"])
        .assert()
        .success()
        .stdout("10.0.32.0/20\n");
}

#[test]
fn test_allocate_exhausted() {
    vpcplan()
        .args(["allocate", "10.0.0.0/16", "256"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Address space exhausted"))
        .stderr(predicate::str::contains("HINT"));
}

#[test]
fn test_allocate_invalid_cidr() {
    vpcplan()
        .args(["allocate", "10.0.0/16", "0"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid CIDR block"));
}

#[test]
fn test_allocate_json() {
    vpcplan()
        .args(["--output", "json", "allocate", "10.0.0.0/16", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"cidr_block\": \"10.0.1.0/28\""));
}

#[test]
fn test_plan_json() {
    let output = vpcplan()
        .args(["plan", "--zones", "a,b,c", "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["public_subnets"][0]["cidr_block"], "10.0.0.0/28");
    assert_eq!(doc["private_subnets"][2]["cidr_block"], "10.0.5.0/28");
}

#[test]
fn test_plan_human_lists_subnets() {
    vpcplan()
        .args(["plan", "--zones", "us-east-1a,us-east-1b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10.0.3.0/28"))
        .stdout(predicate::str::contains("us-east-1b"));
}

#[test]
fn test_plan_exhausted() {
    vpcplan()
        .args(["plan", "--zones", "a,b,c", "--cidr-block", "10.0.253.0/16"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Subnet allocation failed"));
}

#[test]
fn test_preview_exports_ids() {
    vpcplan()
        .args(["preview", "--zones", "a,b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vpc-00000001"));
}

#[test]
fn test_validate_ok() {
    vpcplan()
        .args(["validate", "--zones", "a,b,c"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK:"));
}

#[test]
fn test_validate_bad_cidr() {
    vpcplan()
        .args(["validate", "--cidr-block", "300.0.0.0/16"])
        .assert()
        .code(3);
}

#[test]
fn test_unreadable_config_is_fatal() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[vpc\n").unwrap();

    vpcplan()
        .args(["--config", path.to_str().unwrap(), "validate"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn test_missing_config_file_is_fatal() {
    vpcplan()
        .args(["--config", "/nonexistent/vpcplan.toml", "plan", "--zones", "a"])
        .assert()
        .code(3)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_plan_grouped_layout() {
    let output = vpcplan()
        .args(["plan", "--zones", "a,b", "--layout", "grouped", "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["public_subnets"][1]["cidr_block"], "10.0.1.16/28");
    assert_eq!(doc["private_subnets"][0]["cidr_block"], "10.0.2.0/28");
}
