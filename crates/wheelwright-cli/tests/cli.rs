#![cfg(unix)]

mod common;

use common::{TestEnv, REPOSITORY};
use predicates::str::contains;
use std::fs;

const WHEEL: &str = "ganeti_webmgr-0.11.0-py2-none-any.whl";

#[test]
fn help_prints_usage_and_does_nothing() {
    let env = TestEnv::new();
    env.cmd()
        .arg("-h")
        .assert()
        .success()
        .stdout(contains("Build Ganeti Web Manager dependencies as wheel packages."))
        .stdout(contains("{distribution}/{version}/{architecture}"));

    assert!(env.calls().is_empty());
    assert!(!env.env_dir().exists());
    assert!(!env.gwm_dir().exists());
}

#[test]
fn version_exits_zero() {
    let env = TestEnv::new();
    env.cmd()
        .arg("-V")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_flag_exits_2() {
    let env = TestEnv::new();
    env.cmd().arg("-x").assert().code(2);

    assert!(env.calls().is_empty());
    assert!(!env.env_dir().exists());
}

#[test]
fn missing_option_argument_exits_2() {
    let env = TestEnv::new();
    // -w consumes no value when it is the last argument
    env.cmd().arg("-w").assert().code(2);
    assert!(env.calls().is_empty());
}

#[test]
fn missing_tool_exits_1_without_touching_env() {
    let env = TestEnv::new();
    let marker = env.write_file("venv/keep.txt", "stay");
    env.remove_tool("virtualenv");

    env.cmd()
        .assert()
        .code(1)
        .stderr(contains("Cannot find"))
        .stderr(contains("virtualenv"));

    assert!(env.calls().is_empty(), "no tool may run: {:?}", env.calls());
    assert!(marker.is_file(), "env dir must not be removed");
}

#[test]
fn full_build_produces_wheels_and_removes_env() {
    let env = TestEnv::new();
    env.write_file("venv/stale.txt", "old");

    env.cmd()
        .assert()
        .success()
        .stdout(contains("debian/bookworm/x86_64"));

    let wheel_dir = env.wheels_dir().join("debian").join("bookworm").join("x86_64");
    assert!(wheel_dir.join(WHEEL).is_file());
    assert!(!env.env_dir().exists());
    assert!(env.gwm_dir().join("setup.py").is_file());
    assert!(env.root.join("pip.log").is_file(), "pip log in invocation dir");

    let calls = env.calls();
    let order: Vec<&str> = calls
        .iter()
        .map(|c| c.split_whitespace().next().unwrap_or(""))
        .collect();
    assert_eq!(order, ["rm", "virtualenv", "pip", "git", "pip", "rm"]);
    assert!(calls[1].contains("--setuptools --no-site-packages"));
    assert_eq!(calls[2], "pip install --upgrade setuptools pip wheel");
    assert!(calls[3].starts_with(&format!("git clone {REPOSITORY} ")));
}

#[test]
fn existing_checkout_is_reused_unmodified() {
    let env = TestEnv::new();
    let setup = env.write_file("gwm/setup.py", "# local checkout\n");

    env.cmd().assert().success();

    assert!(!env.calls().iter().any(|c| c.starts_with("git clone")));
    assert_eq!(fs::read_to_string(setup).unwrap(), "# local checkout\n");
    assert!(env
        .wheels_dir()
        .join("debian/bookworm/x86_64")
        .join(WHEEL)
        .is_file());
}

#[test]
fn release_file_is_used_without_lsb_release() {
    let env = TestEnv::new();
    env.remove_tool("lsb_release");
    env.write_file("redhat-release", "CentOS release 6.4 (Final)\n");

    env.cmd().assert().success();

    assert!(env.wheels_dir().join("centos/6.4/x86_64").join(WHEEL).is_file());
}

#[test]
fn unknown_host_uses_sentinel() {
    let env = TestEnv::new();
    env.remove_tool("lsb_release");

    env.cmd().assert().success();

    assert!(env
        .wheels_dir()
        .join("unknown/unknown/x86_64")
        .join(WHEEL)
        .is_file());
}

#[test]
fn virtualenv_failure_exits_3() {
    let env = TestEnv::new();
    env.cmd()
        .env("FAKE_FAIL", "virtualenv")
        .assert()
        .code(3)
        .stderr(contains("Could not create virtual environment"))
        .stderr(contains(env.env_dir().display().to_string()));
}

#[test]
fn upgrade_failure_exits_4() {
    let env = TestEnv::new();
    env.cmd()
        .env("FAKE_FAIL", "pip-install")
        .assert()
        .code(4)
        .stderr(contains("Could not install setuptools, pip or wheel"));
}

#[test]
fn clone_failure_exits_5() {
    let env = TestEnv::new();
    env.cmd()
        .env("FAKE_FAIL", "git")
        .assert()
        .code(5)
        .stderr(contains(REPOSITORY));
}

#[test]
fn build_failure_exits_6() {
    let env = TestEnv::new();
    env.cmd()
        .env("FAKE_FAIL", "pip-wheel")
        .assert()
        .code(6)
        .stderr(contains("./pip.log"));
}

#[test]
fn cleanup_failure_returns_rm_status() {
    let env = TestEnv::new();
    env.cmd().env("FAKE_FAIL", "rm").assert().code(1);

    let wheel_dir = env.wheels_dir().join("debian/bookworm/x86_64");
    assert!(wheel_dir.join(WHEEL).is_file(), "build itself completed");
}
