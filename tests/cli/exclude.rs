use super::common::{TestContext, MANIFEST};
use assert_fs::prelude::*;
use predicates::prelude::*;

fn assert_module_intact(ctx: &TestContext, name: &str) {
    let module = ctx.temp.child("node_modules").child(name);
    module
        .child("index.js")
        .assert(format!("module.exports = '{}';\n", name));
    module
        .child("package.json")
        .assert(format!("{{\"name\":\"{}\"}}\n", name));
}

#[test]
fn test_excludes_installed_module_and_restores() {
    let ctx = TestContext::new();
    ctx.add_module("lodash");
    ctx.add_module("express");

    ctx.npm_exclude()
        .arg("lodash")
        .arg("chalk")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "The npm command was executed successfully.",
        ));

    assert_eq!(
        ctx.npm_log(),
        vec![
            "args: install --loglevel warn",
            "lodash: absent",
            "manifest: no-lodash",
        ]
    );
    assert_eq!(ctx.manifest(), MANIFEST);
    assert_module_intact(&ctx, "lodash");
    assert_module_intact(&ctx, "express");
    ctx.temp
        .child("staging/lodash")
        .assert(predicate::path::missing());
}

#[test]
fn test_failed_command_exit_code_and_restore() {
    let ctx = TestContext::new();
    ctx.add_module("lodash");

    ctx.npm_exclude()
        .env("FAKE_NPM_EXIT", "5")
        .arg("lodash")
        .assert()
        .code(5)
        .stderr(predicate::str::contains("failed with exit code 5"));

    assert_eq!(ctx.npm_log().len(), 3);
    assert_eq!(ctx.manifest(), MANIFEST);
    assert_module_intact(&ctx, "lodash");
}

#[test]
fn test_interrupt_while_npm_runs_still_restores() {
    let ctx = TestContext::new();
    ctx.add_module("lodash");

    ctx.npm_exclude()
        .env("FAKE_NPM_INTERRUPT", "1")
        .arg("lodash")
        .assert()
        .success();

    assert_eq!(ctx.npm_log()[1], "lodash: absent");
    assert_eq!(ctx.manifest(), MANIFEST);
    assert_module_intact(&ctx, "lodash");
    ctx.temp
        .child("staging/lodash")
        .assert(predicate::path::missing());
}

#[test]
fn test_command_changes_to_manifest_are_overwritten() {
    let ctx = TestContext::new();
    ctx.add_module("lodash");

    ctx.npm_exclude()
        .env("FAKE_NPM_REWRITE", "{\"name\":\"rewritten\"}")
        .arg("lodash")
        .assert()
        .success();

    assert_eq!(ctx.manifest(), MANIFEST);
}

#[test]
fn test_update_verbose_and_extra_args() {
    let ctx = TestContext::new();
    ctx.add_module("lodash");

    ctx.npm_exclude()
        .arg("--update")
        .arg("-v")
        .arg("lodash")
        .arg("--")
        .arg("--no-audit")
        .assert()
        .success();

    assert_eq!(ctx.npm_log()[0], "args: update --no-audit");
}

#[test]
fn test_production_install() {
    let ctx = TestContext::new();

    ctx.npm_exclude()
        .arg("--production")
        .arg("chalk")
        .assert()
        .success();

    assert_eq!(
        ctx.npm_log()[0],
        "args: install --loglevel warn --production"
    );
    // Nothing was installed, but the manifest was still edited for the run
    assert_eq!(ctx.npm_log()[2], "manifest: lodash");
}

#[test]
fn test_production_conflicts_with_update() {
    let ctx = TestContext::new();

    ctx.npm_exclude()
        .arg("--production")
        .arg("--update")
        .arg("lodash")
        .assert()
        .failure()
        .code(2);

    assert!(ctx.npm_log().is_empty());
}

#[test]
fn test_modules_are_required() {
    let ctx = TestContext::new();

    ctx.npm_exclude()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("MODULE"));

    assert!(ctx.npm_log().is_empty());
}

#[test]
fn test_missing_manifest_touches_nothing() {
    let ctx = TestContext::new();
    ctx.add_module("lodash");
    std::fs::remove_file(ctx.temp.child("package.json").path()).unwrap();

    ctx.npm_exclude()
        .arg("lodash")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Manifest not found"));

    assert!(ctx.npm_log().is_empty());
    assert_module_intact(&ctx, "lodash");
    ctx.temp.child("staging").assert(predicate::path::missing());
}

#[test]
fn test_occupied_staging_slot_is_reported() {
    let ctx = TestContext::new();
    ctx.add_module("lodash");
    ctx.temp
        .child("staging/lodash/leftover.txt")
        .write_str("from an earlier run")
        .unwrap();

    ctx.npm_exclude()
        .arg("lodash")
        .assert()
        .success()
        .stderr(predicate::str::contains("could not be excluded"));

    assert_eq!(ctx.npm_log()[1], "lodash: present");
    assert_eq!(ctx.manifest(), MANIFEST);
    assert_module_intact(&ctx, "lodash");
    ctx.temp
        .child("staging/lodash/leftover.txt")
        .assert("from an earlier run");
}

#[test]
fn test_npm_binary_from_environment() {
    let ctx = TestContext::new();
    ctx.add_module("lodash");

    ctx.npm_exclude_bare()
        .env("NPM_EXCLUDE_NPM", &ctx.fake_npm)
        .arg("lodash")
        .assert()
        .success();

    assert_eq!(ctx.npm_log()[1], "lodash: absent");
    assert_module_intact(&ctx, "lodash");
}

#[test]
fn test_running_twice_leaves_same_state() {
    let ctx = TestContext::new();
    ctx.add_module("lodash");
    ctx.add_module("chalk");

    ctx.npm_exclude().arg("lodash").arg("chalk").assert().success();
    ctx.npm_exclude().arg("lodash").arg("chalk").assert().success();

    assert_eq!(ctx.npm_log().len(), 6);
    assert_eq!(ctx.manifest(), MANIFEST);
    assert_module_intact(&ctx, "lodash");
    assert_module_intact(&ctx, "chalk");
}
