//! Common utilities for CLI tests

use assert_cmd::Command;
use assert_fs::{prelude::*, TempDir};
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

pub const MANIFEST: &str = r#"{
  "name": "demo",
  "version": "1.0.0",
  "dependencies": {
    "lodash": "^4.17.21",
    "chalk": "^5.0.0",
    "express": "^4.18.0"
  }
}
"#;

/// Records its arguments and the project state, then exits with $FAKE_NPM_EXIT.
/// With $FAKE_NPM_INTERRUPT set it sends SIGINT to npm-exclude first.
const FAKE_NPM: &str = r#"#!/bin/sh
{
  echo "args: $*"
  if [ -d node_modules/lodash ]; then echo "lodash: present"; else echo "lodash: absent"; fi
  if grep -q '"lodash"' package.json; then echo "manifest: lodash"; else echo "manifest: no-lodash"; fi
} >> npm-calls.log
if [ -n "$FAKE_NPM_INTERRUPT" ]; then
  kill -INT $PPID
  sleep 1
fi
if [ -n "$FAKE_NPM_REWRITE" ]; then
  echo "$FAKE_NPM_REWRITE" > package.json
fi
exit ${FAKE_NPM_EXIT:-0}
"#;

/// Test context that provides an isolated project for each test
pub struct TestContext {
    pub temp: TempDir,
    pub fake_npm: PathBuf,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Create a project with package.json and a fake npm
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        temp.child("config").create_dir_all().unwrap();
        temp.child("package.json").write_str(MANIFEST).unwrap();

        let fake_npm = temp.child("bin").child("fake-npm");
        fake_npm.write_str(FAKE_NPM).unwrap();
        let mut perms = std::fs::metadata(fake_npm.path()).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(fake_npm.path(), perms).unwrap();

        Self {
            fake_npm: fake_npm.to_path_buf(),
            temp,
        }
    }

    /// Command for running npm-exclude inside the project, using the fake npm
    pub fn npm_exclude(&self) -> Command {
        let mut cmd = self.npm_exclude_bare();
        cmd.arg("--npm").arg(&self.fake_npm);
        cmd
    }

    /// Like [`TestContext::npm_exclude`] but without choosing an npm binary
    pub fn npm_exclude_bare(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("npm-exclude").unwrap();
        cmd.current_dir(&self.temp);

        // Keep the user's config out of the way
        cmd.env("XDG_CONFIG_HOME", self.temp.child("config").path());
        cmd.env("HOME", self.temp.path());
        cmd.env_remove("NPM_EXCLUDE_NPM");
        cmd.env_remove("FAKE_NPM_EXIT");
        cmd.env_remove("FAKE_NPM_REWRITE");
        cmd.env_remove("FAKE_NPM_INTERRUPT");

        cmd.arg("--tmp-dir").arg(self.staging());
        cmd
    }

    pub fn staging(&self) -> PathBuf {
        self.temp.child("staging").to_path_buf()
    }

    /// Install a module directory under node_modules
    pub fn add_module(&self, name: &str) {
        let module = self.temp.child("node_modules").child(name);
        module
            .child("index.js")
            .write_str(&format!("module.exports = '{}';\n", name))
            .unwrap();
        module
            .child("package.json")
            .write_str(&format!("{{\"name\":\"{}\"}}\n", name))
            .unwrap();
    }

    /// Lines the fake npm logged, across all invocations
    pub fn npm_log(&self) -> Vec<String> {
        std::fs::read_to_string(self.temp.child("npm-calls.log").path())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn manifest(&self) -> String {
        std::fs::read_to_string(self.temp.child("package.json").path()).unwrap()
    }
}
