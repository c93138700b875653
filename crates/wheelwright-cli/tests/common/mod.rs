#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const REPOSITORY: &str = "git://git.example.org/ganeti_webmgr";

/// Scratch workspace with fake `rm`, `virtualenv`, `git`, `lsb_release`
/// and `uname` scripts. Every fake appends its command line to `calls.log`.
/// Setting `FAKE_FAIL=<tool>` (or `pip-install` / `pip-wheel`) makes that
/// step exit non-zero.
pub struct TestEnv {
    tmp: TempDir,
    pub root: PathBuf,
    pub bin: PathBuf,
    pub calls: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        let bin = root.join("bin");
        fs::create_dir_all(&bin).expect("create bin dir");
        let calls = root.join("calls.log");

        let env = Self {
            tmp,
            root,
            bin,
            calls,
        };
        env.install_fakes();
        env
    }

    pub fn env_dir(&self) -> PathBuf {
        self.root.join("venv")
    }

    pub fn gwm_dir(&self) -> PathBuf {
        self.root.join("gwm")
    }

    pub fn wheels_dir(&self) -> PathBuf {
        self.root.join("wheels")
    }

    pub fn tool(&self, name: &str) -> PathBuf {
        self.bin.join(name)
    }

    /// Build command with every path pointed into the scratch workspace.
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("build-wheels");
        cmd.current_dir(&self.root)
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .arg("--rm-bin")
            .arg(self.tool("rm"))
            .arg("--virtualenv-bin")
            .arg(self.tool("virtualenv"))
            .arg("--git-bin")
            .arg(self.tool("git"))
            .arg("--lsb-release-bin")
            .arg(self.tool("lsb_release"))
            .arg("--uname-bin")
            .arg(self.tool("uname"))
            .arg("--release-file")
            .arg(self.root.join("redhat-release"))
            .args(["--repository", REPOSITORY])
            .arg("-e")
            .arg(self.env_dir())
            .arg("-g")
            .arg(self.gwm_dir())
            .arg("-w")
            .arg(self.wheels_dir());
        cmd
    }

    /// Command lines recorded by the fakes, one per call.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(&self.calls)
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn remove_tool(&self, name: &str) {
        fs::remove_file(self.tool(name)).expect("remove fake tool");
    }

    pub fn write_file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, content).expect("write file");
        path
    }

    fn install_fakes(&self) {
        let log = self.calls.display().to_string();

        self.script(
            "rm",
            r##"echo "rm $*" >> "@LOG@"
[ "$FAKE_FAIL" = "rm" ] && exit 1
rm "$@""##,
            &log,
        );

        self.script(
            "virtualenv",
            r##"echo "virtualenv $*" >> "@LOG@"
[ "$FAKE_FAIL" = "virtualenv" ] && exit 1
for last in "$@"; do :; done
mkdir -p "$last/bin"
cat > "$last/bin/pip" <<'PIP'
#!/bin/sh
echo "pip $*" >> "@LOG@"
case "$1" in
  install) [ "$FAKE_FAIL" = "pip-install" ] && exit 1 ;;
  wheel)
    [ "$FAKE_FAIL" = "pip-wheel" ] && exit 1
    for arg in "$@"; do
      case "$arg" in
        --wheel-dir=*) dir="${arg#--wheel-dir=}" ;;
        --log=*) log="${arg#--log=}" ;;
      esac
    done
    mkdir -p "$dir"
    touch "$dir/ganeti_webmgr-0.11.0-py2-none-any.whl"
    echo "built" > "$log"
    ;;
esac
exit 0
PIP
chmod +x "$last/bin/pip""##,
            &log,
        );

        self.script(
            "git",
            r##"echo "git $*" >> "@LOG@"
case "$1" in
  clone)
    [ "$FAKE_FAIL" = "git" ] && exit 128
    mkdir -p "$3"
    echo "# cloned" > "$3/setup.py"
    ;;
  rev-parse) exit 0 ;;
esac"##,
            &log,
        );

        self.script(
            "lsb_release",
            r##"case "$2" in
  -i) echo Debian ;;
  -c) echo Bookworm ;;
  -r) echo 12.4 ;;
esac"##,
            &log,
        );

        self.script("uname", "echo x86_64", &log);
    }

    fn script(&self, name: &str, body: &str, log: &str) {
        write_executable(
            &self.tool(name),
            &format!("#!/bin/sh\n{}\n", body.replace("@LOG@", log)),
        );
    }
}

fn write_executable(path: &Path, content: &str) {
    fs::write(path, content).expect("write script");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod script");
}
