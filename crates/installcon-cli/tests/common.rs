#![allow(dead_code)]

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use assert_cmd::{assert::Assert, cargo::cargo_bin_cmd, Command};
use serde_json::Value;
use tempfile::TempDir;

/// Conda stand-in: answers `search`, `info -e`, `create` and `remove`, and
/// keeps environments under `$ROOT/envs`. Created environments get a
/// `demo-cli` program that prints help and echoes its arguments.
const FAKE_CONDA: &str = r#"#!/bin/sh
ROOT='@ROOT@'
case "$1" in
  search)
    if [ "$2" != "demo" ]; then
      echo "PackagesNotFoundError: The following packages are not available from current channels: $2"
      exit 1
    fi
    if [ "$3" = "--info" ]; then
      echo '{"demo": [{"url": "@URL@", "version": "1.0", "build": "0"}]}'
    else
      echo "demo  1.0  0"
    fi
    exit 0
    ;;
  info)
    if [ -n "$FAKE_CONDA_INFO_FAILS" ]; then
      echo 'CondaHTTPError: HTTP 000 CONNECTION FAILED'
      exit 1
    fi
    printf '{"envs": ["%s"' "$ROOT"
    for dir in "$ROOT"/envs/*; do
      if [ -d "$dir" ]; then
        printf ', "%s"' "$dir"
      fi
    done
    printf ']}\n'
    exit 0
    ;;
  create)
    env_dir="$ROOT/envs/$3"
    mkdir -p "$env_dir/bin"
    cat > "$env_dir/bin/demo-cli" <<'EOS'
#!/bin/sh
if [ "$1" = "--help" ]; then
  printf 'usage: demo-cli [-h] ARGS\n\nDemo command line tool.\n'
  exit 0
fi
echo "demo-cli ran with $*"
EOS
    chmod 755 "$env_dir/bin/demo-cli"
    echo "created $3"
    exit 0
    ;;
  remove)
    env_dir="$ROOT/envs/$3"
    if [ ! -d "$env_dir" ]; then
      echo "EnvironmentLocationNotFound: Not a conda environment: $env_dir"
      exit 1
    fi
    rm -rf "$env_dir"
    exit 0
    ;;
esac
echo "unsupported fake conda command: $*" >&2
exit 2
"#;

/// Temp home with a wrapper directory, an index directory and a fake conda.
pub struct Sandbox {
    _temp: TempDir,
    pub home: PathBuf,
    pub bin: PathBuf,
    pub index_dir: PathBuf,
    pub conda_root: PathBuf,
    pub conda: PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        let temp = tempfile::Builder::new()
            .prefix("installcon-cli")
            .tempdir()
            .expect("tempdir");
        let home = temp.path().join("home");
        let bin = home.join("bin");
        let index_dir = home.join(".installcon");
        let conda_root = temp.path().join("conda");
        fs::create_dir_all(&bin).expect("bin dir");
        fs::create_dir_all(conda_root.join("envs")).expect("conda root");

        let archive = temp.path().join("demo-1.0-0.tar.bz2");
        fs::write(
            &archive,
            demo_archive(&["info/index.json", "bin/demo-cli", "python-scripts/demo-gui"]),
        )
        .expect("archive");
        let url = url::Url::from_file_path(&archive).expect("file url");

        let conda = temp.path().join("conda-bin").join("conda");
        fs::create_dir_all(conda.parent().expect("conda dir")).expect("conda dir");
        let script = FAKE_CONDA
            .replace("@ROOT@", &conda_root.display().to_string())
            .replace("@URL@", url.as_str());
        fs::write(&conda, script).expect("fake conda");
        make_executable(&conda);

        Self {
            _temp: temp,
            home,
            bin,
            index_dir,
            conda_root,
            conda,
        }
    }

    pub fn path_var(&self) -> String {
        format!("{}:/usr/bin:/bin", self.bin.display())
    }

    pub fn command(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("installcon");
        cmd.env("HOME", &self.home)
            .env("PATH", self.path_var())
            .env("INSTALLCON_HOME", &self.index_dir)
            .env("INSTALLCON_CONDA", &self.conda)
            .env("NO_COLOR", "1")
            .env_remove("INSTALLCON_BIN_DIR")
            .env_remove("INSTALLCON_ACTIVATION")
            .env_remove("CONDA_PREFIX")
            .env_remove("CONDA_PREFIX_1")
            .env_remove("CONDA_EXE")
            .env_remove("FAKE_CONDA_INFO_FAILS");
        cmd
    }

    pub fn index_file(&self) -> PathBuf {
        self.index_dir.join("index.json")
    }

    pub fn read_index(&self) -> Value {
        let contents = fs::read_to_string(self.index_file()).expect("index file");
        serde_json::from_str(&contents).expect("index json")
    }
}

pub fn demo_archive(entries: &[&str]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for entry in entries {
        let body = b"#!/bin/sh\n";
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o755);
        builder
            .append_data(&mut header, entry, &body[..])
            .expect("append entry");
    }
    let tar_bytes = builder.into_inner().expect("finish tar");
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::best());
    encoder.write_all(&tar_bytes).expect("compress");
    encoder.finish().expect("finish bzip2")
}

#[cfg(unix)]
pub fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod");
}

#[cfg(not(unix))]
pub fn make_executable(_path: &Path) {}

pub fn parse_json(assert: &Assert) -> Value {
    serde_json::from_slice(&assert.get_output().stdout).expect("valid json")
}

pub fn stdout_of(assert: &Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
}
