use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const BIN: &str = env!("CARGO_BIN_EXE_catalog-filter");

fn packages_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (rel, name) in [("io/reader.json", "reader"), ("viz/plotter.json", "plotter")] {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let container = rel.trim_end_matches(".json");
        fs::write(
            path,
            format!(
                r#"{{
                    "name": "{name}",
                    "version": "1.0",
                    "query": "org.acme.{name}:1.0-*",
                    "container": "{container}",
                    "maintainer": {{ "name": "Ada", "email": "ada@acme.org" }},
                    "tags": ["1.0"]
                }}"#
            ),
        )
        .unwrap();
    }
    dir
}

fn command(dir: &Path) -> Command {
    let mut cmd = Command::new(BIN);
    cmd.arg("--config").arg(dir.join("none.toml"));
    cmd.stdout(Stdio::piped()).stderr(Stdio::null());
    cmd
}

fn wait_with_deadline(child: &mut Child) -> ExitStatus {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if let Some(status) = child.try_wait().unwrap() {
            return status;
        }
        if Instant::now() > deadline {
            child.kill().unwrap();
            panic!("catalog-filter did not exit after its input closed");
        }
        thread::sleep(Duration::from_millis(20));
    }
}

/// Runs an interactive session fed `input`, returning its stdout.
fn session(dir: &Path, args: &[&str], input: &[u8]) -> String {
    let mut child = command(dir).args(args).stdin(Stdio::piped()).spawn().unwrap();
    {
        let mut stdin = child.stdin.take().unwrap();
        stdin.write_all(input).unwrap();
    }
    let status = wait_with_deadline(&mut child);
    assert!(status.success(), "exited with {status}");

    let mut out = String::new();
    child.stdout.take().unwrap().read_to_string(&mut out).unwrap();
    out
}

#[test]
fn exits_when_stdin_is_empty() {
    let dir = packages_dir();
    let mut child = command(dir.path())
        .arg("--packages-dir")
        .arg(dir.path())
        .stdin(Stdio::null())
        .spawn()
        .unwrap();
    assert!(wait_with_deadline(&mut child).success());
}

#[test]
fn invalid_utf8_does_not_end_the_session() {
    let dir = packages_dir();
    let path = dir.path().to_str().unwrap();
    let out = session(
        dir.path(),
        &["--packages-dir", path],
        b"search \xff\xfe\nsearch plotter\n",
    );
    assert!(out.contains("1 package found with search"), "{out}");
    assert!(out.contains("plotter"));
}

#[test]
fn built_index_serves_the_same_catalog() {
    let dir = packages_dir();
    let index = dir.path().join("dist/index.json");
    let status = command(dir.path())
        .arg("--packages-dir")
        .arg(dir.path())
        .arg("--build-index")
        .arg(&index)
        .args(["--owner", "acme", "--repo", "catalog"])
        .status()
        .unwrap();
    assert!(status.success());

    let out = session(
        dir.path(),
        &["--index", index.to_str().unwrap()],
        b"category io\nquit\n",
    );
    assert!(out.contains("1 package found with filter 'io'"), "{out}");
    assert!(out.contains("reader"));
}

#[test]
fn strict_build_with_invalid_package_exits_with_two() {
    let dir = packages_dir();
    fs::write(dir.path().join("io/broken.json"), "{ not json").unwrap();
    let index = dir.path().join("index.json");
    let status = command(dir.path())
        .arg("--packages-dir")
        .arg(dir.path())
        .arg("--build-index")
        .arg(&index)
        .arg("--strict")
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(2));
    assert!(!index.exists());
}
