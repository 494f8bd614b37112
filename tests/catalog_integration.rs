use serde_json::Value;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(name: &str) -> std::path::PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "gopkg_finder_it_{}_{}_{}",
        std::process::id(),
        nanos,
        name
    ))
}

fn write_file(path: &std::path::Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn run(args: &[&str], envs: &[(&str, &str)]) -> anyhow::Result<std::process::Output> {
    let bin = env!("CARGO_BIN_EXE_gopkg-finder");
    let mut cmd = Command::new(bin);
    cmd.args(args);
    for (k, v) in envs {
        cmd.env(k, v);
    }
    Ok(cmd.output()?)
}

fn run_json(args: &[&str], envs: &[(&str, &str)]) -> anyhow::Result<Value> {
    let out = run(args, envs)?;
    if !out.status.success() {
        return Err(anyhow::anyhow!(
            "command failed: status={:?}, stderr={}",
            out.status.code(),
            String::from_utf8_lossy(&out.stderr)
        ));
    }
    Ok(serde_json::from_slice(&out.stdout)?)
}

fn package_by_import_path<'a>(result: &'a Value, import_path: &str) -> Option<&'a Value> {
    result["packages"]
        .as_array()?
        .iter()
        .find(|p| p["import_path"] == Value::String(import_path.to_string()))
}

#[test]
fn list_applies_filter_rules_and_reports_packages() -> anyhow::Result<()> {
    let base = temp_dir("list_rules");
    let root = base.join("src");
    write_file(&root.join("lib/a.go"), "package lib\n")?;
    write_file(&root.join("lib/a_test.go"), "package lib\n")?;
    write_file(&root.join("cmd/main.go"), "package main\n")?;
    write_file(&root.join(".hidden/x.go"), "package hidden\n")?;
    write_file(&root.join("_build/gen.go"), "package gen\n")?;
    write_file(&root.join("vendor/testdata/y.go"), "package y\n")?;
    write_file(&root.join("util/strings.go"), "package strutil\n")?;
    write_file(&root.join("util/inner/deep.go"), "package deep\n")?;
    write_file(&root.join("top.go"), "package top\n")?;
    write_file(&root.join("README.md"), "not go\n")?;

    let result = run_json(
        &["--src-dir", root.to_string_lossy().as_ref(), "list"],
        &[],
    )?;

    assert_eq!(result["package_count"], Value::from(4));
    assert_eq!(result["scanned_roots"].as_array().map(|r| r.len()), Some(1));

    let top = package_by_import_path(&result, "").unwrap();
    assert_eq!(top["name"], Value::String("top".to_string()));

    let lib = package_by_import_path(&result, "lib").unwrap();
    assert_eq!(lib["name"], Value::String("lib".to_string()));
    assert_eq!(
        lib["dir"],
        Value::String(root.join("lib").to_string_lossy().into_owned())
    );

    // Declared name wins over the directory basename.
    let util = package_by_import_path(&result, "util").unwrap();
    assert_eq!(util["name"], Value::String("strutil".to_string()));

    // Nested import paths always use forward slashes.
    let deep = package_by_import_path(&result, "util/inner").unwrap();
    assert_eq!(deep["name"], Value::String("deep".to_string()));

    for excluded in ["hidden", "gen", "y", "main"] {
        assert!(
            !result["packages"]
                .as_array()
                .unwrap()
                .iter()
                .any(|p| p["name"] == Value::String(excluded.to_string())),
            "package {excluded} should have been excluded"
        );
    }

    let _ = std::fs::remove_dir_all(base);
    Ok(())
}

#[test]
fn list_keeps_single_record_for_conflicting_directory() -> anyhow::Result<()> {
    let base = temp_dir("list_conflict");
    let root = base.join("src");
    write_file(&root.join("mixed/a.go"), "package foo\n")?;
    write_file(&root.join("mixed/b.go"), "package bar\n")?;

    let result = run_json(
        &["--src-dir", root.to_string_lossy().as_ref(), "list"],
        &[],
    )?;

    assert_eq!(result["package_count"], Value::from(1));
    let mixed = package_by_import_path(&result, "mixed").unwrap();
    let name = mixed["name"].as_str().unwrap();
    assert!(name == "foo" || name == "bar");

    let _ = std::fs::remove_dir_all(base);
    Ok(())
}

#[test]
fn list_prefix_filter_and_text_format() -> anyhow::Result<()> {
    let base = temp_dir("list_prefix");
    let root = base.join("src");
    write_file(&root.join("net/http/h.go"), "package http\n")?;
    write_file(&root.join("net/url/u.go"), "package url\n")?;
    write_file(&root.join("os/o.go"), "package os\n")?;

    let filtered = run_json(
        &[
            "--src-dir",
            root.to_string_lossy().as_ref(),
            "list",
            "--prefix",
            "net/",
        ],
        &[],
    )?;
    assert_eq!(filtered["package_count"], Value::from(2));
    assert!(package_by_import_path(&filtered, "os").is_none());

    let text = run(
        &[
            "--src-dir",
            root.to_string_lossy().as_ref(),
            "list",
            "-f",
            "text",
        ],
        &[],
    )?;
    assert!(text.status.success());
    let stdout = String::from_utf8_lossy(&text.stdout);
    assert!(stdout.contains("packages: 3"));
    assert!(stdout.contains("import_path: net/http, name: http"));

    let _ = std::fs::remove_dir_all(base);
    Ok(())
}

#[test]
fn list_writes_output_file() -> anyhow::Result<()> {
    let base = temp_dir("list_output");
    let root = base.join("src");
    write_file(&root.join("lib/a.go"), "package lib\n")?;
    let out_path = base.join("out/catalog.json");

    let out = run(
        &[
            "--src-dir",
            root.to_string_lossy().as_ref(),
            "list",
            "-o",
            out_path.to_string_lossy().as_ref(),
        ],
        &[],
    )?;
    assert!(out.status.success());

    let result: Value = serde_json::from_slice(&std::fs::read(&out_path)?)?;
    assert_eq!(result["package_count"], Value::from(1));

    let _ = std::fs::remove_dir_all(base);
    Ok(())
}

#[test]
fn roots_resolves_goroot_then_gopath() -> anyhow::Result<()> {
    let base = temp_dir("roots");
    let goroot = base.join("goroot");
    let gopath_a = base.join("wsa");
    let gopath_b = base.join("wsb"); // no src, dropped
    std::fs::create_dir_all(goroot.join("src"))?;
    std::fs::create_dir_all(gopath_a.join("src"))?;
    std::fs::create_dir_all(&gopath_b)?;

    let gopath = std::env::join_paths([&gopath_a, &gopath_b])?;
    let out = run(
        &[
            "--goroot",
            goroot.to_string_lossy().as_ref(),
            "--gopath",
            gopath.to_string_lossy().as_ref(),
            "roots",
        ],
        &[],
    )?;
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            goroot.join("src").to_string_lossy().into_owned(),
            gopath_a.join("src").to_string_lossy().into_owned(),
        ]
    );

    let _ = std::fs::remove_dir_all(base);
    Ok(())
}

#[test]
fn list_reads_gopath_from_environment() -> anyhow::Result<()> {
    let base = temp_dir("env_gopath");
    let workspace = base.join("ws");
    write_file(&workspace.join("src/toolkit/t.go"), "package toolkit\n")?;
    let empty_goroot = base.join("goroot"); // no src, keeps host GOROOT out

    let result = run_json(
        &[
            "--goroot",
            empty_goroot.to_string_lossy().as_ref(),
            "list",
        ],
        &[("GOPATH", workspace.to_string_lossy().as_ref())],
    )?;

    assert_eq!(result["package_count"], Value::from(1));
    let toolkit = package_by_import_path(&result, "toolkit").unwrap();
    assert_eq!(toolkit["name"], Value::String("toolkit".to_string()));

    let _ = std::fs::remove_dir_all(base);
    Ok(())
}

#[test]
fn list_fails_on_unreadable_source_root() -> anyhow::Result<()> {
    let base = temp_dir("bad_root");
    let missing = base.join("definitely-missing");

    let out = run(
        &["--src-dir", missing.to_string_lossy().as_ref(), "list"],
        &[],
    )?;
    assert!(!out.status.success());

    let _ = std::fs::remove_dir_all(base);
    Ok(())
}
