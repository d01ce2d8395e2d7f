// Copyright (c) Contributors to the anypkg project.
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use rstest::rstest;
use tempfile::TempDir;

use super::*;
use crate::fixtures::{MemoryTransport, tmpdir};
use crate::transport::LocalTransport;
use crate::{Error, MANIFEST_FILENAME};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn options(tmp: &TempDir) -> FetchOptions {
    let staging = tmp.path().join(".staging");
    std::fs::create_dir_all(&staging).unwrap();
    FetchOptions {
        root: tmp.path().join("project"),
        staging_dir: Some(staging),
        ..Default::default()
    }
}

/// A project with two local packages that both ship `a.txt`.
fn local_project(tmp: &TempDir, second_a: &str) -> FetchOptions {
    let options = options(tmp);
    let root = &options.root;
    write(root, "pkgs/one/.package", "file a.txt\nfile util.go\n");
    write(root, "pkgs/one/a.txt", "shared");
    write(root, "pkgs/one/util.go", "package one\n");
    write(root, "pkgs/two/.package", "file a.txt\n");
    write(root, "pkgs/two/a.txt", second_a);
    options
}

#[rstest]
fn test_plan_forge_shorthand(tmpdir: TempDir) {
    let options = options(&tmpdir);
    write(
        &options.root,
        MANIFEST_FILENAME,
        "import github.com/acme/lib -> vendor/lib\n",
    );

    let plans = plan_manifest(&options).unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(
        plans[0].url.as_str(),
        "https://raw.githubusercontent.com/acme/lib/master/.package"
    );
    assert_eq!(plans[0].outdir, PathBuf::from("vendor/lib"));
}

#[rstest]
fn test_import_local_packages(tmpdir: TempDir) {
    let options = local_project(&tmpdir, "shared");
    let root = options.root.clone();
    write(
        &root,
        MANIFEST_FILENAME,
        "import ./pkgs/one/.package -> vendor\n\nimport ./pkgs/two/.package -> vendor\n",
    );

    let transport = LocalTransport::new(&root);
    let report = run_manifest(Mode::Fetch, &options, &transport).unwrap();

    assert_eq!(report.imports.len(), 2);
    assert_eq!(
        std::fs::read_to_string(root.join("vendor/util.go")).unwrap(),
        "package one\n"
    );
    assert_eq!(
        std::fs::read_to_string(root.join("vendor/a.txt")).unwrap(),
        "shared"
    );
    assert_eq!(report.written.len(), 3);
}

#[rstest]
#[case("-> vendor/lib/", "vendor/lib")]
#[case("-> vendor/./lib", "vendor/lib")]
#[case("", ".")]
fn test_plan_normalizes_outdir(tmpdir: TempDir, #[case] arrow: &str, #[case] expected: &str) {
    let options = options(&tmpdir);
    write(
        &options.root,
        MANIFEST_FILENAME,
        &format!("import github.com/acme/lib {arrow}\n"),
    );

    let plans = plan_manifest(&options).unwrap();
    assert_eq!(plans[0].outdir, PathBuf::from(expected));
}

#[rstest]
fn test_relative_nested_cycle_between_local_packages(tmpdir: TempDir) {
    let options = options(&tmpdir);
    let root = options.root.clone();
    write(&root, "pkgs/a/.package", "file a.txt\nimport ../b/.package\n");
    write(&root, "pkgs/a/a.txt", "a");
    write(&root, "pkgs/b/.package", "file b.txt\nimport ../a/.package\n");
    write(&root, "pkgs/b/b.txt", "b");
    write(&root, MANIFEST_FILENAME, "import ./pkgs/a/.package -> third_party\n");

    let transport = LocalTransport::new(&root);
    let report = run_manifest(Mode::Fetch, &options, &transport).unwrap();

    let manifests = report.fetched.iter().filter(|url| url.is_manifest()).count();
    assert_eq!(manifests, 2);
    assert_eq!(
        std::fs::read_to_string(root.join("third_party/b.txt")).unwrap(),
        "b"
    );
}

#[rstest]
fn test_conflicting_local_packages(tmpdir: TempDir) {
    let options = local_project(&tmpdir, "different");
    let root = options.root.clone();
    write(
        &root,
        MANIFEST_FILENAME,
        "import ./pkgs/one/.package -> vendor/lib\nimport ./pkgs/two/.package -> vendor/lib\n",
    );

    let transport = LocalTransport::new(&root);
    match run_manifest(Mode::Fetch, &options, &transport) {
        Err(Error::ChecksumConflict { path, .. }) => {
            assert!(path.ends_with("vendor/lib/a.txt"), "got {path:?}");
        }
        other => panic!("Expected ChecksumConflict, got: {:?}", other),
    }
    assert_eq!(
        std::fs::read_to_string(root.join("vendor/lib/a.txt")).unwrap(),
        "shared"
    );
}

#[rstest]
fn test_escaping_outdir_stops_before_fetching(tmpdir: TempDir) {
    let options = options(&tmpdir);
    write(
        &options.root,
        MANIFEST_FILENAME,
        "import https://x.example/a.txt -> ok\nimport https://x.example/.package -> ../escape\nimport https://x.example/b.txt\n",
    );
    let transport = MemoryTransport::default().with("https://x.example/a.txt", "a");

    let result = run_manifest(Mode::Fetch, &options, &transport);
    assert!(matches!(result, Err(Error::InvalidOutputDir(dir)) if dir == "../escape"));
    assert_eq!(transport.calls(), vec!["https://x.example/a.txt".to_string()]);
}

#[rstest]
fn test_invalid_location_is_fatal(tmpdir: TempDir) {
    let options = options(&tmpdir);
    write(&options.root, MANIFEST_FILENAME, "import acme/lib\n");
    let transport = MemoryTransport::default();

    let result = run_manifest(Mode::Fetch, &options, &transport);
    assert!(matches!(result, Err(Error::InvalidLocation(_))));
    assert!(transport.calls().is_empty());
}

#[rstest]
fn test_unknown_root_directive(tmpdir: TempDir) {
    let options = options(&tmpdir);
    write(
        &options.root,
        MANIFEST_FILENAME,
        "import https://x.example/a.txt\nvendor everything\n",
    );
    let transport = MemoryTransport::default().with("https://x.example/a.txt", "a");

    let result = run_manifest(Mode::Fetch, &options, &transport);
    assert!(matches!(result, Err(Error::ManifestParse { line: 2, .. })));
}

#[rstest]
fn test_clean_after_import(tmpdir: TempDir) {
    let options = local_project(&tmpdir, "shared");
    let root = options.root.clone();
    write(
        &root,
        MANIFEST_FILENAME,
        "import ./pkgs/one/.package -> vendor\n",
    );
    let transport = LocalTransport::new(&root);

    run_manifest(Mode::Fetch, &options, &transport).unwrap();
    let report = run_manifest(Mode::Clean, &options, &transport).unwrap();

    assert_eq!(report.mode, Mode::Clean);
    assert_eq!(report.written.len(), 2);
    for rel in ["vendor/a.txt", "vendor/util.go"] {
        assert_eq!(std::fs::metadata(root.join(rel)).unwrap().len(), 0);
    }
    let fetched: Vec<&str> = report.fetched.iter().map(SourceUrl::as_str).collect();
    assert_eq!(fetched, vec!["file://./pkgs/one/.package"]);
}

#[rstest]
fn test_root_file_and_sum_directives_are_noops(tmpdir: TempDir) {
    let options = options(&tmpdir);
    write(
        &options.root,
        MANIFEST_FILENAME,
        "file README.md\nsum abc123\nsum def456\n",
    );
    let transport = MemoryTransport::default();

    let report = run_manifest(Mode::Fetch, &options, &transport).unwrap();
    assert!(report.imports.is_empty());
    assert!(transport.calls().is_empty());
    assert_eq!(count_sums(&options).unwrap(), 2);
}

#[rstest]
fn test_missing_root_manifest(tmpdir: TempDir) {
    let options = options(&tmpdir);
    let transport = MemoryTransport::default();
    assert!(matches!(
        run_manifest(Mode::Fetch, &options, &transport),
        Err(Error::ReadFailed { .. })
    ));
}
