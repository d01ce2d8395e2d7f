// Copyright (c) Contributors to the anypkg project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;
use tempfile::TempDir;

use super::*;

#[rstest]
fn test_directives_in_file_order() {
    let manifest = Manifest::parse(
        "import ./a/.package\n\nfile util.go\n   \nsum deadbeef\nimport github.com/acme/lib -> vendor/lib\n",
    );

    let directives: Vec<Directive> = manifest
        .directives()
        .collect::<Result<_>>()
        .expect("Should parse manifest");

    let kinds: Vec<DirectiveKind> = directives.iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![
            DirectiveKind::Import,
            DirectiveKind::File,
            DirectiveKind::Sum,
            DirectiveKind::Import,
        ]
    );
    let lines: Vec<usize> = directives.iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![1, 3, 5, 6]);
}

#[rstest]
fn test_empty_manifest() {
    let manifest = Manifest::parse("");
    assert_eq!(manifest.directives().count(), 0);
    assert_eq!(Manifest::parse("\n  \n\t\n").directives().count(), 0);
}

#[rstest]
fn test_unknown_directive_reports_line_and_stops() {
    let manifest = Manifest::parse("file a.txt\n\nrequire foo\nfile b.txt\n");
    let mut directives = manifest.directives();

    assert!(directives.next().unwrap().is_ok());
    match directives.next() {
        Some(Err(Error::ManifestParse { line, reason })) => {
            assert_eq!(line, 3);
            assert!(reason.contains("require"));
        }
        other => panic!("Expected ManifestParse, got: {:?}", other),
    }
    assert!(directives.next().is_none(), "iteration stops after an error");
}

#[rstest]
fn test_keywords_are_case_sensitive() {
    let manifest = Manifest::parse("FILE a.txt\n");
    assert!(matches!(
        manifest.directives().next(),
        Some(Err(Error::ManifestParse { line: 1, .. }))
    ));
}

#[rstest]
fn test_crlf_lines() {
    let manifest = Manifest::parse("file a.txt\r\nfile b.txt\r\n");
    let files: Vec<String> = manifest
        .files()
        .map(|f| f.map(|f| f.path))
        .collect::<Result<_>>()
        .unwrap();
    assert_eq!(files, vec!["a.txt", "b.txt"]);
}

#[rstest]
fn test_imports_and_files_filter_by_kind() {
    let manifest = Manifest::parse("file a.txt\nimport ./x/.package -> x\nsum abc\nfile b/c.txt\n");

    let imports: Vec<ImportDirective> = manifest.imports().collect::<Result<_>>().unwrap();
    assert_eq!(imports.len(), 1);
    assert_eq!(imports[0].location, "./x/.package");
    assert_eq!(imports[0].outdir, "x");

    let files: Vec<FileDirective> = manifest.files().collect::<Result<_>>().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[1].path, "b/c.txt");
    assert_eq!(files[1].line, 4);
}

#[rstest]
fn test_from_bytes_is_lossy() {
    let manifest = Manifest::from_bytes(b"file a.txt\nfile \xff.txt\n");
    assert_eq!(manifest.line_count(), 2);
    assert_eq!(manifest.files().count(), 2);
}

#[rstest]
fn test_load_from_disk() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(crate::MANIFEST_FILENAME);
    std::fs::write(&path, "file a.txt\n").unwrap();

    let manifest = Manifest::load(&path).expect("Should load manifest");
    assert_eq!(manifest.files().count(), 1);

    let missing = Manifest::load(tmp.path().join("missing"));
    assert!(matches!(missing, Err(Error::ReadFailed { .. })));
}
