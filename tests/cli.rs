use assert_cmd::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn renders_a_creole_file_to_stdout() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("page.wiki");
    fs::write(&src, "== Title ==\nSome **bold** text.\n").unwrap();

    let mut cmd = cargo_bin_cmd!("wiki2html");
    cmd.arg(&src);

    cmd.assert().success().stdout(
        predicate::str::contains("<h2>Title</h2>")
            .and(predicate::str::contains("<strong>bold</strong>")),
    );
}

#[test]
fn mediawiki_dialect_and_attachment_resolution() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("page.wiki");
    fs::write(
        &src,
        "'''bold''' link: [[attachment:files/report.pdf|report]]\n",
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("wiki2html");
    cmd.arg(&src).arg("--dialect").arg("mediawiki");

    cmd.assert().success().stdout(
        predicate::str::contains("<strong>bold</strong>")
            .and(predicate::str::contains("href=\"/attachments/files/report.pdf\"")),
    );
}

#[test]
fn toc_flag_inserts_a_table_of_contents() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("page.wiki");
    fs::write(&src, "{TOC}\n\n== Intro ==\nbody\n\n== Usage ==\nmore\n").unwrap();

    let mut cmd = cargo_bin_cmd!("wiki2html");
    cmd.arg(&src).arg("--toc");

    cmd.assert().success().stdout(
        predicate::str::contains(">1. Intro</a>")
            .and(predicate::str::contains(">2. Usage</a>"))
            .and(predicate::str::contains("<a name=\"intro\"></a>")),
    );
}

#[test]
fn bulk_mode_preserves_directory_structure_and_writes_outlines() {
    let dir = tempdir().unwrap();
    let src_root = dir.path().join("docs").join("wiki");
    let nested = src_root.join("guides");
    fs::create_dir_all(&nested).unwrap();
    fs::write(src_root.join("Index.wiki"), "== Home ==\n").unwrap();
    fs::write(nested.join("Setup.wiki"), "== Install ==\nsteps\n").unwrap();

    let mut cmd = cargo_bin_cmd!("wiki2html");
    cmd.current_dir(dir.path()).arg("--all").arg("--outline");

    cmd.assert().success();

    let out_root = dir.path().join("docs").join("html");
    let index = fs::read_to_string(out_root.join("Index.html")).unwrap();
    assert!(index.contains("<h2>Home</h2>"), "{index}");

    let setup = fs::read_to_string(out_root.join("guides").join("Setup.html")).unwrap();
    assert!(setup.contains("<h2>Install</h2>"), "{setup}");

    let outline = fs::read_to_string(out_root.join("guides").join("Setup.json")).unwrap();
    assert!(outline.contains("\"title\": \"Install\""), "{outline}");
    assert!(outline.contains("\"schema_version\": 1"), "{outline}");
}

#[test]
fn missing_input_is_an_error() {
    let mut cmd = cargo_bin_cmd!("wiki2html");
    cmd.assert().failure();
}

#[test]
fn unknown_dialect_is_rejected() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("page.wiki");
    fs::write(&src, "text").unwrap();

    let mut cmd = cargo_bin_cmd!("wiki2html");
    cmd.arg(&src).arg("--dialect").arg("textile");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown dialect"));
}
