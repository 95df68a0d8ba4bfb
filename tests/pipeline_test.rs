use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use grammar_render::config::RenderConfig;
use grammar_render::docs::{DirectoryDocs, NoDocs};
use grammar_render::testing::{assert_in_order, Testable};
use grammar_render::{convert, Error, Format};
use tempfile::TempDir;

const PARSER: &str = "parser grammar KotlinParser {
    // SECTION: general

    kotlinFile : statement* EOF ;
    statement : Identifier ASSIGN Identifier NL ;
}
";

const LEXER: &str = "lexer grammar KotlinLexer {
    ASSIGN : \"=\" ;
    NL : \"\\n\" ;
    Identifier : Letter+ ;
    fragment Letter : [\"a-z\"] ;
}
";

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn fixture() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let parser = write(dir.path(), "KotlinParser.notation", PARSER);
    let lexer = write(dir.path(), "KotlinLexer.notation", LEXER);
    (dir, parser, lexer)
}

// --- Test 1: Text rendering from files ---
#[test]
fn test_convert_text() {
    let (_dir, parser, lexer) = fixture();

    let text = convert(Format::Text, &parser, &lexer, &RenderConfig::default(), &NoDocs)
        .test()
        .assert_success();

    assert_eq!(
        text,
        concat!(
            "kotlinFile\n: statement* EOF\n;\n\n",
            "statement\n: Identifier = Identifier\n;\n\n",
            "Identifier\n: Letter+\n;\n\n",
            "[helper] Letter\n: [a-z]\n;\n\n",
        )
    );
}

// --- Test 2: Structured rendering with a config file and a docs directory ---
#[test]
fn test_convert_xml_with_config_and_docs() {
    let (dir, parser, lexer) = fixture();
    let config_path = write(
        dir.path(),
        "render.toml",
        "start_rules = [\"kotlinFile\"]\nexcluded_rules = [\"NL\"]\n",
    );
    let docs_dir = dir.path().join("docs");
    fs::create_dir_all(docs_dir.join("general")).unwrap();
    write(&docs_dir, "description.md", "Kotlin grammar.");
    write(&docs_dir.join("general"), "statement.md", "One statement.");

    let config = RenderConfig::load_from_path(&config_path).unwrap();
    let xml = convert(
        Format::Xml,
        &parser,
        &lexer,
        &config,
        &DirectoryDocs::new(&docs_dir),
    )
    .test()
    .assert_success();

    assert_in_order(
        &xml,
        &[
            "<set file-name=\"description\">",
            "Kotlin grammar.",
            "<set file-name=\"general\">",
            "<annotation>start</annotation>",
            "<declaration name=\"kotlinFile\"",
            "One statement.",
            "<declaration name=\"statement\">",
            "<declaration>kotlinFile</declaration>",
            "<declaration name=\"Identifier\">",
            "<declaration>statement</declaration>",
            "<annotation>helper</annotation>",
            "<declaration name=\"Letter\">",
            "<declaration>Identifier</declaration>",
        ],
    );
    assert!(!xml.contains("name=\"ASSIGN\""));
    assert!(!xml.contains("name=\"NL\""));
}

// --- Test 3: Unreadable input names the file ---
#[test]
fn test_missing_file() {
    let (dir, parser, _lexer) = fixture();
    let missing = dir.path().join("Missing.notation");

    let err = convert(Format::Text, &parser, &missing, &RenderConfig::default(), &NoDocs)
        .test()
        .assert_failure();

    match err {
        Error::Read { path, .. } => assert_eq!(path, missing),
        other => panic!("expected a read error, got {:?}", other),
    }
}

// --- Test 4: Files in the wrong role are rejected ---
#[test]
fn test_swapped_files() {
    let (_dir, parser, lexer) = fixture();

    convert(Format::Text, &lexer, &parser, &RenderConfig::default(), &NoDocs)
        .test()
        .assert_failure_contains("expected a parser grammar");
}

// --- Test 5: Malformed notation ---
#[test]
fn test_malformed_notation() {
    let (dir, _parser, lexer) = fixture();
    let broken = write(dir.path(), "Broken.notation", "parser grammar P { r : a ");

    let err = convert(Format::Xml, &broken, &lexer, &RenderConfig::default(), &NoDocs)
        .test()
        .assert_failure();
    assert!(matches!(err, Error::Notation(_)), "got {:?}", err);
}

// --- Test 6: Command line writes the requested format ---
#[test]
fn test_cli_writes_output_file() {
    let (dir, parser, lexer) = fixture();
    let output = dir.path().join("grammar.txt");

    let status = Command::new(env!("CARGO_BIN_EXE_grammar-render"))
        .arg("--text")
        .arg("--parser")
        .arg(&parser)
        .arg("--lexer")
        .arg(&lexer)
        .arg("-o")
        .arg(&output)
        .status()
        .unwrap();

    assert!(status.success());
    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("kotlinFile\n: statement* EOF\n;\n\n"));
}

// --- Test 7: Command line requires exactly one format ---
#[test]
fn test_cli_rejects_conflicting_formats() {
    let (_dir, parser, lexer) = fixture();

    let output = Command::new(env!("CARGO_BIN_EXE_grammar-render"))
        .args(["--text", "--xml", "--parser"])
        .arg(&parser)
        .arg("--lexer")
        .arg(&lexer)
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

// --- Test 8: Command line reports missing input ---
#[test]
fn test_cli_reports_errors() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("Nope.notation");

    let output = Command::new(env!("CARGO_BIN_EXE_grammar-render"))
        .arg("--xml")
        .arg("--parser")
        .arg(&missing)
        .arg("--lexer")
        .arg(&missing)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read grammar file"), "{}", stderr);
}
