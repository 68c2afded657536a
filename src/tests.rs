/*!
 * Tests for repomaster functionality across modules
 */

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use crate::config::Config;
use crate::diagnostics::{Diagnostic, MemorySink};
use crate::processor::Processor;
use crate::scanner::{CollectorOptions, FileCollector};
use crate::writer::MarkdownWriter;

// Helper function to create a project below a directory holding the rules file
fn setup_project() -> io::Result<(tempfile::TempDir, PathBuf)> {
    let temp_dir = tempdir()?;
    fs::write(temp_dir.path().join(".gitignore"), "*.hidden\n")?;

    let project = temp_dir.path().join("project");
    fs::create_dir_all(project.join("src"))?;
    fs::create_dir_all(project.join("node_modules").join("pkg"))?;

    let mut readme = File::create(project.join("README.md"))?;
    writeln!(readme, "# Project")?;
    fs::write(project.join("src").join("index.js"), "console.log('hi');\n")?;
    fs::write(project.join("src").join(".hidden"), "secret\n")?;
    fs::write(
        project.join("node_modules").join("pkg").join("index.js"),
        "module.exports = {};\n",
    )?;

    Ok((temp_dir, project))
}

fn relative_names(files: &[PathBuf], base: &Path) -> Vec<String> {
    files
        .iter()
        .map(|p| {
            p.strip_prefix(base)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

#[test]
fn test_rules_found_in_parent_directory() {
    let (_temp_dir, project) = setup_project().unwrap();
    let sink = MemorySink::new();
    let files = FileCollector::new(CollectorOptions::default(), &sink).collect(&[project.clone()]);

    let mut names = relative_names(files.paths(), &project);
    names.sort();
    assert_eq!(names, vec!["README.md", "src/index.js"]);
    assert!(sink.is_empty());
}

#[test]
fn test_end_to_end_report() {
    let (_temp_dir, project) = setup_project().unwrap();
    let config = Config {
        paths: vec![project.clone()],
        ..Config::default()
    };
    let sink = MemorySink::new();
    let report = Processor::new(&config, &sink).run().unwrap();

    assert_eq!(report.base_dir, project);
    assert_eq!(report.files.len(), 2);
    assert_eq!(report.tree, "src/\n  index.js\nREADME.md");
    assert_eq!(report.content.stats.text_files, 2);
    // "# Project\n" and "console.log('hi');\n" both count two lines
    assert_eq!(report.content.stats.total_lines, 4);

    let doc = MarkdownWriter::new(config).render(&report);
    assert!(doc.starts_with("# Repository Context\n\n## File System Location\n"));
    assert!(doc.contains("## Structure\n```\nsrc/\n  index.js\nREADME.md\n```\n"));
    assert!(doc.contains("\n### File: README.md\n\n```\n# Project\n\n```\n"));
    assert!(doc.contains("\n### File: src/index.js\n"));
    assert!(!doc.contains(".hidden"));
    assert!(!doc.contains("node_modules"));
    assert!(doc.ends_with("## Summary\n- Total files: 2\n- Total lines: 4\n"));
}

#[test]
fn test_disabled_rules_keep_everything() {
    let (_temp_dir, project) = setup_project().unwrap();
    let config = Config {
        paths: vec![project.clone()],
        use_gitignore: false,
        ..Config::default()
    };
    let sink = MemorySink::new();
    let report = Processor::new(&config, &sink).run().unwrap();

    let mut names = relative_names(report.files.paths(), &project);
    names.sort();
    assert_eq!(
        names,
        vec![
            "README.md",
            "node_modules/pkg/index.js",
            "src/.hidden",
            "src/index.js"
        ]
    );
}

#[test]
fn test_large_file_is_truncated() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("big.txt"), "a".repeat(20_000)).unwrap();

    let config = Config {
        paths: vec![dir.path().to_path_buf()],
        use_gitignore: false,
        ..Config::default()
    };
    let sink = MemorySink::new();
    let report = Processor::new(&config, &sink).run().unwrap();

    let section = &report.content.sections[0];
    assert!(section.rendered.truncated);
    assert_eq!(section.rendered.content.len(), 16 * 1024);
    assert_eq!(report.content.stats.truncated_files, 1);

    let doc = MarkdownWriter::new(config).render(&report);
    assert!(doc.contains("```\n\n> [truncated]\n"));
}

#[test]
fn test_binary_files_are_listed_but_not_rendered() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    fs::write(dir.path().join("image.bin"), [0u8, 1, 2, 3]).unwrap();
    fs::write(dir.path().join("notes.txt"), "notes").unwrap();

    let config = Config {
        paths: vec![dir.path().to_path_buf()],
        ..Config::default()
    };
    let sink = MemorySink::new();
    let report = Processor::new(&config, &sink).run().unwrap();

    assert_eq!(report.tree, "image.bin\nnotes.txt");
    assert_eq!(report.content.sections.len(), 1);
    assert_eq!(report.content.sections[0].label, "notes.txt");
    assert_eq!(report.content.stats.skipped_binary, 1);
}

#[test]
fn test_ignored_input_is_reported() {
    let (_temp_dir, project) = setup_project().unwrap();
    let hidden = project.join("src").join(".hidden");
    let config = Config {
        paths: vec![project.clone(), hidden.clone()],
        ..Config::default()
    };
    let sink = MemorySink::new();
    let report = Processor::new(&config, &sink).run().unwrap();

    assert_eq!(report.files.len(), 2);
    assert!(sink
        .events()
        .iter()
        .any(|d| matches!(d, Diagnostic::IgnoredInput { path } if path == &hidden)));
}

#[test]
fn test_line_numbers_in_report() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    fs::write(dir.path().join("a.txt"), "one\ntwo").unwrap();

    let config = Config {
        paths: vec![dir.path().to_path_buf()],
        line_numbers: true,
        ..Config::default()
    };
    let sink = MemorySink::new();
    let report = Processor::new(&config, &sink).run().unwrap();
    let doc = MarkdownWriter::new(config).render(&report);
    assert!(doc.contains("```\n1 | one\n2 | two\n```"));
}
