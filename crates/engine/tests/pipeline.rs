//! End-to-end pipeline tests over a real git repository

#![allow(clippy::unwrap_used, clippy::panic)]

use hookgate_config::{PipelineConfig, SAMPLE_CONFIG};
use hookgate_engine::git::{FileProvider, GitIndex};
use hookgate_engine::{
    FileFilter, FileSet, FindingKind, HookOutcome, HookRegistry, PipelineRunner, RelPath, RunReport,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const BUNDLED_HOOKS: &str = r"
repos:
  - repo: https://github.com/pre-commit/pre-commit-hooks
    rev: v4.3.0
    hooks:
      - id: mixed-line-ending
        args: [--fix=lf]
      - id: trailing-whitespace
      - id: end-of-file-fixer
      - id: check-json
      - id: pretty-format-json
        args: [--autofix, --indent=4, --no-sort-keys]
      - id: check-toml
      - id: check-yaml
      - id: check-case-conflict
      - id: check-merge-conflict
";

struct Repo {
    temp: TempDir,
    git: git2::Repository,
}

impl Repo {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let git = git2::Repository::init(temp.path()).unwrap();
        Self { temp, git }
    }

    fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Write and stage a file
    fn stage(&self, path: &str, content: &[u8]) {
        let full = self.root().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();

        let mut index = self.git.index().unwrap();
        index.add_path(Path::new(path)).unwrap();
        index.write().unwrap();
    }

    fn read(&self, path: &str) -> Vec<u8> {
        fs::read(self.root().join(path)).unwrap()
    }

    /// Run the pipeline over the staged files, the way `hookgate run` does
    fn run(&self, yaml: &str) -> RunReport {
        let config = PipelineConfig::from_yaml_str(yaml).unwrap();
        let hooks = HookRegistry::new().resolve(&config, self.root()).unwrap();

        let provider = GitIndex::open(self.root()).unwrap();
        let mut files = FileSet::load(self.root(), provider.staged().unwrap()).unwrap();

        PipelineRunner::builder(&hooks)
            .fail_fast(config.fail_fast)
            .global_filter(FileFilter::global(&config).unwrap())
            .known_paths(provider.tracked().unwrap())
            .build()
            .run(&mut files)
            .unwrap()
    }
}

fn outcome_of(report: &RunReport, hook_id: &str) -> HookOutcome {
    report
        .results
        .iter()
        .find(|r| r.hook_id == hook_id)
        .unwrap()
        .outcome
}

#[test]
fn test_clean_commit_passes() {
    let repo = Repo::new();
    repo.stage("README.md", b"# Project\n");
    repo.stage("info.json", b"{\n    \"name\": \"x\",\n    \"author\": \"y\"\n}\n");
    repo.stage("pyproject.toml", b"[tool.black]\nline-length = 99\n");
    repo.stage(".pre-commit-config.yaml", BUNDLED_HOOKS.as_bytes());

    let report = repo.run(BUNDLED_HOOKS);
    assert!(report.passed(), "{report:#?}");
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn test_nothing_staged_passes() {
    let repo = Repo::new();
    let report = repo.run(BUNDLED_HOOKS);
    assert!(report.passed());
    assert!(report.results.iter().all(|r| r.files_checked == 0));
}

#[test]
fn test_line_endings_are_lf_and_stable() {
    let repo = Repo::new();
    repo.stage("notes.txt", b"one\r\ntwo\rthree\n");

    let first = repo.run(BUNDLED_HOOKS);
    assert_eq!(outcome_of(&first, "mixed-line-ending"), HookOutcome::Fixed);
    let content = repo.read("notes.txt");
    assert!(!content.contains(&b'\r'));
    assert_eq!(content, b"one\ntwo\nthree\n");

    // Re-staging the fixed file makes the next run pass
    repo.stage("notes.txt", &content);
    let second = repo.run(BUNDLED_HOOKS);
    assert!(second.passed(), "{second:#?}");
}

#[test]
fn test_end_of_file_has_exactly_one_newline() {
    let cases: Vec<(&str, &[u8], &[u8])> = vec![
        ("missing.txt", b"text", b"text\n"),
        ("extra.txt", b"text\n\n\n", b"text\n"),
        ("correct.txt", b"text\n", b"text\n"),
    ];

    let repo = Repo::new();
    for (path, content, _) in &cases {
        repo.stage(path, content);
    }

    let report = repo.run(BUNDLED_HOOKS);
    assert_eq!(outcome_of(&report, "end-of-file-fixer"), HookOutcome::Fixed);
    for (path, _, expected) in cases {
        assert_eq!(repo.read(path), expected, "{path}");
    }
}

#[test]
fn test_pretty_json_keeps_data_and_order() {
    let repo = Repo::new();
    let input = br#"{"zeta": 1, "alpha": {"nested": [1, 2, {"b": null, "a": true}]}, "mid": "s"}"#;
    repo.stage("data.json", input);

    let report = repo.run(BUNDLED_HOOKS);
    assert_eq!(outcome_of(&report, "pretty-format-json"), HookOutcome::Fixed);

    let output = repo.read("data.json");
    let before: serde_json::Value = serde_json::from_slice(input).unwrap();
    let after: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(before, after);

    let text = String::from_utf8(output).unwrap();
    assert!(text.starts_with("{\n    \"zeta\": 1,\n    \"alpha\": {\n        \"nested\""));
    assert!(text.find("\"zeta\"").unwrap() < text.find("\"mid\"").unwrap());
    assert!(text.find("\"b\"").unwrap() < text.find("\"a\": true").unwrap());
    assert!(text.ends_with("}\n"));
}

#[test]
fn test_merge_markers_fail_and_block_fixers() {
    let repo = Repo::new();
    let content: &[u8] = b"x = 1   \n<<<<<<< HEAD\ny = 2\n=======\ny = 3\n>>>>>>> feature\n\n\n";
    repo.stage("module.txt", content);

    let report = repo.run(BUNDLED_HOOKS);
    assert_eq!(outcome_of(&report, "check-merge-conflict"), HookOutcome::Fail);
    assert_eq!(report.most_severe(), Some(FindingKind::NameConflict));
    assert_eq!(repo.read("module.txt"), content);
    assert_eq!(report.exit_code(), 1);
}

#[cfg(target_os = "linux")]
#[test]
fn test_case_conflict_with_tracked_file() {
    let repo = Repo::new();
    repo.stage("docs/Guide.md", b"guide\n");
    // Commit the first spelling so only the second is staged
    {
        let mut index = repo.git.index().unwrap();
        let tree = repo.git.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = git2::Signature::now("Test", "test@example.com").unwrap();
        repo.git
            .commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
            .unwrap();
    }
    repo.stage("docs/guide.md", b"other\n");

    let report = repo.run(BUNDLED_HOOKS);
    assert_eq!(outcome_of(&report, "check-case-conflict"), HookOutcome::Fail);
    let result = report
        .results
        .iter()
        .find(|r| r.hook_id == "check-case-conflict")
        .unwrap();
    assert_eq!(result.files_checked, 1);
    assert_eq!(
        result.findings[0].message,
        "Case-insensitivity conflict found: docs/guide.md"
    );
}

#[test]
fn test_syntax_errors_are_reported_and_left_untouched() {
    let cases: Vec<(&str, &[u8], &str)> = vec![
        ("bad.json", b"{\"a\": 1,}  \n", "check-json"),
        ("bad.toml", b"key = \n\n\n", "check-toml"),
        ("bad.yaml", b"a: [1, 2  \n", "check-yaml"),
    ];

    for (path, content, hook) in cases {
        let repo = Repo::new();
        repo.stage(path, content);

        let report = repo.run(BUNDLED_HOOKS);
        assert_eq!(outcome_of(&report, hook), HookOutcome::Fail, "{path}");
        assert_eq!(report.most_severe(), Some(FindingKind::SyntaxError), "{path}");
        assert!(report.modified_files().is_empty(), "{path}");
        assert_eq!(repo.read(path), content, "{path}");
    }
}

#[test]
fn test_hook_filters() {
    let yaml = r"
exclude: ^third_party/
repos:
  - repo: https://github.com/pre-commit/pre-commit-hooks
    rev: v4.3.0
    hooks:
      - id: trailing-whitespace
        files: \.md$
";
    let repo = Repo::new();
    repo.stage("doc.md", b"a \n");
    repo.stage("code.txt", b"b \n");
    repo.stage("third_party/doc.md", b"c \n");

    let report = repo.run(yaml);
    let result = &report.results[0];
    assert_eq!(result.files_checked, 1);
    assert_eq!(
        result.modified_files.iter().collect::<Vec<_>>(),
        vec![&RelPath::from_slash("doc.md").unwrap()]
    );
    assert_eq!(repo.read("code.txt"), b"b \n");
    assert_eq!(repo.read("third_party/doc.md"), b"c \n");
}

#[test]
fn test_sample_config_builtins_resolve() {
    let config = PipelineConfig::from_yaml_str(SAMPLE_CONFIG).unwrap();
    let registry = HookRegistry::new();
    for (source, decl) in config.declarations() {
        if source.kind() == hookgate_config::SourceKind::Builtin {
            assert!(registry.builtin(&decl.id).is_some(), "{}", decl.id);
        }
    }
}
