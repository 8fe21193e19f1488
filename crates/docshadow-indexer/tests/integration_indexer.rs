//! Integration tests for discovery, extraction and the structure map.

use std::path::{Path, PathBuf};
use tempfile::tempdir;

use docshadow_indexer::tree::record_path;
use docshadow_indexer::{
    IgnoreMatcher, RecordBody, Scanner, StructureBuilder, StructureEntry, StructureExtractor,
};

/// Helper to create a small Python project
fn create_test_project(base: &Path) -> PathBuf {
    let project = base.join("project");
    let pkg = project.join("app");
    std::fs::create_dir_all(pkg.join("models")).unwrap();
    std::fs::create_dir_all(project.join("build")).unwrap();
    std::fs::create_dir_all(project.join(".venv/lib")).unwrap();

    std::fs::write(
        project.join("main.py"),
        r#""""Entry point."""

from app.models import User

DEBUG = False


def main(argv=None):
    """Run the app."""
    return User("root")
"#,
    )
    .unwrap();

    std::fs::write(pkg.join("__init__.py"), "").unwrap();

    std::fs::write(
        pkg.join("models/__init__.py"),
        r#"from .user import User

__all__ = ["User"]
"#,
    )
    .unwrap();

    std::fs::write(
        pkg.join("models/user.py"),
        r#"import dataclasses


class User:
    """A user account."""

    def __init__(self, name: str, admin: bool = False):
        self.name = name
        self.admin = admin

    @property
    def display(self) -> str:
        return self.name.title()
"#,
    )
    .unwrap();

    std::fs::write(pkg.join("broken.py"), "def oops(:\n    pass\n").unwrap();
    std::fs::write(project.join("build/generated.py"), "X = 1\n").unwrap();
    std::fs::write(project.join("build/keep.py"), "Y = 2\n").unwrap();
    std::fs::write(project.join(".venv/lib/site.py"), "Z = 3\n").unwrap();
    std::fs::write(project.join("README.md"), "# project\n").unwrap();

    project
}

#[test]
fn test_scan_applies_ignore_rules() {
    let dir = tempdir().unwrap();
    let project = create_test_project(dir.path());

    let matcher = IgnoreMatcher::from_lines(&project, ["build/", "!build/keep.py"]).unwrap();
    let result = Scanner::new().scan(&project, &matcher).unwrap();

    assert_eq!(
        result.files,
        vec![
            "app/__init__.py",
            "app/broken.py",
            "app/models/__init__.py",
            "app/models/user.py",
            "build/keep.py",
            "main.py",
        ]
    );
    assert_eq!(result.ignored_count, 1);
}

#[test]
fn test_scan_without_ignore_file() {
    let dir = tempdir().unwrap();
    let project = create_test_project(dir.path());

    let matcher = IgnoreMatcher::load(&project, ".docignore");
    assert!(matcher.is_empty());

    let result = Scanner::new().scan(&project, &matcher).unwrap();
    assert!(result.files.contains(&"build/generated.py".to_string()));
    assert!(!result.files.iter().any(|f| f.starts_with(".venv")));
}

#[test]
fn test_extract_project_files() {
    let dir = tempdir().unwrap();
    let project = create_test_project(dir.path());
    let result = Scanner::new()
        .scan(&project, &IgnoreMatcher::empty())
        .unwrap();

    let extractor = StructureExtractor::new();
    let records: Vec<_> = result
        .files
        .iter()
        .map(|rel| extractor.extract_file(&project, rel))
        .collect();

    let broken = records.iter().find(|r| r.path == "app/broken.py").unwrap();
    assert!(broken.is_error());

    let user = records
        .iter()
        .find(|r| r.path == "app/models/user.py")
        .and_then(|r| r.structure())
        .unwrap();
    let class = &user.classes[0];
    assert_eq!(class.name, "User");
    assert_eq!(class.docstring.as_deref(), Some("A user account."));
    assert_eq!(class.methods.len(), 2);
    assert_eq!(class.properties.len(), 1);
    assert_eq!(class.properties[0].name, "display");
    assert_eq!(class.methods[1].return_type.as_deref(), Some("str"));

    let init = &class.methods[0];
    let names: Vec<_> = init.arguments.iter().map(|a| a.name()).collect();
    assert_eq!(names, vec!["name", "admin"]);
    assert_eq!(init.arguments[1].default_value_repr(), Some("False"));

    let main = records.iter().find(|r| r.path == "main.py").unwrap();
    match &main.body {
        RecordBody::Structure(s) => {
            assert_eq!(s.module_docstring.as_deref(), Some("Entry point."));
            assert_eq!(s.imports[0].module, "app.models");
            assert_eq!(s.constants[0].name, "DEBUG");
            assert_eq!(s.constants[0].value_repr, "False");
            assert_eq!(s.functions[0].name, "main");
            assert_eq!(s.functions[0].arguments[0].default_value_repr(), Some("None"));
        }
        RecordBody::Failed { error } => panic!("unexpected error: {error}"),
    }
}

#[test]
fn test_structure_map_for_scan() {
    let dir = tempdir().unwrap();
    let project = create_test_project(dir.path());
    let result = Scanner::new()
        .scan(&project, &IgnoreMatcher::empty())
        .unwrap();

    let structure = StructureBuilder::new().build(&result.files);
    assert_eq!(structure.file_count(), result.files.len());
    assert_eq!(
        structure.get("app/models/user.py"),
        Some(&StructureEntry::File(record_path("app/models/user.py")))
    );
}

#[test]
fn test_extraction_is_deterministic() {
    let dir = tempdir().unwrap();
    let project = create_test_project(dir.path());
    let extractor = StructureExtractor::new();

    let first = extractor.extract_file(&project, "app/models/user.py");
    let second = extractor.extract_file(&project, "app/models/user.py");

    assert_eq!(
        serde_json::to_string(&first.body).unwrap(),
        serde_json::to_string(&second.body).unwrap()
    );
}
