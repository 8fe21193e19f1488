//! Documentation records.
//!
//! One [`DocumentationRecord`] is produced per source file. A record either
//! carries the full module structure or, when the file could not be read or
//! parsed, a single `error` string in its place.

mod extractor;

pub use extractor::StructureExtractor;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized summary of one source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentationRecord {
    /// Path relative to the project root, `/`-separated
    pub path: String,

    /// Structure or error
    #[serde(flatten)]
    pub body: RecordBody,

    /// When this record was produced
    pub generated_at: DateTime<Utc>,
}

/// Exactly one of the structural fields or the error is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordBody {
    Structure(ModuleStructure),
    Failed { error: String },
}

impl DocumentationRecord {
    /// Record for a file that failed to read, decode or parse.
    pub fn failed(path: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            body: RecordBody::Failed {
                error: error.into(),
            },
            generated_at: Utc::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.body, RecordBody::Failed { .. })
    }

    pub fn structure(&self) -> Option<&ModuleStructure> {
        match &self.body {
            RecordBody::Structure(structure) => Some(structure),
            RecordBody::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.body {
            RecordBody::Failed { error } => Some(error),
            RecordBody::Structure(_) => None,
        }
    }
}

/// Declared structure of a module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleStructure {
    #[serde(default)]
    pub module_docstring: Option<String>,
    /// Every import anywhere in the file, in source order
    pub imports: Vec<ImportEntry>,
    /// Every class anywhere in the file, nested ones flattened
    pub classes: Vec<ClassRecord>,
    /// Top-level functions only
    pub functions: Vec<FunctionRecord>,
    pub constants: Vec<ConstantRecord>,
}

/// Import statement form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    /// `import a.b`
    Direct,
    /// `from a import b`
    FromModule,
}

/// One imported symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEntry {
    pub kind: ImportKind,
    /// Module path; relative imports keep their leading dots
    pub module: String,
    /// Name imported from the module (`*` for wildcard imports)
    pub imported_name: Option<String>,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub name: String,
    pub docstring: Option<String>,
    /// 1-based line of the `class` keyword
    pub line_number: usize,
    pub base_names: Vec<String>,
    pub decorator_names: Vec<String>,
    pub methods: Vec<FunctionRecord>,
    pub properties: Vec<PropertyRecord>,
}

/// A method decorated with `property`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub name: String,
    pub docstring: Option<String>,
    pub line_number: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    pub docstring: Option<String>,
    /// 1-based line of the `def` keyword
    pub line_number: usize,
    pub arguments: Vec<ArgumentRecord>,
    pub decorator_names: Vec<String>,
    pub is_async: bool,
    pub is_method: bool,
    pub return_type: Option<String>,
    /// Present only for methods
    #[serde(flatten, default)]
    pub method: Option<MethodFlags>,
}

/// Flags carried by methods only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodFlags {
    pub is_classmethod: bool,
    pub is_staticmethod: bool,
    /// Name starts with `_`
    pub is_private: bool,
}

/// One parameter of a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArgumentRecord {
    /// Positional-only or regular parameter
    Positional {
        name: String,
        type_annotation: Option<String>,
        has_default: bool,
        default_value_repr: Option<String>,
    },
    /// Parameter after `*` or `*args`
    KeywordOnly {
        name: String,
        type_annotation: Option<String>,
        has_default: bool,
        default_value_repr: Option<String>,
    },
    /// `*args`, name carries the `*` prefix
    VarPositional {
        name: String,
        type_annotation: Option<String>,
    },
    /// `**kwargs`, name carries the `**` prefix
    VarKeyword {
        name: String,
        type_annotation: Option<String>,
    },
}

impl ArgumentRecord {
    pub fn name(&self) -> &str {
        match self {
            Self::Positional { name, .. }
            | Self::KeywordOnly { name, .. }
            | Self::VarPositional { name, .. }
            | Self::VarKeyword { name, .. } => name,
        }
    }

    pub fn type_annotation(&self) -> Option<&str> {
        match self {
            Self::Positional {
                type_annotation, ..
            }
            | Self::KeywordOnly {
                type_annotation, ..
            }
            | Self::VarPositional {
                type_annotation, ..
            }
            | Self::VarKeyword {
                type_annotation, ..
            } => type_annotation.as_deref(),
        }
    }

    /// Variadic parameters never have a default.
    pub fn has_default(&self) -> bool {
        match self {
            Self::Positional { has_default, .. } | Self::KeywordOnly { has_default, .. } => {
                *has_default
            }
            Self::VarPositional { .. } | Self::VarKeyword { .. } => false,
        }
    }

    pub fn default_value_repr(&self) -> Option<&str> {
        match self {
            Self::Positional {
                default_value_repr, ..
            }
            | Self::KeywordOnly {
                default_value_repr, ..
            } => default_value_repr.as_deref(),
            Self::VarPositional { .. } | Self::VarKeyword { .. } => None,
        }
    }
}

/// Module-level upper-case assignment target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantRecord {
    pub name: String,
    pub line_number: usize,
    pub value_repr: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_failed_record_has_only_error_fields() {
        let record = DocumentationRecord::failed("pkg/bad.py", "invalid syntax at line 1, column 5");
        let value = serde_json::to_value(&record).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();

        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&"path".to_string()));
        assert!(keys.contains(&"error".to_string()));
        assert!(keys.contains(&"generated_at".to_string()));
        assert!(record.is_error());
        assert!(record.structure().is_none());
    }

    #[test]
    fn test_structure_record_has_all_fields() {
        let record = DocumentationRecord {
            path: "a.py".to_string(),
            body: RecordBody::Structure(ModuleStructure::default()),
            generated_at: Utc::now(),
        };
        let value = serde_json::to_value(&record).unwrap();

        for key in ["module_docstring", "imports", "classes", "functions", "constants"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert!(value.get("error").is_none());
        assert_eq!(value["module_docstring"], Value::Null);
    }

    #[test]
    fn test_record_deserializes_both_shapes() {
        let failed = DocumentationRecord::failed("x.py", "boom");
        let json = serde_json::to_string(&failed).unwrap();
        let back: DocumentationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.error(), Some("boom"));

        let ok = DocumentationRecord {
            path: "y.py".to_string(),
            body: RecordBody::Structure(ModuleStructure {
                module_docstring: Some("Doc.".to_string()),
                ..Default::default()
            }),
            generated_at: Utc::now(),
        };
        let json = serde_json::to_string(&ok).unwrap();
        let back: DocumentationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ok);
    }

    #[test]
    fn test_method_flags_flatten_into_function() {
        let function = FunctionRecord {
            name: "_helper".to_string(),
            docstring: None,
            line_number: 3,
            arguments: vec![],
            decorator_names: vec![],
            is_async: false,
            is_method: true,
            return_type: None,
            method: Some(MethodFlags {
                is_private: true,
                ..Default::default()
            }),
        };
        let value = serde_json::to_value(&function).unwrap();
        assert_eq!(value["is_private"], Value::Bool(true));
        assert_eq!(value["is_classmethod"], Value::Bool(false));

        let plain = FunctionRecord {
            is_method: false,
            method: None,
            ..function
        };
        let value = serde_json::to_value(&plain).unwrap();
        assert!(value.get("is_private").is_none());
    }

    #[test]
    fn test_argument_kinds_serialize_with_tag() {
        let positional = ArgumentRecord::Positional {
            name: "y".to_string(),
            type_annotation: None,
            has_default: true,
            default_value_repr: Some("1".to_string()),
        };
        let value = serde_json::to_value(&positional).unwrap();
        assert_eq!(value["kind"], "positional");
        assert_eq!(value["default_value_repr"], "1");

        let splat = ArgumentRecord::VarKeyword {
            name: "**kwargs".to_string(),
            type_annotation: Some("Any".to_string()),
        };
        let value = serde_json::to_value(&splat).unwrap();
        assert_eq!(value["kind"], "var_keyword");
        assert!(value.get("has_default").is_none());
        assert!(!splat.has_default());
    }

    #[test]
    fn test_import_kind_names() {
        assert_eq!(
            serde_json::to_value(ImportKind::FromModule).unwrap(),
            Value::String("from_module".to_string())
        );
        assert_eq!(
            serde_json::to_value(ImportKind::Direct).unwrap(),
            Value::String("direct".to_string())
        );
    }
}
