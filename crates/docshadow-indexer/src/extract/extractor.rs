//! Reduction of a parsed module into a [`DocumentationRecord`].

use super::{
    ArgumentRecord, ClassRecord, ConstantRecord, DocumentationRecord, FunctionRecord,
    ImportEntry, ImportKind, MethodFlags, ModuleStructure, PropertyRecord, RecordBody,
};
use crate::error::IndexerError;
use crate::syntax::{
    clean_doc, parse_module, walk_stmts, ClassDef, Expr, FunctionDef, Literal, Module,
    Parameters, Stmt, Target,
};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::debug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Turns Python source into documentation records.
///
/// Extraction never fails: read, decode and parse failures become error
/// records carrying the file path they belong to.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructureExtractor;

impl StructureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Read `root/rel` and extract it. `rel` is the `/`-separated record path.
    pub fn extract_file(&self, root: &Path, rel: &str) -> DocumentationRecord {
        match std::fs::read(root.join(rel)) {
            Ok(bytes) => self.extract_bytes(rel, &bytes),
            Err(e) => DocumentationRecord::failed(rel, format!("failed to read file: {e}")),
        }
    }

    /// Decode raw file content (a leading BOM is dropped) and extract it.
    pub fn extract_bytes(&self, path: &str, bytes: &[u8]) -> DocumentationRecord {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        match std::str::from_utf8(bytes) {
            Ok(content) => self.extract(path, content),
            Err(e) => DocumentationRecord::failed(path, format!("file is not valid UTF-8: {e}")),
        }
    }

    /// Extract the structure of `content`, recorded under `path`.
    pub fn extract(&self, path: &str, content: &str) -> DocumentationRecord {
        match self.structure(path, content) {
            Ok(structure) => DocumentationRecord {
                path: path.to_string(),
                body: RecordBody::Structure(structure),
                generated_at: Utc::now(),
            },
            Err(IndexerError::Parse { message, .. }) => {
                debug!(path = %path, error = %message, "Parse failed");
                DocumentationRecord::failed(path, message)
            }
            Err(e) => DocumentationRecord::failed(path, e.to_string()),
        }
    }

    /// Parse `content` and return its module structure.
    pub fn structure(&self, path: &str, content: &str) -> Result<ModuleStructure, IndexerError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let module = parse_module(content).map_err(|e| IndexerError::Parse {
            path: PathBuf::from(path),
            message: e.to_string(),
        })?;

        let structure = module_structure(&module);
        debug!(
            path = %path,
            imports = structure.imports.len(),
            classes = structure.classes.len(),
            functions = structure.functions.len(),
            "Extracted structure"
        );
        Ok(structure)
    }
}

fn module_structure(module: &Module) -> ModuleStructure {
    let mut imports = Vec::new();
    let mut classes = Vec::new();

    walk_stmts(&module.body, &mut |stmt| match stmt {
        Stmt::Import(aliases) => {
            imports.extend(aliases.iter().map(|alias| ImportEntry {
                kind: ImportKind::Direct,
                module: alias.name.clone(),
                imported_name: None,
                alias: alias.asname.clone(),
            }));
        }
        Stmt::ImportFrom { module, names } => {
            imports.extend(names.iter().map(|alias| ImportEntry {
                kind: ImportKind::FromModule,
                module: module.clone(),
                imported_name: Some(alias.name.clone()),
                alias: alias.asname.clone(),
            }));
        }
        Stmt::ClassDef(class) => classes.push(class_record(class)),
        _ => {}
    });

    let functions = module
        .body
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::FunctionDef(func) => Some(function_record(func, false)),
            _ => None,
        })
        .collect();

    let mut constants = Vec::new();
    for stmt in &module.body {
        if let Stmt::Assign(assign) = stmt {
            for target in &assign.targets {
                collect_constants(target, &assign.value, assign.line, &mut constants);
            }
        }
    }

    ModuleStructure {
        module_docstring: docstring(&module.body),
        imports,
        classes,
        functions,
        constants,
    }
}

/// First statement of a body, when it is a plain string literal.
fn docstring(body: &[Stmt]) -> Option<String> {
    match body.first() {
        Some(Stmt::Expr(Expr::Constant(Literal::Str(doc)))) => Some(clean_doc(doc)),
        _ => None,
    }
}

fn class_record(class: &ClassDef) -> ClassRecord {
    let mut methods = Vec::new();
    let mut properties = Vec::new();

    for stmt in &class.body {
        if let Stmt::FunctionDef(func) = stmt {
            let method = function_record(func, true);
            if func.decorators.iter().any(is_property) {
                properties.push(PropertyRecord {
                    name: method.name.clone(),
                    docstring: method.docstring.clone(),
                    line_number: method.line_number,
                });
            }
            methods.push(method);
        }
    }

    ClassRecord {
        name: class.name.clone(),
        docstring: docstring(&class.body),
        line_number: class.line,
        base_names: class.bases.iter().map(resolve_name).collect(),
        decorator_names: class.decorators.iter().map(resolve_name).collect(),
        methods,
        properties,
    }
}

fn function_record(func: &FunctionDef, is_method: bool) -> FunctionRecord {
    let decorator_names: Vec<String> = func.decorators.iter().map(resolve_name).collect();

    let method = is_method.then(|| MethodFlags {
        is_classmethod: decorator_names.iter().any(|d| d == "classmethod"),
        is_staticmethod: decorator_names.iter().any(|d| d == "staticmethod"),
        is_private: func.name.starts_with('_'),
    });
    let has_receiver = method.is_some_and(|flags| !flags.is_staticmethod);

    FunctionRecord {
        name: func.name.clone(),
        docstring: docstring(&func.body),
        line_number: func.line,
        arguments: arguments(&func.params, has_receiver),
        decorator_names,
        is_async: func.is_async,
        is_method,
        return_type: func.returns.as_ref().map(resolve_name),
        method,
    }
}

/// `property` by bare name or as the last segment of a dotted access.
fn is_property(decorator: &Expr) -> bool {
    match decorator {
        Expr::Name(name) => name == "property",
        Expr::Attribute { attr, .. } => attr == "property",
        _ => false,
    }
}

/// Argument records in declaration order.
///
/// Defaults align with the positional parameters from the right. The
/// receiver is dropped after pairing so it never shifts the alignment.
fn arguments(params: &Parameters, has_receiver: bool) -> Vec<ArgumentRecord> {
    let first_default = params.positional.len().saturating_sub(params.defaults.len());
    let mut args = Vec::new();

    for (i, param) in params.positional.iter().enumerate() {
        if has_receiver && i == 0 {
            continue;
        }
        let default = i
            .checked_sub(first_default)
            .and_then(|d| params.defaults.get(d));
        args.push(ArgumentRecord::Positional {
            name: param.name.clone(),
            type_annotation: param.annotation.as_ref().map(resolve_name),
            has_default: default.is_some(),
            default_value_repr: default.map(value_repr),
        });
    }

    if let Some(vararg) = &params.vararg {
        args.push(ArgumentRecord::VarPositional {
            name: format!("*{}", vararg.name),
            type_annotation: vararg.annotation.as_ref().map(resolve_name),
        });
    }

    for (param, default) in &params.kwonly {
        args.push(ArgumentRecord::KeywordOnly {
            name: param.name.clone(),
            type_annotation: param.annotation.as_ref().map(resolve_name),
            has_default: default.is_some(),
            default_value_repr: default.as_ref().map(value_repr),
        });
    }

    if let Some(kwarg) = &params.kwarg {
        args.push(ArgumentRecord::VarKeyword {
            name: format!("**{}", kwarg.name),
            type_annotation: kwarg.annotation.as_ref().map(resolve_name),
        });
    }

    args
}

fn collect_constants(target: &Target, value: &Expr, line: usize, out: &mut Vec<ConstantRecord>) {
    match target {
        Target::Name(name) if is_constant_name(name) => out.push(ConstantRecord {
            name: name.clone(),
            line_number: line,
            value_repr: value_repr(value),
        }),
        Target::Sequence(items) => match value {
            Expr::Tuple { elements, .. } | Expr::List { elements, .. }
                if elements.len() == items.len() =>
            {
                for (item, element) in items.iter().zip(elements) {
                    collect_constants(item, element, line, out);
                }
            }
            _ => {
                for item in items {
                    collect_constants(item, value, line, out);
                }
            }
        },
        _ => {}
    }
}

/// At least one cased character and no lower-case ones (`str.isupper`).
fn is_constant_name(name: &str) -> bool {
    let mut cased = false;
    for c in name.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Textual name of a decorator, base class or annotation.
fn resolve_name(expr: &Expr) -> String {
    match expr {
        Expr::Name(name) => name.clone(),
        Expr::Attribute { value, attr } => format!("{}.{}", resolve_name(value), attr),
        Expr::Constant(literal) => literal.display(),
        Expr::Tuple { dump, .. }
        | Expr::List { dump, .. }
        | Expr::Dict(dump)
        | Expr::Opaque(dump) => dump.clone(),
    }
}

/// Representation of a default or constant value.
fn value_repr(expr: &Expr) -> String {
    match expr {
        Expr::Constant(literal) => literal.repr(),
        Expr::List { .. } => "[...]".to_string(),
        Expr::Dict(_) => "{...}".to_string(),
        other => resolve_name(other),
    }
}
