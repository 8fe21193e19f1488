//! Lowering of the tree-sitter concrete tree into [`super::Module`].

use super::literal::{parse_float, parse_int, parse_string, repr_str, Literal};
use super::{
    Assign, ClassDef, Expr, FunctionDef, ImportAlias, Module, Param, Parameters, Stmt, Target,
};
use std::fmt;
use tree_sitter::Node;

/// First syntax error found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// 1-based line
    pub line: usize,
    /// 1-based column (bytes)
    pub column: usize,
    pub message: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, column {}",
            self.message, self.line, self.column
        )
    }
}

impl std::error::Error for SyntaxError {}

impl SyntaxError {
    fn at(node: Node<'_>, message: impl Into<String>) -> Self {
        let pos = node.start_position();
        Self {
            line: pos.row + 1,
            column: pos.column + 1,
            message: message.into(),
        }
    }
}

/// Deepest concrete-tree nesting accepted. Lowering recurses once per level,
/// so this bounds stack use on blocking workers.
const MAX_NESTING: usize = 400;

/// Parse Python source into a typed module.
///
/// Any error or missing node in the concrete tree rejects the whole file,
/// as does a positional parameter without a default following one with a
/// default. So does nesting deeper than [`MAX_NESTING`].
pub fn parse_module(source: &str) -> Result<Module, SyntaxError> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| SyntaxError {
            line: 0,
            column: 0,
            message: format!("failed to load Python grammar: {e}"),
        })?;

    let tree = parser.parse(source, None).ok_or_else(|| SyntaxError {
        line: 0,
        column: 0,
        message: "parser produced no tree".to_string(),
    })?;

    let root = tree.root_node();
    if let Some(node) = too_deep(root) {
        return Err(SyntaxError::at(node, "too many nested expressions"));
    }
    if root.has_error() {
        return Err(first_error(root).unwrap_or_else(|| SyntaxError::at(root, "invalid syntax")));
    }

    let mut lowerer = Lowerer {
        src: source.as_bytes(),
        error: None,
    };
    let body = lowerer.block(root);

    match lowerer.error {
        Some(err) => Err(err),
        None => Ok(Module { body }),
    }
}

/// First node nested deeper than [`MAX_NESTING`], found without recursion.
fn too_deep(root: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = root.walk();
    let mut depth = 0usize;

    loop {
        if depth > MAX_NESTING {
            return Some(cursor.node());
        }
        if cursor.goto_first_child() {
            depth += 1;
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return None;
            }
            depth -= 1;
        }
    }
}

/// Depth-first search for the first ERROR or MISSING node.
fn first_error(node: Node<'_>) -> Option<SyntaxError> {
    if node.is_missing() {
        return Some(SyntaxError::at(node, format!("missing `{}`", node.kind())));
    }
    if node.is_error() {
        return Some(SyntaxError::at(node, "invalid syntax"));
    }

    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}

/// Named children, comments excluded.
fn named<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Statements whose nested blocks are searched for definitions and imports.
const COMPOUND_STATEMENTS: &[&str] = &[
    "if_statement",
    "for_statement",
    "while_statement",
    "try_statement",
    "with_statement",
    "match_statement",
    "case_clause",
];

struct Lowerer<'a> {
    src: &'a [u8],
    error: Option<SyntaxError>,
}

impl<'a> Lowerer<'a> {
    fn text(&self, node: Node<'_>) -> &'a str {
        node.utf8_text(self.src).unwrap_or("")
    }

    /// Node text with insignificant whitespace removed (`a . b` -> `a.b`).
    fn compact(&self, node: Node<'_>) -> String {
        self.text(node).split_whitespace().collect()
    }

    fn fail(&mut self, err: SyntaxError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn block(&mut self, node: Node<'_>) -> Vec<Stmt> {
        named(node)
            .into_iter()
            .map(|child| self.statement(child))
            .collect()
    }

    fn statement(&mut self, node: Node<'_>) -> Stmt {
        match node.kind() {
            "import_statement" => Stmt::Import(self.import_names(node)),
            "import_from_statement" => {
                let module = node
                    .child_by_field_name("module_name")
                    .map(|m| self.compact(m))
                    .unwrap_or_default();
                let mut names = self.import_names(node);
                if named(node).iter().any(|c| c.kind() == "wildcard_import") {
                    names.push(ImportAlias {
                        name: "*".to_string(),
                        asname: None,
                    });
                }
                Stmt::ImportFrom { module, names }
            }
            "future_import_statement" => Stmt::ImportFrom {
                module: "__future__".to_string(),
                names: self.import_names(node),
            },
            "function_definition" => Stmt::FunctionDef(self.function(node, Vec::new())),
            "class_definition" => Stmt::ClassDef(self.class(node, Vec::new())),
            "decorated_definition" => self.decorated(node),
            "expression_statement" => self.expression_statement(node),
            kind if COMPOUND_STATEMENTS.contains(&kind) => {
                let mut blocks = Vec::new();
                self.collect_blocks(node, &mut blocks);
                Stmt::Nested(blocks)
            }
            _ => Stmt::Other,
        }
    }

    /// Gather the blocks of a compound statement and of its clauses.
    fn collect_blocks(&mut self, node: Node<'_>, out: &mut Vec<Vec<Stmt>>) {
        for child in named(node) {
            if child.kind() == "block" {
                let body = self.block(child);
                out.push(body);
            } else if child.kind().ends_with("_clause") {
                self.collect_blocks(child, out);
            }
        }
    }

    fn import_names(&self, node: Node<'_>) -> Vec<ImportAlias> {
        let mut cursor = node.walk();
        let names: Vec<Node<'_>> = node.children_by_field_name("name", &mut cursor).collect();

        names
            .into_iter()
            .map(|name| match name.kind() {
                "aliased_import" => ImportAlias {
                    name: name
                        .child_by_field_name("name")
                        .map(|n| self.compact(n))
                        .unwrap_or_default(),
                    asname: name
                        .child_by_field_name("alias")
                        .map(|a| self.text(a).to_string()),
                },
                _ => ImportAlias {
                    name: self.compact(name),
                    asname: None,
                },
            })
            .collect()
    }

    fn decorated(&mut self, node: Node<'_>) -> Stmt {
        let decorators: Vec<Expr> = named(node)
            .into_iter()
            .filter(|child| child.kind() == "decorator")
            .map(|decorator| match named(decorator).first() {
                Some(expression) => self.expr(*expression),
                None => Expr::Opaque(self.dump(decorator)),
            })
            .collect();

        match node.child_by_field_name("definition") {
            Some(def) if def.kind() == "function_definition" => {
                Stmt::FunctionDef(self.function(def, decorators))
            }
            Some(def) if def.kind() == "class_definition" => {
                Stmt::ClassDef(self.class(def, decorators))
            }
            _ => Stmt::Other,
        }
    }

    fn function(&mut self, node: Node<'_>, decorators: Vec<Expr>) -> FunctionDef {
        let is_async = {
            let mut cursor = node.walk();
            let found = node.children(&mut cursor).any(|c| c.kind() == "async");
            found
        };

        FunctionDef {
            name: node
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string())
                .unwrap_or_default(),
            line: node.start_position().row + 1,
            decorators,
            is_async,
            params: node
                .child_by_field_name("parameters")
                .map(|p| self.parameters(p))
                .unwrap_or_default(),
            returns: node.child_by_field_name("return_type").map(|t| self.expr(t)),
            body: node
                .child_by_field_name("body")
                .map(|b| self.block(b))
                .unwrap_or_default(),
        }
    }

    fn class(&mut self, node: Node<'_>, decorators: Vec<Expr>) -> ClassDef {
        let bases = node
            .child_by_field_name("superclasses")
            .map(|args| {
                named(args)
                    .into_iter()
                    .filter(|arg| {
                        !matches!(arg.kind(), "keyword_argument" | "dictionary_splat")
                    })
                    .map(|arg| self.expr(arg))
                    .collect()
            })
            .unwrap_or_default();

        ClassDef {
            name: node
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string())
                .unwrap_or_default(),
            line: node.start_position().row + 1,
            decorators,
            bases,
            body: node
                .child_by_field_name("body")
                .map(|b| self.block(b))
                .unwrap_or_default(),
        }
    }

    fn parameters(&mut self, node: Node<'_>) -> Parameters {
        let mut params = Parameters::default();
        let mut keyword_only = false;

        for child in named(node) {
            match child.kind() {
                "identifier" => {
                    let param = Param {
                        name: self.text(child).to_string(),
                        annotation: None,
                    };
                    self.push_param(&mut params, keyword_only, child, param, None);
                }
                "typed_parameter" => {
                    let annotation = child.child_by_field_name("type").map(|t| self.expr(t));
                    let Some(inner) = named(child).into_iter().next() else {
                        continue;
                    };
                    match inner.kind() {
                        "list_splat_pattern" => {
                            params.vararg = Some(Param {
                                name: self.splat_name(inner),
                                annotation,
                            });
                            keyword_only = true;
                        }
                        "dictionary_splat_pattern" => {
                            params.kwarg = Some(Param {
                                name: self.splat_name(inner),
                                annotation,
                            });
                        }
                        _ => {
                            let param = Param {
                                name: self.text(inner).to_string(),
                                annotation,
                            };
                            self.push_param(&mut params, keyword_only, child, param, None);
                        }
                    }
                }
                "default_parameter" | "typed_default_parameter" => {
                    let param = Param {
                        name: child
                            .child_by_field_name("name")
                            .map(|n| self.text(n).to_string())
                            .unwrap_or_default(),
                        annotation: child.child_by_field_name("type").map(|t| self.expr(t)),
                    };
                    let default = child.child_by_field_name("value").map(|v| self.expr(v));
                    self.push_param(&mut params, keyword_only, child, param, default);
                }
                "list_splat_pattern" => {
                    params.vararg = Some(Param {
                        name: self.splat_name(child),
                        annotation: None,
                    });
                    keyword_only = true;
                }
                "dictionary_splat_pattern" => {
                    params.kwarg = Some(Param {
                        name: self.splat_name(child),
                        annotation: None,
                    });
                }
                "keyword_separator" => keyword_only = true,
                // positional_separator: everything before it is already positional
                _ => {}
            }
        }

        params
    }

    fn push_param(
        &mut self,
        params: &mut Parameters,
        keyword_only: bool,
        node: Node<'_>,
        param: Param,
        default: Option<Expr>,
    ) {
        if keyword_only {
            params.kwonly.push((param, default));
            return;
        }

        match default {
            Some(default) => params.defaults.push(default),
            None if !params.defaults.is_empty() => self.fail(SyntaxError::at(
                node,
                "parameter without a default follows parameter with a default",
            )),
            None => {}
        }
        params.positional.push(param);
    }

    fn splat_name(&self, node: Node<'_>) -> String {
        match named(node).first() {
            Some(name) => self.text(*name).to_string(),
            None => self.text(node).trim_start_matches('*').trim().to_string(),
        }
    }

    fn expression_statement(&mut self, node: Node<'_>) -> Stmt {
        match named(node).as_slice() {
            [single] if single.kind() == "assignment" => self.assignment(*single),
            [single] => Stmt::Expr(self.expr(*single)),
            _ => Stmt::Other,
        }
    }

    /// `a = b = value`: the tree nests each further `=` in the right side.
    fn assignment(&mut self, node: Node<'_>) -> Stmt {
        let line = node.start_position().row + 1;
        let mut targets = Vec::new();
        let mut current = node;

        loop {
            if current.child_by_field_name("type").is_some() {
                return Stmt::Other;
            }
            let Some(left) = current.child_by_field_name("left") else {
                return Stmt::Other;
            };
            targets.push(self.target(left));

            match current.child_by_field_name("right") {
                Some(right) if right.kind() == "assignment" => current = right,
                Some(right) => {
                    return Stmt::Assign(Assign {
                        line,
                        targets,
                        value: self.expr(right),
                    })
                }
                None => return Stmt::Other,
            }
        }
    }

    fn target(&self, node: Node<'_>) -> Target {
        match node.kind() {
            "identifier" => Target::Name(self.text(node).to_string()),
            "pattern_list" | "tuple_pattern" | "list_pattern" | "tuple" | "list"
            | "expression_list" => Target::Sequence(
                named(node)
                    .into_iter()
                    .map(|child| self.target(child))
                    .collect(),
            ),
            "parenthesized_expression" => match named(node).as_slice() {
                [inner] => self.target(*inner),
                _ => Target::Other,
            },
            _ => Target::Other,
        }
    }

    fn expr(&self, node: Node<'_>) -> Expr {
        match node.kind() {
            "identifier" => Expr::Name(self.text(node).to_string()),
            "attribute" => {
                match (
                    node.child_by_field_name("object"),
                    node.child_by_field_name("attribute"),
                ) {
                    (Some(object), Some(attr)) => Expr::Attribute {
                        value: Box::new(self.expr(object)),
                        attr: self.text(attr).to_string(),
                    },
                    _ => Expr::Opaque(self.dump(node)),
                }
            }
            "member_type" => match named(node).as_slice() {
                [object, attr] if attr.kind() == "identifier" => Expr::Attribute {
                    value: Box::new(self.expr(*object)),
                    attr: self.text(*attr).to_string(),
                },
                _ => Expr::Opaque(self.dump(node)),
            },
            "string" => self.string(node),
            "concatenated_string" => self.concatenated_string(node),
            "integer" => Expr::Constant(parse_int(self.text(node))),
            "float" => Expr::Constant(parse_float(self.text(node))),
            "true" => Expr::Constant(Literal::Bool(true)),
            "false" => Expr::Constant(Literal::Bool(false)),
            "none" => Expr::Constant(Literal::None),
            "ellipsis" => Expr::Constant(Literal::Ellipsis),
            "list" => Expr::List {
                elements: named(node)
                    .into_iter()
                    .map(|child| self.expr(child))
                    .collect(),
                dump: self.dump(node),
            },
            "dictionary" => Expr::Dict(self.dump(node)),
            "tuple" | "expression_list" => Expr::Tuple {
                elements: named(node)
                    .into_iter()
                    .map(|child| self.expr(child))
                    .collect(),
                dump: self.dump(node),
            },
            "parenthesized_expression" | "type" => match named(node).as_slice() {
                [inner] => self.expr(*inner),
                _ => Expr::Opaque(self.dump(node)),
            },
            _ => Expr::Opaque(self.dump(node)),
        }
    }

    fn string(&self, node: Node<'_>) -> Expr {
        match parse_string(self.text(node)) {
            Some(s) if s.formatted => Expr::Opaque(self.dump(node)),
            Some(s) if s.bytes => Expr::Constant(Literal::Bytes(s.value)),
            Some(s) => Expr::Constant(Literal::Str(s.value)),
            None => Expr::Opaque(self.dump(node)),
        }
    }

    /// Implicit concatenation of adjacent literals of the same kind.
    fn concatenated_string(&self, node: Node<'_>) -> Expr {
        let parts: Option<Vec<_>> = named(node)
            .into_iter()
            .map(|part| parse_string(self.text(part)))
            .collect();

        match parts {
            Some(parts)
                if !parts.is_empty()
                    && parts.iter().all(|p| !p.formatted)
                    && parts.iter().all(|p| p.bytes == parts[0].bytes) =>
            {
                let value: String = parts.iter().map(|p| p.value.as_str()).collect();
                if parts[0].bytes {
                    Expr::Constant(Literal::Bytes(value))
                } else {
                    Expr::Constant(Literal::Str(value))
                }
            }
            _ => Expr::Opaque(self.dump(node)),
        }
    }

    /// Structural dump: `kind(field=child, child, ...)`, leaves as `kind('text')`.
    fn dump(&self, node: Node<'_>) -> String {
        let mut parts = Vec::new();
        let mut cursor = node.walk();

        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                let field = cursor.field_name();
                if child.is_named() && child.kind() != "comment" {
                    let rendered = self.dump(child);
                    parts.push(match field {
                        Some(field) => format!("{field}={rendered}"),
                        None => rendered,
                    });
                } else if let Some(field) = field {
                    parts.push(format!("{field}={}", repr_str(self.text(child))));
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }

        if parts.is_empty() {
            format!("{}({})", node.kind(), repr_str(self.text(node)))
        } else {
            format!("{}({})", node.kind(), parts.join(", "))
        }
    }
}
