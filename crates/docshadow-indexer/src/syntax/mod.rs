//! Typed Python syntax tree.
//!
//! tree-sitter produces a concrete tree with hundreds of node kinds. The
//! extractor only cares about a handful of statement and expression shapes, so
//! the concrete tree is lowered into the closed enums below. Every expression
//! shape the extractor does not interpret becomes [`Expr::Opaque`], carrying a
//! structural dump of the original node.

mod literal;
mod lower;

pub use literal::{clean_doc, parse_string, repr_float, repr_str, Literal, StringLiteral};
pub use lower::{parse_module, SyntaxError};

/// A parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub body: Vec<Stmt>,
}

/// Statement forms.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `import a.b as c, d`
    Import(Vec<ImportAlias>),
    /// `from .pkg import a as b` (module keeps its leading dots)
    ImportFrom {
        module: String,
        names: Vec<ImportAlias>,
    },
    FunctionDef(FunctionDef),
    ClassDef(ClassDef),
    /// Unannotated assignment, chained targets flattened left to right
    Assign(Assign),
    /// Bare expression statement
    Expr(Expr),
    /// Compound statement (`if`, `for`, `try`, `with`, `match`, ...) reduced
    /// to the statement blocks it contains, in source order
    Nested(Vec<Vec<Stmt>>),
    /// Anything else
    Other,
}

/// One imported name.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportAlias {
    pub name: String,
    pub asname: Option<String>,
}

/// `def` / `async def`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    /// 1-based line of the `def` keyword (decorators excluded)
    pub line: usize,
    pub decorators: Vec<Expr>,
    pub is_async: bool,
    pub params: Parameters,
    pub returns: Option<Expr>,
    pub body: Vec<Stmt>,
}

/// `class`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: String,
    /// 1-based line of the `class` keyword
    pub line: usize,
    pub decorators: Vec<Expr>,
    /// Positional bases; keyword arguments such as `metaclass=` are dropped
    pub bases: Vec<Expr>,
    pub body: Vec<Stmt>,
}

/// Function parameters in Python's own layout: defaults are stored apart
/// from the positional parameters and align to them from the right.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    /// Positional-only and regular parameters, in order
    pub positional: Vec<Param>,
    /// Defaults of the trailing positional parameters
    pub defaults: Vec<Expr>,
    pub vararg: Option<Param>,
    /// Keyword-only parameters, each with its own optional default
    pub kwonly: Vec<(Param, Option<Expr>)>,
    pub kwarg: Option<Param>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub annotation: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub line: usize,
    pub targets: Vec<Target>,
    pub value: Expr,
}

/// Assignment target.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Name(String),
    /// Tuple or list unpacking
    Sequence(Vec<Target>),
    /// Attribute, subscript or starred target
    Other,
}

/// Expression forms.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Name(String),
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Constant(Literal),
    /// List display (not a comprehension)
    List {
        elements: Vec<Expr>,
        dump: String,
    },
    /// Dict display (not a comprehension)
    Dict(String),
    Tuple {
        elements: Vec<Expr>,
        dump: String,
    },
    /// Uninterpreted expression with its structural dump
    Opaque(String),
}

impl Stmt {
    /// Statement blocks directly nested in this statement.
    pub fn blocks(&self) -> Vec<&[Stmt]> {
        match self {
            Stmt::FunctionDef(func) => vec![func.body.as_slice()],
            Stmt::ClassDef(class) => vec![class.body.as_slice()],
            Stmt::Nested(blocks) => blocks.iter().map(Vec::as_slice).collect(),
            _ => Vec::new(),
        }
    }
}

/// Visit every statement of `body` and of all nested blocks, in source order.
pub fn walk_stmts<'a>(body: &'a [Stmt], visit: &mut impl FnMut(&'a Stmt)) {
    for stmt in body {
        visit(stmt);
        for block in stmt.blocks() {
            walk_stmts(block, visit);
        }
    }
}
