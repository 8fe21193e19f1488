//! docShadow Indexer
//!
//! This crate provides the source-structure extraction engine for docShadow:
//! - Directory discovery with hidden-directory pruning and `.docignore` rules
//! - Python parsing via tree-sitter, lowered into a small typed syntax tree
//! - Reduction of that tree into serializable documentation records
//! - The nested project structure map built from discovered paths

mod error;
pub mod extract;
pub mod scanner;
pub mod syntax;
pub mod tree;

pub use error::IndexerError;
pub use extract::{
    ArgumentRecord, ClassRecord, ConstantRecord, DocumentationRecord, FunctionRecord,
    ImportEntry, ImportKind, MethodFlags, ModuleStructure, PropertyRecord, RecordBody,
    StructureExtractor,
};
pub use scanner::{IgnoreMatcher, ScanOptions, ScanResult, Scanner, Walker, SOURCE_EXTENSION};
pub use tree::{ProjectStructure, StructureBuilder, StructureEntry, RECORD_SUFFIX};
