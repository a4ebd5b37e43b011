/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST consumed by the code generator
///
/// Submodules:
/// - ast: The closed expression and statement sum types and operators
/// - expressions: Definitions for the expression node payloads
/// - statements: Definitions for the statement node payloads
/// - types: Type names and their resolution to type descriptors
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
