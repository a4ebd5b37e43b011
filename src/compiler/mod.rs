//! Code generation module for the compiler.
//!
//! This module contains the LLVM-based code generator that transforms
//! the AST into LLVM IR. It handles:
//!
//! - The compilation context: module, builder and the lexical scope stack
//! - Compilation of expressions and statements
//! - Type conversion from type descriptors to LLVM types
//! - The builtin runtime injected ahead of user code

pub mod compiler;
pub mod expr;
pub mod scope;
pub mod stdlib;
pub mod stmt;

#[cfg(test)]
mod tests;
