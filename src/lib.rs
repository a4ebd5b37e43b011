#![allow(clippy::module_inception)]

//! Code generation for a small imperative language.
//!
//! The crate takes a finished AST and produces an LLVM module: one entry
//! function wrapping the top-level block, the user's functions and extern
//! declarations, and a small builtin runtime.
//!
//! ```ignore
//! let context = Context::create();
//! let program = BlockStmt::new(vec![
//!     Stmt::var("int", "x", Some(Expr::int(2))),
//!     Stmt::expression(Expr::call("echo", vec![Expr::symbol("x")])),
//! ]);
//! let compiled = compile(&program, CompilerOptions::default(), &context)?;
//! println!("{}", compiled.print_to_string());
//! ```

pub mod ast;
pub mod compiler;
pub mod errors;
