//! Error types and error handling for the code generator.
//!
//! This module defines the two error families used during generation:
//!
//! - Diagnostics: recoverable problems in the user program, recorded while
//!   the walk continues with a placeholder value
//! - Codegen errors: fatal failures that stop the walk
//!
//! Diagnostics also carry an error name and an optional suggestion.

pub mod errors;
