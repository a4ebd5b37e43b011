use std::fmt::Display;

use inkwell::builder::BuilderError;
use thiserror::Error;

use crate::ast::ast::Operator;

/// A recoverable problem found while generating code.
///
/// Generation continues past a diagnostic; the offending node yields no value.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    internal_error: DiagnosticImpl,
    function: Option<String>,
}

impl Diagnostic {
    pub fn new(error_impl: DiagnosticImpl, function: Option<String>) -> Self {
        Diagnostic {
            internal_error: error_impl,
            function,
        }
    }

    pub fn get_error(&self) -> &DiagnosticImpl {
        &self.internal_error
    }

    /// Name of the function whose body was being generated.
    pub fn get_function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            DiagnosticImpl::UndeclaredVariable { .. } => "UndeclaredVariable",
            DiagnosticImpl::UnknownFunction { .. } => "UnknownFunction",
            DiagnosticImpl::UnmappedOperator { .. } => "UnmappedOperator",
            DiagnosticImpl::UnmappedComparator { .. } => "UnmappedComparator",
            DiagnosticImpl::OperandTypeMismatch { .. } => "OperandTypeMismatch",
            DiagnosticImpl::AssignmentTypeMismatch { .. } => "AssignmentTypeMismatch",
            DiagnosticImpl::ArgumentCountMismatch { .. } => "ArgumentCountMismatch",
            DiagnosticImpl::ArgumentTypeMismatch { .. } => "ArgumentTypeMismatch",
            DiagnosticImpl::ReturnTypeMismatch { .. } => "ReturnTypeMismatch",
            DiagnosticImpl::VoidStorage { .. } => "VoidStorage",
            DiagnosticImpl::VoidParameter { .. } => "VoidParameter",
            DiagnosticImpl::NotAValue { .. } => "NotAValue",
            DiagnosticImpl::FunctionAlreadyDefined { .. } => "FunctionAlreadyDefined",
            DiagnosticImpl::ConflictingDeclaration { .. } => "ConflictingDeclaration",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            DiagnosticImpl::UndeclaredVariable { variable } => ErrorTip::Suggestion(format!(
                "Declare `{}` in this function before using it",
                variable
            )),
            DiagnosticImpl::UnknownFunction { function } => ErrorTip::Suggestion(format!(
                "Define `{}` or add an extern declaration for it before the call",
                function
            )),
            DiagnosticImpl::UnmappedOperator { .. } => ErrorTip::Suggestion(String::from(
                "Arithmetic supports `+`, `-`, `*` and `/`",
            )),
            DiagnosticImpl::UnmappedComparator { .. } => ErrorTip::Suggestion(String::from(
                "Comparisons support `<`, `<=`, `>`, `>=`, `==` and `!=`",
            )),
            DiagnosticImpl::ArgumentCountMismatch {
                expected, received, ..
            } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            DiagnosticImpl::VoidStorage { .. } | DiagnosticImpl::VoidParameter { .. } => {
                ErrorTip::Suggestion(String::from("Use `int` or `double`"))
            }
            DiagnosticImpl::OperandTypeMismatch { .. }
            | DiagnosticImpl::AssignmentTypeMismatch { .. }
            | DiagnosticImpl::ArgumentTypeMismatch { .. }
            | DiagnosticImpl::ReturnTypeMismatch { .. }
            | DiagnosticImpl::NotAValue { .. }
            | DiagnosticImpl::FunctionAlreadyDefined { .. }
            | DiagnosticImpl::ConflictingDeclaration { .. } => ErrorTip::None,
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.function {
            Some(function) => write!(f, "{} (in `{}`)", self.internal_error, function),
            None => write!(f, "{}", self.internal_error),
        }
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiagnosticImpl {
    #[error("undeclared variable {variable}")]
    UndeclaredVariable { variable: String },
    #[error("no function named {function}")]
    UnknownFunction { function: String },
    #[error("unsupported arithmetic operator `{operator}`")]
    UnmappedOperator { operator: Operator },
    #[error("failed to match expression comparator `{operator}`")]
    UnmappedComparator { operator: Operator },
    #[error("operands of `{operator}` do not match: {left} and {right}")]
    OperandTypeMismatch {
        operator: Operator,
        left: String,
        right: String,
    },
    #[error("cannot assign {received} to variable {variable} of type {expected}")]
    AssignmentTypeMismatch {
        variable: String,
        expected: String,
        received: String,
    },
    #[error("function {function} expects {expected} arguments, received {received}")]
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("argument {index} of {function}: expected {expected}, received {received}")]
    ArgumentTypeMismatch {
        function: String,
        index: usize,
        expected: String,
        received: String,
    },
    #[error("function {function} returns {expected}, but {received} was returned")]
    ReturnTypeMismatch {
        function: String,
        expected: String,
        received: String,
    },
    #[error("variable {variable} cannot have type void")]
    VoidStorage { variable: String },
    #[error("parameter {index} of {function} cannot have type void")]
    VoidParameter { function: String, index: usize },
    #[error("{usage} does not produce a value")]
    NotAValue { usage: String },
    #[error("function {function} is already defined")]
    FunctionAlreadyDefined { function: String },
    #[error("function {function} was already declared with a different signature")]
    ConflictingDeclaration { function: String },
}

/// A failure that stops code generation.
///
/// These point at a bug in the generator or at a module that cannot be
/// handed off, never at a plain mistake in the user program.
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("attempted to leave a scope while no scope is active")]
    ScopeUnderflow,
    #[error("no active scope for code generation")]
    NoActiveScope,
    #[error("entry function {0} could not be created")]
    EntryFunction(String),
    #[error("builtin {0} could not be registered")]
    Builtin(String),
    #[error("failed to build instruction: {0}")]
    Builder(#[from] BuilderError),
    #[error("module verification failed: {0}")]
    Verification(String),
    #[error("failed to write module: {0}")]
    Output(String),
    #[error("code generation reported {} error(s)", .0.len())]
    Rejected(Vec<Diagnostic>),
}
