//! Type names and their descriptors.
//!
//! The language only knows two value types. Any other type name, including
//! a missing one, resolves to `Void`.

use std::fmt::Display;

/// The semantic type behind a syntactic type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// 64-bit signed integer (`int`)
    Int64,
    /// 64-bit IEEE double (`double`)
    Double,
    Void,
}

impl TypeDescriptor {
    /// Resolves a type name. Never fails.
    pub fn resolve(type_name: &str) -> Self {
        match type_name {
            "int" => TypeDescriptor::Int64,
            "double" => TypeDescriptor::Double,
            _ => TypeDescriptor::Void,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeDescriptor::Void)
    }
}

impl Display for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeDescriptor::Int64 => write!(f, "int"),
            TypeDescriptor::Double => write!(f, "double"),
            TypeDescriptor::Void => write!(f, "void"),
        }
    }
}
