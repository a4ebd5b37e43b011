//! Lexical scopes.
//!
//! One scope is active per function body being generated. Scopes do not
//! see each other: a name is only ever resolved in the innermost scope.

use std::collections::HashMap;

use inkwell::{
    basic_block::BasicBlock,
    types::BasicTypeEnum,
    values::{BasicValueEnum, PointerValue},
};

/// Storage of a local variable: its stack slot and the type stored in it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variable<'a> {
    pub pointer: PointerValue<'a>,
    pub ty: BasicTypeEnum<'a>,
}

#[derive(Debug)]
pub struct Scope<'a> {
    /// The block code is appended to while this scope is active
    pub block: BasicBlock<'a>,
    locals: HashMap<String, Variable<'a>>,
    return_value: Option<BasicValueEnum<'a>>,
}

impl<'a> Scope<'a> {
    pub fn new(block: BasicBlock<'a>) -> Self {
        Scope {
            block,
            locals: HashMap::new(),
            return_value: None,
        }
    }

    /// Binds `name`, returning the binding it replaced.
    pub fn declare(&mut self, name: &str, variable: Variable<'a>) -> Option<Variable<'a>> {
        self.locals.insert(name.to_string(), variable)
    }

    pub fn lookup(&self, name: &str) -> Option<Variable<'a>> {
        self.locals.get(name).copied()
    }

    pub fn set_return_value(&mut self, value: Option<BasicValueEnum<'a>>) {
        self.return_value = value;
    }

    pub fn return_value(&self) -> Option<BasicValueEnum<'a>> {
        self.return_value
    }
}
