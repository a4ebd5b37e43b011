use std::slice::Iter;

use super::ast::{Expr, Stmt};

/// An ordered sequence of statements. The program root is a block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockStmt {
    pub body: Vec<Stmt>,
}

impl BlockStmt {
    pub fn new(body: Vec<Stmt>) -> Self {
        BlockStmt { body }
    }
    pub fn iter(&self) -> Iter<'_, Stmt> {
        self.body.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStmt {
    pub expression: Expr,
}

/// Variable declaration, also used for function parameters.
///
/// `var_type` is the syntactic type name (`int`, `double`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclStmt {
    pub var_type: String,
    pub identifier: String,
    pub assigned_value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnDeclStmt {
    pub return_type: String,
    pub identifier: String,
    pub parameters: Vec<VarDeclStmt>,
    pub body: BlockStmt,
}

/// A function defined outside the module. Only parameter types are known.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternDeclStmt {
    pub return_type: String,
    pub identifier: String,
    pub parameter_types: Vec<String>,
    pub is_variadic: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Expr,
}

impl Stmt {
    pub fn expression(expression: Expr) -> Self {
        Stmt::Expression(ExpressionStmt { expression })
    }

    pub fn block(body: Vec<Stmt>) -> Self {
        Stmt::Block(BlockStmt::new(body))
    }

    pub fn var(var_type: &str, identifier: &str, assigned_value: Option<Expr>) -> Self {
        Stmt::VarDecl(VarDeclStmt::new(var_type, identifier, assigned_value))
    }

    pub fn function(
        return_type: &str,
        identifier: &str,
        parameters: Vec<VarDeclStmt>,
        body: Vec<Stmt>,
    ) -> Self {
        Stmt::FnDecl(FnDeclStmt {
            return_type: return_type.to_string(),
            identifier: identifier.to_string(),
            parameters,
            body: BlockStmt::new(body),
        })
    }

    pub fn external(return_type: &str, identifier: &str, parameter_types: &[&str]) -> Self {
        Stmt::ExternDecl(ExternDeclStmt {
            return_type: return_type.to_string(),
            identifier: identifier.to_string(),
            parameter_types: parameter_types.iter().map(|ty| ty.to_string()).collect(),
            is_variadic: false,
        })
    }

    pub fn ret(value: Expr) -> Self {
        Stmt::Return(ReturnStmt { value })
    }
}

impl VarDeclStmt {
    pub fn new(var_type: &str, identifier: &str, assigned_value: Option<Expr>) -> Self {
        VarDeclStmt {
            var_type: var_type.to_string(),
            identifier: identifier.to_string(),
            assigned_value,
        }
    }

    /// A parameter: a declaration without an initializer.
    pub fn param(var_type: &str, identifier: &str) -> Self {
        VarDeclStmt::new(var_type, identifier, None)
    }
}
