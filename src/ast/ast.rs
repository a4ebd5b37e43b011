use std::fmt::Display;

use super::{
    expressions::{AssignmentExpr, BinaryExpr, CallExpr, ComparisonExpr, SymbolExpr},
    statements::{
        BlockStmt, ExpressionStmt, ExternDeclStmt, FnDeclStmt, ReturnStmt, VarDeclStmt,
    },
};

/// Expression
///
/// Every expression kind the parser can produce. Code generation matches on
/// this exhaustively, so a new variant has to be handled before it compiles.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Integer(i64),
    Double(f64),
    Symbol(SymbolExpr),
    Call(CallExpr),
    Binary(BinaryExpr),
    Comparison(ComparisonExpr),
    Assignment(AssignmentExpr),
}

/// Statement
///
/// Every statement kind the parser can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(ExpressionStmt),
    Block(BlockStmt),
    VarDecl(VarDeclStmt),
    FnDecl(FnDeclStmt),
    ExternDecl(ExternDeclStmt),
    Return(ReturnStmt),
}

/// Operator tokens shared by binary and comparison expressions.
///
/// The parser hands over whichever token it saw; the code generator decides
/// which of them are valid in which position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
