use super::ast::{Expr, Operator};

/// Symbol Expression
/// A read of a named variable.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolExpr {
    pub value: String,
}

/// Call Expression
/// A call of a function by name with positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: String,
    pub arguments: Vec<Expr>,
}

/// Binary Expression
/// Arithmetic between two operands.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: Operator,
    pub right: Box<Expr>,
}

/// Comparison Expression
/// A comparison between two operands, producing 0 or 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonExpr {
    pub left: Box<Expr>,
    pub operator: Operator,
    pub right: Box<Expr>,
}

/// Assignment Expression
/// Stores a value into an already declared variable.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentExpr {
    pub assignee: String,
    pub value: Box<Expr>,
}

// Constructors for building trees by hand

impl Expr {
    pub fn int(value: i64) -> Self {
        Expr::Integer(value)
    }

    pub fn double(value: f64) -> Self {
        Expr::Double(value)
    }

    pub fn symbol(name: &str) -> Self {
        Expr::Symbol(SymbolExpr {
            value: name.to_string(),
        })
    }

    pub fn call(callee: &str, arguments: Vec<Expr>) -> Self {
        Expr::Call(CallExpr {
            callee: callee.to_string(),
            arguments,
        })
    }

    pub fn binary(left: Expr, operator: Operator, right: Expr) -> Self {
        Expr::Binary(BinaryExpr {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    pub fn compare(left: Expr, operator: Operator, right: Expr) -> Self {
        Expr::Comparison(ComparisonExpr {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    pub fn assign(assignee: &str, value: Expr) -> Self {
        Expr::Assignment(AssignmentExpr {
            assignee: assignee.to_string(),
            value: Box::new(value),
        })
    }
}
