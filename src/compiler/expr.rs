use inkwell::{
    values::{BasicMetadataValueEnum, BasicValueEnum, FloatValue, FunctionValue, IntValue},
    FloatPredicate, IntPredicate,
};
use log::debug;

use crate::{
    ast::{
        ast::{Expr, Operator},
        expressions::{BinaryExpr, CallExpr, ComparisonExpr, SymbolExpr},
    },
    errors::errors::{CodegenError, DiagnosticImpl},
};

use super::compiler::{Compiler, GenResult, Value};

/// Generates LLVM IR for the given expression.
pub fn gen_expression<'a>(compiler: &mut Compiler<'a>, expression: &Expr) -> GenResult<'a> {
    match expression {
        Expr::Integer(value) => {
            debug!("Creating integer: {}", value);
            let constant = compiler.context.i64_type().const_int(*value as u64, true);
            Ok(Some(Value::Basic(constant.into())))
        }
        Expr::Double(value) => {
            debug!("Creating double: {}", value);
            let constant = compiler.context.f64_type().const_float(*value);
            Ok(Some(Value::Basic(constant.into())))
        }
        Expr::Symbol(symbol) => gen_symbol(compiler, symbol),
        Expr::Call(call_expr) => gen_call(compiler, call_expr),
        Expr::Binary(binary_expr) => gen_binary(compiler, binary_expr),
        Expr::Comparison(comparison_expr) => gen_comparison(compiler, comparison_expr),
        Expr::Assignment(assignment_expr) => {
            gen_assignment(compiler, &assignment_expr.assignee, &assignment_expr.value)
        }
    }
}

/// Stores `value` into the already declared variable `assignee`.
///
/// The right-hand side is only generated once the target is known to exist.
pub fn gen_assignment<'a>(compiler: &mut Compiler<'a>, assignee: &str, value: &Expr) -> GenResult<'a> {
    debug!("Creating assignment for {}", assignee);

    let Some(variable) = compiler.lookup(assignee)? else {
        compiler.report(DiagnosticImpl::UndeclaredVariable {
            variable: assignee.to_string(),
        });
        return Ok(None);
    };

    let value = gen_expression(compiler, value)?;
    let Some(value) = expect_basic(compiler, value, &format!("value assigned to {}", assignee))
    else {
        return Ok(None);
    };

    if value.get_type() != variable.ty {
        let expected = compiler.describe_type(variable.ty);
        let received = compiler.describe_type(value.get_type());
        compiler.report(DiagnosticImpl::AssignmentTypeMismatch {
            variable: assignee.to_string(),
            expected,
            received,
        });
        return Ok(None);
    }

    let store = compiler.builder.build_store(variable.pointer, value)?;
    Ok(Some(Value::Instruction(store)))
}

/// Narrows a generated value to a first-class value.
///
/// A node that produced something without a usable result (a void call, a
/// store) is reported; a node that already failed is passed through silently.
pub fn expect_basic<'a>(
    compiler: &mut Compiler<'a>,
    value: Option<Value<'a>>,
    usage: &str,
) -> Option<BasicValueEnum<'a>> {
    match value {
        Some(Value::Basic(value)) => Some(value),
        Some(_) => {
            compiler.report(DiagnosticImpl::NotAValue {
                usage: usage.to_string(),
            });
            None
        }
        None => None,
    }
}

fn gen_symbol<'a>(compiler: &mut Compiler<'a>, symbol: &SymbolExpr) -> GenResult<'a> {
    debug!("Creating identifier reference: {}", symbol.value);

    let Some(variable) = compiler.lookup(&symbol.value)? else {
        compiler.report(DiagnosticImpl::UndeclaredVariable {
            variable: symbol.value.clone(),
        });
        return Ok(None);
    };

    let value = compiler.builder.build_load(variable.pointer, &symbol.value)?;
    Ok(Some(Value::Basic(value)))
}

fn gen_call<'a>(compiler: &mut Compiler<'a>, call_expr: &CallExpr) -> GenResult<'a> {
    let Some(function) = compiler.module.get_function(&call_expr.callee) else {
        compiler.report(DiagnosticImpl::UnknownFunction {
            function: call_expr.callee.clone(),
        });
        return Ok(None);
    };

    // Arguments are evaluated left to right
    let mut args = Vec::with_capacity(call_expr.arguments.len());
    let mut complete = true;
    for (index, argument) in call_expr.arguments.iter().enumerate() {
        let value = gen_expression(compiler, argument)?;
        let usage = format!("argument {} of {}", index, call_expr.callee);
        match expect_basic(compiler, value, &usage) {
            Some(value) => args.push(value),
            None => complete = false,
        }
    }

    if !complete || !check_arguments(compiler, function, &call_expr.callee, &args) {
        return Ok(None);
    }

    let args: Vec<BasicMetadataValueEnum<'a>> = args.into_iter().map(Into::into).collect();
    let call_site = compiler.builder.build_call(function, &args, "")?;

    debug!("Creating function call: {}", call_expr.callee);

    Ok(Some(
        call_site
            .try_as_basic_value()
            .either(Value::Basic, Value::Instruction),
    ))
}

/// Checks argument count and types against the callee's signature.
///
/// Variadic callees accept extra arguments after their fixed parameters.
fn check_arguments<'a>(
    compiler: &mut Compiler<'a>,
    function: FunctionValue<'a>,
    name: &str,
    args: &[BasicValueEnum<'a>],
) -> bool {
    let params = function.get_params();
    let is_var_args = function.get_type().is_var_arg();

    if args.len() < params.len() || (!is_var_args && args.len() > params.len()) {
        compiler.report(DiagnosticImpl::ArgumentCountMismatch {
            function: name.to_string(),
            expected: params.len(),
            received: args.len(),
        });
        return false;
    }

    let mut valid = true;
    for (index, (param, arg)) in params.iter().zip(args).enumerate() {
        if param.get_type() != arg.get_type() {
            let expected = compiler.describe_type(param.get_type());
            let received = compiler.describe_type(arg.get_type());
            compiler.report(DiagnosticImpl::ArgumentTypeMismatch {
                function: name.to_string(),
                index,
                expected,
                received,
            });
            valid = false;
        }
    }

    valid
}

/// Both operands of a binary or comparison expression, of one shared type.
enum Operands<'a> {
    Int(IntValue<'a>, IntValue<'a>),
    Float(FloatValue<'a>, FloatValue<'a>),
}

/// Generates the left operand, then the right one.
fn gen_operands<'a>(
    compiler: &mut Compiler<'a>,
    left: &Expr,
    operator: Operator,
    right: &Expr,
) -> Result<Option<Operands<'a>>, CodegenError> {
    let left_value = gen_expression(compiler, left)?;
    let right_value = gen_expression(compiler, right)?;

    let left = expect_basic(compiler, left_value, &format!("left operand of `{}`", operator));
    let right = expect_basic(compiler, right_value, &format!("right operand of `{}`", operator));
    let (Some(left), Some(right)) = (left, right) else {
        return Ok(None);
    };

    match (left, right) {
        (BasicValueEnum::IntValue(left), BasicValueEnum::IntValue(right))
            if left.get_type() == right.get_type() =>
        {
            Ok(Some(Operands::Int(left, right)))
        }
        (BasicValueEnum::FloatValue(left), BasicValueEnum::FloatValue(right))
            if left.get_type() == right.get_type() =>
        {
            Ok(Some(Operands::Float(left, right)))
        }
        (left, right) => {
            let left = compiler.describe_type(left.get_type());
            let right = compiler.describe_type(right.get_type());
            compiler.report(DiagnosticImpl::OperandTypeMismatch {
                operator,
                left,
                right,
            });
            Ok(None)
        }
    }
}

fn gen_binary<'a>(compiler: &mut Compiler<'a>, binary_expr: &BinaryExpr) -> GenResult<'a> {
    debug!("Creating binary operation: {}", binary_expr.operator);

    let operands = gen_operands(
        compiler,
        &binary_expr.left,
        binary_expr.operator,
        &binary_expr.right,
    )?;

    let value: BasicValueEnum<'a> = match (binary_expr.operator, operands) {
        (Operator::Plus, Some(Operands::Int(left, right))) => {
            compiler.builder.build_int_add(left, right, "")?.into()
        }
        (Operator::Minus, Some(Operands::Int(left, right))) => {
            compiler.builder.build_int_sub(left, right, "")?.into()
        }
        (Operator::Multiply, Some(Operands::Int(left, right))) => {
            compiler.builder.build_int_mul(left, right, "")?.into()
        }
        (Operator::Divide, Some(Operands::Int(left, right))) => compiler
            .builder
            .build_int_signed_div(left, right, "")?
            .into(),
        (Operator::Plus, Some(Operands::Float(left, right))) => {
            compiler.builder.build_float_add(left, right, "")?.into()
        }
        (Operator::Minus, Some(Operands::Float(left, right))) => {
            compiler.builder.build_float_sub(left, right, "")?.into()
        }
        (Operator::Multiply, Some(Operands::Float(left, right))) => {
            compiler.builder.build_float_mul(left, right, "")?.into()
        }
        (Operator::Divide, Some(Operands::Float(left, right))) => {
            compiler.builder.build_float_div(left, right, "")?.into()
        }
        (Operator::Plus | Operator::Minus | Operator::Multiply | Operator::Divide, None) => {
            return Ok(None);
        }
        (operator, _) => {
            compiler.report(DiagnosticImpl::UnmappedOperator { operator });
            return Ok(None);
        }
    };

    Ok(Some(Value::Basic(value)))
}

fn gen_comparison<'a>(
    compiler: &mut Compiler<'a>,
    comparison_expr: &ComparisonExpr,
) -> GenResult<'a> {
    debug!("Creating comparison: {}", comparison_expr.operator);

    let operator = comparison_expr.operator;
    let operands = gen_operands(
        compiler,
        &comparison_expr.left,
        operator,
        &comparison_expr.right,
    )?;

    let (Some(int_predicate), Some(float_predicate)) =
        (int_predicate(operator), float_predicate(operator))
    else {
        compiler.report(DiagnosticImpl::UnmappedComparator { operator });
        return Ok(None);
    };

    let flag = match operands {
        Some(Operands::Int(left, right)) => compiler
            .builder
            .build_int_compare(int_predicate, left, right, "")?,
        Some(Operands::Float(left, right)) => compiler
            .builder
            .build_float_compare(float_predicate, left, right, "")?,
        None => return Ok(None),
    };

    // Comparisons produce an `int` holding 0 or 1
    let value = compiler
        .builder
        .build_int_z_extend(flag, compiler.context.i64_type(), "")?;

    Ok(Some(Value::Basic(value.into())))
}

fn int_predicate(operator: Operator) -> Option<IntPredicate> {
    match operator {
        Operator::Less => Some(IntPredicate::SLT),
        Operator::LessEqual => Some(IntPredicate::SLE),
        Operator::Greater => Some(IntPredicate::SGT),
        Operator::GreaterEqual => Some(IntPredicate::SGE),
        Operator::Equal => Some(IntPredicate::EQ),
        Operator::NotEqual => Some(IntPredicate::NE),
        _ => None,
    }
}

fn float_predicate(operator: Operator) -> Option<FloatPredicate> {
    match operator {
        Operator::Less => Some(FloatPredicate::OLT),
        Operator::LessEqual => Some(FloatPredicate::OLE),
        Operator::Greater => Some(FloatPredicate::OGT),
        Operator::GreaterEqual => Some(FloatPredicate::OGE),
        Operator::Equal => Some(FloatPredicate::OEQ),
        // Unordered, so NaN compares unequal to everything
        Operator::NotEqual => Some(FloatPredicate::UNE),
        _ => None,
    }
}
