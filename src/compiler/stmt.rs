use inkwell::{
    module::Linkage,
    types::{BasicMetadataTypeEnum, FunctionType},
    values::FunctionValue,
};
use log::debug;

use crate::{
    ast::{
        ast::Stmt,
        statements::{BlockStmt, ExternDeclStmt, FnDeclStmt, ReturnStmt, VarDeclStmt},
        types::TypeDescriptor,
    },
    errors::errors::{CodegenError, DiagnosticImpl},
};

use super::{
    compiler::{Compiler, GenResult, Value},
    expr::{expect_basic, gen_assignment, gen_expression},
    scope::Variable,
};

pub fn gen_statement<'a>(compiler: &mut Compiler<'a>, statement: &Stmt) -> GenResult<'a> {
    match statement {
        Stmt::Expression(expression_stmt) => {
            debug!("Generating code for expression statement");
            gen_expression(compiler, &expression_stmt.expression)
        }
        Stmt::Block(block_stmt) => gen_block(compiler, block_stmt),
        Stmt::VarDecl(var_decl_stmt) => gen_var_decl(compiler, var_decl_stmt),
        Stmt::FnDecl(fn_decl_stmt) => gen_fn_decl(compiler, fn_decl_stmt),
        Stmt::ExternDecl(extern_decl_stmt) => gen_extern_decl(compiler, extern_decl_stmt),
        Stmt::Return(return_stmt) => gen_return(compiler, return_stmt),
    }
}

/// Generates every statement in order. The block's value is the value of
/// its last statement.
pub fn gen_block<'a>(compiler: &mut Compiler<'a>, block: &BlockStmt) -> GenResult<'a> {
    let mut last = None;
    for statement in block.iter() {
        last = gen_statement(compiler, statement)?;
    }

    debug!("Creating block of {} statement(s)", block.body.len());
    Ok(last)
}

fn gen_var_decl<'a>(compiler: &mut Compiler<'a>, var_decl_stmt: &VarDeclStmt) -> GenResult<'a> {
    debug!(
        "Creating variable declaration {} {}",
        var_decl_stmt.var_type, var_decl_stmt.identifier
    );

    let Some(variable) =
        declare_local(compiler, &var_decl_stmt.var_type, &var_decl_stmt.identifier)?
    else {
        return Ok(None);
    };

    if let Some(assigned_value) = &var_decl_stmt.assigned_value {
        gen_assignment(compiler, &var_decl_stmt.identifier, assigned_value)?;
    }

    Ok(Some(Value::Basic(variable.pointer.into())))
}

/// Allocates a stack slot in the current block and binds it in the current scope.
fn declare_local<'a>(
    compiler: &mut Compiler<'a>,
    var_type: &str,
    identifier: &str,
) -> Result<Option<Variable<'a>>, CodegenError> {
    let Some(ty) = compiler.convert_type(TypeDescriptor::resolve(var_type)) else {
        compiler.report(DiagnosticImpl::VoidStorage {
            variable: identifier.to_string(),
        });
        return Ok(None);
    };

    let pointer = compiler.builder.build_alloca(ty, identifier)?;
    let variable = Variable { pointer, ty };
    compiler.declare(identifier, variable)?;

    Ok(Some(variable))
}

/// Converts parameter type names. Void parameters are reported and make the
/// whole signature unusable.
fn param_types<'a, 'n>(
    compiler: &mut Compiler<'a>,
    function: &str,
    type_names: impl Iterator<Item = &'n str>,
) -> Option<Vec<BasicMetadataTypeEnum<'a>>> {
    let mut params = Vec::new();
    let mut valid = true;

    for (index, type_name) in type_names.enumerate() {
        match compiler.convert_type(TypeDescriptor::resolve(type_name)) {
            Some(type_) => params.push(type_.into()),
            None => {
                compiler.report(DiagnosticImpl::VoidParameter {
                    function: function.to_string(),
                    index,
                });
                valid = false;
            }
        }
    }

    valid.then_some(params)
}

fn gen_fn_decl<'a>(compiler: &mut Compiler<'a>, fn_decl_stmt: &FnDeclStmt) -> GenResult<'a> {
    let return_type = TypeDescriptor::resolve(&fn_decl_stmt.return_type);
    let Some(params) = param_types(
        compiler,
        &fn_decl_stmt.identifier,
        fn_decl_stmt
            .parameters
            .iter()
            .map(|param| param.var_type.as_str()),
    ) else {
        return Ok(None);
    };

    let function_type = compiler.function_type(return_type, &params, false);
    let created =
        compiler.create_function(&fn_decl_stmt.identifier, function_type, Linkage::Internal);
    let function = match created {
        Some(function) => function,
        None => create_stand_in(compiler, &fn_decl_stmt.identifier, function_type),
    };

    // The function's scope is active from here on
    for (param, value) in fn_decl_stmt.parameters.iter().zip(function.get_param_iter()) {
        value.set_name(&param.identifier);
        if let Some(variable) = declare_local(compiler, &param.var_type, &param.identifier)? {
            compiler.builder.build_store(variable.pointer, value)?;
        }
    }

    gen_block(compiler, &fn_decl_stmt.body)?;

    let return_value = compiler.get_return_value()?;
    compiler.build_function_return(return_type, return_value)?;
    compiler.exit_scope()?;

    debug!("Creating function: {}", fn_decl_stmt.identifier);

    Ok(created.map(Value::Function))
}

/// Opens a private function for the body of a definition whose name was
/// rejected.
///
/// The body is still generated so its own errors are reported in the same
/// pass. LLVM renames the stand-in (`f.1`, ...) and the module is rejected
/// by [`compile`](super::compiler::compile) because of the earlier diagnostic.
fn create_stand_in<'a>(
    compiler: &mut Compiler<'a>,
    name: &str,
    function_type: FunctionType<'a>,
) -> FunctionValue<'a> {
    let function = compiler
        .module
        .add_function(name, function_type, Some(Linkage::Private));
    let entry = compiler.context.append_basic_block(function, "entry");
    compiler.enter_scope(entry);

    function
}

fn gen_extern_decl<'a>(
    compiler: &mut Compiler<'a>,
    extern_decl_stmt: &ExternDeclStmt,
) -> GenResult<'a> {
    let return_type = TypeDescriptor::resolve(&extern_decl_stmt.return_type);
    let Some(params) = param_types(
        compiler,
        &extern_decl_stmt.identifier,
        extern_decl_stmt.parameter_types.iter().map(String::as_str),
    ) else {
        return Ok(None);
    };

    let function_type = compiler.function_type(return_type, &params, extern_decl_stmt.is_variadic);
    let function = compiler.declare_function(
        &extern_decl_stmt.identifier,
        function_type,
        Linkage::External,
    );

    debug!("Creating extern declaration: {}", extern_decl_stmt.identifier);

    Ok(function.map(Value::Function))
}

/// Records the returned value for the enclosing function's terminator.
///
/// No branch is emitted; a later return in the same body replaces the value.
fn gen_return<'a>(compiler: &mut Compiler<'a>, return_stmt: &ReturnStmt) -> GenResult<'a> {
    debug!("Generating code for return statement");

    let value = gen_expression(compiler, &return_stmt.value)?;
    let return_value = expect_basic(compiler, value, "returned expression");
    compiler.set_return_value(return_value)?;

    Ok(value)
}
