//! Builtin runtime.
//!
//! These functions are registered in every module before any user code is
//! generated, so programs can call them without declaring them:
//!
//! - `printf`: the C formatted-output function, declared with external linkage
//! - `echo(int)`: prints an integer on its own line through `printf`

use inkwell::{
    module::Linkage,
    values::{BasicMetadataValueEnum, FunctionValue},
    AddressSpace,
};
use log::debug;

use crate::{ast::types::TypeDescriptor, errors::errors::CodegenError};

use super::compiler::Compiler;

pub const PRINTF: &str = "printf";
pub const ECHO: &str = "echo";

const ECHO_FORMAT: &str = "%lld\n";

/// Registers the builtins in the module.
///
/// The builder is left where it was: `echo` opens and closes its own scope.
pub fn inject_builtins(compiler: &mut Compiler) -> Result<(), CodegenError> {
    let printf = declare_printf(compiler)?;
    define_echo(compiler, printf)?;
    Ok(())
}

/// Declares `i32 printf(i8*, ...)`.
fn declare_printf<'a>(compiler: &mut Compiler<'a>) -> Result<FunctionValue<'a>, CodegenError> {
    let i8_ptr_type = compiler.context.i8_type().ptr_type(AddressSpace::default());
    let printf_type = compiler
        .context
        .i32_type()
        .fn_type(&[i8_ptr_type.into()], true);

    let printf = compiler
        .declare_function(PRINTF, printf_type, Linkage::External)
        .ok_or_else(|| CodegenError::Builtin(PRINTF.to_string()))?;
    // C calling convention
    printf.set_call_conventions(0);

    Ok(printf)
}

/// Defines `void echo(i64 toPrint)`, which calls `printf("%lld\n", toPrint)`.
///
/// Built the same way as a user function: entry block, scope, call, and the
/// terminator taken from the pending return value.
fn define_echo<'a>(
    compiler: &mut Compiler<'a>,
    printf: FunctionValue<'a>,
) -> Result<FunctionValue<'a>, CodegenError> {
    let echo_type = compiler.function_type(
        TypeDescriptor::Void,
        &[compiler.context.i64_type().into()],
        false,
    );
    let echo = compiler
        .create_function(ECHO, echo_type, Linkage::Internal)
        .ok_or_else(|| CodegenError::Builtin(ECHO.to_string()))?;

    let format = compiler.builder.build_global_string_ptr(ECHO_FORMAT, ".str")?;

    let mut args: Vec<BasicMetadataValueEnum<'a>> = vec![format.as_pointer_value().into()];
    for param in echo.get_param_iter() {
        param.set_name("toPrint");
        args.push(param.into());
    }

    compiler.builder.build_call(printf, &args, "")?;

    let return_value = compiler.get_return_value()?;
    compiler.build_function_return(TypeDescriptor::Void, return_value)?;
    compiler.exit_scope()?;

    debug!("Creating function: {}", ECHO);

    Ok(echo)
}
