//! Main compiler module.
//!
//! This module contains the core Compiler structure: the compilation context
//! every generation routine works against, and the driver that turns a whole
//! program into a module. It manages the LLVM module and builder, the stack
//! of lexical scopes, type conversion and the diagnostics of a run.

use std::path::Path;

use inkwell::{
    attributes::{Attribute, AttributeLoc},
    basic_block::BasicBlock,
    builder::Builder,
    context::Context,
    module::{Linkage, Module},
    types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum, FunctionType},
    values::{BasicValueEnum, FunctionValue, InstructionValue},
};
use log::{debug, error, info, trace};

use crate::{
    ast::{statements::BlockStmt, types::TypeDescriptor},
    errors::errors::{CodegenError, Diagnostic, DiagnosticImpl},
};

use super::{
    scope::{Scope, Variable},
    stdlib::inject_builtins,
    stmt::gen_block,
};

/// Settings for one compilation run.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Name given to the LLVM module
    pub module_name: String,
    /// Name of the synthetic function wrapping the top-level block
    pub entry_function: String,
    /// Run the LLVM verifier before handing the module off
    pub verify: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            module_name: String::from("main"),
            entry_function: String::from("main"),
            verify: true,
        }
    }
}

/// What generating a node produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    /// A first-class value: constants, loads, arithmetic, storage pointers
    Basic(BasicValueEnum<'a>),
    /// An instruction with no usable result, such as a store or a void call
    Instruction(InstructionValue<'a>),
    Function(FunctionValue<'a>),
}

impl<'a> Value<'a> {
    pub fn as_basic(&self) -> Option<BasicValueEnum<'a>> {
        match self {
            Value::Basic(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<FunctionValue<'a>> {
        match self {
            Value::Function(function) => Some(*function),
            _ => None,
        }
    }
}

/// Result of generating one node. `Ok(None)` is the placeholder left behind
/// by a recoverable error.
pub type GenResult<'a> = Result<Option<Value<'a>>, CodegenError>;

/// The state of a compilation run.
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the LLVM context
pub struct Compiler<'a> {
    pub options: CompilerOptions,

    /// Reference to the LLVM context
    pub context: &'a Context,
    /// The LLVM module being built
    pub module: Module<'a>,
    /// The LLVM IR builder, always positioned at the end of the current scope's block
    pub builder: Builder<'a>,

    scopes: Vec<Scope<'a>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Compiler<'a> {
    pub fn new(context: &'a Context, options: CompilerOptions) -> Self {
        Compiler {
            module: context.create_module(&options.module_name),
            builder: context.create_builder(),
            context,
            options,
            scopes: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Generates the whole program.
    ///
    /// The top-level block becomes the body of the entry function. The
    /// builtins are registered first so user code can call them.
    ///
    /// Recoverable problems end up in [`Compiler::diagnostics`]; only fatal
    /// ones are returned as errors.
    pub fn generate(&mut self, ast: &BlockStmt) -> Result<FunctionValue<'a>, CodegenError> {
        info!("Generating code for module {}", self.options.module_name);

        let entry_name = self.options.entry_function.clone();
        let entry_type = self.function_type(TypeDescriptor::Void, &[], false);
        let entry = self
            .create_function(&entry_name, entry_type, Linkage::External)
            .ok_or(CodegenError::EntryFunction(entry_name))?;

        inject_builtins(self)?;

        gen_block(self, ast)?;

        let return_value = self.get_return_value()?;
        self.build_function_return(TypeDescriptor::Void, return_value)?;
        self.exit_scope()?;

        info!(
            "Code is generated with {} error(s)",
            self.diagnostics.len()
        );

        Ok(entry)
    }

    /// Pushes a new scope bound to `block` and moves the builder there.
    pub fn enter_scope(&mut self, block: BasicBlock<'a>) {
        trace!("Entering scope (depth {})", self.scopes.len() + 1);
        self.scopes.push(Scope::new(block));
        self.builder.position_at_end(block);
    }

    /// Pops the current scope and moves the builder back to the enclosing one.
    pub fn exit_scope(&mut self) -> Result<Scope<'a>, CodegenError> {
        let scope = self.scopes.pop().ok_or(CodegenError::ScopeUnderflow)?;
        trace!("Left scope (depth {})", self.scopes.len());

        match self.scopes.last() {
            Some(outer) => self.builder.position_at_end(outer.block),
            None => self.builder.clear_insertion_position(),
        }

        Ok(scope)
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn current_block(&self) -> Result<BasicBlock<'a>, CodegenError> {
        Ok(self.current_scope()?.block)
    }

    /// Binds a local in the current scope. An existing binding is replaced.
    pub fn declare(&mut self, name: &str, variable: Variable<'a>) -> Result<(), CodegenError> {
        if self.current_scope_mut()?.declare(name, variable).is_some() {
            debug!("Redeclared variable {}", name);
        }
        Ok(())
    }

    /// Resolves a name in the current scope only.
    pub fn lookup(&self, name: &str) -> Result<Option<Variable<'a>>, CodegenError> {
        Ok(self.current_scope()?.lookup(name))
    }

    pub fn set_return_value(
        &mut self,
        value: Option<BasicValueEnum<'a>>,
    ) -> Result<(), CodegenError> {
        self.current_scope_mut()?.set_return_value(value);
        Ok(())
    }

    pub fn get_return_value(&self) -> Result<Option<BasicValueEnum<'a>>, CodegenError> {
        Ok(self.current_scope()?.return_value())
    }

    /// Records a recoverable error against the function being generated.
    pub fn report(&mut self, internal_error: DiagnosticImpl) {
        let function = self
            .scopes
            .last()
            .and_then(|scope| scope.block.get_parent())
            .map(|function| function.get_name().to_string_lossy().into_owned());

        let diagnostic = Diagnostic::new(internal_error, function);
        error!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Converts a type descriptor to an LLVM basic type. Void has none.
    pub fn convert_type(&self, type_: TypeDescriptor) -> Option<BasicTypeEnum<'a>> {
        match type_ {
            TypeDescriptor::Int64 => Some(self.context.i64_type().into()),
            TypeDescriptor::Double => Some(self.context.f64_type().into()),
            TypeDescriptor::Void => None,
        }
    }

    pub fn function_type(
        &self,
        return_type: TypeDescriptor,
        params: &[BasicMetadataTypeEnum<'a>],
        is_var_args: bool,
    ) -> FunctionType<'a> {
        match self.convert_type(return_type) {
            Some(type_) => type_.fn_type(params, is_var_args),
            None => self.context.void_type().fn_type(params, is_var_args),
        }
    }

    /// Source-level name of an LLVM type, for diagnostics.
    pub fn describe_type(&self, type_: BasicTypeEnum<'a>) -> String {
        match type_ {
            BasicTypeEnum::IntType(int_type) if int_type.get_bit_width() == 64 => {
                TypeDescriptor::Int64.to_string()
            }
            BasicTypeEnum::IntType(int_type) => format!("i{}", int_type.get_bit_width()),
            BasicTypeEnum::FloatType(_) => TypeDescriptor::Double.to_string(),
            BasicTypeEnum::PointerType(_) => String::from("pointer"),
            _ => String::from("aggregate"),
        }
    }

    /// Creates a function with a body and enters the scope of its entry block.
    ///
    /// A previous declaration with the same signature (an extern) is reused
    /// and becomes the definition.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the function in the module
    /// * `function_type` - The LLVM function type
    /// * `linkage` - Linkage of the definition
    ///
    /// # Returns
    ///
    /// The function, with the builder at the end of its `entry` block, or
    /// `None` after reporting if the name is already defined or declared with
    /// another signature. No scope is entered in that case.
    pub fn create_function(
        &mut self,
        name: &str,
        function_type: FunctionType<'a>,
        linkage: Linkage,
    ) -> Option<FunctionValue<'a>> {
        let function = match self.module.get_function(name) {
            Some(existing) if existing.count_basic_blocks() > 0 => {
                self.report(DiagnosticImpl::FunctionAlreadyDefined {
                    function: name.to_string(),
                });
                return None;
            }
            Some(existing) if existing.get_type() != function_type => {
                self.report(DiagnosticImpl::ConflictingDeclaration {
                    function: name.to_string(),
                });
                return None;
            }
            Some(existing) => {
                existing.set_linkage(linkage);
                existing
            }
            None => self.module.add_function(name, function_type, Some(linkage)),
        };

        let nounwind = self
            .context
            .create_enum_attribute(Attribute::get_named_enum_kind_id("nounwind"), 0);
        function.add_attribute(AttributeLoc::Function, nounwind);

        self.create_function_block(function);

        Some(function)
    }

    /// Declares a function defined elsewhere. Redeclaring with the same
    /// signature returns the existing function.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the function in the module
    /// * `function_type` - The LLVM function type
    /// * `linkage` - Linkage of a new declaration
    ///
    /// # Returns
    ///
    /// The declared function, or `None` after reporting a
    /// `ConflictingDeclaration` if the name exists with another signature.
    pub fn declare_function(
        &mut self,
        name: &str,
        function_type: FunctionType<'a>,
        linkage: Linkage,
    ) -> Option<FunctionValue<'a>> {
        match self.module.get_function(name) {
            Some(existing) if existing.get_type() == function_type => Some(existing),
            Some(_) => {
                self.report(DiagnosticImpl::ConflictingDeclaration {
                    function: name.to_string(),
                });
                None
            }
            None => Some(self.module.add_function(name, function_type, Some(linkage))),
        }
    }

    /// Emits the terminator of the current function from its pending return value.
    ///
    /// Without a pending value a non-void function returns the zero value of
    /// its return type.
    ///
    /// # Arguments
    ///
    /// * `return_type` - The declared return type of the current function
    /// * `value` - The pending return value, if a return statement set one
    ///
    /// # Returns
    ///
    /// The `ret` instruction. A value of the wrong type is reported as a
    /// `ReturnTypeMismatch` and replaced by the zero value.
    pub fn build_function_return(
        &mut self,
        return_type: TypeDescriptor,
        value: Option<BasicValueEnum<'a>>,
    ) -> Result<InstructionValue<'a>, CodegenError> {
        let expected = self.convert_type(return_type);

        if let Some(value) = value {
            if Some(value.get_type()) != expected {
                let function = self
                    .current_block()?
                    .get_parent()
                    .map(|function| function.get_name().to_string_lossy().into_owned())
                    .unwrap_or_default();
                let received = self.describe_type(value.get_type());
                self.report(DiagnosticImpl::ReturnTypeMismatch {
                    function,
                    expected: return_type.to_string(),
                    received,
                });
            }
        }

        let instruction = match (return_type, value) {
            (TypeDescriptor::Void, _) => self.builder.build_return(None)?,
            (_, Some(value)) if Some(value.get_type()) == expected => {
                self.builder.build_return(Some(&value))?
            }
            (TypeDescriptor::Int64, _) => {
                let zero = self.context.i64_type().const_zero();
                self.builder.build_return(Some(&zero))?
            }
            (TypeDescriptor::Double, _) => {
                let zero = self.context.f64_type().const_zero();
                self.builder.build_return(Some(&zero))?
            }
        };

        Ok(instruction)
    }

    /// Runs the LLVM verifier over the module.
    pub fn verify(&self) -> Result<(), CodegenError> {
        self.module
            .verify()
            .map_err(|message| CodegenError::Verification(message.to_string()))
    }

    pub fn print_to_string(&self) -> String {
        self.module.print_to_string().to_string()
    }

    /// Saves the current LLVM module to a file.
    pub fn save_module_to_file(&self, output_file: impl AsRef<Path>) -> Result<(), CodegenError> {
        self.module
            .print_to_file(output_file)
            .map_err(|message| CodegenError::Output(message.to_string()))
    }

    fn current_scope(&self) -> Result<&Scope<'a>, CodegenError> {
        self.scopes.last().ok_or(CodegenError::NoActiveScope)
    }

    fn current_scope_mut(&mut self) -> Result<&mut Scope<'a>, CodegenError> {
        self.scopes.last_mut().ok_or(CodegenError::NoActiveScope)
    }

    /// Creates the entry basic block for a function and enters its scope.
    fn create_function_block(&mut self, function: FunctionValue<'a>) {
        let entry = self.context.append_basic_block(function, "entry");
        self.enter_scope(entry);
    }
}

/// Generates a program and hands back the finished module.
///
/// A run that reported any diagnostic is rejected with all of them, even
/// though the walk itself completed.
///
/// # Arguments
///
/// * `ast` - The top-level block of the program
/// * `options` - Module and entry function names, and whether to verify
/// * `context` - Reference to the LLVM context
///
/// # Returns
///
/// The compiler holding the finished module, `CodegenError::Rejected` with
/// every diagnostic, or the fatal error that stopped generation.
pub fn compile<'a>(
    ast: &BlockStmt,
    options: CompilerOptions,
    context: &'a Context,
) -> Result<Compiler<'a>, CodegenError> {
    let mut compiler = Compiler::new(context, options);

    compiler.generate(ast)?;

    if !compiler.diagnostics.is_empty() {
        return Err(CodegenError::Rejected(compiler.take_diagnostics()));
    }

    if compiler.options.verify {
        compiler.verify()?;
    }

    Ok(compiler)
}
