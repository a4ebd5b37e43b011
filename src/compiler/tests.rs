//! Unit tests for the compiler module.
//!
//! This module contains tests for code generation including:
//! - Literals, variables and assignments
//! - Calls, arithmetic and comparisons
//! - Scopes and pending return values
//! - Function, extern and builtin declarations
//! - Diagnostics for recoverable errors

use inkwell::{
    context::Context,
    module::Linkage,
    types::BasicTypeEnum,
    values::{FunctionValue, InstructionOpcode},
};
use pretty_assertions::assert_eq;

use crate::{
    ast::{
        ast::{Expr, Operator, Stmt},
        statements::{BlockStmt, ExternDeclStmt, VarDeclStmt},
        types::TypeDescriptor,
    },
    errors::errors::CodegenError,
};

use super::{
    compiler::{compile, Compiler, CompilerOptions},
    expr::gen_expression,
    stmt::gen_statement,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Generates `body` as the top-level block of a fresh module.
fn generate(context: &Context, body: Vec<Stmt>) -> Compiler<'_> {
    init_logger();
    let mut compiler = Compiler::new(context, CompilerOptions::default());
    compiler
        .generate(&BlockStmt::new(body))
        .expect("code generation should not fail");
    compiler
}

fn error_names(compiler: &Compiler) -> Vec<String> {
    compiler
        .diagnostics()
        .iter()
        .map(|diagnostic| diagnostic.get_error_name().to_string())
        .collect()
}

/// Opens a `void test()` function so single nodes can be generated inside it.
fn open_test_function<'a>(compiler: &mut Compiler<'a>) -> FunctionValue<'a> {
    let function_type = compiler.function_type(TypeDescriptor::Void, &[], false);
    compiler
        .create_function("test", function_type, Linkage::Internal)
        .expect("test function should be created")
}

fn test_compiler(context: &Context) -> Compiler<'_> {
    init_logger();
    let mut compiler = Compiler::new(context, CompilerOptions::default());
    open_test_function(&mut compiler);
    compiler
}

#[test]
fn test_integer_literal_is_signed_64_bit() {
    let context = Context::create();
    let mut compiler = test_compiler(&context);

    for literal in [0, 42, -7, i64::MIN, i64::MAX] {
        let value = gen_expression(&mut compiler, &Expr::int(literal))
            .unwrap()
            .and_then(|value| value.as_basic())
            .unwrap()
            .into_int_value();

        assert_eq!(value.get_type().get_bit_width(), 64);
        assert_eq!(value.get_sign_extended_constant(), Some(literal));
    }
}

#[test]
fn test_double_literal() {
    let context = Context::create();
    let mut compiler = test_compiler(&context);

    let value = gen_expression(&mut compiler, &Expr::double(2.5))
        .unwrap()
        .and_then(|value| value.as_basic())
        .unwrap()
        .into_float_value();

    assert_eq!(value.get_constant().map(|(constant, _)| constant), Some(2.5));
}

#[test]
fn test_undeclared_variable_read() {
    let context = Context::create();
    let mut compiler = test_compiler(&context);

    let value = gen_expression(&mut compiler, &Expr::symbol("x")).unwrap();

    assert!(value.is_none());
    assert_eq!(error_names(&compiler), vec!["UndeclaredVariable"]);
    assert_eq!(compiler.diagnostics()[0].get_function(), Some("test"));
}

#[test]
fn test_undeclared_assignment_does_not_stop_generation() {
    let context = Context::create();
    let compiler = generate(
        &context,
        vec![
            Stmt::expression(Expr::assign("y", Expr::int(1))),
            Stmt::expression(Expr::call("echo", vec![Expr::int(2)])),
        ],
    );

    assert_eq!(error_names(&compiler), vec!["UndeclaredVariable"]);
    assert!(compiler.print_to_string().contains("call void @echo(i64 2)"));
}

#[test]
fn test_unknown_function() {
    let context = Context::create();
    let mut compiler = test_compiler(&context);

    let value = gen_expression(
        &mut compiler,
        &Expr::call("foo", vec![Expr::int(1), Expr::int(2)]),
    )
    .unwrap();

    assert!(value.is_none());
    assert_eq!(error_names(&compiler), vec!["UnknownFunction"]);
}

#[test]
fn test_declare_and_read_variable() {
    let context = Context::create();
    let mut compiler = test_compiler(&context);

    gen_statement(&mut compiler, &Stmt::var("int", "x", Some(Expr::int(5)))).unwrap();
    let value = gen_expression(&mut compiler, &Expr::symbol("x")).unwrap();

    assert!(compiler.diagnostics().is_empty());
    assert!(value.and_then(|value| value.as_basic()).is_some());

    let ir = compiler.print_to_string();
    assert!(ir.contains("alloca i64"));
    assert!(ir.contains("store i64 5"));
    assert!(ir.contains("load i64"));
}

#[test]
fn test_top_level_variables_are_invisible_in_functions() {
    let context = Context::create();
    let compiler = generate(
        &context,
        vec![
            Stmt::var("int", "x", Some(Expr::int(1))),
            Stmt::function("int", "f", vec![], vec![Stmt::ret(Expr::symbol("x"))]),
        ],
    );

    assert_eq!(error_names(&compiler), vec!["UndeclaredVariable"]);
    assert_eq!(compiler.diagnostics()[0].get_function(), Some("f"));
}

#[test]
fn test_exit_scope_without_scope() {
    let context = Context::create();
    let mut compiler = Compiler::new(&context, CompilerOptions::default());

    assert!(matches!(
        compiler.exit_scope(),
        Err(CodegenError::ScopeUnderflow)
    ));
}

#[test]
fn test_scope_queries_without_scope() {
    let context = Context::create();
    let compiler = Compiler::new(&context, CompilerOptions::default());

    assert!(matches!(
        compiler.lookup("x"),
        Err(CodegenError::NoActiveScope)
    ));
    assert!(matches!(
        compiler.get_return_value(),
        Err(CodegenError::NoActiveScope)
    ));
    assert!(matches!(
        compiler.current_block(),
        Err(CodegenError::NoActiveScope)
    ));
}

#[test]
fn test_exit_scope_restores_builder() {
    let context = Context::create();
    let mut compiler = test_compiler(&context);
    let outer_block = compiler.current_block().unwrap();

    let inner_type = compiler.function_type(TypeDescriptor::Void, &[], false);
    compiler
        .create_function("inner", inner_type, Linkage::Internal)
        .unwrap();
    assert_eq!(compiler.scope_depth(), 2);
    assert_ne!(compiler.builder.get_insert_block(), Some(outer_block));

    compiler.exit_scope().unwrap();
    assert_eq!(compiler.scope_depth(), 1);
    assert_eq!(compiler.builder.get_insert_block(), Some(outer_block));

    compiler.exit_scope().unwrap();
    assert_eq!(compiler.scope_depth(), 0);
    assert_eq!(compiler.builder.get_insert_block(), None);
}

#[test]
fn test_redeclaration_replaces_binding() {
    let context = Context::create();
    let mut compiler = test_compiler(&context);

    gen_statement(&mut compiler, &Stmt::var("int", "x", None)).unwrap();
    gen_statement(
        &mut compiler,
        &Stmt::var("double", "x", Some(Expr::double(1.5))),
    )
    .unwrap();

    let variable = compiler.lookup("x").unwrap().unwrap();
    assert!(compiler.diagnostics().is_empty());
    assert_eq!(variable.ty, BasicTypeEnum::from(context.f64_type()));
}

#[test]
fn test_function_without_return_returns_zero() {
    let context = Context::create();
    let compiler = generate(&context, vec![Stmt::function("int", "f", vec![], vec![])]);

    let function = compiler.module.get_function("f").unwrap();
    let terminator = function
        .get_last_basic_block()
        .and_then(|block| block.get_terminator())
        .unwrap();

    assert!(compiler.diagnostics().is_empty());
    assert_eq!(terminator.get_opcode(), InstructionOpcode::Return);
    assert!(compiler.print_to_string().contains("ret i64 0"));
}

#[test]
fn test_last_return_wins() {
    let context = Context::create();
    let compiler = generate(
        &context,
        vec![Stmt::function(
            "int",
            "f",
            vec![],
            vec![Stmt::ret(Expr::int(1)), Stmt::ret(Expr::int(2))],
        )],
    );

    let ir = compiler.print_to_string();
    assert!(ir.contains("ret i64 2"));
    assert!(!ir.contains("ret i64 1"));
}

#[test]
fn test_parameters_are_stored_in_locals() {
    let context = Context::create();
    let compiler = generate(
        &context,
        vec![Stmt::function(
            "int",
            "identity",
            vec![VarDeclStmt::param("int", "v")],
            vec![Stmt::ret(Expr::symbol("v"))],
        )],
    );

    assert!(compiler.diagnostics().is_empty());
    assert!(compiler.print_to_string().contains("store i64 %v,"));
    compiler.verify().unwrap();
}

#[test]
fn test_extern_declaration_and_call() {
    let context = Context::create();
    let compiler = generate(
        &context,
        vec![
            Stmt::external("int", "add", &["int", "int"]),
            Stmt::expression(Expr::call("add", vec![Expr::int(2), Expr::int(3)])),
        ],
    );

    let add = compiler.module.get_function("add").unwrap();
    assert_eq!(add.get_linkage(), Linkage::External);
    assert_eq!(add.count_basic_blocks(), 0);

    let ir = compiler.print_to_string();
    assert!(ir.contains("declare i64 @add(i64, i64)"));
    assert!(ir.contains("call i64 @add(i64 2, i64 3)"));
}

#[test]
fn test_variadic_extern_accepts_extra_arguments() {
    let context = Context::create();
    let compiler = generate(
        &context,
        vec![
            Stmt::ExternDecl(ExternDeclStmt {
                return_type: String::from("int"),
                identifier: String::from("sum"),
                parameter_types: vec![String::from("int")],
                is_variadic: true,
            }),
            Stmt::expression(Expr::call(
                "sum",
                vec![Expr::int(1), Expr::int(2), Expr::int(3)],
            )),
            Stmt::expression(Expr::call("sum", vec![])),
        ],
    );

    assert_eq!(error_names(&compiler), vec!["ArgumentCountMismatch"]);
    assert!(compiler.module.get_function("sum").unwrap().get_type().is_var_arg());
}

#[test]
fn test_builtins_are_registered() {
    let context = Context::create();
    let compiler = generate(&context, vec![]);

    let printf = compiler.module.get_function("printf").unwrap();
    assert!(printf.get_type().is_var_arg());
    assert_eq!(printf.get_linkage(), Linkage::External);
    assert_eq!(printf.get_call_conventions(), 0);

    let echo = compiler.module.get_function("echo").unwrap();
    assert_eq!(echo.get_linkage(), Linkage::Internal);
    assert_eq!(echo.count_basic_blocks(), 1);
    assert_eq!(echo.count_params(), 1);

    let format = compiler.module.get_global(".str").unwrap();
    assert_eq!(format.get_linkage(), Linkage::Private);
    assert!(format.is_constant());
    assert!(compiler.print_to_string().contains(r#"c"%lld\0A\00""#));
}

#[test]
fn test_entry_function() {
    let context = Context::create();
    let compiler = generate(&context, vec![]);

    let main = compiler.module.get_function("main").unwrap();
    assert_eq!(main.get_linkage(), Linkage::External);
    assert!(main.get_type().get_return_type().is_none());
    assert_eq!(compiler.scope_depth(), 0);
    compiler.verify().unwrap();
}

#[test]
fn test_custom_entry_function_name() {
    init_logger();
    let context = Context::create();
    let options = CompilerOptions {
        entry_function: String::from("program"),
        ..CompilerOptions::default()
    };

    let compiled = compile(&BlockStmt::default(), options, &context).unwrap();

    assert!(compiled.module.get_function("program").is_some());
    assert!(compiled.module.get_function("main").is_none());
}

#[test]
fn test_unmapped_operator() {
    let context = Context::create();
    let mut compiler = test_compiler(&context);

    let value = gen_expression(
        &mut compiler,
        &Expr::binary(Expr::int(1), Operator::Less, Expr::int(2)),
    )
    .unwrap();

    assert!(value.is_none());
    assert_eq!(error_names(&compiler), vec!["UnmappedOperator"]);
}

#[test]
fn test_unmapped_comparator() {
    let context = Context::create();
    let mut compiler = test_compiler(&context);

    let value = gen_expression(
        &mut compiler,
        &Expr::compare(Expr::int(1), Operator::Plus, Expr::int(2)),
    )
    .unwrap();

    assert!(value.is_none());
    assert_eq!(error_names(&compiler), vec!["UnmappedComparator"]);
}

#[test]
fn test_operand_type_mismatch() {
    let context = Context::create();
    let mut compiler = test_compiler(&context);

    let value = gen_expression(
        &mut compiler,
        &Expr::binary(Expr::int(1), Operator::Plus, Expr::double(1.0)),
    )
    .unwrap();

    assert!(value.is_none());
    assert_eq!(error_names(&compiler), vec!["OperandTypeMismatch"]);
}

#[test]
fn test_assignment_type_mismatch() {
    let context = Context::create();
    let mut compiler = test_compiler(&context);

    gen_statement(&mut compiler, &Stmt::var("int", "x", Some(Expr::double(0.5)))).unwrap();

    assert_eq!(error_names(&compiler), vec!["AssignmentTypeMismatch"]);
}

#[test]
fn test_comparison_is_widened_to_int() {
    let context = Context::create();
    let compiler = generate(
        &context,
        vec![Stmt::function(
            "int",
            "below_three",
            vec![VarDeclStmt::param("int", "a")],
            vec![Stmt::ret(Expr::compare(
                Expr::symbol("a"),
                Operator::Less,
                Expr::int(3),
            ))],
        )],
    );

    let ir = compiler.print_to_string();
    assert!(compiler.diagnostics().is_empty());
    assert!(ir.contains("icmp slt i64"));
    assert!(ir.contains("zext i1"));
    compiler.verify().unwrap();
}

#[test]
fn test_float_arithmetic() {
    let context = Context::create();
    let compiler = generate(
        &context,
        vec![Stmt::function(
            "double",
            "half",
            vec![VarDeclStmt::param("double", "d")],
            vec![Stmt::ret(Expr::binary(
                Expr::symbol("d"),
                Operator::Divide,
                Expr::double(2.0),
            ))],
        )],
    );

    assert!(compiler.diagnostics().is_empty());
    assert!(compiler.print_to_string().contains("fdiv double"));
}

#[test]
fn test_argument_mismatches() {
    let context = Context::create();
    let compiler = generate(
        &context,
        vec![
            Stmt::expression(Expr::call("echo", vec![Expr::int(1), Expr::int(2)])),
            Stmt::expression(Expr::call("echo", vec![Expr::double(1.5)])),
        ],
    );

    assert_eq!(
        error_names(&compiler),
        vec!["ArgumentCountMismatch", "ArgumentTypeMismatch"]
    );
}

#[test]
fn test_function_already_defined() {
    let context = Context::create();
    let compiler = generate(
        &context,
        vec![
            Stmt::function("int", "f", vec![], vec![]),
            Stmt::function("int", "f", vec![], vec![]),
        ],
    );

    assert_eq!(error_names(&compiler), vec!["FunctionAlreadyDefined"]);
    assert_eq!(compiler.scope_depth(), 0);
}

#[test]
fn test_rejected_definition_body_is_still_checked() {
    let context = Context::create();
    let compiler = generate(
        &context,
        vec![
            Stmt::function("int", "f", vec![], vec![Stmt::ret(Expr::int(1))]),
            Stmt::function("int", "f", vec![], vec![Stmt::ret(Expr::symbol("y"))]),
            Stmt::external("int", "g", &["int"]),
            Stmt::function(
                "int",
                "g",
                vec![],
                vec![Stmt::expression(Expr::call("missing", vec![]))],
            ),
        ],
    );

    assert_eq!(
        error_names(&compiler),
        vec![
            "FunctionAlreadyDefined",
            "UndeclaredVariable",
            "ConflictingDeclaration",
            "UnknownFunction",
        ]
    );
    assert_eq!(compiler.scope_depth(), 0);

    let f = compiler.module.get_function("f").unwrap();
    assert_eq!(f.get_linkage(), Linkage::Internal);
    assert!(compiler.print_to_string().contains("ret i64 1"));
    assert_eq!(
        compiler.module.get_function("g").unwrap().count_basic_blocks(),
        0
    );
}

#[test]
fn test_extern_completed_by_definition() {
    let context = Context::create();
    let compiler = generate(
        &context,
        vec![
            Stmt::external("int", "twice", &["int"]),
            Stmt::function(
                "int",
                "twice",
                vec![VarDeclStmt::param("int", "v")],
                vec![Stmt::ret(Expr::binary(
                    Expr::symbol("v"),
                    Operator::Multiply,
                    Expr::int(2),
                ))],
            ),
        ],
    );

    let twice = compiler.module.get_function("twice").unwrap();
    assert!(compiler.diagnostics().is_empty());
    assert_eq!(twice.count_basic_blocks(), 1);
    assert_eq!(twice.get_linkage(), Linkage::Internal);
    compiler.verify().unwrap();
}

#[test]
fn test_conflicting_declarations() {
    let context = Context::create();
    let compiler = generate(
        &context,
        vec![
            Stmt::external("int", "g", &["int"]),
            Stmt::function("int", "g", vec![], vec![]),
            Stmt::external("double", "g", &["int"]),
        ],
    );

    assert_eq!(
        error_names(&compiler),
        vec!["ConflictingDeclaration", "ConflictingDeclaration"]
    );
}

#[test]
fn test_void_storage_and_parameters() {
    let context = Context::create();
    let compiler = generate(
        &context,
        vec![
            Stmt::var("void", "v", None),
            Stmt::function("int", "h", vec![VarDeclStmt::param("void", "p")], vec![]),
        ],
    );

    assert_eq!(error_names(&compiler), vec!["VoidStorage", "VoidParameter"]);
    assert!(compiler.module.get_function("h").is_none());
}

#[test]
fn test_return_type_mismatch() {
    let context = Context::create();
    let compiler = generate(
        &context,
        vec![
            Stmt::function("int", "f", vec![], vec![Stmt::ret(Expr::double(1.5))]),
            Stmt::function("void", "g", vec![], vec![Stmt::ret(Expr::int(1))]),
        ],
    );

    assert_eq!(
        error_names(&compiler),
        vec!["ReturnTypeMismatch", "ReturnTypeMismatch"]
    );
    assert!(compiler.print_to_string().contains("ret i64 0"));
}

#[test]
fn test_void_call_is_not_a_value() {
    let context = Context::create();
    let compiler = generate(
        &context,
        vec![Stmt::var(
            "int",
            "x",
            Some(Expr::call("echo", vec![Expr::int(1)])),
        )],
    );

    assert_eq!(error_names(&compiler), vec!["NotAValue"]);
}

#[test]
fn test_nested_function_definition() {
    init_logger();
    let context = Context::create();
    let program = BlockStmt::new(vec![Stmt::function(
        "int",
        "outer",
        vec![],
        vec![
            Stmt::function(
                "int",
                "inner",
                vec![VarDeclStmt::param("int", "v")],
                vec![Stmt::ret(Expr::symbol("v"))],
            ),
            Stmt::ret(Expr::call("inner", vec![Expr::int(4)])),
        ],
    )]);

    let compiled = compile(&program, CompilerOptions::default(), &context).unwrap();

    assert!(compiled.module.get_function("inner").is_some());
    assert!(compiled.print_to_string().contains("call i64 @inner(i64 4)"));
}

#[test]
fn test_compile_rejects_program_with_diagnostics() {
    init_logger();
    let context = Context::create();
    let program = BlockStmt::new(vec![Stmt::expression(Expr::symbol("x"))]);

    match compile(&program, CompilerOptions::default(), &context) {
        Err(CodegenError::Rejected(diagnostics)) => {
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(diagnostics[0].get_error_name(), "UndeclaredVariable");
        }
        Err(error) => panic!("unexpected error: {}", error),
        Ok(_) => panic!("program should be rejected"),
    };
}

#[test]
fn test_save_module_to_file() {
    let context = Context::create();
    let compiler = generate(&context, vec![Stmt::var("int", "x", Some(Expr::int(1)))]);

    let path = std::env::temp_dir().join("irgen_save_module_test.ll");
    compiler.save_module_to_file(&path).unwrap();

    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.contains("define void @main()"));
    let _ = std::fs::remove_file(&path);
}
