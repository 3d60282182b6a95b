//! LLVM backend end to end: compile, write IR, drive the toolchain.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use inkwell::context::Context;
use zap_codegen::{CodegenError, CodegenOptions, LlvmCompiler, Stage, Toolchain};
use zap_diagnostic::ErrorCode;
use zap_ir::{NodeArena, TypeDesc};

fn hello_program() -> NodeArena {
    let mut arena = NodeArena::new();
    let msg = arena.string("Hello, world!");
    let call = arena.call("println", vec![msg], TypeDesc::VOID);
    let stmt = arena.expr_stmt(call);
    let zero = arena.int(0);
    let ret = arena.ret(Some(zero));
    arena.function("main", vec![], TypeDesc::INT32, vec![stmt, ret]);
    arena
}

#[test]
fn ir_file_matches_module_text() {
    let context = Context::create();
    let mut compiler = LlvmCompiler::new(&context, CodegenOptions::default());
    let report = compiler.compile(&hello_program());
    assert!(!report.has_errors());
    assert_eq!(compiler.verify(), Ok(()));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hello.ll");
    compiler.emit_ir_to_file(&path).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, compiler.ir_text());
    assert!(written.contains("c\"Hello, world!\\00\""));
    assert!(written.contains("  call void @println(i8* getelementptr"));
    assert!(written.contains("  ret i32 0\n}\n"));
}

#[test]
fn unwritable_ir_path_is_an_io_error() {
    let context = Context::create();
    let compiler = LlvmCompiler::new(&context, CodegenOptions::default());
    let dir = tempfile::tempdir().unwrap();
    let err = compiler
        .emit_ir_to_file(&dir.path().join("no").join("such.ll"))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::E5001);
}

#[test]
fn undeclared_callee_marks_compilation_failed() {
    let mut arena = NodeArena::new();
    let call = arena.call("foo", vec![], TypeDesc::VOID);
    let stmt = arena.expr_stmt(call);
    arena.function("main", vec![], TypeDesc::VOID, vec![stmt]);

    let context = Context::create();
    let mut compiler = LlvmCompiler::new(&context, CodegenOptions::default());
    let report = compiler.compile(&arena);
    assert!(report.has_errors());
    assert_eq!(report.errors().count(), 1);
    assert_eq!(report.functions[0].error_count, 1);
}

#[test]
fn missing_assembler_stops_the_pipeline() {
    let options = CodegenOptions::default()
        .with_toolchain(Toolchain::new("zap-no-such-llc", "zap-no-such-cc"));
    let context = Context::create();
    let mut compiler = LlvmCompiler::new(&context, options);
    compiler.compile(&hello_program());

    let dir = tempfile::tempdir().unwrap();
    let ir = dir.path().join("hello.ll");
    compiler.emit_ir_to_file(&ir).unwrap();

    let err = compiler
        .assemble_and_link(&ir, &dir.path().join("hello"))
        .unwrap_err();
    assert!(matches!(
        err,
        CodegenError::Spawn {
            stage: Stage::Assemble,
            ..
        }
    ));
}

#[cfg(unix)]
#[test]
fn failing_linker_reports_command_and_exit_code() {
    let options = CodegenOptions::default().with_toolchain(Toolchain::new("true", "false"));
    let context = Context::create();
    let compiler = LlvmCompiler::new(&context, options);
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("app");

    let err = compiler
        .assemble_and_link(&dir.path().join("app.ll"), &output)
        .unwrap_err();
    match &err {
        CodegenError::ExternalTool {
            stage,
            command,
            exit_code,
            ..
        } => {
            assert_eq!(*stage, Stage::Link);
            assert_eq!(*exit_code, Some(1));
            assert!(command.starts_with("false -fPIE -pie -o"));
        }
        other => panic!("expected a link failure, got {other:?}"),
    }
    assert_eq!(err.to_diagnostic().code, ErrorCode::E5002);
}
