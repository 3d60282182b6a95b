use pretty_assertions::assert_eq;
use zap_diagnostic::ErrorCode;
use zap_ir::{BinaryOp, NodeArena, Param, TypeDesc, UnaryOp};

use super::*;

const PREAMBLE: &str = "#include \"zap_std.h\"\n\n";

fn generate(arena: &NodeArena) -> CSource {
    CCodegen::default().generate_source(arena)
}

/// Body of the generated file after the include line.
fn body(source: &CSource) -> &str {
    source
        .code
        .strip_prefix(PREAMBLE)
        .unwrap_or_else(|| panic!("missing preamble in {:?}", source.code))
}

#[test]
fn returns_parenthesized_sum() {
    let mut arena = NodeArena::new();
    let one = arena.int(1);
    let two = arena.int(2);
    let sum = arena.binary(BinaryOp::Add, one, two, TypeDesc::INT32);
    let ret = arena.ret(Some(sum));
    arena.function("main", vec![], TypeDesc::INT32, vec![ret]);

    let source = generate(&arena);
    assert!(!source.report.has_errors());
    assert!(source.report.entry_point);
    assert_eq!(body(&source), "int32_t main()\n{\n    return (1 + 2);\n}\n\n");
}

#[test]
fn declaration_is_a_prototype() {
    let mut arena = NodeArena::new();
    arena.declaration("log", vec![Param::new("msg", TypeDesc::STRING)], TypeDesc::VOID);

    let source = generate(&arena);
    assert!(source.code.ends_with("void log(const char* msg);\n\n"));
    assert!(!source.report.entry_point);
}

#[test]
fn custom_runtime_header() {
    let options = CodegenOptions::default().with_runtime_header("rt.h");
    let source = CCodegen::new(options).generate_source(&NodeArena::new());
    assert_eq!(source.code, "#include \"rt.h\"\n\n");
}

#[test]
fn static_variadic_signature() {
    let mut arena = NodeArena::new();
    arena.alloc_function(
        FunctionDecl {
            name: "fmt".into(),
            params: vec![Param::new("pattern", TypeDesc::STRING), Param::variadic()],
            body: vec![],
            is_declaration: true,
            is_static: true,
        },
        TypeDesc::INT32,
    );

    let source = generate(&arena);
    assert_eq!(body(&source), "static int32_t fmt(const char* pattern, ...);\n\n");
}

#[test]
fn let_assign_and_reuse() {
    let mut arena = NodeArena::new();
    let five = arena.int(5);
    let decl = arena.let_("x", TypeDesc::INT32, Some(five));
    let x = arena.ident("x", TypeDesc::INT32);
    let one = arena.int(1);
    let inc = arena.binary(BinaryOp::Add, x, one, TypeDesc::INT32);
    let assign = arena.assign_to("x", TypeDesc::INT32, inc);
    let x2 = arena.ident("x", TypeDesc::INT32);
    let ret = arena.ret(Some(x2));
    arena.function("main", vec![], TypeDesc::INT32, vec![decl, assign, ret]);

    let source = generate(&arena);
    assert!(!source.report.has_errors());
    assert_eq!(
        body(&source),
        "int32_t main()\n{\n    int32_t x = 5;\n    x = (x + 1);\n    return x;\n}\n\n"
    );

    let main = source.symbols.lookup_function("main").unwrap();
    assert_eq!(main.scope.len(), 1);
    assert!(main.scope.lookup_variable("x").unwrap().storage.is_some());
}

#[test]
fn let_without_initializer_uses_zero_value() {
    let mut arena = NodeArena::new();
    let a = arena.let_("count", TypeDesc::INT32, None);
    let b = arena.let_("name", TypeDesc::STRING, None);
    let c = arena.let_("buf", TypeDesc::CHAR.array(), None);
    arena.function("init", vec![], TypeDesc::VOID, vec![a, b, c]);

    let source = generate(&arena);
    assert_eq!(
        body(&source),
        "void init()\n{\n    int32_t count = 0;\n    const char* name = NULL;\n    char buf[] = {0};\n}\n\n"
    );
}

#[test]
fn literal_spelling() {
    let mut arena = NodeArena::new();
    let f = arena.float(2.0);
    let b = arena.bool(true);
    let c = arena.char('\n');
    let s = arena.string("say \"hi\"");
    let call = arena.call("printf", vec![s, f, b, c], TypeDesc::INT32);
    let stmt = arena.expr_stmt(call);
    arena.function("show", vec![], TypeDesc::VOID, vec![stmt]);

    let source = generate(&arena);
    assert!(!source.report.has_errors());
    assert!(
        source
            .code
            .contains("    printf(\"say \\\"hi\\\"\", 2.0, true, '\\n');\n"),
        "{}",
        source.code
    );
}

#[test]
fn parameters_pointer_store_and_address_of() {
    let mut arena = NodeArena::new();
    let p = arena.ident("p", TypeDesc::INT32.pointer());
    let target = arena.unary(UnaryOp::Deref, p, TypeDesc::INT32);
    let seven = arena.int(7);
    let store = arena.assign(target, seven);
    let v = arena.ident("v", TypeDesc::INT32);
    let addr = arena.unary(UnaryOp::AddrOf, v, TypeDesc::INT32.pointer());
    let keep = arena.let_("q", TypeDesc::INT32.pointer(), Some(addr));
    arena.function(
        "poke",
        vec![
            Param::new("p", TypeDesc::INT32.pointer()),
            Param::new("v", TypeDesc::INT32),
        ],
        TypeDesc::VOID,
        vec![store, keep],
    );

    let source = generate(&arena);
    assert!(!source.report.has_errors());
    assert_eq!(
        body(&source),
        "void poke(int32_t* p, int32_t v)\n{\n    *p = 7;\n    int32_t* q = &v;\n}\n\n"
    );
}

#[test]
fn double_negation_keeps_a_space() {
    let mut arena = NodeArena::new();
    let one = arena.int(1);
    let neg = arena.unary(UnaryOp::Neg, one, TypeDesc::INT32);
    let neg2 = arena.unary(UnaryOp::Neg, neg, TypeDesc::INT32);
    let ret = arena.ret(Some(neg2));
    arena.function("f", vec![], TypeDesc::INT32, vec![ret]);

    let source = generate(&arena);
    assert!(source.code.contains("return - -1;"), "{}", source.code);
}

#[test]
fn concat_calls_runtime() {
    let mut arena = NodeArena::new();
    let a = arena.string("a");
    let b = arena.string("b");
    let cat = arena.binary(BinaryOp::Concat, a, b, TypeDesc::STRING);
    let ret = arena.ret(Some(cat));
    arena.function("both", vec![], TypeDesc::STRING, vec![ret]);

    let source = generate(&arena);
    assert!(source.code.contains("return (str_concat(\"a\", \"b\"));"));
}

#[test]
fn deref_of_non_pointer_is_a_type_mismatch() {
    let mut arena = NodeArena::new();
    let n = arena.int(3);
    let deref = arena.unary(UnaryOp::Deref, n, TypeDesc::INT32);
    let ret = arena.ret(Some(deref));
    arena.function("bad", vec![], TypeDesc::INT32, vec![ret]);

    let source = generate(&arena);
    let errors: Vec<_> = source.report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::E4002);
    assert_eq!(errors[0].function.as_deref(), Some("bad"));
}

#[test]
fn undeclared_call_is_reported_once() {
    let mut arena = NodeArena::new();
    let call = arena.call("foo", vec![], TypeDesc::VOID);
    let stmt = arena.expr_stmt(call);
    arena.function("main", vec![], TypeDesc::VOID, vec![stmt]);

    let source = generate(&arena);
    let errors: Vec<_> = source.report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::E4001);
    assert!(errors[0].message.contains("`foo`"));
    assert_eq!(source.report.functions[0].error_count, 1);
}

#[test]
fn call_to_later_function_resolves() {
    let mut arena = NodeArena::new();
    let call = arena.call("helper", vec![], TypeDesc::VOID);
    let stmt = arena.expr_stmt(call);
    arena.function("main", vec![], TypeDesc::VOID, vec![stmt]);
    arena.function("helper", vec![], TypeDesc::VOID, vec![]);

    let source = generate(&arena);
    assert!(!source.report.has_errors());
    assert!(source.code.contains("    helper();\n"));
}

#[test]
fn return_is_emitted_as_written() {
    let mut arena = NodeArena::new();
    let bare = arena.ret(None);
    arena.function("main", vec![], TypeDesc::INT32, vec![bare]);
    let one = arena.int(1);
    let valued = arena.ret(Some(one));
    arena.function("done", vec![], TypeDesc::VOID, vec![valued]);

    let source = generate(&arena);
    assert!(!source.report.has_errors());
    assert!(source.code.contains("int32_t main()\n{\n    return;\n}\n"), "{}", source.code);
    assert!(source.code.contains("void done()\n{\n    return 1;\n}\n"), "{}", source.code);
}

#[test]
fn non_finite_floats_use_macros() {
    let mut arena = NodeArena::new();
    let nan = arena.float(f64::NAN);
    let a = arena.let_("a", TypeDesc::FLOAT32, Some(nan));
    let inf = arena.float(f64::NEG_INFINITY);
    let b = arena.let_("b", TypeDesc::FLOAT32, Some(inf));
    arena.function("edges", vec![], TypeDesc::VOID, vec![a, b]);

    let source = generate(&arena);
    assert!(!source.report.has_errors());
    assert!(source.code.contains("    float a = NAN;\n"), "{}", source.code);
    assert!(source.code.contains("    float b = -INFINITY;\n"), "{}", source.code);
}
