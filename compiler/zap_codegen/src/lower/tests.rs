//! Traversal tests against a backend that records every leaf call.

use pretty_assertions::assert_eq;
use zap_diagnostic::ErrorCode;
use zap_ir::{BinaryOp, FunctionDecl, Literal, NodeArena, Param, TypeDesc, UnaryOp};
use zap_sema::{StorageHandle, SymbolTable, VariableSymbol};

use crate::driver::{lower_module, CodegenReport};
use crate::lower::FunctionState;
use crate::traits::{BackendTypes, BuilderMethods, CodegenMethods, LowerError, Place, TypeMethods};

#[derive(Default)]
struct Recorder {
    log: Vec<String>,
    next_slot: u32,
}

impl Recorder {
    fn slot(&mut self) -> StorageHandle {
        let handle = StorageHandle::new(self.next_slot);
        self.next_slot += 1;
        handle
    }
}

impl BackendTypes for Recorder {
    type Value = String;
    type Type = TypeDesc;
}

impl TypeMethods for Recorder {
    fn map_type(&self, ty: &TypeDesc) -> TypeDesc {
        *ty
    }

    fn zero_value(&self, _ty: &TypeDesc) -> Result<String, LowerError> {
        Ok("zero".into())
    }
}

impl BuilderMethods for Recorder {
    fn literal(&mut self, literal: &Literal, _ty: &TypeDesc) -> Result<Option<String>, LowerError> {
        Ok(match literal {
            Literal::Int(v) => Some(v.to_string()),
            Literal::Void => None,
            other => Some(format!("{other:?}")),
        })
    }

    fn load(&mut self, var: &VariableSymbol, handle: StorageHandle) -> Result<String, LowerError> {
        self.log.push(format!("load {} {handle}", var.name));
        Ok(var.name.clone())
    }

    fn address_of(&mut self, var: &VariableSymbol, handle: StorageHandle) -> Result<String, LowerError> {
        self.log.push(format!("addr {} {handle}", var.name));
        Ok(format!("&{}", var.name))
    }

    fn unary(
        &mut self,
        op: UnaryOp,
        operand: String,
        _operand_ty: &TypeDesc,
        _ty: &TypeDesc,
    ) -> Result<String, LowerError> {
        Ok(format!("{}{operand}", op.token()))
    }

    fn binary(
        &mut self,
        op: BinaryOp,
        lhs: String,
        rhs: String,
        _ty: &TypeDesc,
    ) -> Result<String, LowerError> {
        Ok(format!("({lhs} {} {rhs})", op.token()))
    }

    fn call(
        &mut self,
        callee: &str,
        args: Vec<String>,
        ty: &TypeDesc,
    ) -> Result<Option<String>, LowerError> {
        self.log.push(format!("call {callee}({})", args.join(", ")));
        Ok((!ty.is_void()).then(|| format!("{callee}()")))
    }

    fn bind_param(&mut self, param: &Param, index: usize) -> Result<StorageHandle, LowerError> {
        let handle = self.slot();
        self.log.push(format!("param {index} {} {handle}", param.name));
        Ok(handle)
    }

    fn declare_local(
        &mut self,
        name: &str,
        _ty: &TypeDesc,
        init: String,
    ) -> Result<StorageHandle, LowerError> {
        let handle = self.slot();
        self.log.push(format!("let {name} {handle} = {init}"));
        Ok(handle)
    }

    fn store(&mut self, place: Place<String>, value: String) -> Result<(), LowerError> {
        let target = match place {
            Place::Local { handle, .. } => handle.to_string(),
            Place::Deref { pointer, .. } => format!("*{pointer}"),
            Place::Expr { target, .. } => target,
        };
        self.log.push(format!("store {target} = {value}"));
        Ok(())
    }

    fn ret(&mut self, value: Option<String>) -> Result<(), LowerError> {
        self.log.push(format!("ret {}", value.unwrap_or_default()).trim_end().to_owned());
        Ok(())
    }

    fn discard(&mut self, value: Option<String>) {
        if let Some(value) = value {
            self.log.push(format!("discard {value}"));
        }
    }
}

impl CodegenMethods for Recorder {
    fn emit_declaration(&mut self, decl: &FunctionDecl, _ret: &TypeDesc) {
        self.log.push(format!("declare {}", decl.name));
    }

    fn begin_function(&mut self, decl: &FunctionDecl, _ret: &TypeDesc) {
        self.log.push(format!("begin {}", decl.name));
    }

    fn end_function(&mut self, decl: &FunctionDecl, _ret: &TypeDesc, terminated: bool) {
        self.log.push(format!("end {} terminated={terminated}", decl.name));
    }

    fn has_symbol(&self, name: &str) -> bool {
        name == "intrinsic"
    }
}

fn run(arena: &NodeArena) -> (Recorder, SymbolTable, CodegenReport) {
    let mut backend = Recorder::default();
    let mut symbols = SymbolTable::new();
    let report = lower_module(&mut backend, arena, &mut symbols);
    (backend, symbols, report)
}

#[test]
fn let_binds_storage_and_reuses_it() {
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

    let (backend, symbols, report) = run(&arena);
    assert!(report.diagnostics.is_empty());
    assert_eq!(
        backend.log,
        vec![
            "begin main",
            "let x slot0 = 5",
            "load x slot0",
            "store slot0 = (x + 1)",
            "load x slot0",
            "ret x",
            "end main terminated=true",
        ]
    );

    let scope = &symbols.lookup_function("main").unwrap().scope;
    let x = scope.lookup_variable("x").unwrap();
    assert_eq!(x.storage, Some(StorageHandle::new(0)));
}

#[test]
fn use_before_let_is_one_missing_symbol() {
    let mut arena = NodeArena::new();
    let early = arena.ident("x", TypeDesc::INT32);
    let read = arena.expr_stmt(early);
    let zero = arena.int(0);
    let decl = arena.let_("x", TypeDesc::INT32, Some(zero));
    arena.function("f", vec![], TypeDesc::VOID, vec![read, decl]);

    let (backend, _, report) = run(&arena);
    let errors: Vec<_> = report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::E4001);
    assert_eq!(errors[0].node, Some(early));
    assert!(!backend.log.iter().any(|l| l.starts_with("load")));
    // The rest of the body is still lowered.
    assert!(backend.log.contains(&"let x slot0 = 0".to_owned()));
}

#[test]
fn assignment_to_unknown_name_is_reported() {
    let mut arena = NodeArena::new();
    let one = arena.int(1);
    let assign = arena.assign_to("ghost", TypeDesc::INT32, one);
    arena.function("f", vec![], TypeDesc::VOID, vec![assign]);

    let (backend, _, report) = run(&arena);
    let errors: Vec<_> = report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::E4001);
    assert!(errors[0].message.contains("`ghost`"));
    assert!(!backend.log.iter().any(|l| l.starts_with("store")));
}

#[test]
fn redeclaration_gets_fresh_storage() {
    let mut arena = NodeArena::new();
    let one = arena.int(1);
    let first = arena.let_("x", TypeDesc::INT32, Some(one));
    let two = arena.int(2);
    let second = arena.let_("x", TypeDesc::INT32, Some(two));
    let x = arena.ident("x", TypeDesc::INT32);
    let ret = arena.ret(Some(x));
    arena.function("f", vec![], TypeDesc::INT32, vec![first, second, ret]);

    let (backend, symbols, report) = run(&arena);
    assert!(!report.has_errors());
    assert!(backend.log.contains(&"load x slot1".to_owned()));
    let scope = &symbols.lookup_function("f").unwrap().scope;
    assert_eq!(scope.lookup_variable("x").unwrap().storage, Some(StorageHandle::new(1)));
}

#[test]
fn parameters_bound_before_body_and_variadic_skipped() {
    let mut arena = NodeArena::new();
    let n = arena.ident("n", TypeDesc::INT32);
    let ret = arena.ret(Some(n));
    arena.function(
        "f",
        vec![Param::new("n", TypeDesc::INT32), Param::variadic()],
        TypeDesc::INT32,
        vec![ret],
    );

    let (backend, symbols, report) = run(&arena);
    assert!(!report.has_errors());
    assert_eq!(
        backend.log,
        vec![
            "begin f",
            "param 0 n slot0",
            "load n slot0",
            "ret n",
            "end f terminated=true",
        ]
    );
    assert_eq!(symbols.lookup_function("f").unwrap().scope.len(), 1);
}

#[test]
fn let_without_initializer_takes_zero_value() {
    let mut arena = NodeArena::new();
    let decl = arena.let_("flag", TypeDesc::BOOL, None);
    arena.function("f", vec![], TypeDesc::VOID, vec![decl]);

    let (backend, _, _) = run(&arena);
    assert!(backend.log.contains(&"let flag slot0 = zero".to_owned()));
}

#[test]
fn void_let_is_a_type_mismatch() {
    let mut arena = NodeArena::new();
    let decl = arena.let_("nothing", TypeDesc::VOID, None);
    arena.function("f", vec![], TypeDesc::VOID, vec![decl]);

    let (_, symbols, report) = run(&arena);
    assert_eq!(report.errors().next().map(|d| d.code), Some(ErrorCode::E4002));
    assert!(symbols.lookup_function("f").unwrap().scope.is_empty());
}

#[test]
fn return_shape_is_passed_through() {
    let mut arena = NodeArena::new();
    let bare = arena.ret(None);
    arena.function("needs_value", vec![], TypeDesc::INT32, vec![bare]);
    let one = arena.int(1);
    let extra = arena.ret(Some(one));
    arena.function("wants_nothing", vec![], TypeDesc::VOID, vec![extra]);

    let (backend, _, report) = run(&arena);
    assert!(!report.has_errors());
    assert_eq!(
        backend.log,
        vec![
            "begin needs_value",
            "ret",
            "end needs_value terminated=true",
            "begin wants_nothing",
            "ret 1",
            "end wants_nothing terminated=true",
        ]
    );
}

#[test]
fn returning_a_void_call_evaluates_it() {
    let mut arena = NodeArena::new();
    arena.declaration("tick", vec![], TypeDesc::VOID);
    let call = arena.call("tick", vec![], TypeDesc::VOID);
    let ret = arena.ret(Some(call));
    arena.function("f", vec![], TypeDesc::VOID, vec![ret]);

    let (backend, _, report) = run(&arena);
    assert!(!report.has_errors());
    assert_eq!(
        backend.log,
        vec!["declare tick", "begin f", "call tick()", "ret", "end f terminated=true"]
    );
}

#[test]
fn callee_resolves_through_backend_symbols() {
    let mut arena = NodeArena::new();
    let arg = arena.int(3);
    let call = arena.call("intrinsic", vec![arg], TypeDesc::VOID);
    let stmt = arena.expr_stmt(call);
    arena.function("f", vec![], TypeDesc::VOID, vec![stmt]);

    let (backend, _, report) = run(&arena);
    assert!(!report.has_errors());
    assert!(backend.log.contains(&"call intrinsic(3)".to_owned()));
}

#[test]
fn missing_callee_skips_its_arguments() {
    let mut arena = NodeArena::new();
    let ghost = arena.ident("ghost", TypeDesc::INT32);
    let call = arena.call("foo", vec![ghost], TypeDesc::VOID);
    let stmt = arena.expr_stmt(call);
    arena.function("main", vec![], TypeDesc::VOID, vec![stmt]);

    let (_, _, report) = run(&arena);
    let errors: Vec<_> = report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("function `foo`"));
    assert!(report.entry_point);
}

#[test]
fn both_binary_operands_are_reported() {
    let mut arena = NodeArena::new();
    let a = arena.ident("a", TypeDesc::INT32);
    let b = arena.ident("b", TypeDesc::INT32);
    let sum = arena.binary(BinaryOp::Add, a, b, TypeDesc::INT32);
    let stmt = arena.expr_stmt(sum);
    arena.function("f", vec![], TypeDesc::VOID, vec![stmt]);

    let (_, _, report) = run(&arena);
    assert_eq!(report.errors().count(), 2);
    assert_eq!(report.functions[0].error_count, 2);
}

#[test]
fn address_of_requires_a_variable() {
    let mut arena = NodeArena::new();
    let one = arena.int(1);
    let addr = arena.unary(UnaryOp::AddrOf, one, TypeDesc::INT32.pointer());
    let stmt = arena.expr_stmt(addr);
    arena.function("f", vec![], TypeDesc::VOID, vec![stmt]);

    let (_, _, report) = run(&arena);
    assert_eq!(report.errors().next().map(|d| d.code), Some(ErrorCode::E4003));
}

#[test]
fn missing_return_is_a_warning() {
    let mut arena = NodeArena::new();
    arena.function("f", vec![], TypeDesc::INT32, vec![]);

    let (backend, _, report) = run(&arena);
    assert!(!report.has_errors());
    assert_eq!(report.warnings().count(), 1);
    assert_eq!(backend.log.last().map(String::as_str), Some("end f terminated=false"));
}

#[test]
fn functions_finish_in_arena_order() {
    let mut arena = NodeArena::new();
    arena.declaration("ext", vec![], TypeDesc::VOID);
    arena.function("main", vec![], TypeDesc::VOID, vec![]);

    let (_, _, report) = run(&arena);
    let names: Vec<_> = report.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["ext", "main"]);
    assert!(report
        .functions
        .iter()
        .all(|f| f.state == FunctionState::Finalized));
}

#[test]
fn malformed_tree_is_not_lowered() {
    let mut arena = NodeArena::new();
    let dangling = zap_ir::NodeId::new(99);
    let ret = arena.ret(Some(dangling));
    arena.function("f", vec![], TypeDesc::INT32, vec![ret]);

    let (backend, _, report) = run(&arena);
    assert!(report.has_errors());
    assert!(report.errors().all(|d| d.code == ErrorCode::E4004));
    assert!(report.functions.is_empty());
    assert!(backend.log.is_empty());
}
