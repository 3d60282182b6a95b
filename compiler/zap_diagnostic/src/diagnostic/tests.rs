use super::*;

#[test]
fn test_diagnostic_builder() {
    let diag = Diagnostic::error(ErrorCode::E4001)
        .with_message("test error")
        .with_node(NodeId::new(3))
        .in_function("main")
        .with_note("some context");

    assert_eq!(diag.code, ErrorCode::E4001);
    assert_eq!(diag.message, "test error");
    assert!(diag.is_error());
    assert_eq!(diag.node, Some(NodeId::new(3)));
    assert_eq!(diag.function.as_deref(), Some("main"));
    assert_eq!(diag.notes.len(), 1);
}

#[test]
fn test_missing_symbol_helper() {
    let diag = missing_symbol(NodeId::new(0), "function", "foo");

    assert_eq!(diag.code, ErrorCode::E4001);
    assert_eq!(diag.message, "cannot find function `foo`");
    assert!(diag.is_error());
}

#[test]
fn test_missing_return_is_warning() {
    let diag = missing_return("f", "i32");

    assert_eq!(diag.code, ErrorCode::W4001);
    assert!(!diag.is_error());
    assert!(diag.message.contains("`f`"));
    assert!(diag.message.contains("i32"));
}

#[test]
fn test_malformed_tree_points_at_parent() {
    let err = ArenaError::OutOfBounds {
        parent: NodeId::new(2),
        child: NodeId::new(40),
        len: 3,
    };
    let diag = malformed_tree(&err);

    assert_eq!(diag.code, ErrorCode::E4004);
    assert_eq!(diag.node, Some(NodeId::new(2)));
}

#[test]
fn test_diagnostic_display() {
    let diag = type_mismatch(NodeId::new(5), "cannot dereference `i32`").in_function("main");

    let output = diag.to_string();
    assert!(output.starts_with("error [E4002]: cannot dereference `i32`"));
    assert!(output.contains("in `main` at node #5"));
}
