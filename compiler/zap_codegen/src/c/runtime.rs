//! C runtime interface.
//!
//! Generated C includes one runtime header. It provides the fixed-width and
//! boolean types the type mapping relies on, the `<math.h>` macros `NAN`
//! and `INFINITY`, plus the functions below.

/// Functions the runtime header declares. Calls to these resolve even
/// though no descriptor was registered for them.
pub const RUNTIME_SYMBOLS: &[&str] = &["println", "puts", "printf", "str_concat"];

/// Runtime routine that `~` lowers to.
pub const STR_CONCAT: &str = "str_concat";

pub fn is_runtime_symbol(name: &str) -> bool {
    RUNTIME_SYMBOLS.contains(&name)
}

/// The fixed first lines of every generated file.
pub fn preamble(header: &str) -> String {
    format!("#include \"{header}\"\n\n")
}

/// A float constant as C source. `{:?}` keeps the fractional part (`2.0`,
/// not `2`); non-finite values have no literal form and use the macros.
pub fn float_literal(value: f64) -> String {
    if value.is_nan() {
        "NAN".to_owned()
    } else if value.is_infinite() {
        if value.is_sign_negative() { "-INFINITY" } else { "INFINITY" }.to_owned()
    } else {
        format!("{value:?}")
    }
}

/// Quote `s` as a C string literal.
pub fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        escape_into(&mut out, c, '"');
    }
    out.push('"');
    out
}

/// Quote `c` as a C character literal.
pub fn char_literal(c: char) -> String {
    let mut out = String::with_capacity(4);
    out.push('\'');
    escape_into(&mut out, c, '\'');
    out.push('\'');
    out
}

fn escape_into(out: &mut String, c: char, quote: char) {
    match c {
        '\\' => out.push_str("\\\\"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        c if c == quote => {
            out.push('\\');
            out.push(c);
        }
        // Octal, not hex: C hex escapes swallow every following hex digit.
        c if c.is_ascii_control() => out.push_str(&format!("\\{:03o}", u32::from(c))),
        c => out.push(c),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn preamble_is_include_and_blank_line() {
        assert_eq!(preamble("zap_std.h"), "#include \"zap_std.h\"\n\n");
    }

    #[test]
    fn string_escapes() {
        assert_eq!(string_literal("hi \"you\"\n"), r#""hi \"you\"\n""#);
        assert_eq!(string_literal("a\\b"), r#""a\\b""#);
        assert_eq!(string_literal("\u{1b}1"), r#""\0331""#);
        assert_eq!(string_literal("\u{0}7"), r#""\0007""#);
    }

    #[test]
    fn float_literals() {
        assert_eq!(float_literal(2.0), "2.0");
        assert_eq!(float_literal(-0.5), "-0.5");
        assert_eq!(float_literal(f64::NAN), "NAN");
        assert_eq!(float_literal(f64::INFINITY), "INFINITY");
        assert_eq!(float_literal(f64::NEG_INFINITY), "-INFINITY");
    }

    #[test]
    fn char_escapes() {
        assert_eq!(char_literal('a'), "'a'");
        assert_eq!(char_literal('\''), r"'\''");
        assert_eq!(char_literal('"'), "'\"'");
    }

    #[test]
    fn runtime_symbols() {
        assert!(is_runtime_symbol("println"));
        assert!(is_runtime_symbol(STR_CONCAT));
        assert!(!is_runtime_symbol("foo"));
    }
}
