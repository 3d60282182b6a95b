//! Indented text output for the C backend.

/// Output buffer with an indentation level of four spaces per step.
#[derive(Debug, Default)]
pub struct SourceWriter {
    output: String,
    indent: usize,
}

impl SourceWriter {
    pub fn new() -> Self {
        SourceWriter {
            output: String::with_capacity(4096),
            indent: 0,
        }
    }

    /// Increase indentation level.
    pub fn indent(&mut self) {
        self.indent += 1;
    }

    /// Decrease indentation level.
    pub fn dedent(&mut self) {
        debug_assert!(self.indent > 0, "dedent called with zero indent");
        self.indent = self.indent.saturating_sub(1);
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
    }

    /// Write without indentation or newline.
    pub fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    /// Write a line with indentation and newline.
    pub fn writeln(&mut self, s: &str) {
        self.write_indent();
        self.output.push_str(s);
        self.output.push('\n');
    }

    /// Take the generated output.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}
