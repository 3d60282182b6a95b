//! Code generation configuration.

use crate::aot::Toolchain;

/// Settings shared by both backends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodegenOptions {
    /// LLVM module identifier.
    pub module_name: String,
    /// `source_filename` recorded in the IR module.
    pub source_filename: String,
    /// Header included at the top of generated C.
    pub runtime_header: String,
    /// External tools for assembling and linking native output.
    pub toolchain: Toolchain,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        CodegenOptions {
            module_name: "zap".to_owned(),
            source_filename: "zap".to_owned(),
            runtime_header: "zap_std.h".to_owned(),
            toolchain: Toolchain::default(),
        }
    }
}

impl CodegenOptions {
    /// Defaults, with the toolchain taken from the environment.
    pub fn from_env() -> Self {
        CodegenOptions {
            toolchain: Toolchain::from_env(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.source_filename.clone_from(&name);
        self.module_name = name;
        self
    }

    #[must_use]
    pub fn with_runtime_header(mut self, header: impl Into<String>) -> Self {
        self.runtime_header = header.into();
        self
    }

    #[must_use]
    pub fn with_toolchain(mut self, toolchain: Toolchain) -> Self {
        self.toolchain = toolchain;
        self
    }
}
