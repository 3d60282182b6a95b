//! Toolchain Driver for AOT Compilation
//!
//! Turns a textual IR file into an executable with two external commands,
//! run synchronously in order:
//!
//! ```text
//! <assembler> -filetype=obj -relocation-model=pic -o <output>.o <ir-file>
//! <linker> -fPIE -pie -o <output> <output>.o
//! ```
//!
//! A step that cannot be spawned or exits non-zero stops the pipeline; the
//! link step never runs after a failed assembly.
//!
//! # Environment Variables
//!
//! - `ZAP_LLC`: assembler to use instead of `llc`
//! - `ZAP_CC`: linker driver to use instead of `gcc`

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::error::CodegenError;

/// Default IR-to-object assembler.
pub const DEFAULT_ASSEMBLER: &str = "llc";
/// Default linker driver.
pub const DEFAULT_LINKER: &str = "gcc";

/// A pipeline step, for error reporting.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Stage {
    Assemble,
    Link,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Assemble => write!(f, "assemble"),
            Stage::Link => write!(f, "link"),
        }
    }
}

/// The external programs used to produce an executable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toolchain {
    pub assembler: String,
    pub linker: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Toolchain {
            assembler: DEFAULT_ASSEMBLER.to_owned(),
            linker: DEFAULT_LINKER.to_owned(),
        }
    }
}

impl Toolchain {
    pub fn new(assembler: impl Into<String>, linker: impl Into<String>) -> Self {
        Toolchain {
            assembler: assembler.into(),
            linker: linker.into(),
        }
    }

    /// Defaults overridden by `ZAP_LLC` and `ZAP_CC`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Toolchain {
            assembler: std::env::var("ZAP_LLC").unwrap_or(defaults.assembler),
            linker: std::env::var("ZAP_CC").unwrap_or(defaults.linker),
        }
    }

    /// Object file path for `output`: the same path with `.o` appended.
    pub fn object_path(output: &Path) -> PathBuf {
        let mut object = OsString::from(output.as_os_str());
        object.push(".o");
        PathBuf::from(object)
    }

    pub fn assemble_command(&self, ir: &Path, object: &Path) -> Command {
        let mut cmd = Command::new(&self.assembler);
        cmd.arg("-filetype=obj")
            .arg("-relocation-model=pic")
            .arg("-o")
            .arg(object)
            .arg(ir);
        cmd
    }

    pub fn link_command(&self, object: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.linker);
        cmd.arg("-fPIE").arg("-pie").arg("-o").arg(output).arg(object);
        cmd
    }

    pub fn assemble(&self, ir: &Path, object: &Path) -> Result<(), CodegenError> {
        run(Stage::Assemble, &mut self.assemble_command(ir, object))
    }

    pub fn link(&self, object: &Path, output: &Path) -> Result<(), CodegenError> {
        run(Stage::Link, &mut self.link_command(object, output))
    }

    /// Assemble `ir` and link the result into `output`.
    ///
    /// Returns the path of the intermediate object file.
    pub fn assemble_and_link(&self, ir: &Path, output: &Path) -> Result<PathBuf, CodegenError> {
        let object = Self::object_path(output);
        self.assemble(ir, &object)?;
        self.link(&object, output)?;
        info!(output = %output.display(), "linked executable");
        Ok(object)
    }
}

/// Render a command the way a shell user would type it.
pub fn render_command(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

fn run(stage: Stage, cmd: &mut Command) -> Result<(), CodegenError> {
    let command = render_command(cmd);
    debug!(%stage, %command, "running external tool");

    let output = cmd.output().map_err(|source| CodegenError::Spawn {
        stage,
        tool: cmd.get_program().to_string_lossy().into_owned(),
        source,
    })?;

    if output.status.success() {
        return Ok(());
    }

    Err(CodegenError::ExternalTool {
        stage,
        command,
        exit_code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
