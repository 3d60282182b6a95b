//! Fatal code generation errors.
//!
//! Unlike lowering diagnostics these stop the operation that raised them:
//! a file that cannot be written, or a toolchain step that failed. The
//! remaining pipeline stages are not attempted.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use zap_diagnostic::{Diagnostic, ErrorCode};

use crate::aot::Stage;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("cannot write `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not run {stage} command `{tool}`: {source}")]
    Spawn {
        stage: Stage,
        tool: String,
        #[source]
        source: io::Error,
    },
    #[error("{stage} step failed ({}): {command}", exit_status(.exit_code))]
    ExternalTool {
        stage: Stage,
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },
}

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_owned(),
    }
}

impl CodegenError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CodegenError::Io { .. } => ErrorCode::E5001,
            CodegenError::Spawn { .. } | CodegenError::ExternalTool { .. } => ErrorCode::E5002,
        }
    }

    /// Render as a diagnostic, for callers that print everything uniformly.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code()).with_message(self.to_string());
        match self {
            CodegenError::ExternalTool { stderr, .. } if !stderr.trim().is_empty() => {
                diag.with_note(stderr.trim().to_owned())
            }
            _ => diag,
        }
    }
}
