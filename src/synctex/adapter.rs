//! Forward and reverse correspondence queries

use std::io;
use std::path::Path;
use std::sync::Arc;

use log::{debug, error, warn};

use super::parse::{parse_forward, parse_reverse};
use super::runner::{CommandRunner, ProcessRunner};
use super::types::{RenderPosition, SourcePosition};

pub const DEFAULT_SYNCTEX_COMMAND: &str = "synctex";

/// The tool could not be started at all.
///
/// "No correspondence" is not an error; it is reported as `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum SyncTexError {
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Drives the external correspondence tool, one process per call
#[derive(Clone)]
pub struct SyncTex {
    program: String,
    runner: Arc<dyn CommandRunner>,
}

impl std::fmt::Debug for SyncTex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncTex")
            .field("program", &self.program)
            .finish_non_exhaustive()
    }
}

impl Default for SyncTex {
    fn default() -> Self {
        Self::new(DEFAULT_SYNCTEX_COMMAND)
    }
}

impl SyncTex {
    /// Use the real process runner with the given program name
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self::with_runner(program, Arc::new(ProcessRunner))
    }

    #[must_use]
    pub fn with_runner(program: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            program: program.into(),
            runner,
        }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Argument vector for a `view` request: `line:column:source` into `pdf`
    #[must_use]
    pub fn forward_args(source: &Path, line: u32, column: u32, pdf: &Path) -> Vec<String> {
        vec![
            "view".to_string(),
            "-i".to_string(),
            format!("{line}:{column}:{}", source.display()),
            "-o".to_string(),
            pdf.display().to_string(),
        ]
    }

    /// Argument vector for an `edit` request: `page:x:y:pdf`
    #[must_use]
    pub fn reverse_args(pdf: &Path, page: u32, x: f64, y: f64) -> Vec<String> {
        vec![
            "edit".to_string(),
            "-o".to_string(),
            format!("{page}:{x}:{y}:{}", pdf.display()),
        ]
    }

    /// Map a source location to a point on a rendered page
    pub fn forward_sync(
        &self,
        source: &Path,
        line: u32,
        column: u32,
        pdf: &Path,
    ) -> Result<Option<RenderPosition>, SyncTexError> {
        let args = Self::forward_args(source, line, column, pdf);
        let Some(stdout) = self.invoke(&args, "forward")? else {
            return Ok(None);
        };

        let position = parse_forward(&stdout);
        if position.is_none() {
            debug!("No page/x/y in synctex view output for {source:?}:{line}:{column}");
        }
        Ok(position)
    }

    /// Map a point on a rendered page back to a source location
    pub fn reverse_sync(
        &self,
        pdf: &Path,
        page: u32,
        x: f64,
        y: f64,
    ) -> Result<Option<SourcePosition>, SyncTexError> {
        let args = Self::reverse_args(pdf, page, x, y);
        let Some(stdout) = self.invoke(&args, "reverse")? else {
            return Ok(None);
        };

        let position = parse_reverse(&stdout);
        if position.is_none() {
            debug!("No input/line in synctex edit output for {pdf:?} page {page}");
        }
        Ok(position)
    }

    /// Run the tool; `Ok(None)` on a non-zero exit
    fn invoke(&self, args: &[String], direction: &str) -> Result<Option<String>, SyncTexError> {
        debug!("Running {} {:?}", self.program, args);

        let output = self.runner.run(&self.program, args).map_err(|source| {
            error!("Failed to start {direction} synctex ({}): {source}", self.program);
            SyncTexError::Launch {
                program: self.program.clone(),
                source,
            }
        })?;

        if !output.is_success() {
            match output.code {
                Some(code) => warn!("{direction} synctex exited with code {code}"),
                None => warn!("{direction} synctex terminated by signal"),
            }
            return Ok(None);
        }

        Ok(Some(output.stdout))
    }
}
