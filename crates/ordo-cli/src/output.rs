//! Shared output layer for human/JSON parity across CLI commands.
//!
//! Every command handler receives an [`OutputMode`]. Results go to stdout,
//! errors to stderr, in the same mode.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--json` flag
//! 2. `ORDO_FORMAT` env var: `"json"` | `"human"`
//! 3. Default: [`OutputMode::Human`]

use ordo_core::api::Envelope;
use ordo_core::{ErrorCode, StoreError};
use serde::Serialize;
use std::io::{self, Write};

/// Environment variable selecting the default output mode.
pub const FORMAT_ENV_VAR: &str = "ORDO_FORMAT";

/// Shared width for human separators.
pub const RULE_WIDTH: usize = 60;

/// Write a horizontal separator.
pub fn rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = RULE_WIDTH)
}

/// Render a left-aligned key/value line in human output.
pub fn kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Plain text for terminals.
    Human,
    /// Machine-readable JSON, one document per invocation.
    Json,
}

impl OutputMode {
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

fn resolve_output_mode_inner(json_flag: bool, format_env: Option<&str>) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }
    match format_env.map(str::to_ascii_lowercase).as_deref() {
        Some("json") => OutputMode::Json,
        _ => OutputMode::Human,
    }
}

/// Resolve the output mode from the `--json` flag and `ORDO_FORMAT`.
pub fn resolve_output_mode(json_flag: bool) -> OutputMode {
    let env_val = std::env::var(FORMAT_ENV_VAR).ok();
    resolve_output_mode_inner(json_flag, env_val.as_deref())
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable `E####` code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    fn coded(message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }

    /// Build from a failed request-layer response.
    pub fn from_envelope(envelope: &Envelope) -> Self {
        match envelope.error_code {
            Some(code) => Self::coded(&envelope.message, code),
            None => Self::new(&envelope.message),
        }
    }
}

impl From<&StoreError> for CliError {
    fn from(err: &StoreError) -> Self {
        Self::coded(err.to_string(), err.code())
    }
}

/// Render a serializable value to stdout in the requested format.
///
/// In JSON mode the value is serialized with `serde_json`; otherwise
/// `human_fn` writes the text form.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Human => human_fn(value, &mut out)?,
    }
    Ok(())
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(mode, error, &mut out)?;
    Ok(())
}

fn write_error(mode: OutputMode, error: &CliError, out: &mut dyn Write) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({ "error": error });
            serde_json::to_writer_pretty(&mut *out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Human => {
            match &error.error_code {
                Some(code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(suggestion) = &error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_wins_over_env() {
        assert_eq!(
            resolve_output_mode_inner(true, Some("human")),
            OutputMode::Json
        );
    }

    #[test]
    fn env_selects_json_case_insensitively() {
        assert_eq!(resolve_output_mode_inner(false, Some("JSON")), OutputMode::Json);
        assert_eq!(resolve_output_mode_inner(false, Some("bogus")), OutputMode::Human);
        assert_eq!(resolve_output_mode_inner(false, None), OutputMode::Human);
    }

    #[test]
    fn store_error_carries_code_and_hint() {
        let err = StoreError::InvalidPosition {
            position: 5,
            len: 2,
        };
        let cli = CliError::from(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E2006"));
        assert!(cli.suggestion.is_some());
        assert!(cli.message.contains("out of range"));
    }

    #[test]
    fn human_error_includes_code_and_suggestion() {
        let err = CliError::from(&StoreError::EmptyList);
        let mut buf = Vec::new();
        write_error(OutputMode::Human, &err, &mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("error[E3001]: cannot reorder an empty list"));
        assert!(text.contains("suggestion:"));
    }

    #[test]
    fn json_error_is_wrapped() {
        let err = CliError::new("boom");
        let mut buf = Vec::new();
        write_error(OutputMode::Json, &err, &mut buf).expect("write");
        let value: serde_json::Value = serde_json::from_slice(&buf).expect("json");
        assert_eq!(value["error"]["message"], "boom");
        assert!(value["error"].get("error_code").is_none());
    }
}
