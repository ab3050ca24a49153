//! Evaluation options, read from the debugger's JSON request.

use crate::error::EvalError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Where to evaluate and which binaries describe the program.
///
/// ```json
/// {
///   "contextBinaries": ["out/geo.dbgi", "out/main.dbgi"],
///   "sourcePath": "src/main.ets",
///   "className": "ETSGLOBAL",
///   "methodName": "main",
///   "bytecodeOffset": 24
/// }
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateOptions {
    #[serde(default)]
    pub context_binaries: Vec<PathBuf>,
    /// Source path of the module the debuggee is stopped in.
    pub source_path: String,
    /// Class of the suspended method; simple or `module.Name`.
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub method_name: Option<String>,
    #[serde(default)]
    pub bytecode_offset: u32,
    /// Overrides the module name recorded in the context binary.
    #[serde(default)]
    pub module_name: Option<String>,
}

impl EvaluateOptions {
    pub fn new(source_path: impl Into<String>) -> Self {
        EvaluateOptions {
            source_path: source_path.into(),
            ..EvaluateOptions::default()
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, EvalError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, EvalError> {
        let text = std::fs::read_to_string(path)?;
        let mut options = Self::from_json_str(&text)?;
        // Relative binary paths are relative to the options file.
        if let Some(base) = path.parent() {
            for binary in &mut options.context_binaries {
                if binary.is_relative() {
                    *binary = base.join(&*binary);
                }
            }
        }
        Ok(options)
    }

    /// Breakpoint location inside a method, when the request names one.
    pub fn method_location(&self) -> Option<(&str, &str)> {
        Some((self.class_name.as_deref()?, self.method_name.as_deref()?))
    }
}
