use thiserror::Error;

use crate::engine::EngineError;

/// Errores de la línea de comandos, con el número de línea
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DslError {
    #[error("[line {line}] Parse error: {msg}")]
    Parse { line: usize, msg: String },

    #[error("[line {line}] Engine error: {source}")]
    Engine { line: usize, source: EngineError },
}

impl DslError {
    pub fn line(&self) -> usize {
        match self {
            DslError::Parse { line, .. } | DslError::Engine { line, .. } => *line,
        }
    }
}
