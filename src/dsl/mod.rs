//! Line-oriented front end: `<operation> <json-operand> [<json-operand> ...]`.

pub mod error;
pub mod json;

pub use error::DslError;

use serde_json::Value as Json;
use std::fmt;

use crate::core::value::Value;
use crate::engine::Registry;

#[derive(Debug, Clone, PartialEq)]
pub enum DslOutput {
    None,
    Message(String),
    Value(Value),
}

impl DslOutput {
    pub fn to_json(&self) -> Json {
        match self {
            DslOutput::None => Json::Null,
            DslOutput::Message(s) => Json::String(s.clone()),
            DslOutput::Value(v) => json::to_json(v),
        }
    }
}

impl fmt::Display for DslOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DslOutput::None => Ok(()),
            DslOutput::Message(s) => write!(f, "{}", s),
            DslOutput::Value(v) => write!(f, "{}", v),
        }
    }
}

/// Net count of open brackets, used to join operands spread over lines.
pub fn bracket_balance(line: &str) -> i32 {
    line.chars().fold(0, |acc, c| match c {
        '[' | '{' => acc + 1,
        ']' | '}' => acc - 1,
        _ => acc,
    })
}

fn is_comment(line: &str) -> bool {
    line.is_empty() || line.starts_with('#') || line.starts_with("//")
}

/// Splits a script into complete statements, tagged with the line they
/// start on. Comments and blank lines between statements are skipped.
pub fn statements(script: &str) -> Result<Vec<(usize, String)>, DslError> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut start_line = 0;
    let mut balance = 0;

    for (idx, raw_line) in script.lines().enumerate() {
        let line = raw_line.trim();
        if current.is_empty() {
            if is_comment(line) {
                continue;
            }
            start_line = idx + 1;
        } else {
            current.push(' ');
        }
        current.push_str(line);
        balance += bracket_balance(line);

        if balance <= 0 {
            out.push((start_line, std::mem::take(&mut current)));
            balance = 0;
        }
    }

    if !current.is_empty() {
        return Err(DslError::Parse {
            line: start_line,
            msg: "Unexpected end of script (unbalanced brackets?)".into(),
        });
    }
    Ok(out)
}

/// Runs every statement of a script, stopping at the first error.
pub fn execute_script(registry: &Registry, script: &str) -> Result<Vec<DslOutput>, DslError> {
    statements(script)?
        .into_iter()
        .map(|(line_no, stmt)| execute_line(registry, &stmt, line_no))
        .collect()
}

/// Ejecuta una sola línea
pub fn execute_line(registry: &Registry, line: &str, line_no: usize) -> Result<DslOutput, DslError> {
    let line = line.trim();
    if is_comment(line) {
        return Ok(DslOutput::None);
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    if name.eq_ignore_ascii_case("OPS") && rest.is_empty() {
        return Ok(DslOutput::Message(describe(registry)));
    }

    let args = parse_operands(rest, line_no)?;
    if args.is_empty() {
        return Err(DslError::Parse {
            line: line_no,
            msg: format!("'{}' needs at least one operand", name),
        });
    }

    registry
        .call(name, &args)
        .map(DslOutput::Value)
        .map_err(|source| DslError::Engine {
            line: line_no,
            source,
        })
}

fn parse_operands(text: &str, line_no: usize) -> Result<Vec<Value>, DslError> {
    let parse_error = |msg: String| DslError::Parse { line: line_no, msg };
    serde_json::Deserializer::from_str(text)
        .into_iter::<Json>()
        .map(|operand| {
            let operand = operand.map_err(|e| parse_error(format!("invalid operand: {}", e)))?;
            json::from_json(&operand).map_err(|e| parse_error(e.to_string()))
        })
        .collect()
}

/// One line per operation with its signature table.
pub fn describe(registry: &Registry) -> String {
    let mut out = String::new();
    for op in registry.operations() {
        out.push_str(op.name());
        if !op.dependencies().is_empty() {
            out.push_str(&format!(" (uses {})", op.dependencies().join(", ")));
        }
        out.push('\n');
        for signature in op.signatures() {
            out.push_str(&format!("  {}\n", signature));
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngineConfig;
    use crate::engine::EngineError;

    fn registry() -> Registry {
        Registry::with_config(EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_execute_line_calls_operation() {
        let out = execute_line(&registry(), "fix [3.2, 3.8, -4.7]", 1).unwrap();
        assert_eq!(out, DslOutput::Value(Value::numbers(&[3.0, 3.0, -4.0])));
        assert_eq!(out.to_string(), "[3, 3, -4]");
    }

    #[test]
    fn test_statements_join_multiline_operands() {
        let script = "# comment\nfix {\"dense\": [[1.5, -1.5],\n  [2.5, 0]]}\n\nfloor 2.5\n";
        let stmts = statements(script).unwrap();
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].0, 2);
        assert_eq!(stmts[1], (5, "floor 2.5".to_string()));
        assert!(statements("fix [1,\n").is_err());
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = execute_line(&registry(), "fix [1] [2]", 7).unwrap_err();
        assert!(matches!(
            err,
            DslError::Engine { line: 7, source: EngineError::UnsupportedOperandKinds { .. } }
        ));
        let err = execute_line(&registry(), "fix [1", 3).unwrap_err();
        assert_eq!(err.line(), 3);
        assert!(matches!(err, DslError::Parse { .. }));
    }

    #[test]
    fn test_ops_lists_signatures() {
        let text = describe(&registry());
        assert!(text.starts_with("floor"));
        assert!(text.contains("fix (uses floor, ceil)"));
        assert!(text.contains("  (Number, Number | Decimal)"));
    }
}
