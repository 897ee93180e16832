// src/dsl/json.rs

//! JSON operand codec used by the command line.
//!
//! - number → Number, array → Sequence
//! - `{"re": .., "im": ..}` → Complex
//! - `{"decimal": "3.18"}` → Decimal, `{"rational": "7/2"}` → Rational
//! - `{"dense": [[..], ..]}` → DenseMatrix
//! - `{"sparse": {"shape": [r, c], "entries": [[i, j, v], ..]}}` → SparseMatrix

use num_rational::BigRational;
use serde_json::{json, Map, Value as Json};

use crate::core::matrix::{DenseMatrix, Matrix, SparseMatrix};
use crate::core::scalar::Scalar;
use crate::core::value::Value;
use crate::engine::EngineError;

fn invalid(msg: impl Into<String>) -> EngineError {
    EngineError::InvalidValue(msg.into())
}

pub fn from_json(json: &Json) -> Result<Value, EngineError> {
    match json {
        Json::Number(n) => n
            .as_f64()
            .map(Value::from)
            .ok_or_else(|| invalid(format!("{} is not representable as a number", n))),
        Json::Array(items) => items
            .iter()
            .map(from_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Sequence),
        Json::Object(fields) => from_object(fields),
        other => Err(invalid(format!("unsupported operand: {}", other))),
    }
}

fn from_object(fields: &Map<String, Json>) -> Result<Value, EngineError> {
    if let Some(literal) = fields.get("decimal") {
        return Scalar::decimal(&literal_text(literal)?).map(Value::Scalar);
    }
    if let Some(literal) = fields.get("rational") {
        let text = literal_text(literal)?;
        return text
            .trim()
            .parse::<BigRational>()
            .map(|r| Value::Scalar(Scalar::Rational(r)))
            .map_err(|e| invalid(format!("'{}' is not a rational: {}", text, e)));
    }
    if let Some(rows) = fields.get("dense") {
        let Json::Array(items) = rows else {
            return Err(invalid("dense matrix expects a nested array"));
        };
        let items = items.iter().map(from_json).collect::<Result<Vec<_>, _>>()?;
        return Ok(DenseMatrix::from_nested(&items)?.into());
    }
    if let Some(sparse) = fields.get("sparse") {
        return sparse_from_json(sparse);
    }
    if fields.contains_key("re") || fields.contains_key("im") {
        let part = |key: &str| match fields.get(key) {
            None => Ok(0.0),
            Some(v) => v
                .as_f64()
                .ok_or_else(|| invalid(format!("complex '{}' must be a number", key))),
        };
        return Ok(Scalar::complex(part("re")?, part("im")?).into());
    }
    Err(invalid(format!(
        "unrecognised operand object: {}",
        Json::Object(fields.clone())
    )))
}

fn literal_text(literal: &Json) -> Result<String, EngineError> {
    match literal {
        Json::String(s) => Ok(s.clone()),
        Json::Number(n) => Ok(n.to_string()),
        other => Err(invalid(format!("expected a string or number, got {}", other))),
    }
}

fn index(json: &Json, what: &str) -> Result<usize, EngineError> {
    json.as_u64()
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| invalid(format!("{} must be a non-negative integer, got {}", what, json)))
}

fn sparse_from_json(sparse: &Json) -> Result<Value, EngineError> {
    let shape = sparse
        .get("shape")
        .and_then(Json::as_array)
        .filter(|dims| dims.len() == 2)
        .ok_or_else(|| invalid("sparse matrix needs \"shape\": [rows, cols]"))?;
    let rows = index(&shape[0], "rows")?;
    let cols = index(&shape[1], "cols")?;

    let mut triplets = Vec::new();
    if let Some(entries) = sparse.get("entries") {
        let entries = entries
            .as_array()
            .ok_or_else(|| invalid("sparse \"entries\" must be an array"))?;
        for entry in entries {
            let parts = entry
                .as_array()
                .filter(|p| p.len() == 3)
                .ok_or_else(|| invalid(format!("sparse entry {} is not [row, col, value]", entry)))?;
            let value = match from_json(&parts[2])? {
                Value::Scalar(s) => s,
                other => {
                    return Err(invalid(format!(
                        "sparse entry value must be a scalar, got {}",
                        other.kind()
                    )))
                }
            };
            triplets.push((index(&parts[0], "row")?, index(&parts[1], "col")?, value));
        }
    }
    Ok(SparseMatrix::from_triplets(rows, cols, triplets)?.into())
}

pub fn scalar_to_json(scalar: &Scalar) -> Json {
    match scalar {
        Scalar::Number(v) => json!(v),
        Scalar::Complex(c) => json!({ "re": c.re, "im": c.im }),
        Scalar::Decimal(d) => json!({ "decimal": d.normalized().to_string() }),
        Scalar::Rational(r) => json!({ "rational": r.to_string() }),
    }
}

pub fn to_json(value: &Value) -> Json {
    match value {
        Value::Scalar(s) => scalar_to_json(s),
        Value::Sequence(items) => Json::Array(items.iter().map(to_json).collect()),
        Value::Matrix(Matrix::Dense(m)) => json!({ "dense": to_json(&m.to_nested()) }),
        Value::Matrix(Matrix::Sparse(m)) => {
            let entries: Vec<Json> = m
                .iter()
                .map(|(r, c, v)| json!([r, c, scalar_to_json(v)]))
                .collect();
            json!({ "sparse": { "shape": [m.rows(), m.cols()], "entries": entries } })
        }
    }
}
