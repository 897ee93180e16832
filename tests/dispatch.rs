// tests/dispatch.rs
//
// Signature resolution, registry construction and configuration effects

use std::sync::Arc;
use typedmath::engine::Dependencies;
use typedmath::{
    Assembler, EngineConfig, EngineError, KindPattern, OperandKindTag, OperationDecl, Registry,
    Scalar, Signature, Value,
};
use OperandKindTag::*;

fn tagged(
    tag: f64,
) -> impl Fn(&typedmath::Operation, &[Value]) -> Result<Value, EngineError> + Send + Sync + 'static {
    move |_, _| Ok(Value::from(tag))
}

#[test]
fn test_most_specific_signature_wins() {
    let op = Assembler::new("probe", &EngineConfig::default())
        .signature(Signature::new([KindPattern::scalar()]), tagged(1.0))
        .signature(Signature::new([Number | Decimal]), tagged(2.0))
        .signature(Signature::new([Number]), tagged(3.0))
        .build();

    assert_eq!(op.call(&[Value::from(1.0)]).unwrap(), Value::from(3.0));
    assert_eq!(
        op.call(&[Scalar::decimal("1").unwrap().into()]).unwrap(),
        Value::from(2.0)
    );
    assert_eq!(
        op.call(&[Scalar::complex(0.0, 1.0).into()]).unwrap(),
        Value::from(1.0)
    );
}

#[test]
fn test_equal_specificity_goes_to_first_registered() {
    let op = Assembler::new("probe", &EngineConfig::default())
        .signature(Signature::new([Number | Complex, KindPattern::from(Number)]), tagged(1.0))
        .signature(Signature::new([KindPattern::from(Number), Number | Complex]), tagged(2.0))
        .build();

    assert_eq!(
        op.call(&[Value::from(1.0), Value::from(1.0)]).unwrap(),
        Value::from(1.0)
    );
    assert_eq!(
        op.call(&[Value::from(1.0), Scalar::complex(0.0, 1.0).into()])
            .unwrap(),
        Value::from(2.0)
    );
}

#[test]
fn test_cache_does_not_change_results() {
    let mut uncached = EngineConfig::default();
    uncached.dispatch.cache_resolutions = false;

    let cached = Registry::with_config(EngineConfig::default()).unwrap();
    let uncached = Registry::with_config(uncached).unwrap();

    let inputs: Vec<Vec<Value>> = vec![
        vec![Value::from(-2.5)],
        vec![Value::from(2.75), Value::from(1.0)],
        vec![Value::numbers(&[1.5, -1.5])],
        vec![Value::from(1.5), Value::numbers(&[0.0, 1.0])],
        vec![Scalar::rational(-5, 3).unwrap().into()],
    ];
    for args in &inputs {
        for name in ["floor", "ceil", "fix"] {
            assert_eq!(
                cached.call(name, args).unwrap(),
                uncached.call(name, args).unwrap(),
                "{} {:?}",
                name,
                args
            );
        }
    }

    let fix = cached.get("fix").unwrap();
    assert!(fix.resolver().cached_len() > 0);
    assert_eq!(uncached.get("fix").unwrap().resolver().cached_len(), 0);
}

#[test]
fn test_resolve_signature_reports_choice() {
    let registry = Registry::with_config(EngineConfig::default()).unwrap();
    let fix = registry.get("fix").unwrap();
    let sig = fix
        .resolver()
        .resolve_signature("fix", &[Sequence, Number])
        .unwrap();
    assert_eq!(sig.to_string(), "(Sequence | DenseMatrix | SparseMatrix, Number | Decimal)");
}

#[test]
fn test_user_operation_composes_builtin() {
    // "trunc_mag": |fix(x)| for numbers, built on top of fix
    let decl = OperationDecl::new("trunc_mag", &["fix"], |deps: &Dependencies, config| {
        let fix = deps.get("fix")?;
        Ok(Assembler::new("trunc_mag", config)
            .depends_on(&["fix"])
            .unary(Number, move |x| {
                let t = fix.call_scalar(x)?;
                Ok(Scalar::Number(t.as_number().unwrap_or(0.0).abs()))
            })
            .zero_preserving_collections()
            .build())
    });

    let registry = Registry::builder(EngineConfig::default())
        .declare(decl)
        .declare_all(typedmath::functions::declarations())
        .build()
        .unwrap();

    assert_eq!(registry.names().last().map(String::as_str), Some("trunc_mag"));
    assert_eq!(
        registry
            .call("trunc_mag", &[Value::numbers(&[-3.7, 2.2, 0.0])])
            .unwrap(),
        Value::numbers(&[3.0, 2.0, 0.0])
    );
}

#[test]
fn test_signature_tables() {
    let registry = Registry::with_config(EngineConfig::default()).unwrap();
    assert_eq!(registry.names(), &["floor", "ceil", "fix"]);
    for op in registry.operations() {
        // four kinds, unary and with a count, plus four collection forms
        assert_eq!(op.signatures().count(), 12, "{}", op.name());
    }
    let fix: Arc<typedmath::Operation> = registry.get("fix").unwrap();
    assert_eq!(fix.dependencies(), &["floor", "ceil"]);
}
