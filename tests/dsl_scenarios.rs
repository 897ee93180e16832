// tests/dsl_scenarios.rs
//
// Scripts and single lines through the command-line front end

use serde_json::json;
use typedmath::dsl::{describe, json::to_json, statements};
use typedmath::{
    execute_line, execute_script, DslError, DslOutput, EngineConfig, EngineError, Registry,
    Scalar, Value,
};

fn registry() -> Registry {
    Registry::with_config(EngineConfig::default()).expect("registry builds")
}

#[test]
fn test_script_runs_every_statement() {
    let script = r#"
        # rounding toward zero
        fix 3.8
        fix -4.2
        fix 3.18 1
        // complex operands
        fix {"re": 3.22, "im": -2.78}
        fix [3.2, 3.8, -4.7]
        floor {"rational": "-7/2"}
        ceil {"decimal": "-3.18"} 1
    "#;
    let outputs = execute_script(&registry(), script).expect("script should run");
    let rendered: Vec<String> = outputs.iter().map(|o| o.to_string()).collect();
    assert_eq!(
        rendered,
        vec!["3", "-4", "3.1", "3 - 2i", "[3, 3, -4]", "-4", "-3.1"]
    );
}

#[test]
fn test_matrix_operands_round_trip_through_json() {
    let r = registry();
    let out = execute_line(&r, r#"fix {"dense": [[1.5, -1.5], [0, 2.7]]}"#, 1).unwrap();
    assert_eq!(out.to_json(), json!({ "dense": [[1.0, -1.0], [0.0, 2.0]] }));

    let out = execute_line(
        &r,
        r#"fix {"sparse": {"shape": [2, 3], "entries": [[0, 0, 0.5], [1, 2, -7.9]]}}"#,
        1,
    )
    .unwrap();
    assert_eq!(
        out.to_json(),
        json!({ "sparse": { "shape": [2, 3], "entries": [[1, 2, -7.0]] } })
    );

    let out = execute_line(
        &r,
        r#"fix 0 {"sparse": {"shape": [2, 2], "entries": [[0, 1, 3]]}}"#,
        1,
    )
    .unwrap();
    assert_eq!(
        out.to_json(),
        json!({ "sparse": { "shape": [2, 2], "entries": [] } })
    );
}

#[test]
fn test_multiline_operand_in_script() {
    let script = "fix {\"dense\": [\n  [1.9, 2.9],\n  [-1.9, -2.9]\n]}\n";
    let stmts = statements(script).unwrap();
    assert_eq!(stmts.len(), 1);
    let outputs = execute_script(&registry(), script).unwrap();
    assert_eq!(
        outputs[0].to_json(),
        json!({ "dense": [[1.0, 2.0], [-1.0, -2.0]] })
    );
}

#[test]
fn test_errors_report_line_and_kinds() {
    let script = "fix 1.5\nfix [1] {\"re\": 1, \"im\": 0}\nfix 2.5\n";
    let err = execute_script(&registry(), script).unwrap_err();
    assert_eq!(err.line(), 2);
    match err {
        DslError::Engine { source, .. } => {
            let msg = source.to_string();
            assert!(msg.contains("Sequence"), "{}", msg);
            assert!(msg.contains("Complex"), "{}", msg);
        }
        other => panic!("expected engine error, got {}", other),
    }

    let err = execute_line(&registry(), "round 1.5", 4).unwrap_err();
    assert_eq!(
        err,
        DslError::Engine {
            line: 4,
            source: EngineError::UnknownOperation("round".into())
        }
    );

    let err = execute_line(&registry(), "fix", 5).unwrap_err();
    assert!(matches!(err, DslError::Parse { line: 5, .. }));
    let err = execute_line(&registry(), "fix \"text\"", 6).unwrap_err();
    assert!(matches!(err, DslError::Parse { line: 6, .. }));
}

#[test]
fn test_ops_and_comments() {
    let r = registry();
    assert_eq!(execute_line(&r, "# nothing", 1).unwrap(), DslOutput::None);
    let DslOutput::Message(text) = execute_line(&r, "ops", 1).unwrap() else {
        panic!("expected a listing");
    };
    assert_eq!(text, describe(&r));
    assert!(text.contains("ceil"));
}

#[test]
fn test_value_codec_for_exact_kinds() {
    assert_eq!(
        to_json(&Scalar::rational(-7, 2).unwrap().into()),
        json!({ "rational": "-7/2" })
    );
    assert_eq!(
        to_json(&Value::Sequence(vec![Scalar::decimal("3.10").unwrap().into()])),
        json!([{ "decimal": "3.1" }])
    );
}
