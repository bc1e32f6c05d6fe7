use dae_ir::Slot;
use pretty_assertions::assert_eq;

use super::*;

const LOOP: &str = r#"{
    "alg_states": [{ "name": "x" }, { "name": "y", "shape": 3 }],
    "equations": [
        { "op": "-", "args": ["y[1]", "x"] },
        { "op": "-", "args": ["y[2]", { "op": "*", "args": [2, "x"] }] },
        { "op": "-", "args": ["y[3]", { "op": "*", "args": [3, "y[1]"] }] }
    ],
    "options": { "expand_vectors": true, "detect_aliases": true }
}"#;

#[test]
fn loads_variables_and_equations() {
    let doc = ModelDocument::from_json(LOOP).unwrap_or_else(|e| panic!("{e}"));
    let model = doc.to_model().unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(model.alg_states().len(), 2);
    assert_eq!(model.slots(Partition::AlgState).len(), 4);
    assert_eq!(model.equations.len(), 3);
    let dae_model::Equation::Scalar(first) = model.equations[0] else {
        panic!("scalar expected");
    };
    assert_eq!(model.render(first), "y[1] - x");
}

#[test]
fn document_options_load() {
    let doc = ModelDocument::from_json(LOOP).unwrap_or_else(|e| panic!("{e}"));
    let options = doc.compiler_options().unwrap_or_else(|e| panic!("{e}"));
    assert!(options.expand_vectors);
    assert!(options.detect_aliases);
    assert!(!options.reduce_affine_expression);
}

#[test]
fn attributes_and_derivatives_resolve() {
    let doc = ModelDocument::from_json(
        r#"{
            "states": [{ "name": "s", "start": 1.5, "fixed": true }],
            "der_states": [{ "name": "der(s)", "derivative_of": "s" }],
            "parameters": [{ "name": "k", "value": 2 }],
            "equations": [{ "op": "-", "args": ["der(s)", { "op": "*", "args": ["k", "s", "time"] }] }]
        }"#,
    )
    .unwrap_or_else(|e| panic!("{e}"));
    let model = doc.to_model().unwrap_or_else(|e| panic!("{e}"));

    let s = model.lookup("s").unwrap_or_else(|| panic!("s"));
    let ds = model.lookup("der(s)").unwrap_or_else(|| panic!("der(s)"));
    assert_eq!(model.variable(ds).derivative_of, Some(s));
    let attrs = model.variable(s).attributes;
    assert_eq!(attrs.start.and_then(|e| model.arena.as_num(e)), Some(1.5));
    assert_eq!(attrs.fixed, Some(ExprId::ONE));

    let dae_model::Equation::Scalar(eq) = model.equations[0] else {
        panic!("scalar expected");
    };
    assert!(model.arena.free_slots(eq).contains(&Slot::Time));
}

#[test]
fn unknown_references_are_errors() {
    let doc = ModelDocument::from_json(r#"{ "equations": ["nope"] }"#)
        .unwrap_or_else(|e| panic!("{e}"));
    assert!(matches!(doc.to_model(), Err(LoadError::UnknownVariable(name)) if name == "nope"));

    let doc = ModelDocument::from_json(
        r#"{ "alg_states": [{ "name": "y", "shape": 2 }], "equations": ["y[3]"] }"#,
    )
    .unwrap_or_else(|e| panic!("{e}"));
    assert!(matches!(
        doc.to_model(),
        Err(LoadError::ElementOutOfRange { index: 3, .. })
    ));
}

#[test]
fn operators_check_arity() {
    let doc = ModelDocument::from_json(r#"{ "equations": [{ "op": "/", "args": [1] }] }"#)
        .unwrap_or_else(|e| panic!("{e}"));
    assert!(matches!(doc.to_model(), Err(LoadError::Arity { found: 1, .. })));

    let doc = ModelDocument::from_json(r#"{ "equations": [{ "op": "frobnicate", "args": [1] }] }"#)
        .unwrap_or_else(|e| panic!("{e}"));
    assert!(matches!(doc.to_model(), Err(LoadError::UnknownOperator(_))));
}
