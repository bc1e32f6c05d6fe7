//! Driver tests over documents written to disk: simplify with every pass,
//! persist the cache, then compare it against a hand-reduced document.

use std::path::{Path, PathBuf};

use daec::commands::{compare, simplify};
use daec::{CliError, CompareArgs, SimplifyArgs};
use dae_model::Partition;
use dae_oracle::{OracleError, DEFAULT_SEED, DEFAULT_TOLERANCE};
use pretty_assertions::assert_eq;

/// A state with its derivative, two algebraic aliases of them and a
/// parameter defined over a constant.
const OSCILLATOR: &str = r#"{
    "states": [{ "name": "s", "start": 1 }],
    "der_states": [{ "name": "der(s)", "derivative_of": "s" }],
    "alg_states": [{ "name": "a" }, { "name": "b", "min": -4 }],
    "inputs": [{ "name": "u" }],
    "constants": [{ "name": "c", "value": 2 }],
    "parameters": [{ "name": "k", "value": { "op": "*", "args": ["c", 3] } }],
    "equations": [
        { "op": "-", "args": ["der(s)", "a"] },
        { "op": "+", "args": ["b", "s"] },
        { "op": "-", "args": ["a", { "op": "*", "args": ["k", "b", "u"] }] }
    ]
}"#;

const OSCILLATOR_REDUCED: &str = r#"{
    "states": [{ "name": "s", "start": 1, "max": 4 }],
    "der_states": [{ "name": "der(s)", "derivative_of": "s" }],
    "inputs": [{ "name": "u" }],
    "equations": [
        { "op": "+", "args": ["der(s)", { "op": "*", "args": [6, "s", "u"] }] }
    ]
}"#;

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap_or_else(|e| panic!("{e}"));
    path
}

#[test]
fn protected_variables_absorb_their_aliases() {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
    let source = write(dir.path(), "oscillator.json", OSCILLATOR);
    let reference = write(dir.path(), "reduced.json", OSCILLATOR_REDUCED);
    let cache = dir.path().join("oscillator.cache");

    let (model, report) = simplify(&SimplifyArgs {
        model: source,
        all: true,
        output: Some(cache.clone()),
        ..SimplifyArgs::default()
    })
    .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(report.folded, 2);
    assert_eq!(report.eliminated, 2);
    assert_eq!(report.affine_rows, 0);
    assert!(model.alg_states().is_empty());
    assert!(model.constants().is_empty());
    assert!(model.parameters().is_empty());
    assert_eq!(model.slots(Partition::State).len(), 1);

    compare(&CompareArgs {
        left: cache,
        right: reference,
        seed: DEFAULT_SEED,
        tolerance: DEFAULT_TOLERANCE,
    })
    .unwrap_or_else(|e| panic!("{e}"));
}

#[test]
fn unsimplified_model_differs_in_shape() {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
    let source = write(dir.path(), "oscillator.json", OSCILLATOR);
    let reference = write(dir.path(), "reduced.json", OSCILLATOR_REDUCED);

    let result = compare(&CompareArgs {
        left: source,
        right: reference,
        seed: DEFAULT_SEED,
        tolerance: DEFAULT_TOLERANCE,
    });
    assert!(matches!(
        result,
        Err(CliError::Oracle(OracleError::CardinalityMismatch { .. }))
    ));
}
