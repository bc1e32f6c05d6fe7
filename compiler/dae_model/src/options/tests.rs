use pretty_assertions::assert_eq;

use super::*;

#[test]
fn defaults_disable_every_pass() {
    let options = CompilerOptions::default();
    assert!(!options.any_enabled());
    assert_eq!(options.max_reduction_iterations, None);
}

#[test]
fn flags_apply_in_order() {
    let options = CompilerOptions::from_flags([
        ("detect_aliases", true),
        ("reduce_affine_expression", true),
        ("detect_aliases", false),
    ])
    .unwrap_or_else(|e| panic!("{e}"));
    assert!(!options.detect_aliases);
    assert!(options.reduce_affine_expression);
    assert!(options.any_enabled());
}

#[test]
fn unknown_flag_is_rejected() {
    assert_eq!(
        CompilerOptions::from_flags([("inline_everything", true)]),
        Err(OptionsError::Unknown("inline_everything".to_owned()))
    );
}
