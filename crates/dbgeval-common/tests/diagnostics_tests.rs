use dbgeval_common::diagnostics::{
    DiagnosticCategory, format_message, get_diagnostic_category, get_message_template,
};
use dbgeval_common::{Diagnostic, diagnostic_codes};

#[test]
fn test_format_message_replaces_positional_arguments() {
    let text = format_message("Type '{0}' is not assignable to type '{1}'.", &["int", "string"]);
    assert_eq!(text, "Type 'int' is not assignable to type 'string'.");
}

#[test]
fn test_every_code_has_a_template() {
    for code in [
        diagnostic_codes::CANNOT_FIND_NAME,
        diagnostic_codes::TYPE_NOT_ASSIGNABLE,
        diagnostic_codes::PROPERTY_DOES_NOT_EXIST,
        diagnostic_codes::CANNOT_FIND_MODULE,
        diagnostic_codes::EXPECTED_ARGUMENTS,
    ] {
        assert!(
            get_message_template(code).is_some(),
            "missing template for code {code}"
        );
        assert_eq!(get_diagnostic_category(code), Some(DiagnosticCategory::Error));
    }
}

#[test]
fn test_diagnostic_from_code_formats_message() {
    let diag = Diagnostic::from_code(
        "eval.ets".to_string(),
        4,
        3,
        diagnostic_codes::CANNOT_FIND_NAME,
        &["foo"],
    );
    assert_eq!(diag.message_text, "Cannot find name 'foo'.");
    assert_eq!(diag.code, 2304);
    assert!(diag.is_error());
}

#[test]
fn test_diagnostic_unknown_code_falls_back() {
    let diag = Diagnostic::from_code("eval.ets".to_string(), 0, 0, 9999, &[]);
    assert_eq!(diag.message_text, "error 9999");
}
