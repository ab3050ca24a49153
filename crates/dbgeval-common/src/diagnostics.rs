//! Diagnostic types and message lookup for the evaluator front end.
//!
//! Codes follow the TypeScript numbering so that tooling which already
//! understands `TS2304`-style codes can display evaluator diagnostics as-is.

use serde::Serialize;

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

/// Related information for a diagnostic (e.g., "see also" locations).
#[derive(Clone, Debug, Serialize)]
pub struct DiagnosticRelatedInformation {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

/// A diagnostic message with optional related information.
#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
    /// Related information spans (e.g., where a type was declared)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub const fn error(file: String, start: u32, length: u32, message: String, code: u32) -> Self {
        Self {
            file,
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Error,
            code,
            related_information: Vec::new(),
        }
    }

    /// Create an error diagnostic from a code and its template arguments.
    ///
    /// Falls back to the raw code when the code has no registered template.
    #[must_use]
    pub fn from_code(file: String, start: u32, length: u32, code: u32, args: &[&str]) -> Self {
        let message = get_message_template(code)
            .map(|template| format_message(template, args))
            .unwrap_or_else(|| format!("error {code}"));
        let category = get_diagnostic_category(code).unwrap_or(DiagnosticCategory::Error);
        Self {
            category,
            ..Self::error(file, start, length, message, code)
        }
    }

    /// Add related information to this diagnostic.
    #[must_use]
    pub fn with_related(mut self, file: String, start: u32, length: u32, message: String) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            file,
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Message,
            code: 0,
        });
        self
    }

    /// Whether this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// A diagnostic message definition with code, category, and message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

pub mod diagnostic_codes {
    pub const UNEXPECTED_TOKEN: u32 = 1012;
    pub const EXPECTED_TOKEN: u32 = 1005;
    pub const IDENTIFIER_EXPECTED: u32 = 1003;
    pub const EXPRESSION_EXPECTED: u32 = 1109;
    pub const UNTERMINATED_STRING_LITERAL: u32 = 1002;
    pub const INVALID_CHARACTER: u32 = 1127;
    pub const DUPLICATE_IDENTIFIER: u32 = 2300;
    pub const CANNOT_FIND_NAME: u32 = 2304;
    pub const MODULE_HAS_NO_EXPORTED_MEMBER: u32 = 2305;
    pub const CANNOT_FIND_MODULE: u32 = 2307;
    pub const TYPE_NOT_ASSIGNABLE: u32 = 2322;
    pub const PROPERTY_DOES_NOT_EXIST: u32 = 2339;
    pub const NOT_CALLABLE: u32 = 2349;
    pub const CONVERSION_MAY_BE_A_MISTAKE: u32 = 2352;
    pub const OPERATOR_CANNOT_BE_APPLIED: u32 = 2365;
    pub const CIRCULAR_BASE_REFERENCE: u32 = 2506;
    pub const CANNOT_CREATE_ABSTRACT_INSTANCE: u32 = 2511;
    pub const EXPECTED_ARGUMENTS: u32 = 2554;
    pub const NO_OVERLOAD_MATCHES: u32 = 2769;
    pub const SUPER_CALL_OUTSIDE_CONSTRUCTOR: u32 = 2337;
    pub const RETURN_OUTSIDE_FUNCTION: u32 = 1108;
    pub const THIS_OUTSIDE_CLASS: u32 = 2332;
    pub const INVALID_ASSIGNMENT_TARGET: u32 = 2364;
    pub const CANNOT_FIND_TYPE: u32 = 2552;
    pub const NOT_A_TYPE: u32 = 2749;
}

pub mod diagnostic_messages {
    pub const UNEXPECTED_TOKEN: &str = "Unexpected token '{0}'.";
    pub const EXPECTED_TOKEN: &str = "'{0}' expected.";
    pub const IDENTIFIER_EXPECTED: &str = "Identifier expected.";
    pub const EXPRESSION_EXPECTED: &str = "Expression expected.";
    pub const UNTERMINATED_STRING_LITERAL: &str = "Unterminated string literal.";
    pub const INVALID_CHARACTER: &str = "Invalid character.";
    pub const DUPLICATE_IDENTIFIER: &str = "Duplicate identifier '{0}'.";
    pub const CANNOT_FIND_NAME: &str = "Cannot find name '{0}'.";
    pub const MODULE_HAS_NO_EXPORTED_MEMBER: &str = "Module '\"{0}\"' has no exported member '{1}'.";
    pub const CANNOT_FIND_MODULE: &str = "Cannot find module '{0}'.";
    pub const TYPE_NOT_ASSIGNABLE: &str = "Type '{0}' is not assignable to type '{1}'.";
    pub const PROPERTY_DOES_NOT_EXIST: &str = "Property '{0}' does not exist on type '{1}'.";
    pub const NOT_CALLABLE: &str = "This expression is not callable. Type '{0}' has no call signatures.";
    pub const CONVERSION_MAY_BE_A_MISTAKE: &str =
        "Conversion of type '{0}' to type '{1}' may be a mistake.";
    pub const OPERATOR_CANNOT_BE_APPLIED: &str =
        "Operator '{0}' cannot be applied to types '{1}' and '{2}'.";
    pub const CIRCULAR_BASE_REFERENCE: &str = "'{0}' is referenced directly or indirectly in its own base expression.";
    pub const CANNOT_CREATE_ABSTRACT_INSTANCE: &str =
        "Cannot create an instance of an abstract class.";
    pub const EXPECTED_ARGUMENTS: &str = "Expected {0} arguments, but got {1}.";
    pub const NO_OVERLOAD_MATCHES: &str = "No overload matches this call.";
    pub const SUPER_CALL_OUTSIDE_CONSTRUCTOR: &str =
        "Super calls are not permitted outside constructors or in nested functions inside constructors.";
    pub const RETURN_OUTSIDE_FUNCTION: &str = "A 'return' statement can only be used within a function body.";
    pub const THIS_OUTSIDE_CLASS: &str = "'this' cannot be referenced outside a class body.";
    pub const INVALID_ASSIGNMENT_TARGET: &str = "Invalid left-hand side in assignment expression.";
    pub const CANNOT_FIND_TYPE: &str = "Cannot find type '{0}'.";
    pub const NOT_A_TYPE: &str = "'{0}' refers to a value, but is being used as a type here.";
}

macro_rules! message_table {
    ($($name:ident),+ $(,)?) => {
        /// Every registered diagnostic message.
        pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
            $(DiagnosticMessage {
                code: diagnostic_codes::$name,
                category: DiagnosticCategory::Error,
                message: diagnostic_messages::$name,
            },)+
        ];
    };
}

message_table!(
    UNEXPECTED_TOKEN,
    EXPECTED_TOKEN,
    IDENTIFIER_EXPECTED,
    EXPRESSION_EXPECTED,
    UNTERMINATED_STRING_LITERAL,
    INVALID_CHARACTER,
    DUPLICATE_IDENTIFIER,
    CANNOT_FIND_NAME,
    MODULE_HAS_NO_EXPORTED_MEMBER,
    CANNOT_FIND_MODULE,
    TYPE_NOT_ASSIGNABLE,
    PROPERTY_DOES_NOT_EXIST,
    NOT_CALLABLE,
    CONVERSION_MAY_BE_A_MISTAKE,
    OPERATOR_CANNOT_BE_APPLIED,
    CIRCULAR_BASE_REFERENCE,
    CANNOT_CREATE_ABSTRACT_INSTANCE,
    EXPECTED_ARGUMENTS,
    NO_OVERLOAD_MATCHES,
    SUPER_CALL_OUTSIDE_CONSTRUCTOR,
    RETURN_OUTSIDE_FUNCTION,
    THIS_OUTSIDE_CLASS,
    INVALID_ASSIGNMENT_TARGET,
    CANNOT_FIND_TYPE,
    NOT_A_TYPE,
);

/// Look up a diagnostic message definition by code.
///
/// Returns the `DiagnosticMessage` with template string containing `{0}`, `{1}`, etc. placeholders.
/// Use `format_message()` to fill in the placeholders.
#[must_use]
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

/// Get the message template for a diagnostic code.
#[must_use]
pub fn get_message_template(code: u32) -> Option<&'static str> {
    get_diagnostic_message(code).map(|m| m.message)
}

/// Get the category for a diagnostic code.
#[must_use]
pub fn get_diagnostic_category(code: u32) -> Option<DiagnosticCategory> {
    get_diagnostic_message(code).map(|m| m.category)
}
