// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! C-family identifier validation.
//!
//! Names introduced by tweaks must be usable in C, C++, and Objective-C
//! translation units alike, so the keyword list is the union of the three.

use thiserror::Error;

use hoist_core::error::HoistError;

/// Error for validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },
}

impl From<ValidationError> for HoistError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidName { name, reason } => {
                HoistError::InvalidIdentifier { name, reason }
            }
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Reserved words of C11, C++20, and the Objective-C literals that may not
/// name a local variable.
pub const RESERVED_WORDS: &[&str] = &[
    "_Alignas", "_Alignof", "_Atomic", "_Bool", "_Complex", "_Generic", "_Imaginary",
    "_Noreturn", "_Static_assert", "_Thread_local", "alignas", "alignof", "and", "and_eq",
    "asm", "auto", "bitand", "bitor", "bool", "break", "case", "catch", "char", "char8_t",
    "char16_t", "char32_t", "class", "co_await", "co_return", "co_yield", "compl", "concept",
    "const", "const_cast", "consteval", "constexpr", "constinit", "continue", "decltype",
    "default", "delete", "do", "double", "dynamic_cast", "else", "enum", "explicit", "export",
    "extern", "false", "float", "for", "friend", "goto", "if", "inline", "int", "long",
    "mutable", "namespace", "new", "noexcept", "not", "not_eq", "nullptr", "operator", "or",
    "or_eq", "private", "protected", "public", "register", "reinterpret_cast", "requires",
    "restrict", "return", "short", "signed", "sizeof", "static", "static_assert",
    "static_cast", "struct", "switch", "template", "this", "thread_local", "throw", "true",
    "try", "typedef", "typeid", "typename", "union", "unsigned", "using", "virtual", "void",
    "volatile", "wchar_t", "while", "xor", "xor_eq", "self", "super", "nil", "Nil", "YES",
    "NO", "id", "SEL",
];

pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Validate a name for a new C-family variable.
///
/// Checks:
/// - Non-empty
/// - Starts with an ASCII letter or underscore
/// - Contains only ASCII letters, digits, and underscores
/// - Not a reserved word
///
/// # Examples
///
/// ```
/// use hoist_cxx::validation::validate_identifier;
///
/// assert!(validate_identifier("placeholder").is_ok());
/// assert!(validate_identifier("_tmp1").is_ok());
/// assert!(validate_identifier("1st").is_err());
/// assert!(validate_identifier("auto").is_err());
/// ```
pub fn validate_identifier(name: &str) -> ValidationResult<()> {
    let invalid = |reason: String| ValidationError::InvalidName {
        name: name.to_string(),
        reason,
    };

    let Some(first) = name.chars().next() else {
        return Err(invalid("name cannot be empty".to_string()));
    };
    if !first.is_ascii_alphabetic() && first != '_' {
        return Err(invalid("must start with letter or underscore".to_string()));
    }
    if let Some(ch) = name.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '_') {
        return Err(invalid(format!("invalid character: '{}'", ch)));
    }
    if is_reserved_word(name) {
        return Err(invalid("cannot use a reserved word as identifier".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod valid_identifiers {
        use super::*;

        #[test]
        fn simple_names() {
            assert!(validate_identifier("x").is_ok());
            assert!(validate_identifier("placeholder").is_ok());
            assert!(validate_identifier("camelCase").is_ok());
        }

        #[test]
        fn underscores_and_digits() {
            assert!(validate_identifier("_").is_ok());
            assert!(validate_identifier("__tmp").is_ok());
            assert!(validate_identifier("value2").is_ok());
        }
    }

    mod invalid_identifiers {
        use super::*;

        #[test]
        fn empty_name() {
            assert_eq!(
                validate_identifier(""),
                Err(ValidationError::InvalidName {
                    name: String::new(),
                    reason: "name cannot be empty".to_string()
                })
            );
        }

        #[test]
        fn bad_characters() {
            assert!(validate_identifier("9lives").is_err());
            assert!(validate_identifier("a-b").is_err());
            assert!(validate_identifier("a b").is_err());
            assert!(validate_identifier("naïve").is_err());
        }

        #[test]
        fn reserved_words() {
            assert!(validate_identifier("int").is_err());
            assert!(validate_identifier("constexpr").is_err());
            assert!(validate_identifier("_Bool").is_err());
            assert!(validate_identifier("self").is_err());
            assert!(!is_reserved_word("Int"));
        }

        #[test]
        fn maps_to_invalid_identifier() {
            let err: HoistError = validate_identifier("for").unwrap_err().into();
            assert!(matches!(err, HoistError::InvalidIdentifier { .. }));
        }
    }
}
