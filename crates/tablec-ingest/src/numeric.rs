//! Numeric normalization and per-type value checks.

use tablec_model::cell::render_number;
use tablec_model::{DataType, DiagnosticCode};

/// Rounds to eight decimals and drops the fraction of integral results.
pub fn normalize_number(value: f64) -> String {
    let rounded = format!("{value:.8}").parse::<f64>().unwrap_or(value);
    render_number(rounded)
}

/// Checks a normalized value against its column type.
///
/// Numeric text must survive a parse/format round trip unchanged, so a
/// stray character or a redundant fraction (`12.0` for an int) fails.
pub fn check_value(data_type: DataType, value: &str) -> Result<(), DiagnosticCode> {
    if value.is_empty() {
        return match data_type {
            DataType::Int | DataType::Long => Err(DiagnosticCode::IntValueNull),
            DataType::Float | DataType::Double => Err(DiagnosticCode::FloatValueNull),
            DataType::Bool => Err(DiagnosticCode::BoolValueNull),
            DataType::Type => Err(DiagnosticCode::TypeValueNull),
            DataType::String | DataType::Stream | DataType::LocalText => Ok(()),
        };
    }
    match data_type {
        DataType::Int | DataType::Long => {
            if is_canonical_int(value) {
                Ok(())
            } else {
                Err(DiagnosticCode::IntValueError)
            }
        }
        DataType::Float | DataType::Double => {
            if is_canonical_float(value) || is_canonical_int(value) {
                Ok(())
            } else {
                Err(DiagnosticCode::FloatValueError)
            }
        }
        DataType::Bool => {
            if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
                Ok(())
            } else {
                Err(DiagnosticCode::BoolValueError)
            }
        }
        DataType::Type => {
            if value.contains(' ') {
                Err(DiagnosticCode::TypeValueSpaceError)
            } else {
                Ok(())
            }
        }
        DataType::String => {
            if value.contains('"') {
                Err(DiagnosticCode::StringValueQuoteError)
            } else {
                Ok(())
            }
        }
        DataType::Stream | DataType::LocalText => Ok(()),
    }
}

fn is_canonical_int(value: &str) -> bool {
    value
        .parse::<i64>()
        .is_ok_and(|parsed| parsed.to_string() == value)
}

fn is_canonical_float(value: &str) -> bool {
    value
        .parse::<f64>()
        .is_ok_and(|parsed| format!("{parsed:?}") == value)
}

/// Human-readable message for a failed type check.
pub fn type_error_message(code: DiagnosticCode, value: &str) -> String {
    match code {
        DiagnosticCode::IntValueError => format!("not an int value ({value})"),
        DiagnosticCode::IntValueNull => "int value is empty".to_string(),
        DiagnosticCode::FloatValueError => format!("not a float value ({value})"),
        DiagnosticCode::FloatValueNull => "float value is empty".to_string(),
        DiagnosticCode::BoolValueError => format!("not a bool value ({value})"),
        DiagnosticCode::BoolValueNull => "bool value is empty".to_string(),
        DiagnosticCode::TypeValueSpaceError => format!("type text contains a space ({value})"),
        DiagnosticCode::TypeValueNull => "type value is empty".to_string(),
        DiagnosticCode::StringValueQuoteError => {
            format!("string contains a double quote ({value})")
        }
        other => format!("{other} ({value})"),
    }
}
