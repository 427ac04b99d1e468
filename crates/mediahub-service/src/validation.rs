//! Mapping of `validator` failures onto the application error.

use validator::ValidationErrors;

use mediahub_core::error::AppError;

/// Turns derive-validation failures into a single validation error.
///
/// Fields are reported in name order so the message is stable.
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    let message = fields
        .into_iter()
        .find_map(|(field, errs)| {
            errs.first().map(|err| match &err.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .unwrap_or_else(|| "Invalid input".to_string());

    AppError::validation(message)
}
