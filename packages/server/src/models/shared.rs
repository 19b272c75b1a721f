use crate::error::AppError;

/// Validate a trimmed display name (1..=`max` Unicode characters).
pub fn validate_name(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be 1-{max} characters"
        )));
    }
    Ok(())
}

/// Seasons are addressed by calendar year.
pub fn validate_season_year(year: i32) -> Result<(), AppError> {
    if !(1950..=2100).contains(&year) {
        return Err(AppError::Validation(
            "year must be between 1950 and 2100".into(),
        ));
    }
    Ok(())
}

/// Trim every identifier in a list; blank or duplicate entries are rejected.
pub fn normalize_ids(field: &str, ids: Vec<String>) -> Result<Vec<String>, AppError> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.trim().to_string();
        if id.is_empty() {
            return Err(AppError::Validation(format!(
                "{field}: identifiers must not be blank"
            )));
        }
        if out.contains(&id) {
            return Err(AppError::Validation(format!(
                "{field}: duplicate identifier {id}"
            )));
        }
        out.push(id);
    }
    Ok(out)
}

/// Trim an optional identifier, treating a blank string as absent.
pub fn normalize_opt_id(id: Option<String>) -> Option<String> {
    id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
