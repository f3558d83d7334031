/// Rewrites a field identifier into the environment variable name it is bound to.
///
/// Words are separated by `_` and upper-cased. Boundaries are detected at
/// lower-to-upper transitions, between letters and digits, and before the
/// last capital of an acronym run that starts a new word, so `HTTPServer`
/// becomes `HTTP_SERVER` rather than `H_T_T_P_SERVER`. Spaces, `-`, `.` and
/// `_` all map to `_`.
///
/// ```rust
/// use envbind::naming::to_screaming_snake;
///
/// assert_eq!(to_screaming_snake("AppMaxWorkers"), "APP_MAX_WORKERS");
/// assert_eq!(to_screaming_snake("max_workers"), "MAX_WORKERS");
/// ```
pub fn to_screaming_snake(identifier: &str) -> String {
    let trimmed = identifier.trim();
    let trimmed = trimmed.strip_prefix("r#").unwrap_or(trimmed);
    let chars: Vec<char> = trimmed.chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        let is_upper = c.is_ascii_uppercase();
        let is_lower = c.is_ascii_lowercase();
        let is_digit = c.is_ascii_digit();

        if let Some(&next) = chars.get(i + 1) {
            let next_upper = next.is_ascii_uppercase();
            let next_lower = next.is_ascii_lowercase();
            let next_digit = next.is_ascii_digit();

            let boundary = (is_upper && (next_lower || next_digit))
                || (is_lower && (next_upper || next_digit))
                || (is_digit && (next_upper || next_lower));

            if boundary {
                // Last capital of an acronym starts the next word
                if is_upper && next_lower && i > 0 && chars[i - 1].is_ascii_uppercase() {
                    out.push('_');
                }
                out.push(c.to_ascii_uppercase());
                if is_lower || is_digit || next_digit {
                    out.push('_');
                }
                continue;
            }
        }

        if matches!(c, ' ' | '-' | '.' | '_') {
            out.push('_');
        } else {
            out.extend(c.to_uppercase());
        }
    }

    out
}
