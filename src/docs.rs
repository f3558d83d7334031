use crate::field::EnvRecord;
use std::{fs, path::Path};

/// Render a markdown table of the environment variables a record reads
///
/// # Example
/// ```rust
/// use envbind::{EnvRecord, docs::describe};
///
/// #[derive(Default, EnvRecord)]
/// struct Config {
///     app_max_workers: i32,
///     app_logging_type: Option<String>,
/// }
///
/// let md = describe::<Config>();
/// assert!(md.contains("| APP_MAX_WORKERS | app_max_workers | i32 | Yes |"));
/// assert!(md.contains("| APP_LOGGING_TYPE | app_logging_type | String | No |"));
/// ```
pub fn describe<T: EnvRecord>() -> String {
    let mut md = String::new();

    md.push_str("## Environment Variables Summary\n\n");
    md.push_str("| Variable | Field | Type | Required |\n");
    md.push_str("|----------|-------|------|----------|\n");
    for field in T::fields() {
        let required_str = if field.optional { "No" } else { "Yes" };
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            field.env_key(),
            field.name,
            field.type_name,
            required_str
        ));
    }

    md
}

/// Write [`describe`] output to `path`
pub fn write_docs<T: EnvRecord>(path: impl AsRef<Path>) -> std::io::Result<()> {
    fs::write(path, describe::<T>())
}
