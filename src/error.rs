use colored::Colorize;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Why a field could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ErrorKind {
    /// No environment value, no usable default, and the field is not optional
    Required,
    /// A converter was found but rejected the raw value
    WrongType,
    /// No converter is registered for the field's declared type
    UnsupportedType,
}

impl ErrorKind {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::WrongType => "wrong_type",
            Self::UnsupportedType => "unsupported_type",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single field that failed to bind
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldError {
    /// Environment variable the field is bound to
    pub key: String,
    pub kind: ErrorKind,
    /// Declared type identifier of the field
    pub type_name: String,
    /// Converter failure, for `WrongType`
    #[cfg_attr(feature = "serde", serde(skip))]
    pub source: Option<Arc<dyn Error + Send + Sync>>,
}

impl FieldError {
    pub fn required(key: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: ErrorKind::Required,
            type_name: type_name.into(),
            source: None,
        }
    }

    pub fn unsupported_type(key: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: ErrorKind::UnsupportedType,
            type_name: type_name.into(),
            source: None,
        }
    }

    pub fn wrong_type(
        key: impl Into<String>,
        type_name: impl Into<String>,
        source: Arc<dyn Error + Send + Sync>,
    ) -> Self {
        Self {
            key: key.into(),
            kind: ErrorKind::WrongType,
            type_name: type_name.into(),
            source: Some(source),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::Required => {
                write!(f, "Environmental variable '{}' is unset", self.key)
            }
            ErrorKind::WrongType => write!(
                f,
                "Environmental variable '{}' has wrong type. Required type: '{}'",
                self.key, self.type_name
            ),
            ErrorKind::UnsupportedType => write!(
                f,
                "Parser missing for environmental variable '{}'. Required type: '{}'",
                self.key, self.type_name
            ),
        }
    }
}

impl Error for FieldError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn Error + 'static))
    }
}

/// A converter produced a value that does not fit the field it was meant for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueTypeMismatch {
    pub field: &'static str,
    pub type_name: &'static str,
}

impl fmt::Display for ValueTypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "converter registered for '{}' returned a value that cannot be stored in field '{}'",
            self.type_name, self.field
        )
    }
}

impl Error for ValueTypeMismatch {}

/// Every field error from one bind call, in field declaration order
///
/// The `Display` output is one message per line with no trailing newline.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ErrorCollection {
    errors: Vec<FieldError>,
}

impl ErrorCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Environment keys of the failed fields, in order
    pub fn keys(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.key.as_str()).collect()
    }

    /// `None` when nothing failed
    pub fn into_option(self) -> Option<Self> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    /// Human-readable summary for terminals
    pub fn report(&self) -> String {
        let lines = self
            .errors
            .iter()
            .map(|e| {
                let mut line = format!(
                    "  - {} [{}] {}",
                    e.key.magenta().bold(),
                    e.kind.code().yellow(),
                    e
                );
                if let Some(source) = &e.source {
                    line.push_str(&format!("\n\tCause: {}", source.to_string().red()));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Configuration failed with {} error(s):\n{}",
            self.errors.len().to_string().yellow().bold(),
            lines
        )
    }
}

impl fmt::Display for ErrorCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl Error for ErrorCollection {}

impl From<Vec<FieldError>> for ErrorCollection {
    fn from(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }
}

impl IntoIterator for ErrorCollection {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorCollection {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
