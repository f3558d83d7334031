use std::any::Any;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

/// A converted value, type-erased so converters for any type share one map
pub type BoxedValue = Box<dyn Any + Send>;

/// Failure reported by a converter
pub type ParseError = Box<dyn Error + Send + Sync>;

/// Converts a raw environment string into a value of one declared type
pub type Parser = Arc<dyn Fn(&str) -> Result<BoxedValue, ParseError> + Send + Sync>;

/// Strings accepted as `true` by the boolean converter (compared lower-cased)
pub const TRUE_VALUES: [&str; 5] = ["t", "true", "y", "yes", "1"];

static BUILTIN: LazyLock<ParserMap> = LazyLock::new(|| {
    ParserMap::new()
        .with("String", |s: &str| Ok::<_, ParseError>(s.to_string()))
        .with("i8", parse_number::<i8>)
        .with("i16", parse_number::<i16>)
        .with("i32", parse_number::<i32>)
        .with("i64", parse_number::<i64>)
        .with("isize", parse_number::<isize>)
        .with("u8", parse_unsigned::<u8>)
        .with("u16", parse_unsigned::<u16>)
        .with("u32", parse_unsigned::<u32>)
        .with("u64", parse_unsigned::<u64>)
        .with("usize", parse_unsigned::<usize>)
        .with("f32", parse_f32)
        .with("f64", parse_f64)
        .with("bool", |s: &str| Ok::<_, ParseError>(parse_bool(s)))
});

/// A set of converters keyed by declared type identifier
///
/// # Example
/// ```rust
/// use envbind::ParserMap;
///
/// #[derive(Debug, Default, Clone, PartialEq)]
/// struct Point { x: i32, y: i32 }
///
/// let parsers = ParserMap::new().with("Point", |s: &str| {
///     let (x, y) = s.split_once(';').ok_or("expected 'x;y'")?;
///     Ok::<_, Box<dyn std::error::Error + Send + Sync>>(Point {
///         x: x.parse()?,
///         y: y.parse()?,
///     })
/// });
/// assert!(parsers.contains("Point"));
/// ```
#[derive(Clone, Default)]
pub struct ParserMap {
    parsers: HashMap<String, Parser>,
}

impl ParserMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in converters for `String`, every primitive integer, `f32`, `f64` and `bool`
    pub fn builtin() -> &'static ParserMap {
        &BUILTIN
    }

    /// Register a typed converter for `type_name`, replacing any previous one
    pub fn with<T, E, F>(mut self, type_name: impl Into<String>, parse: F) -> Self
    where
        T: Send + 'static,
        E: Into<ParseError>,
        F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    {
        let parser: Parser = Arc::new(move |raw: &str| {
            parse(raw)
                .map(|value| Box::new(value) as BoxedValue)
                .map_err(Into::into)
        });
        self.insert(type_name, parser);
        self
    }

    /// Register `T::from_str` as the converter for `type_name`
    pub fn with_from_str<T>(self, type_name: impl Into<String>) -> Self
    where
        T: FromStr + Send + 'static,
        T::Err: Error + Send + Sync + 'static,
    {
        self.with(type_name, |raw: &str| raw.parse::<T>())
    }

    pub fn insert(&mut self, type_name: impl Into<String>, parser: Parser) -> Option<Parser> {
        self.parsers.insert(type_name.into(), parser)
    }

    pub fn get(&self, type_name: &str) -> Option<&Parser> {
        self.parsers.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.parsers.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Registered type identifiers, sorted
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.parsers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ParserMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.type_names()).finish()
    }
}

/// Caller registries in precedence order, backed by the built-in registry
#[derive(Clone, Debug, Default)]
pub struct ParserChain {
    layers: Vec<ParserMap>,
}

impl ParserChain {
    pub fn new(layers: impl IntoIterator<Item = ParserMap>) -> Self {
        Self {
            layers: layers.into_iter().collect(),
        }
    }

    /// First converter registered for `type_name`, walking caller layers before built-ins
    pub fn resolve(&self, type_name: &str) -> Option<&Parser> {
        self.layers
            .iter()
            .chain(std::iter::once(ParserMap::builtin()))
            .find_map(|layer| layer.get(type_name))
    }

    /// Number of caller-supplied layers
    pub fn depth(&self) -> usize {
        self.layers.len()
    }
}

/// Permissive boolean conversion: unrecognized input is `false`, never an error
pub fn parse_bool(raw: &str) -> bool {
    let lowered = raw.to_lowercase();
    TRUE_VALUES.contains(&lowered.as_str())
}

fn parse_number<T>(raw: &str) -> Result<T, ParseError>
where
    T: FromStr,
    T::Err: Error + Send + Sync + 'static,
{
    raw.parse::<T>().map_err(Into::into)
}

/// Unsigned widths take no sign at all, not even `+`
fn parse_unsigned<T>(raw: &str) -> Result<T, ParseError>
where
    T: FromStr,
    T::Err: Error + Send + Sync + 'static,
{
    if raw.starts_with('+') {
        return Err(SignedUnsignedError {
            raw: raw.to_string(),
        }
        .into());
    }
    parse_number(raw)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUnsignedError {
    raw: String,
}

impl fmt::Display for SignedUnsignedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsigned value '{}' must not carry a sign", self.raw)
    }
}

impl Error for SignedUnsignedError {}

fn parse_f32(raw: &str) -> Result<f32, ParseError> {
    let value: f32 = raw.parse()?;
    check_finite(raw, value.is_infinite())?;
    Ok(value)
}

fn parse_f64(raw: &str) -> Result<f64, ParseError> {
    let value: f64 = raw.parse()?;
    check_finite(raw, value.is_infinite())?;
    Ok(value)
}

/// Rejects finite literals that overflowed to infinity
fn check_finite(raw: &str, infinite: bool) -> Result<(), ParseError> {
    let explicit = raw
        .trim_start_matches(['+', '-'])
        .to_ascii_lowercase()
        .starts_with("inf");
    if infinite && !explicit {
        return Err(FloatRangeError {
            raw: raw.to_string(),
        }
        .into());
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatRangeError {
    raw: String,
}

impl fmt::Display for FloatRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "value '{}' is out of range for the target float type", self.raw)
    }
}

impl Error for FloatRangeError {}
