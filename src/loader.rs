use crate::error::{ErrorCollection, FieldError, ValueTypeMismatch};
use crate::field::{DefaultSource, EnvRecord, FieldDescriptor};
use crate::parser::{ParserChain, ParserMap};
use crate::source::{EnvLookup, ProcessEnv};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, trace};

/// Result of binding a record: the best-effort record plus any field errors
///
/// Fields that failed are left at their `Default` value.
#[derive(Debug)]
pub struct Binding<T> {
    pub record: T,
    /// `None` when every field resolved
    pub errors: Option<ErrorCollection>,
}

impl<T> Binding<T> {
    pub fn is_ok(&self) -> bool {
        self.errors.is_none()
    }

    pub fn into_result(self) -> Result<T, ErrorCollection> {
        match self.errors {
            None => Ok(self.record),
            Some(errors) => Err(errors),
        }
    }

    pub fn into_parts(self) -> (T, Option<ErrorCollection>) {
        (self.record, self.errors)
    }
}

/// Bind every field of `T` from `env`
///
/// Each field, in declaration order:
/// - set in `env`: converted with the first matching parser in `chain`
/// - unset, `defaults` given: copied from the same-named default field
/// - unset, no defaults: left as `None` if optional, otherwise an error
///
/// All fields are always evaluated, so the returned errors cover the whole record.
pub fn bind<T, E>(
    env: &E,
    chain: &ParserChain,
    defaults: Option<&dyn DefaultSource>,
) -> Binding<T>
where
    T: EnvRecord,
    E: EnvLookup + ?Sized,
{
    let mut record = T::default();
    let mut errors = ErrorCollection::new();

    for field in T::fields() {
        let key = field.env_key();
        trace!(field = field.name, key = %key, "looking up field");

        let outcome = match env.lookup(&key) {
            Some(raw) => bind_raw(&mut record, field, &key, &raw, chain),
            None => match defaults {
                Some(defaults) => bind_default(&mut record, field, &key, defaults),
                None if field.optional => {
                    debug!(field = field.name, key = %key, "optional field left unset");
                    Ok(())
                }
                None => Err(FieldError::required(&key, field.type_name)),
            },
        };

        if let Err(error) = outcome {
            debug!(field = field.name, key = %key, kind = %error.kind, "field failed to bind");
            errors.push(error);
        }
    }

    Binding {
        record,
        errors: errors.into_option(),
    }
}

fn bind_raw<T: EnvRecord>(
    record: &mut T,
    field: &FieldDescriptor,
    key: &str,
    raw: &str,
    chain: &ParserChain,
) -> Result<(), FieldError> {
    let Some(parse) = chain.resolve(field.type_name) else {
        return Err(FieldError::unsupported_type(key, field.type_name));
    };

    let value = parse(raw)
        .map_err(|e| FieldError::wrong_type(key, field.type_name, Arc::from(e)))?;

    record.assign(field.name, value).map_err(|_| {
        let mismatch = ValueTypeMismatch {
            field: field.name,
            type_name: field.type_name,
        };
        FieldError::wrong_type(key, field.type_name, Arc::new(mismatch))
    })?;

    debug!(field = field.name, key = %key, "bound from environment");
    Ok(())
}

fn bind_default<T: EnvRecord>(
    record: &mut T,
    field: &FieldDescriptor,
    key: &str,
    defaults: &dyn DefaultSource,
) -> Result<(), FieldError> {
    let Some(value) = defaults.default_value(field.name) else {
        return Err(FieldError::required(key, field.type_name));
    };

    // A same-named default of another type is no default at all
    if record.assign(field.name, value).is_err() {
        return Err(FieldError::required(key, field.type_name));
    }

    debug!(field = field.name, key = %key, "bound from default");
    Ok(())
}

/// Loads records of type `T`, with caller parsers layered over the built-ins
///
/// # Example
/// ```rust
/// use envbind::{EnvRecord, Loader, MapEnv};
///
/// #[derive(Debug, Default, EnvRecord)]
/// struct Config {
///     app_max_workers: i32,
///     app_logging_type: Option<String>,
/// }
///
/// let env = MapEnv::new().with_var("APP_MAX_WORKERS", "10");
/// let config = Loader::<Config>::new()
///     .bind_with(&env, None)
///     .into_result()
///     .unwrap();
///
/// assert_eq!(config.app_max_workers, 10);
/// assert_eq!(config.app_logging_type, None);
/// ```
pub struct Loader<T> {
    chain: ParserChain,
    _record: PhantomData<fn() -> T>,
}

impl<T: EnvRecord> Loader<T> {
    pub fn new() -> Self {
        Self::with_parsers([])
    }

    /// Earlier maps take precedence over later ones, and all of them over the built-ins
    pub fn with_parsers(parsers: impl IntoIterator<Item = ParserMap>) -> Self {
        Self {
            chain: ParserChain::new(parsers),
            _record: PhantomData,
        }
    }

    pub fn chain(&self) -> &ParserChain {
        &self.chain
    }

    /// Bind from the process environment without defaults
    pub fn load(&self) -> Result<T, ErrorCollection> {
        self.bind_with(&ProcessEnv, None).into_result()
    }

    /// Bind from the process environment, falling back to `defaults` for unset fields
    pub fn load_with_defaults<D: DefaultSource>(&self, defaults: &D) -> Result<T, ErrorCollection> {
        self.bind_with(&ProcessEnv, Some(defaults)).into_result()
    }

    /// Bind from any environment, keeping the partial record on failure
    pub fn bind_with<E: EnvLookup + ?Sized>(
        &self,
        env: &E,
        defaults: Option<&dyn DefaultSource>,
    ) -> Binding<T> {
        bind(env, &self.chain, defaults)
    }

    /// Bind from the process environment, panicking with a report of every error
    pub fn load_or_panic(&self) -> T {
        match self.load() {
            Ok(record) => record,
            Err(errors) => panic!("{}", errors.report()),
        }
    }
}

impl<T: EnvRecord> Default for Loader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Loader<T> {
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Loader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("record", &std::any::type_name::<T>())
            .field("chain", &self.chain)
            .finish()
    }
}

/// Shorthand for loading any [`EnvRecord`] with the built-in parsers
pub trait FromEnv: EnvRecord {
    fn from_env() -> Result<Self, ErrorCollection> {
        Loader::<Self>::new().load()
    }

    fn from_env_with_defaults<D: DefaultSource>(defaults: &D) -> Result<Self, ErrorCollection> {
        Loader::<Self>::new().load_with_defaults(defaults)
    }
}

impl<T: EnvRecord> FromEnv for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::field::{assign_optional, assign_required};
    use crate::parser::{BoxedValue, ParseError};
    use crate::source::MapEnv;

    // Implemented by hand to exercise the trait without the derive
    #[derive(Debug, Default, PartialEq)]
    struct Settings {
        max_workers: i32,
        logging_type: Option<String>,
    }

    impl EnvRecord for Settings {
        fn fields() -> &'static [FieldDescriptor] {
            const FIELDS: &[FieldDescriptor] = &[
                FieldDescriptor::required("max_workers", "i32"),
                FieldDescriptor::optional("logging_type", "String"),
            ];
            FIELDS
        }

        fn assign(&mut self, field: &str, value: BoxedValue) -> Result<(), BoxedValue> {
            match field {
                "max_workers" => assign_required(&mut self.max_workers, value),
                "logging_type" => assign_optional(&mut self.logging_type, value),
                _ => Err(value),
            }
        }
    }

    struct PartialDefaults {
        max_workers: i32,
    }

    impl DefaultSource for PartialDefaults {
        fn default_value(&self, field: &str) -> Option<BoxedValue> {
            match field {
                "max_workers" => Some(Box::new(self.max_workers)),
                _ => None,
            }
        }
    }

    #[test]
    fn test_binds_present_and_leaves_optional_absent() {
        let env = MapEnv::new().with_var("MAX_WORKERS", "10");
        let binding = Loader::<Settings>::new().bind_with(&env, None);

        assert!(binding.is_ok());
        assert_eq!(
            binding.record,
            Settings {
                max_workers: 10,
                logging_type: None,
            }
        );
    }

    #[test]
    fn test_optional_field_converted_when_present() {
        let env = MapEnv::new()
            .with_var("MAX_WORKERS", "1")
            .with_var("LOGGING_TYPE", "json");
        let settings = Loader::<Settings>::new()
            .bind_with(&env, None)
            .into_result()
            .unwrap();

        assert_eq!(settings.logging_type.as_deref(), Some("json"));
    }

    #[test]
    fn test_missing_required_field() {
        let binding = Loader::<Settings>::new().bind_with(&MapEnv::new(), None);
        let (record, errors) = binding.into_parts();
        let errors = errors.unwrap();

        assert_eq!(record, Settings::default());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].key, "MAX_WORKERS");
        assert_eq!(errors.errors()[0].kind, ErrorKind::Required);
        assert_eq!(errors.errors()[0].type_name, "i32");
    }

    #[test]
    fn test_conversion_failure_keeps_zero_value() {
        let env = MapEnv::new()
            .with_var("MAX_WORKERS", "more than ever")
            .with_var("LOGGING_TYPE", "text");
        let binding = Loader::<Settings>::new().bind_with(&env, None);

        assert_eq!(binding.record.max_workers, 0);
        assert_eq!(binding.record.logging_type.as_deref(), Some("text"));

        let errors = binding.errors.unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].kind, ErrorKind::WrongType);
        assert!(std::error::Error::source(&errors.errors()[0]).is_some());
    }

    #[test]
    fn test_defaults_fill_unset_fields() {
        let defaults = PartialDefaults { max_workers: 8 };
        let binding = Loader::<Settings>::new().bind_with(&MapEnv::new(), Some(&defaults));

        // logging_type is not on the defaults, so it is reported even though optional
        assert_eq!(binding.record.max_workers, 8);
        let errors = binding.errors.unwrap();
        assert_eq!(errors.keys(), vec!["LOGGING_TYPE"]);
        assert_eq!(errors.errors()[0].kind, ErrorKind::Required);
    }

    #[test]
    fn test_environment_wins_over_default() {
        let defaults = PartialDefaults { max_workers: 8 };
        let env = MapEnv::new()
            .with_var("MAX_WORKERS", "3")
            .with_var("LOGGING_TYPE", "text");
        let settings = Loader::<Settings>::new()
            .bind_with(&env, Some(&defaults))
            .into_result()
            .unwrap();

        assert_eq!(settings.max_workers, 3);
    }

    #[test]
    fn test_default_of_other_type_is_unusable() {
        struct WrongDefaults;
        impl DefaultSource for WrongDefaults {
            fn default_value(&self, _field: &str) -> Option<BoxedValue> {
                Some(Box::new(1.5f64))
            }
        }

        let binding = Loader::<Settings>::new().bind_with(&MapEnv::new(), Some(&WrongDefaults));
        let errors = binding.errors.unwrap();

        assert_eq!(errors.keys(), vec!["MAX_WORKERS", "LOGGING_TYPE"]);
        assert!(errors.iter().all(|e| e.kind == ErrorKind::Required));
    }

    #[test]
    fn test_unsupported_type() {
        #[derive(Debug, Default)]
        struct WithUrl {
            endpoint: String,
        }

        impl EnvRecord for WithUrl {
            fn fields() -> &'static [FieldDescriptor] {
                const FIELDS: &[FieldDescriptor] = &[FieldDescriptor::required("endpoint", "Url")];
                FIELDS
            }

            fn assign(&mut self, field: &str, value: BoxedValue) -> Result<(), BoxedValue> {
                match field {
                    "endpoint" => assign_required(&mut self.endpoint, value),
                    _ => Err(value),
                }
            }
        }

        let env = MapEnv::new().with_var("ENDPOINT", "http://localhost");
        let binding = bind::<WithUrl, _>(&env, &ParserChain::default(), None);
        let errors = binding.errors.unwrap();

        assert_eq!(errors.errors()[0].kind, ErrorKind::UnsupportedType);
        assert_eq!(errors.errors()[0].type_name, "Url");
        assert_eq!(binding.record.endpoint, "");
    }

    #[test]
    fn test_converter_returning_wrong_type_is_reported() {
        let custom = ParserMap::new().with("i32", |_: &str| Ok::<_, ParseError>(5i64));
        let env = MapEnv::new().with_var("MAX_WORKERS", "5");
        let binding = Loader::<Settings>::with_parsers([custom]).bind_with(&env, None);

        let errors = binding.errors.unwrap();
        assert_eq!(errors.errors()[0].kind, ErrorKind::WrongType);
        let cause = std::error::Error::source(&errors.errors()[0]).unwrap();
        assert!(cause.to_string().contains("max_workers"));
    }

    #[test]
    fn test_custom_parsers_take_precedence() {
        let custom = ParserMap::new().with("i32", |_: &str| Ok::<_, ParseError>(6i32));
        let env = MapEnv::new().with_var("MAX_WORKERS", "2");
        let settings = Loader::<Settings>::with_parsers([custom])
            .bind_with(&env, None)
            .into_result()
            .unwrap();

        assert_eq!(settings.max_workers, 6);
    }

    #[test]
    fn test_loader_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Loader<Settings>>();
    }

    #[test]
    fn test_loader_debug() {
        let loader = Loader::<Settings>::new();
        let debug = format!("{:?}", loader.clone());
        assert!(debug.contains("Settings"));
        assert_eq!(loader.chain().depth(), 0);
    }
}
