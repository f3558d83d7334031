use crate::naming::to_screaming_snake;
use crate::parser::BoxedValue;

/// Metadata about one field of a bindable record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldDescriptor {
    /// Field identifier as declared on the struct
    pub name: &'static str,
    /// Declared type identifier, used to pick a converter
    pub type_name: &'static str,
    /// Whether the field is an `Option<T>` slot
    pub optional: bool,
}

impl FieldDescriptor {
    pub const fn required(name: &'static str, type_name: &'static str) -> Self {
        Self {
            name,
            type_name,
            optional: false,
        }
    }

    pub const fn optional(name: &'static str, type_name: &'static str) -> Self {
        Self {
            name,
            type_name,
            optional: true,
        }
    }

    /// Environment variable this field is read from
    pub fn env_key(&self) -> String {
        to_screaming_snake(self.name)
    }
}

/// A flat struct whose fields can be bound from the environment
///
/// Usually implemented with `#[derive(EnvRecord)]`.
pub trait EnvRecord: Default {
    /// Bindable fields in declaration order
    fn fields() -> &'static [FieldDescriptor];

    /// Store `value` into the named field
    ///
    /// Hands the value back when the field does not exist or the value has the
    /// wrong type for it.
    fn assign(&mut self, field: &str, value: BoxedValue) -> Result<(), BoxedValue>;
}

/// Supplies fallback values by field name
///
/// Usually implemented with `#[derive(DefaultSource)]`. The source only needs
/// to share field names with the record being bound, not its whole shape.
pub trait DefaultSource {
    /// A copy of the named field's value, or `None` if there is no such field
    fn default_value(&self, field: &str) -> Option<BoxedValue>;
}

/// Store a boxed value into a non-optional slot of type `T`
pub fn assign_required<T: 'static>(slot: &mut T, value: BoxedValue) -> Result<(), BoxedValue> {
    *slot = *value.downcast::<T>()?;
    Ok(())
}

/// Store a boxed value into an `Option<T>` slot
///
/// Accepts either a whole `Option<T>` (copied verbatim from a default) or a bare
/// `T` (a converter result, stored as `Some`).
pub fn assign_optional<T: 'static>(
    slot: &mut Option<T>,
    value: BoxedValue,
) -> Result<(), BoxedValue> {
    let value = match value.downcast::<Option<T>>() {
        Ok(whole) => {
            *slot = *whole;
            return Ok(());
        }
        Err(value) => value,
    };
    *slot = Some(*value.downcast::<T>()?);
    Ok(())
}
