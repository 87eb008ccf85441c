//! Registry of field factories keyed by type name.
//!
//! Schemas described in header files name their columns by type, e.g.
//! `Field<string>\tField<uint32>\tArrayField<int>`. The registry maps each such
//! name to a factory and assembles a [`Record`] from an ordered list of names.
//!
//! Registration happens on a [`FieldTypeRegistryBuilder`]. Calling
//! [`build`](FieldTypeRegistryBuilder::build) seals it into a read-only
//! [`FieldTypeRegistry`], so no type can be added once parsing has started.

use log::{debug, error};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::composite::{ArrayField, Record};
use crate::error::{Error, FieldError, Result};
use crate::field::{Field, FieldKind};

/// Builds a field of one registered type, given the field's name.
pub type FieldFactory = Arc<dyn Fn(&str) -> Field + Send + Sync>;

static GLOBAL_REGISTRY: OnceLock<FieldTypeRegistry> = OnceLock::new();

/// Registry key of a leaf field type, e.g. `Field<uint32>`.
pub fn field_type_name(kind: FieldKind) -> String {
    format!("Field<{}>", kind.type_name())
}

/// Registry key of an array field type, e.g. `ArrayField<string>`.
pub fn array_type_name(kind: FieldKind) -> String {
    format!("ArrayField<{}>", kind.type_name())
}

/// Mutable registry used before parsing begins.
pub struct FieldTypeRegistryBuilder {
    factories: HashMap<String, FieldFactory>,
}

impl FieldTypeRegistryBuilder {
    /// A builder with no registered types.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A builder with the built-in `Field<..>` and `ArrayField<..>` types registered.
    pub fn new() -> Self {
        let mut builder = Self::empty();
        builder.register_builtins();
        builder
    }

    /// Register `factory` under `type_name`.
    ///
    /// The first registration of a name wins. Returns `false`, keeping the existing
    /// factory, if `type_name` was already registered.
    pub fn register<F>(&mut self, type_name: impl Into<String>, factory: F) -> bool
    where
        F: Fn(&str) -> Field + Send + Sync + 'static,
    {
        match self.factories.entry(type_name.into()) {
            Entry::Occupied(entry) => {
                debug!("field type `{}` already registered, keeping it", entry.key());
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(factory));
                true
            }
        }
    }

    /// Register the leaf and array types for every [`FieldKind`].
    pub fn register_builtins(&mut self) {
        for kind in FieldKind::ALL {
            self.register(field_type_name(kind), move |name| kind.instantiate(name));
        }
        for kind in FieldKind::ALL {
            self.register(array_type_name(kind), move |name| {
                ArrayField::new(name, kind).into()
            });
        }
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Seal the registry.
    pub fn build(self) -> FieldTypeRegistry {
        FieldTypeRegistry {
            factories: self.factories,
        }
    }
}

impl Default for FieldTypeRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only mapping from type names to field factories.
///
/// # Examples
///
/// ```
/// use dict_parser::FieldTypeRegistry;
///
/// let registry = FieldTypeRegistry::with_builtins();
/// let mut record = registry.build_record(&["Field<string>", "Field<uint32>"]);
///
/// record.deserialize("zhang\t18").unwrap();
/// assert_eq!(record.data::<u32>("1"), Some(&18));
/// ```
pub struct FieldTypeRegistry {
    factories: HashMap<String, FieldFactory>,
}

impl FieldTypeRegistry {
    /// Start a registry from the built-in types.
    pub fn builder() -> FieldTypeRegistryBuilder {
        FieldTypeRegistryBuilder::new()
    }

    pub fn with_builtins() -> Self {
        Self::builder().build()
    }

    /// The process-wide registry.
    ///
    /// Holds the built-in types unless [`install_global`](Self::install_global) ran
    /// first. Initialized at most once.
    pub fn global() -> &'static FieldTypeRegistry {
        GLOBAL_REGISTRY.get_or_init(Self::with_builtins)
    }

    /// Make `registry` the process-wide registry.
    ///
    /// # Errors
    ///
    /// Fails if the global registry has already been initialized, either by an
    /// earlier call or by a call to [`global`](Self::global).
    pub fn install_global(registry: FieldTypeRegistry) -> Result<&'static FieldTypeRegistry> {
        GLOBAL_REGISTRY.set(registry).map_err(|_| {
            Error::Registry("global field type registry is already initialized".to_string())
        })?;
        Ok(Self::global())
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Create a field of type `type_name` called `field_name`.
    pub fn instantiate(&self, type_name: &str, field_name: &str) -> Option<Field> {
        self.factories
            .get(type_name)
            .map(|factory| factory(field_name))
    }

    /// Build a record with one field per type name, named by position (`"0"`, `"1"`, ...).
    ///
    /// Unknown type names are logged and skipped, leaving the record shorter than
    /// `type_names`. Lines parsed against such a record fail the field count check.
    pub fn build_record<S: AsRef<str>>(&self, type_names: &[S]) -> Record {
        let mut record = Record::record();
        for (position, type_name) in type_names.iter().enumerate() {
            let type_name = type_name.as_ref();
            match self.instantiate(type_name, &position.to_string()) {
                Some(field) => {
                    // factories that ignore the requested name can collide
                    if let Err(err) = record.add_field(field) {
                        error!("position {} ({}): {}", position, type_name, err);
                    }
                }
                None => error!("key [{}] not exist", type_name),
            }
        }
        debug!(
            "built record with {} of {} field(s)",
            record.num_fields(),
            type_names.len()
        );
        record
    }

    /// Like [`build_record`](Self::build_record) but fails on the first unknown type
    /// name or rejected field.
    pub fn build_record_strict<S: AsRef<str>>(
        &self,
        type_names: &[S],
    ) -> std::result::Result<Record, FieldError> {
        let mut record = Record::record();
        for (position, type_name) in type_names.iter().enumerate() {
            let type_name = type_name.as_ref();
            let field = self
                .instantiate(type_name, &position.to_string())
                .ok_or_else(|| FieldError::UnknownType(type_name.to_string()))?;
            record.add_field(field)?;
        }
        Ok(record)
    }
}

impl Default for FieldTypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for FieldTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldTypeRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::CompositeField;
    use crate::field::TypedField;

    fn money(name: &str) -> Field {
        CompositeField::new(name, ",")
            .with_field(TypedField::<i32>::new("income"))
            .and_then(|f| f.with_field(TypedField::<i32>::new("expense")))
            .map(Field::from)
            .unwrap_or_else(|_| FieldKind::Str.instantiate(name))
    }

    #[test]
    fn test_builtin_type_names() {
        let registry = FieldTypeRegistry::with_builtins();
        assert_eq!(registry.len(), 10);
        for name in [
            "Field<int>",
            "Field<float>",
            "Field<uint32>",
            "Field<uint64>",
            "Field<string>",
            "ArrayField<int>",
            "ArrayField<float>",
            "ArrayField<uint32>",
            "ArrayField<uint64>",
            "ArrayField<string>",
        ] {
            assert!(registry.contains(name), "missing {}", name);
        }
    }

    #[test]
    fn test_register_first_wins() {
        let mut builder = FieldTypeRegistry::builder();
        assert!(!builder.register("Field<int>", |name| FieldKind::Str.instantiate(name)));
        assert!(builder.register("Money", money));
        assert!(!builder.register("Money", |name| FieldKind::Int.instantiate(name)));

        let registry = builder.build();
        let field = registry.instantiate("Field<int>", "x").unwrap();
        assert_eq!(field.kind(), Some(FieldKind::Int));
        let field = registry.instantiate("Money", "m").unwrap();
        assert_eq!(field.num_fields(), 2);
    }

    #[test]
    fn test_build_record_positional_names() {
        let registry = FieldTypeRegistry::with_builtins();
        let record = registry.build_record(&["Field<string>", "ArrayField<uint64>", "Field<float>"]);

        assert_eq!(record.num_fields(), 3);
        let names: Vec<&str> = record.sub_fields().iter().map(Field::name).collect();
        assert_eq!(names, vec!["0", "1", "2"]);
        assert!(record.get_field("1").and_then(Field::as_array).is_some());
    }

    #[test]
    fn test_build_record_skips_unknown_types() {
        let registry = FieldTypeRegistry::with_builtins();
        let mut record = registry.build_record(&["Field<string>", "Field<bool>", "Field<int>"]);

        assert_eq!(record.num_fields(), 2);
        assert!(record.get_field("1").is_none());
        assert_eq!(record.data::<i32>("2"), Some(&0));

        let err = record.deserialize("a\ttrue\t3").unwrap_err();
        assert!(matches!(
            err,
            FieldError::CountMismatch {
                expected: 2,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_build_record_strict_rejects_unknown_types() {
        let registry = FieldTypeRegistry::with_builtins();
        let err = registry
            .build_record_strict(&["Field<string>", "Field<bool>"])
            .unwrap_err();
        assert_eq!(err, FieldError::UnknownType("Field<bool>".to_string()));

        let record = registry
            .build_record_strict(&["Field<string>", "Field<int>"])
            .unwrap();
        assert_eq!(record.num_fields(), 2);
    }

    #[test]
    fn test_custom_composite_type() {
        let mut builder = FieldTypeRegistry::builder();
        builder.register("Money", money);
        let registry = builder.build();

        let mut record = registry.build_record(&["Field<string>", "Money"]);
        record.deserialize("wangwu\t199,20").unwrap();

        let money = record.get_field("1").and_then(Field::as_composite).unwrap();
        assert_eq!(money.data::<i32>("income"), Some(&199));
        assert_eq!(money.data::<i32>("expense"), Some(&20));
    }

    #[test]
    fn test_empty_builder() {
        let registry = FieldTypeRegistryBuilder::empty().build();
        assert!(registry.is_empty());
        assert_eq!(registry.build_record(&["Field<int>"]).num_fields(), 0);
    }
}
