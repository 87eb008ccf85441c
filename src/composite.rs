//! Container fields: delimiter splitting and positional binding.
//!
//! Deserializing a container happens in two stages. The split stage turns the
//! input token into a list of sub-tokens; the bind stage hands each sub-token to
//! the child at the same position. [`ArrayField`] replaces the split stage with a
//! self-describing `<count>:<item>,<item>,...` grammar and sizes its children
//! from the input.

use log::{debug, error};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::HashMap;

use crate::error::FieldError;
use crate::field::{Field, FieldKind, Primitive};

/// Default delimiter between the fields of a [`Record`].
pub const RECORD_DELIMITER: &str = "\t";
/// Default delimiter between the sub fields of a [`NestedField`].
pub const NESTED_DELIMITER: &str = "#";
/// Default delimiter between the items of an [`ArrayField`].
pub const ARRAY_ITEM_DELIMITER: &str = ",";

const ARRAY_COUNT_SEPARATOR: &str = ":";
const ARRAY_ITEM_PREFIX: &str = "sub_field_";
const RECORD_NAME: &str = "record";

/// Split `input` on any character of `delimiter`.
///
/// Every maximal run of non-delimiter characters is one item. Empty segments
/// produced by leading, trailing or repeated delimiters are dropped.
///
/// ```
/// use dict_parser::composite::split_tokens;
///
/// assert_eq!(split_tokens("a\t\tb\t", "\t"), vec!["a", "b"]);
/// assert!(split_tokens("###", "#").is_empty());
/// ```
pub fn split_tokens<'a>(input: &'a str, delimiter: &str) -> Vec<&'a str> {
    input
        .split(|c: char| delimiter.contains(c))
        .filter(|item| !item.is_empty())
        .collect()
}

/// An ordered, named container of child fields.
///
/// Children are owned exclusively and addressed by position or by name. Names are
/// unique within one container.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeField {
    name: String,
    delimiter: String,
    sub_fields: Vec<Field>,
    index: HashMap<String, usize>,
}

/// A composite used as a field inside another composite (`#` delimited by default).
pub type NestedField = CompositeField;

/// The top-level composite for one line of input (tab delimited by default).
pub type Record = CompositeField;

impl CompositeField {
    pub fn new(name: impl Into<String>, delimiter: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            delimiter: delimiter.into(),
            sub_fields: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Empty nested field using the `#` delimiter.
    pub fn nested(name: impl Into<String>) -> Self {
        Self::new(name, NESTED_DELIMITER)
    }

    /// Empty record named `record` using the tab delimiter.
    pub fn record() -> Self {
        Self::new(RECORD_NAME, RECORD_DELIMITER)
    }

    /// Replace the delimiter, keeping the children.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Append a child field.
    ///
    /// Fails with [`FieldError::DuplicateName`] if a child with the same name is
    /// already present; the container is left unchanged in that case.
    pub fn add_field(&mut self, field: impl Into<Field>) -> Result<(), FieldError> {
        let field = field.into();
        if self.index.contains_key(field.name()) {
            error!(
                "duplicated field name `{}` in `{}`",
                field.name(),
                self.name
            );
            return Err(FieldError::DuplicateName(field.name().to_string()));
        }
        self.index
            .insert(field.name().to_string(), self.sub_fields.len());
        self.sub_fields.push(field);
        Ok(())
    }

    /// Builder-style [`add_field`](Self::add_field).
    pub fn with_field(mut self, field: impl Into<Field>) -> Result<Self, FieldError> {
        self.add_field(field)?;
        Ok(self)
    }

    /// Split `token` on the delimiter and bind the pieces to the children.
    ///
    /// Binding stops at the first failing child. Children before it keep their new
    /// values, children after it are not touched.
    pub fn deserialize(&mut self, token: &str) -> Result<(), FieldError> {
        let items = split_tokens(token, &self.delimiter);
        self.bind(&items).inspect_err(|err| {
            debug!("failed to parse `{}` from {:?}: {}", self.name, token, err);
        })
    }

    pub(crate) fn bind(&mut self, items: &[&str]) -> Result<(), FieldError> {
        if items.len() != self.sub_fields.len() {
            error!(
                "`{}`: items.size={}, sub_fields.size={} mismatch",
                self.name,
                items.len(),
                self.sub_fields.len()
            );
            return Err(FieldError::CountMismatch {
                field: self.name.clone(),
                expected: self.sub_fields.len(),
                actual: items.len(),
            });
        }

        for (field, item) in self.sub_fields.iter_mut().zip(items) {
            field.deserialize(item)?;
        }
        Ok(())
    }

    /// Drop all children and install `fields` in their place.
    fn replace_sub_fields(&mut self, fields: Vec<Field>) {
        self.index = fields
            .iter()
            .enumerate()
            .map(|(i, field)| (field.name().to_string(), i))
            .collect();
        self.sub_fields = fields;
    }

    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.index.get(name).map(|&i| &self.sub_fields[i])
    }

    pub fn get_field_mut(&mut self, name: &str) -> Option<&mut Field> {
        let i = *self.index.get(name)?;
        self.sub_fields.get_mut(i)
    }

    /// Child at `index`, or `None` (logged) if out of range.
    pub fn sub_field_at(&self, index: usize) -> Option<&Field> {
        let field = self.sub_fields.get(index);
        if field.is_none() {
            error!(
                "`{}`: index {} >= sub_fields.size {}",
                self.name,
                index,
                self.sub_fields.len()
            );
        }
        field
    }

    pub fn num_fields(&self) -> usize {
        self.sub_fields.len()
    }

    pub fn sub_fields(&self) -> &[Field] {
        &self.sub_fields
    }

    /// Value of the leaf child `name`, if it exists and holds a `T`.
    pub fn data<T: Primitive>(&self, name: &str) -> Option<&T> {
        self.get_field(name)?.data::<T>()
    }
}

impl Serialize for CompositeField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sub_fields.len()))?;
        for field in &self.sub_fields {
            map.serialize_entry(field.name(), field)?;
        }
        map.end()
    }
}

/// A list of leaf fields whose length is read from the input.
///
/// The accepted grammar is `<count>:<item><delim><item>...`. Every successful
/// split rebuilds the children as `count` fresh fields named `sub_field_0`,
/// `sub_field_1` and so on, so a field reused across lines never carries items
/// from an earlier, longer input.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayField {
    element: FieldKind,
    items: CompositeField,
}

impl ArrayField {
    pub fn new(name: impl Into<String>, element: FieldKind) -> Self {
        Self {
            element,
            items: CompositeField::new(name, ARRAY_ITEM_DELIMITER),
        }
    }

    /// Array of `T` elements, e.g. `ArrayField::of::<u64>("ids")`.
    pub fn of<T: Primitive>(name: impl Into<String>) -> Self {
        Self::new(name, T::KIND)
    }

    /// Replace the item delimiter.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.items = self.items.with_delimiter(delimiter);
        self
    }

    pub fn name(&self) -> &str {
        self.items.name()
    }

    pub fn delimiter(&self) -> &str {
        self.items.delimiter()
    }

    pub fn element_kind(&self) -> FieldKind {
        self.element
    }

    pub fn deserialize(&mut self, token: &str) -> Result<(), FieldError> {
        let items = self.split(token).inspect_err(|err| {
            error!("`{}`: {}", self.name(), err);
        })?;

        let fields = (0..items.len())
            .map(|i| {
                self.element
                    .instantiate(format!("{}{}", ARRAY_ITEM_PREFIX, i))
            })
            .collect();
        self.items.replace_sub_fields(fields);

        self.items.bind(&items).inspect_err(|err| {
            debug!("failed to parse `{}` from {:?}: {}", self.name(), token, err);
        })
    }

    fn split<'a>(&self, token: &'a str) -> Result<Vec<&'a str>, FieldError> {
        let parts = split_tokens(token, ARRAY_COUNT_SEPARATOR);
        let [count, rest] = parts.as_slice() else {
            return Err(self.format_error(format!(
                "expected `<count>:<items>`, got {} part(s) in {:?}",
                parts.len(),
                token
            )));
        };

        let count: usize = count
            .parse()
            .map_err(|_| self.format_error(format!("invalid item count {:?}", count)))?;

        let items = split_tokens(rest, self.items.delimiter());
        if items.len() != count {
            return Err(self.format_error(format!(
                "numele={} but found {} item(s)",
                count,
                items.len()
            )));
        }
        Ok(items)
    }

    fn format_error(&self, reason: String) -> FieldError {
        FieldError::SplitFormat {
            field: self.name().to_string(),
            reason,
        }
    }

    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.items.get_field(name)
    }

    pub fn sub_field_at(&self, index: usize) -> Option<&Field> {
        self.items.sub_field_at(index)
    }

    pub fn num_fields(&self) -> usize {
        self.items.num_fields()
    }

    pub fn sub_fields(&self) -> &[Field] {
        self.items.sub_fields()
    }

    /// Item values in order, or `None` if the element kind is not `T`.
    pub fn values<T: Primitive>(&self) -> Option<Vec<&T>> {
        if T::KIND != self.element {
            return None;
        }
        Some(
            self.items
                .sub_fields()
                .iter()
                .filter_map(Field::data::<T>)
                .collect(),
        )
    }
}

impl Serialize for ArrayField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.num_fields()))?;
        for field in self.sub_fields() {
            seq.serialize_element(field)?;
        }
        seq.end()
    }
}
