//! Component values.
//!
//! A component value is either a primitive, stored and replaced by value, or
//! a composite, a mutable structured value reached through a shared
//! [`CompositeRef`] handle. Composite handles are what the store pools and
//! recycles.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::intern::SymbolId;

/// A component value.
///
/// Everything except [`Value::Composite`] is a primitive. [`Value::Unset`] is
/// the absent marker: handing it to the store removes the component.
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// No value. Setting a component to `Unset` removes it.
    #[default]
    Unset,
    /// Explicit null. Unlike `Unset`, this is stored.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// String value.
    String(Arc<str>),
    /// Interned symbol atom.
    Symbol(SymbolId),
    /// Handle to a mutable structured value.
    Composite(CompositeRef),
}

impl Value {
    /// Returns true for every variant except [`Value::Composite`].
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        !self.is_composite()
    }

    /// Returns true if this value is a composite handle.
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }

    /// Returns true if this is the absent marker.
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Returns true if this value is an explicit null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Attempts to extract a boolean value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract an integer value.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a float value.
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a number as f64 (converts int to float).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a symbol.
    #[must_use]
    pub const fn as_symbol(&self) -> Option<SymbolId> {
        match self {
            Self::Symbol(id) => Some(*id),
            _ => None,
        }
    }

    /// Attempts to extract a composite handle.
    #[must_use]
    pub const fn as_composite(&self) -> Option<&CompositeRef> {
        match self {
            Self::Composite(c) => Some(c),
            _ => None,
        }
    }

    /// Identity comparison used to skip redundant assignments.
    ///
    /// Primitives compare by value; composites compare by handle, so two
    /// distinct handles with equal contents are not identical.
    #[must_use]
    pub fn is_identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Composite(a), Self::Composite(b)) => CompositeRef::ptr_eq(a, b),
            (Self::Composite(_), _) | (_, Self::Composite(_)) => false,
            _ => self == other,
        }
    }

    /// Returns a copy that shares no composite handles with `self`.
    #[must_use]
    pub fn detached(&self) -> Self {
        match self {
            Self::Composite(c) => Self::Composite(c.detached()),
            other => other.clone(),
        }
    }
}

// Floats compare by bit pattern; composites compare by content
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unset, Self::Unset) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::Composite(a), Self::Composite(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => write!(f, "unset"),
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Symbol(id) => write!(f, "{id:?}"),
            Self::Composite(c) => write!(f, "{c:?}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => write!(f, "unset"),
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Symbol(id) => write!(f, "#{}", id.index()),
            Self::Composite(c) => write!(f, "{}", c.borrow()),
        }
    }
}

/// A mutable structured value.
///
/// Records keep their fields in insertion order. Writes define the shape:
/// setting a field on a list turns it into a record, pushing onto a record
/// turns it into a list.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Composite {
    /// Named fields.
    Record(IndexMap<Arc<str>, Value>),
    /// Positional items.
    List(Vec<Value>),
}

impl Default for Composite {
    fn default() -> Self {
        Self::record()
    }
}

impl Composite {
    /// Creates an empty record.
    #[must_use]
    pub fn record() -> Self {
        Self::Record(IndexMap::new())
    }

    /// Creates an empty list.
    #[must_use]
    pub fn list() -> Self {
        Self::List(Vec::new())
    }

    /// Builder method to set a field.
    #[must_use]
    pub fn with(mut self, field: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Returns a field of a record.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self {
            Self::Record(fields) => fields.get(field),
            Self::List(_) => None,
        }
    }

    /// Sets a field, returning the previous value.
    ///
    /// On a list this turns the composite into a record holding only the new
    /// field. The list items are dropped and `None` is returned.
    pub fn set(&mut self, field: impl Into<Arc<str>>, value: impl Into<Value>) -> Option<Value> {
        if let Self::Record(fields) = self {
            return fields.insert(field.into(), value.into());
        }
        let mut fields = IndexMap::new();
        fields.insert(field.into(), value.into());
        *self = Self::Record(fields);
        None
    }

    /// Removes a field from a record, keeping the order of the rest.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        match self {
            Self::Record(fields) => fields.shift_remove(field),
            Self::List(_) => None,
        }
    }

    /// Returns an item of a list.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<&Value> {
        match self {
            Self::List(items) => items.get(index),
            Self::Record(_) => None,
        }
    }

    /// Appends an item.
    ///
    /// On a record this turns the composite into a list holding only the new
    /// item. Every field of the record is dropped, including fields built by
    /// a component factory.
    pub fn push(&mut self, value: impl Into<Value>) {
        if let Self::Record(_) = self {
            *self = Self::list();
        }
        if let Self::List(items) = self {
            items.push(value.into());
        }
    }

    /// Number of fields or items.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Record(fields) => fields.len(),
            Self::List(items) => items.len(),
        }
    }

    /// Returns true if there are no fields or items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every field or item, keeping the shape and its allocation.
    pub fn clear(&mut self) {
        match self {
            Self::Record(fields) => fields.clear(),
            Self::List(items) => items.clear(),
        }
    }

    /// Shallow-copies every field or item of `source` into `self`.
    ///
    /// Records merge per field, lists overwrite per index (growing as
    /// needed). When the shapes differ `self` becomes a copy of `source`.
    /// Nested composite handles are shared, not copied.
    pub fn copy_fields_from(&mut self, source: &Composite) {
        match (&mut *self, source) {
            (Self::Record(fields), Self::Record(from)) => {
                for (field, value) in from {
                    fields.insert(field.clone(), value.clone());
                }
            }
            (Self::List(items), Self::List(from)) => {
                for (i, value) in from.iter().enumerate() {
                    if let Some(slot) = items.get_mut(i) {
                        *slot = value.clone();
                    } else {
                        items.push(value.clone());
                    }
                }
            }
            _ => *self = source.clone(),
        }
    }

    /// Deep copy; nested composite handles are copied too.
    #[must_use]
    pub fn detached(&self) -> Self {
        match self {
            Self::Record(fields) => Self::Record(
                fields
                    .iter()
                    .map(|(field, value)| (field.clone(), value.detached()))
                    .collect(),
            ),
            Self::List(items) => Self::List(items.iter().map(Value::detached).collect()),
        }
    }
}

impl fmt::Display for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record(fields) => {
                write!(f, "{{")?;
                for (i, (field, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}: {value}")?;
                }
                write!(f, "}}")
            }
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Shared handle to a [`Composite`].
///
/// Cloning the handle aliases the same value. Composites must not contain a
/// handle to themselves; equality and [`CompositeRef::detached`] recurse.
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CompositeRef(Rc<RefCell<Composite>>);

impl CompositeRef {
    /// Wraps a composite in a new handle.
    #[must_use]
    pub fn new(composite: Composite) -> Self {
        Self(Rc::new(RefCell::new(composite)))
    }

    /// Borrows the composite.
    ///
    /// # Panics
    ///
    /// Panics if the composite is currently mutably borrowed.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, Composite> {
        self.0.borrow()
    }

    /// Mutably borrows the composite.
    ///
    /// # Panics
    ///
    /// Panics if the composite is currently borrowed.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, Composite> {
        self.0.borrow_mut()
    }

    /// Returns true if both handles point at the same composite.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    /// Returns a new handle to a deep copy of the composite.
    #[must_use]
    pub fn detached(&self) -> Self {
        Self::new(self.borrow().detached())
    }
}

impl PartialEq for CompositeRef {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other) || *self.borrow() == *other.borrow()
    }
}

impl fmt::Debug for CompositeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(composite) => write!(f, "{:?}", &*composite),
            Err(_) => write!(f, "<borrowed composite>"),
        }
    }
}

// Convenience From implementations

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}

impl From<Arc<str>> for Value {
    fn from(s: Arc<str>) -> Self {
        Self::String(s)
    }
}

impl From<SymbolId> for Value {
    fn from(id: SymbolId) -> Self {
        Self::Symbol(id)
    }
}

impl From<CompositeRef> for Value {
    fn from(handle: CompositeRef) -> Self {
        Self::Composite(handle)
    }
}

impl From<Composite> for Value {
    fn from(composite: Composite) -> Self {
        Self::Composite(CompositeRef::new(composite))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
