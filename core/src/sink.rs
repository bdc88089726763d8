//! Caller-owned result sinks.
//!
//! A sink is handed to [`ArgParser::add_option`](crate::ArgParser::add_option)
//! at registration and written whenever its option matches. The caller keeps
//! a clone of the handle and reads the values back after matching.
//!
//! - [`Holder<T>`] stores a single value.
//! - [`ArrayHolder<T>`] stores a fixed-length array, one slot per value of a
//!   multi-valued option.
//! - [`Collector`] appends one fresh [`Occurrence`] per match, for options
//!   that may be given several times.
//!
//! The parser only sees the type-erased [`ResultSink`], whose storage kind is
//! resolved once at registration.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use serde::Serialize;

use crate::types::{Value, ValueKind};

/// Rust types that can be stored by a sink.
pub trait ArgValue: Clone + Default + fmt::Debug + 'static {
    /// Storage kind of this type.
    const KIND: ValueKind;

    /// Wraps the value.
    fn into_value(self) -> Value;

    /// Unwraps a stored value of the same kind.
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_arg_value {
    ($($ty:ty => $kind:ident, $variant:ident;)*) => {
        $(
            impl ArgValue for $ty {
                const KIND: ValueKind = ValueKind::$kind;

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(inner) => Some(inner.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_arg_value! {
    bool => Boolean, Bool;
    char => Char, Char;
    i32 => Int, Int;
    i64 => Long, Long;
    f32 => Float, Float;
    f64 => Double, Double;
    String => String, Str;
}

/// Shared single-value cell.
///
/// # Examples
///
/// ```
/// use argspec_core::{ArgParser, Holder};
///
/// let name = Holder::with_value(String::from("anonymous"));
/// let mut parser = ArgParser::new("demo");
/// parser.add_option("-name %s", &name).unwrap();
///
/// let args = ["-name", "joe"];
/// assert_eq!(parser.match_arg(&args, 0).unwrap(), 2);
/// assert_eq!(name.get(), "joe");
/// ```
#[derive(Debug)]
pub struct Holder<T: ArgValue> {
    slot: Rc<RefCell<Value>>,
    _marker: PhantomData<T>,
}

impl<T: ArgValue> Holder<T> {
    /// Creates a holder containing `T::default()`.
    pub fn new() -> Self {
        Self::with_value(T::default())
    }

    /// Creates a holder with an initial value.
    pub fn with_value(value: T) -> Self {
        Self {
            slot: Rc::new(RefCell::new(value.into_value())),
            _marker: PhantomData,
        }
    }

    /// Returns the current value.
    pub fn get(&self) -> T {
        T::from_value(&self.slot.borrow()).unwrap_or_default()
    }

    /// Replaces the current value.
    pub fn set(&self, value: T) {
        *self.slot.borrow_mut() = value.into_value();
    }
}

impl<T: ArgValue> Default for Holder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ArgValue> Clone for Holder<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
            _marker: PhantomData,
        }
    }
}

/// Shared fixed-length array.
///
/// Every slot starts as `T::default()`; a match with multiplicity `n` writes
/// slots `0..n`.
#[derive(Debug)]
pub struct ArrayHolder<T: ArgValue> {
    slots: Rc<RefCell<Vec<Value>>>,
    _marker: PhantomData<T>,
}

impl<T: ArgValue> ArrayHolder<T> {
    /// Creates an array of `len` default values.
    pub fn new(len: usize) -> Self {
        Self {
            slots: Rc::new(RefCell::new(vec![T::default().into_value(); len])),
            _marker: PhantomData,
        }
    }

    /// Returns a copy of the array.
    pub fn get(&self) -> Vec<T> {
        self.slots
            .borrow()
            .iter()
            .map(|value| T::from_value(value).unwrap_or_default())
            .collect()
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Returns `true` for a zero-length array.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: ArgValue> Clone for ArrayHolder<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Rc::clone(&self.slots),
            _marker: PhantomData,
        }
    }
}

/// Values stored by one match of a repeatable option.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Occurrence {
    /// Multiplicity one.
    Single(Value),
    /// Multiplicity above one, in order.
    Multiple(Vec<Value>),
}

/// Growable list of occurrences.
///
/// # Examples
///
/// ```
/// use argspec_core::{ArgParser, Collector, MatchPolicy};
///
/// let values = Collector::new();
/// let mut parser = ArgParser::new("demo");
/// parser.add_option("-v %f", &values).unwrap();
///
/// let args = ["-v", "1.2", "-v", "1000", "-v", "-78"];
/// parser.match_all_args(&args, 0, MatchPolicy::STRICT).unwrap();
/// assert_eq!(values.scalars::<f64>(), vec![1.2, 1000.0, -78.0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Collector {
    occurrences: Rc<RefCell<Vec<Occurrence>>>,
}

impl Collector {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored occurrences.
    pub fn len(&self) -> usize {
        self.occurrences.borrow().len()
    }

    /// Returns `true` when nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of every occurrence in match order.
    pub fn occurrences(&self) -> Vec<Occurrence> {
        self.occurrences.borrow().clone()
    }

    /// Single-value occurrences of type `T`, in match order.
    pub fn scalars<T: ArgValue>(&self) -> Vec<T> {
        self.occurrences
            .borrow()
            .iter()
            .filter_map(|occurrence| match occurrence {
                Occurrence::Single(value) => T::from_value(value),
                Occurrence::Multiple(_) => None,
            })
            .collect()
    }

    /// Multi-value occurrences of type `T`, in match order.
    pub fn arrays<T: ArgValue>(&self) -> Vec<Vec<T>> {
        self.occurrences
            .borrow()
            .iter()
            .filter_map(|occurrence| match occurrence {
                Occurrence::Multiple(values) => values.iter().map(T::from_value).collect(),
                Occurrence::Single(_) => None,
            })
            .collect()
    }

    /// Removes every occurrence.
    pub fn clear(&self) {
        self.occurrences.borrow_mut().clear();
    }
}

/// Type-erased sink bound to a descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResultSink {
    /// No storage; used by help options.
    #[default]
    None,
    /// Single value cell.
    Holder {
        /// Element kind.
        kind: ValueKind,
        /// Shared slot.
        slot: Rc<RefCell<Value>>,
    },
    /// Fixed-length array.
    Array {
        /// Element kind.
        kind: ValueKind,
        /// Shared slots.
        slots: Rc<RefCell<Vec<Value>>>,
    },
    /// Growable list of occurrences.
    Collector(Rc<RefCell<Vec<Occurrence>>>),
}

impl ResultSink {
    /// Element kind declared by the sink. `None` for collectors, whose kind
    /// follows the conversion code, and for the empty sink.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Self::Holder { kind, .. } | Self::Array { kind, .. } => Some(*kind),
            Self::None | Self::Collector(_) => None,
        }
    }

    /// Returns `true` for growable collectors.
    pub fn is_collector(&self) -> bool {
        matches!(self, Self::Collector(_))
    }

    /// Length of an array sink.
    pub fn array_len(&self) -> Option<usize> {
        match self {
            Self::Array { slots, .. } => Some(slots.borrow().len()),
            _ => None,
        }
    }

    /// Short description used in registration errors.
    pub fn describe(&self) -> String {
        match self {
            Self::None => "nothing".to_string(),
            Self::Holder { kind, .. } => format!("Holder<{kind}>"),
            Self::Array { kind, slots } => format!("ArrayHolder<{kind}>[{}]", slots.borrow().len()),
            Self::Collector(_) => "Collector".to_string(),
        }
    }

    /// Writes the values of one successful match.
    ///
    /// Holders take the first value, arrays are filled from index 0 and
    /// collectors receive a new occurrence.
    pub(crate) fn commit(&self, mut values: Vec<Value>, multiplicity: usize) {
        match self {
            Self::None => {}
            Self::Holder { slot, .. } => {
                if !values.is_empty() {
                    *slot.borrow_mut() = values.swap_remove(0);
                }
            }
            Self::Array { slots, .. } => {
                let mut slots = slots.borrow_mut();
                for (slot, value) in slots.iter_mut().zip(values) {
                    *slot = value;
                }
            }
            Self::Collector(occurrences) => {
                let occurrence = if multiplicity > 1 {
                    Occurrence::Multiple(values)
                } else {
                    match values.pop() {
                        Some(value) => Occurrence::Single(value),
                        None => return,
                    }
                };
                occurrences.borrow_mut().push(occurrence);
            }
        }
    }

    /// Serializable copy of the current contents.
    pub fn snapshot(&self) -> SinkSnapshot {
        match self {
            Self::None => SinkSnapshot::Empty,
            Self::Holder { slot, .. } => SinkSnapshot::Value(slot.borrow().clone()),
            Self::Array { slots, .. } => SinkSnapshot::Array(slots.borrow().clone()),
            Self::Collector(occurrences) => {
                SinkSnapshot::Occurrences(occurrences.borrow().clone())
            }
        }
    }
}

impl<T: ArgValue> From<&Holder<T>> for ResultSink {
    fn from(holder: &Holder<T>) -> Self {
        Self::Holder {
            kind: T::KIND,
            slot: Rc::clone(&holder.slot),
        }
    }
}

impl<T: ArgValue> From<&ArrayHolder<T>> for ResultSink {
    fn from(array: &ArrayHolder<T>) -> Self {
        Self::Array {
            kind: T::KIND,
            slots: Rc::clone(&array.slots),
        }
    }
}

impl From<&Collector> for ResultSink {
    fn from(collector: &Collector) -> Self {
        Self::Collector(Rc::clone(&collector.occurrences))
    }
}

/// Contents of a sink at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SinkSnapshot {
    /// The sink stores nothing.
    Empty,
    /// Holder contents.
    Value(Value),
    /// Array contents.
    Array(Vec<Value>),
    /// Collector contents.
    Occurrences(Vec<Occurrence>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holder_clones_share_storage() {
        let holder = Holder::<i64>::new();
        let other = holder.clone();
        other.set(42);
        assert_eq!(holder.get(), 42);
    }

    #[test]
    fn test_sink_resolves_kind() {
        let holder = Holder::<f32>::new();
        let sink = ResultSink::from(&holder);
        assert_eq!(sink.kind(), Some(ValueKind::Float));
        assert_eq!(sink.describe(), "Holder<f32>");

        let array = ArrayHolder::<i32>::new(3);
        let sink = ResultSink::from(&array);
        assert_eq!(sink.kind(), Some(ValueKind::Int));
        assert_eq!(sink.array_len(), Some(3));
        assert_eq!(sink.describe(), "ArrayHolder<i32>[3]");

        let collector = Collector::new();
        let sink = ResultSink::from(&collector);
        assert!(sink.is_collector());
        assert_eq!(sink.kind(), None);
    }

    #[test]
    fn test_commit_into_holder_and_array() {
        let holder = Holder::<String>::new();
        ResultSink::from(&holder).commit(vec![Value::Str("x".into())], 1);
        assert_eq!(holder.get(), "x");

        let array = ArrayHolder::<f64>::new(4);
        ResultSink::from(&array).commit(
            vec![Value::Double(1.0), Value::Double(2.0), Value::Double(3.0)],
            3,
        );
        assert_eq!(array.get(), vec![1.0, 2.0, 3.0, 0.0]);
    }

    #[test]
    fn test_collector_occurrences_are_independent() {
        let collector = Collector::new();
        let sink = ResultSink::from(&collector);
        sink.commit(vec![Value::Long(1), Value::Long(2)], 2);
        sink.commit(vec![Value::Long(3), Value::Long(4)], 2);
        sink.commit(vec![Value::Long(5)], 1);

        assert_eq!(collector.len(), 3);
        assert_eq!(collector.arrays::<i64>(), vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(collector.scalars::<i64>(), vec![5]);

        collector.clear();
        assert!(collector.is_empty());
    }

    #[test]
    fn test_snapshot_serializes_plain_values() {
        let array = ArrayHolder::<bool>::new(2);
        let sink = ResultSink::from(&array);
        sink.commit(vec![Value::Bool(true)], 1);
        let json = serde_json::to_string(&sink.snapshot()).unwrap();
        assert_eq!(json, "[true,false]");
        assert_eq!(serde_json::to_string(&ResultSink::None.snapshot()).unwrap(), "null");
    }
}
