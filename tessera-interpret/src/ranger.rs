#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use crate::value::Value;

/// A forward cursor over a set of values.
pub trait Ranger {
    /// Advances to the next value. Returns whether there was one.
    fn next(&mut self) -> bool;

    /// The current value. Only defined after a successful `next`.
    fn value(&self) -> Value;

    /// The current iteration status. Only defined after a successful
    /// `next`.
    fn status(&self) -> Status;
}

/// Per-step iteration status, bound to a loop's status identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status {
    pub index: i64,
    pub first: bool,
    pub last: bool,
    pub even: bool,
    pub odd: bool,
    pub has_more: bool,
}

impl Status {
    fn at(index: i64, last_index: i64) -> Self {
        let even = index % 2 == 0;
        Self {
            index,
            first: index == 0,
            last: index == last_index,
            even,
            odd: !even,
            has_more: index < last_index,
        }
    }

    /// The mapping view template code sees: keys `index`, `first`, `last`,
    /// `even`, `odd`, `hasMore`.
    pub fn to_value(self) -> Value {
        let mut m = BTreeMap::new();
        m.insert("index".to_string(), Value::Int(self.index));
        m.insert("first".to_string(), Value::Bool(self.first));
        m.insert("last".to_string(), Value::Bool(self.last));
        m.insert("even".to_string(), Value::Bool(self.even));
        m.insert("odd".to_string(), Value::Bool(self.odd));
        m.insert("hasMore".to_string(), Value::Bool(self.has_more));
        Value::Map(m)
    }
}

/// Iterates over a half-open range of integers.
pub struct IntRanger {
    min_inclusive: i64,
    max_exclusive: i64,
    current: i64,
}

impl IntRanger {
    pub fn new(min_inclusive: i64, max_exclusive: i64) -> miette::Result<Self> {
        if max_exclusive <= min_inclusive {
            return Err(miette::miette!(
                "upper bound must be greater than lower bound"
            ));
        }

        Ok(Self {
            min_inclusive,
            max_exclusive,
            current: min_inclusive - 1,
        })
    }

    /// Like [`IntRanger::new`], but the upper bound is inclusive.
    pub fn from_to(min_inclusive: i64, max_inclusive: i64) -> miette::Result<Self> {
        Self::new(min_inclusive, max_inclusive + 1)
    }
}

impl Ranger for IntRanger {
    fn next(&mut self) -> bool {
        let c = self.current + 1;
        if c < self.max_exclusive {
            self.current = c;
            return true;
        }
        false
    }

    fn value(&self) -> Value {
        Value::Int(self.current)
    }

    fn status(&self) -> Status {
        let index = self.current - self.min_inclusive;
        let last_index = self.max_exclusive - self.min_inclusive - 1;
        Status::at(index, last_index)
    }
}

/// Iterates over the elements of a sequence.
pub struct SeqRanger {
    items: Vec<Value>,
    index: i64,
}

impl SeqRanger {
    pub fn new(items: Vec<Value>) -> Self {
        Self { items, index: -1 }
    }
}

impl Ranger for SeqRanger {
    fn next(&mut self) -> bool {
        let i = self.index + 1;
        if (i as usize) < self.items.len() {
            self.index = i;
            return true;
        }
        false
    }

    fn value(&self) -> Value {
        self.items[self.index as usize].clone()
    }

    fn status(&self) -> Status {
        Status::at(self.index, self.items.len() as i64 - 1)
    }
}

/// Iterates over a mapping, yielding `{key, value}` mappings in the
/// mapping's stable (sorted) key order.
pub struct MapRanger {
    entries: Vec<(String, Value)>,
    index: i64,
}

impl MapRanger {
    pub fn new(map: BTreeMap<String, Value>) -> Self {
        Self {
            entries: map.into_iter().collect(),
            index: -1,
        }
    }
}

impl Ranger for MapRanger {
    fn next(&mut self) -> bool {
        let i = self.index + 1;
        if (i as usize) < self.entries.len() {
            self.index = i;
            return true;
        }
        false
    }

    fn value(&self) -> Value {
        let (k, v) = &self.entries[self.index as usize];
        let mut m = BTreeMap::new();
        m.insert("key".to_string(), Value::Str(k.clone()));
        m.insert("value".to_string(), v.clone());
        Value::Map(m)
    }

    fn status(&self) -> Status {
        Status::at(self.index, self.entries.len() as i64 - 1)
    }
}
