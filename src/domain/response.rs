use crate::domain::Value;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Field name to value mapping that keeps wire order. Inserting an existing name
/// replaces its value in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, Value)>,
}

impl Fields {
    pub fn new() -> Self {
        Fields::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, Value)> for Fields {
    fn from_iter<T: IntoIterator<Item = (N, Value)>>(iter: T) -> Self {
        let mut fields = Fields::new();
        for (name, value) in iter {
            fields.insert(name, value);
        }
        fields
    }
}

impl Serialize for Fields {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// The default response shape: one section per top-level fragment, each holding
/// the flattened leaf fields found below it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    sections: Vec<(String, Fields)>,
}

impl Record {
    pub fn new() -> Self {
        Record::default()
    }

    /// Returns the section with the given name, creating it at the end if needed.
    pub fn section_mut(&mut self, name: &str) -> &mut Fields {
        let index = match self.sections.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.sections.push((name.to_string(), Fields::new()));
                self.sections.len() - 1
            }
        };
        &mut self.sections[index].1
    }

    pub fn section(&self, name: &str) -> Option<&Fields> {
        self.sections.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &Fields)> {
        self.sections.iter().map(|(n, f)| (n.as_str(), f))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for (name, fields) in &self.sections {
            map.serialize_entry(name, fields)?;
        }
        map.end()
    }
}

/// Historical samples in receipt order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    samples: Vec<Fields>,
}

impl Series {
    pub fn new() -> Self {
        Series::default()
    }

    pub fn start_sample(&mut self) {
        self.samples.push(Fields::new());
    }

    /// Adds a field to the last sample, starting one if there is none yet.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        if self.samples.is_empty() {
            self.start_sample();
        }
        if let Some(sample) = self.samples.last_mut() {
            sample.insert(name, value);
        }
    }

    pub fn samples(&self) -> &[Fields] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl Serialize for Series {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.samples.len()))?;
        for sample in &self.samples {
            seq.serialize_element(sample)?;
        }
        seq.end()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    Record(Record),
    Series(Series),
}

impl Response {
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Response::Record(record) => Some(record),
            Response::Series(_) => None,
        }
    }

    pub fn as_series(&self) -> Option<&Series> {
        match self {
            Response::Series(series) => Some(series),
            Response::Record(_) => None,
        }
    }
}

impl Serialize for Response {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Response::Record(record) => record.serialize(serializer),
            Response::Series(series) => series.serialize(serializer),
        }
    }
}
