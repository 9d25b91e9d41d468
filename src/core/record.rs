use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// One cell of a [`Record`].
///
/// Loaders usually produce `Text` and leave numeric interpretation to the
/// consumer, the same way field-mapped CSV rows behave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view of the value; text is trimmed and parsed.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse::<f64>().ok(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                write!(f, "{}", *value as i64)
            }
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Number(value as f64)
    }
}

/// One row of a dataset: named fields in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, FieldValue>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn same_schema(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self.fields.keys().all(|key| other.fields.contains_key(key))
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Ordered records for one render cycle, all sharing one field schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Record>", into = "Vec<Record>")]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Builds a dataset, rejecting records whose field set differs from the
    /// first record.
    pub fn new(records: Vec<Record>) -> ChartResult<Self> {
        if let Some(first) = records.first() {
            if let Some(index) = records.iter().position(|record| !record.same_schema(first)) {
                return Err(ChartError::InvalidData(format!(
                    "record {index} does not share the dataset field schema"
                )));
            }
        }
        Ok(Self { records })
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Keeps the records matching `predicate`; schema is preserved.
    #[must_use]
    pub fn filtered(&self, mut predicate: impl FnMut(&Record) -> bool) -> Self {
        Self {
            records: self
                .records
                .iter()
                .filter(|record| predicate(record))
                .cloned()
                .collect(),
        }
    }

    /// Stable in-place sort; schema is unaffected.
    pub fn sort_by(&mut self, compare: impl FnMut(&Record, &Record) -> std::cmp::Ordering) {
        self.records.sort_by(compare);
    }

    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl TryFrom<Vec<Record>> for Dataset {
    type Error = ChartError;

    fn try_from(records: Vec<Record>) -> ChartResult<Self> {
        Self::new(records)
    }
}

impl From<Dataset> for Vec<Record> {
    fn from(dataset: Dataset) -> Self {
        dataset.records
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{Dataset, FieldValue, Record};

    #[test]
    fn number_display_drops_integral_fraction() {
        assert_eq!(FieldValue::Number(7065.0).to_string(), "7065");
        assert_eq!(FieldValue::Number(2.5).to_string(), "2.5");
    }

    #[test]
    fn text_values_parse_as_numbers_when_possible() {
        assert_eq!(FieldValue::from(" 42 ").as_f64(), Some(42.0));
        assert_eq!(FieldValue::from("many").as_f64(), None);
    }

    #[test]
    fn mixed_schema_is_rejected() {
        let records = vec![
            Record::new().with_field("Name", "Mary").with_field("Sex", "F"),
            Record::new().with_field("Name", "John"),
        ];
        assert!(Dataset::new(records).is_err());
    }
}
