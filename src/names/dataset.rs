use serde::{Deserialize, Serialize};

use crate::core::{Dataset, FieldValue, Record};
use crate::error::ChartResult;

pub const NAME_FIELD: &str = "Name";
pub const SEX_FIELD: &str = "Sex";
pub const COUNT_FIELD: &str = "BirthCount";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedName {
    pub name: String,
    pub sex: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainName {
    pub name: String,
    pub sex: String,
}

/// Names of one year, with or without birth counts. The variant is decided
/// once when the file is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameDataset {
    Ranked(Vec<RankedName>),
    Plain(Vec<PlainName>),
}

impl NameDataset {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Ranked(names) => names.len(),
            Self::Plain(names) => names.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_ranked(&self) -> bool {
        matches!(self, Self::Ranked(_))
    }

    /// Generic records with `Name`, `Sex` and, for ranked data, `BirthCount`.
    pub fn to_dataset(&self) -> ChartResult<Dataset> {
        let records = match self {
            Self::Ranked(names) => names
                .iter()
                .map(|entry| {
                    Record::new()
                        .with_field(NAME_FIELD, entry.name.as_str())
                        .with_field(SEX_FIELD, entry.sex.as_str())
                        .with_field(COUNT_FIELD, FieldValue::from(entry.count))
                })
                .collect(),
            Self::Plain(names) => names
                .iter()
                .map(|entry| {
                    Record::new()
                        .with_field(NAME_FIELD, entry.name.as_str())
                        .with_field(SEX_FIELD, entry.sex.as_str())
                })
                .collect(),
        };
        Dataset::new(records)
    }
}

/// Display class of a name derived from its sex code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SexClass {
    Girl,
    Boy,
    Both,
}

impl SexClass {
    #[must_use]
    pub fn from_sex(sex: &str) -> Self {
        match sex {
            "F" | "Girl" => Self::Girl,
            "M" | "Boy" => Self::Boy,
            _ => Self::Both,
        }
    }

    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Girl => "girl",
            Self::Boy => "boy",
            Self::Both => "both",
        }
    }
}
