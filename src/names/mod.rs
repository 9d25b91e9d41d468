//! Baby-name data: SSA file loading, name lists, search and the chart profile
//! used by the year page.

mod dataset;
mod list;
mod loader;
mod profile;
mod search;

pub use dataset::{COUNT_FIELD, NAME_FIELD, NameDataset, PlainName, RankedName, SEX_FIELD, SexClass};
pub use list::{ListKind, NameList, NameListItem};
pub use loader::{FsDataSource, parse_names, parse_years};
pub use profile::{
    BabyNamesProfile, DEFAULT_FALLBACK_YEAR, POPULARITY_FRACTION, YearSelection, baby_chart_config,
    retain_popular_records,
};
pub use search::{ordinal, search_summary};
