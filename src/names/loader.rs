use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::api::DataSource;
use crate::core::Dataset;
use crate::error::{ChartError, ChartResult};

use super::{NameDataset, PlainName, RankedName};

fn load_error(path: &str, reason: impl Into<String>) -> ChartError {
    ChartError::Load {
        path: path.to_owned(),
        reason: reason.into(),
    }
}

fn csv_error(path: &str, err: &csv::Error) -> ChartError {
    let reason = match err.position() {
        Some(position) => format!("line {}: {err}", position.line()),
        None => err.to_string(),
    };
    load_error(path, reason)
}

fn reader(text: &str, delimiter: u8, has_headers: bool) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.trim_start_matches('\u{feff}').as_bytes())
}

fn column(header: &csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    header.iter().position(|column| {
        candidates
            .iter()
            .any(|candidate| column.eq_ignore_ascii_case(candidate))
    })
}

/// Parses a names file.
///
/// Headerless files follow the SSA `yobYYYY.txt` layout (`Name,Sex,Count`, or
/// `Name,Sex` without counts). A first row with a `Name` column is read as a
/// header and columns are picked by name; a `BirthCount`/`Count`/`Births`
/// column makes the dataset ranked. Fields may be quoted.
pub fn parse_names(text: &str, path: &str) -> ChartResult<NameDataset> {
    let first = reader(text, b',', true)
        .headers()
        .map_err(|err| csv_error(path, &err))?
        .clone();
    if first.is_empty() {
        return Ok(NameDataset::Ranked(Vec::new()));
    }

    let has_header = column(&first, &["name"]).is_some();
    let (name_col, sex_col, count_col) = if has_header {
        let name = column(&first, &["name"]).ok_or_else(|| load_error(path, "header has no Name column"))?;
        let sex = column(&first, &["sex"]).ok_or_else(|| load_error(path, "header has no Sex column"))?;
        (name, sex, column(&first, &["birthcount", "count", "births"]))
    } else {
        match first.len() {
            3 => (0, 1, Some(2)),
            2 => (0, 1, None),
            columns => {
                return Err(load_error(
                    path,
                    format!("expected 2 or 3 columns, found {columns}"),
                ));
            }
        }
    };

    let width = name_col.max(sex_col).max(count_col.unwrap_or(0)) + 1;
    let mut ranked = Vec::new();
    let mut plain = Vec::new();
    for row in reader(text, b',', has_header).records() {
        let row = row.map_err(|err| csv_error(path, &err))?;
        let line_no = row.position().map_or(0, csv::Position::line);
        if row.len() < width {
            return Err(load_error(
                path,
                format!("line {line_no}: expected at least {width} columns"),
            ));
        }
        let name = row[name_col].to_owned();
        let sex = row[sex_col].to_owned();
        match count_col {
            Some(col) => {
                let count = row[col].parse::<u64>().map_err(|err| {
                    load_error(path, format!("line {line_no}: invalid count `{}`: {err}", &row[col]))
                })?;
                ranked.push(RankedName { name, sex, count });
            }
            None => plain.push(PlainName { name, sex }),
        }
    }

    debug!(path, ranked = count_col.is_some(), records = ranked.len() + plain.len(), "parsed names file");
    Ok(match count_col {
        Some(_) => NameDataset::Ranked(ranked),
        None => NameDataset::Plain(plain),
    })
}

/// Parses the tab-separated list of available years (`Year` column),
/// newest first.
pub fn parse_years(text: &str, path: &str) -> ChartResult<Vec<u16>> {
    let mut rows = reader(text, b'\t', true);
    let header = rows.headers().map_err(|err| csv_error(path, &err))?;
    if header.is_empty() {
        return Err(load_error(path, "years file is empty"));
    }
    let year_col = column(header, &["year"]).ok_or_else(|| load_error(path, "header has no Year column"))?;

    let mut years = rows
        .records()
        .map(|row| {
            let row = row.map_err(|err| csv_error(path, &err))?;
            let raw = row.get(year_col).unwrap_or_default();
            raw.parse::<u16>()
                .map_err(|err| load_error(path, format!("invalid year `{raw}`: {err}")))
        })
        .collect::<ChartResult<Vec<u16>>>()?;
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    Ok(years)
}

/// Reads name files from a data directory.
#[derive(Debug, Clone)]
pub struct FsDataSource {
    root: PathBuf,
}

impl FsDataSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative path of the SSA file for `year`.
    #[must_use]
    pub fn path_for(year: u16) -> String {
        format!("names/yob{year}.txt")
    }

    pub fn load_names(&self, path: &str) -> ChartResult<NameDataset> {
        let text = self.read(path)?;
        parse_names(&text, path)
    }

    pub fn load_years(&self) -> ChartResult<Vec<u16>> {
        let path = "years.tsv";
        let text = self.read(path)?;
        parse_years(&text, path)
    }

    fn read(&self, path: &str) -> ChartResult<String> {
        fs::read_to_string(self.root.join(path)).map_err(|err| load_error(path, err.to_string()))
    }
}

impl DataSource for FsDataSource {
    fn load(&mut self, path: &str) -> ChartResult<Dataset> {
        self.load_names(path)?.to_dataset()
    }
}
