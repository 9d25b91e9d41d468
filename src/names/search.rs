use super::{NameDataset, SexClass};

/// English ordinal suffix: `1st`, `2nd`, `3rd`, `11th`, `22nd`.
#[must_use]
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

fn sex_word(sex: &str) -> &'static str {
    SexClass::from_sex(sex).css_class()
}

/// Human-readable answer to "how popular was `term` in `year`".
///
/// Matching is case-insensitive on the whole name. Ranked data reports the
/// popularity rank within each sex the name was given to.
#[must_use]
pub fn search_summary(dataset: &NameDataset, year: u16, term: &str) -> String {
    let term = term.trim();
    if term.is_empty() {
        return format!("Type a name to search the {} names recorded in {year}", dataset.len());
    }

    let lines: Vec<String> = match dataset {
        NameDataset::Ranked(names) => {
            let mut lines = Vec::new();
            for hit in names.iter().filter(|entry| entry.name.eq_ignore_ascii_case(term)) {
                let mut same_sex: Vec<_> = names.iter().filter(|entry| entry.sex == hit.sex).collect();
                same_sex.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
                let rank = same_sex
                    .iter()
                    .position(|entry| entry.name == hit.name)
                    .map_or(same_sex.len(), |index| index + 1);
                lines.push(format!(
                    "In {year}, {} ({}) was the {} most popular of {} total",
                    hit.name,
                    sex_word(&hit.sex),
                    ordinal(rank),
                    same_sex.len()
                ));
            }
            lines
        }
        NameDataset::Plain(names) => names
            .iter()
            .filter(|entry| entry.name.eq_ignore_ascii_case(term))
            .map(|hit| {
                format!(
                    "In {year}, {} ({}) is listed among {} names",
                    hit.name,
                    sex_word(&hit.sex),
                    names.len()
                )
            })
            .collect(),
    };

    if lines.is_empty() {
        format!("{term} was not among the {} names recorded in {year}", dataset.len())
    } else {
        lines.join("\n")
    }
}
