use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{NameDataset, SexClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListKind {
    /// Ranked names, most births first.
    Ordered,
    /// Names without counts, alphabetical.
    Unordered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameListItem {
    pub text: String,
    pub class: SexClass,
}

/// Text list of one year's names, ready to bind to a list element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameList {
    pub kind: ListKind,
    pub items: Vec<NameListItem>,
    /// Entries cut by `max_display_items`.
    pub truncated: usize,
}

impl NameList {
    #[must_use]
    pub fn build(dataset: &NameDataset, max_display_items: Option<usize>) -> Self {
        let (kind, mut items) = match dataset {
            NameDataset::Ranked(names) => {
                let mut sorted: Vec<_> = names.iter().collect();
                sorted.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
                let items = sorted
                    .into_iter()
                    .map(|entry| NameListItem {
                        text: format!("{}\t - {} births", entry.name, entry.count),
                        class: SexClass::from_sex(&entry.sex),
                    })
                    .collect::<Vec<_>>();
                (ListKind::Ordered, items)
            }
            NameDataset::Plain(names) => {
                let mut sorted: Vec<_> = names.iter().collect();
                sorted.sort_by(|a, b| a.name.cmp(&b.name));
                let items = sorted
                    .into_iter()
                    .map(|entry| NameListItem {
                        text: entry.name.clone(),
                        class: SexClass::from_sex(&entry.sex),
                    })
                    .collect::<Vec<_>>();
                (ListKind::Unordered, items)
            }
        };

        let limit = max_display_items.unwrap_or(usize::MAX);
        let truncated = items.len().saturating_sub(limit);
        if truncated > 0 {
            items.truncate(limit);
            debug!(limit, truncated, "name list truncated");
        }

        Self {
            kind,
            items,
            truncated,
        }
    }
}
