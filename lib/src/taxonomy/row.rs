use std::borrow::Cow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::value::{Dict, Value};

/// One raw input row: normalized column names mapped to cell values.
///
/// Column names are trimmed, lowercased, and have spaces replaced with `_`,
/// so `"Body MD"` and `body_md` address the same cell. Missing columns read
/// as blank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Dict", into = "Dict")]
pub struct Row {
    cells: Dict,
}

impl Row {
    pub fn new<I, K, V>(cells: I) -> Self
        where I: IntoIterator<Item = (K, V)>, K: AsRef<str>, V: Into<Value>
    {
        let cells = cells.into_iter()
            .map(|(k, v)| (Row::column(k.as_ref()), v.into()))
            .collect();

        Row { cells }
    }

    fn column(name: &str) -> Arc<str> {
        name.trim().to_lowercase().replace(' ', "_").into()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    /// The cell's text, trimmed, or `None` if absent or blank.
    pub fn text(&self, column: &str) -> Option<Cow<'_, str>> {
        let text = self.raw_text(column)?;
        match text {
            Cow::Borrowed(s) if !s.trim().is_empty() => Some(Cow::Borrowed(s.trim())),
            Cow::Owned(s) if !s.trim().is_empty() => Some(Cow::Owned(s.trim().to_string())),
            _ => None,
        }
    }

    /// The cell's text exactly as given.
    pub fn raw_text(&self, column: &str) -> Option<Cow<'_, str>> {
        self.get(column)?.to_text()
    }

    /// Whether the cell holds `true` or the text `"true"` in any case.
    pub fn flag(&self, column: &str) -> bool {
        match self.get(column) {
            Some(Value::Bool(b)) => *b,
            Some(value) => value.to_text().map_or(false, |t| t.trim().eq_ignore_ascii_case("true")),
            None => false,
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(|k| &**k)
    }
}

impl From<Dict> for Row {
    fn from(cells: Dict) -> Self {
        Row::new(cells)
    }
}

impl From<Row> for Dict {
    fn from(row: Row) -> Self {
        row.cells
    }
}
