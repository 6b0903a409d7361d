//! Row-aligned (document, label) storage.
//!
//! A document and its label live in the same [`Row`], so every transform and
//! every filter moves them together. Transforms that reject a document mark it
//! missing instead of removing the row; [`Corpus::drop_missing`] is the only
//! place rows disappear.

use tracing::debug;

use crate::error::{PreProcessingError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// `None` once a filter has rejected the document.
    pub document: Option<String>,
    pub label: String,
}

impl Row {
    pub fn new(document: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            document: Some(document.into()),
            label: label.into(),
        }
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.document.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    rows: Vec<Row>,
}

impl Corpus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, document: impl Into<String>, label: impl Into<String>) {
        self.rows.push(Row::new(document, label));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.label.as_str()).collect()
    }

    /// Number of rows currently marked missing.
    #[must_use]
    pub fn missing(&self) -> usize {
        self.rows.iter().filter(|row| row.is_missing()).count()
    }

    /// Borrow every document in row order.
    ///
    /// Fails if a row is still marked missing: callers must run
    /// [`Corpus::drop_missing`] before handing documents to the vectorizer.
    pub fn documents(&self) -> Result<Vec<&str>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                row.document.as_deref().ok_or_else(|| {
                    PreProcessingError::InvalidInput(format!(
                        "row {idx} is marked missing and has not been filtered"
                    ))
                })
            })
            .collect()
    }

    /// Mark documents with fewer than `min_tokens` whitespace tokens as missing.
    ///
    /// Returns how many rows were newly marked. Labels are left untouched.
    pub fn mark_short_documents(&mut self, min_tokens: usize) -> usize {
        let mut marked = 0;
        for row in &mut self.rows {
            let too_short = row
                .document
                .as_deref()
                .is_some_and(|doc| doc.split_whitespace().count() < min_tokens);
            if too_short {
                row.document = None;
                marked += 1;
            }
        }
        debug!(min_tokens, marked, "Marked short documents as missing");
        marked
    }

    /// Remove missing rows, dropping each document together with its label.
    #[must_use]
    pub fn drop_missing(self) -> Self {
        let before = self.rows.len();
        let rows = self
            .rows
            .into_iter()
            .filter(|row| !row.is_missing())
            .collect::<Vec<_>>();
        debug!(before, after = rows.len(), "Dropped missing rows");
        Self { rows }
    }

    /// Split into parallel document and label vectors.
    ///
    /// Missing documents come back as empty strings.
    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        self.rows
            .into_iter()
            .map(|row| (row.document.unwrap_or_default(), row.label))
            .unzip()
    }
}

impl FromIterator<Row> for Corpus {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<D: Into<String>, L: Into<String>> FromIterator<(D, L)> for Corpus {
    fn from_iter<I: IntoIterator<Item = (D, L)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(document, label)| Row::new(document, label))
            .collect()
    }
}

impl IntoIterator for Corpus {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
