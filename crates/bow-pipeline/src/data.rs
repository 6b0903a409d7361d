//! CSV tables.
//!
//! [`Table`] is a raw or interim table: arbitrary columns, two of which are
//! the text and label columns. [`FeatureTable`] is the bag-of-words output:
//! one integer column per vocabulary entry followed by a trailing `label`
//! column.

use std::io::{Read, Write};

use bow_pre_processing::{Corpus, pre_processor::CountMatrix};
use csv::{ReaderBuilder, StringRecord, Writer};
use sprs::CsMat;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Name of the trailing column in feature tables.
pub const LABEL_COLUMN: &str = "label";

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: StringRecord,
    records: Vec<StringRecord>,
    text_idx: usize,
    label_idx: usize,
}

impl Table {
    /// Read a headed CSV table and resolve the text and label columns.
    ///
    /// Fails with `InvalidInput` when either column is absent or a record has
    /// the wrong number of fields. Empty text cells read as empty documents.
    pub fn read<R: Read>(reader: R, text_column: &str, label_column: &str) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = rdr
            .headers()
            .map_err(|e| PipelineError::invalid_input(format!("unreadable header: {e}")))?
            .clone();

        let column = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                PipelineError::invalid_input(format!(
                    "missing required column `{name}` (found: {})",
                    headers.iter().collect::<Vec<_>>().join(", ")
                ))
            })
        };
        let text_idx = column(text_column)?;
        let label_idx = column(label_column)?;

        let records = rdr
            .records()
            .enumerate()
            .map(|(row, record)| {
                record.map_err(|e| PipelineError::invalid_input(format!("row {row}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(
            rows = records.len(),
            columns = headers.len(),
            "Table loaded"
        );

        Ok(Self {
            headers,
            records,
            text_idx,
            label_idx,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    /// The text and label columns as a row-aligned corpus.
    #[must_use]
    pub fn corpus(&self) -> Corpus {
        self.records
            .iter()
            .map(|record| {
                (
                    record.get(self.text_idx).unwrap_or_default(),
                    record.get(self.label_idx).unwrap_or_default(),
                )
            })
            .collect()
    }

    /// Write `corpus` back into the text column, in place.
    ///
    /// `corpus` must be row-aligned with this table. Rows whose document is
    /// missing are dropped together with the rest of their record.
    pub fn replace_corpus(self, corpus: Corpus) -> Result<Self> {
        if corpus.len() != self.records.len() {
            return Err(PipelineError::invalid_input(format!(
                "corpus has {} rows but the table has {}",
                corpus.len(),
                self.records.len()
            )));
        }

        let text_idx = self.text_idx;
        let records = self
            .records
            .into_iter()
            .zip(corpus)
            .filter_map(|(record, row)| {
                row.document.map(|document| {
                    record
                        .iter()
                        .enumerate()
                        .map(|(idx, field)| {
                            if idx == text_idx {
                                document.as_str()
                            } else {
                                field
                            }
                        })
                        .collect::<StringRecord>()
                })
            })
            .collect::<Vec<_>>();

        Ok(Self { records, ..self })
    }

    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = Writer::from_writer(writer);
        wtr.write_record(&self.headers)?;
        for record in &self.records {
            wtr.write_record(record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Count matrix plus its row-aligned labels.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    matrix: CountMatrix,
    labels: Vec<String>,
}

impl FeatureTable {
    pub fn new(matrix: CountMatrix, labels: Vec<String>) -> Result<Self> {
        if matrix.rows() != labels.len() {
            return Err(PipelineError::invalid_input(format!(
                "feature matrix has {} rows but {} labels were given",
                matrix.rows(),
                labels.len()
            )));
        }
        Ok(Self { matrix, labels })
    }

    #[must_use]
    pub fn matrix(&self) -> &CountMatrix {
        &self.matrix
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[must_use]
    pub fn num_features(&self) -> usize {
        self.matrix.cols()
    }

    /// Header `0,1,…,n-1,label` followed by one dense row per document.
    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        let num_features = self.num_features();
        let mut wtr = Writer::from_writer(writer);

        let mut header = (0..num_features).map(|idx| idx.to_string()).collect::<Vec<_>>();
        header.push(LABEL_COLUMN.to_string());
        wtr.write_record(&header)?;

        let mut dense = vec![0_u64; num_features];
        for (row, label) in self.matrix.outer_iterator().zip(&self.labels) {
            dense.fill(0);
            for (col_idx, &count) in row.iter() {
                dense[col_idx] = count;
            }
            let mut record = dense.iter().map(u64::to_string).collect::<Vec<_>>();
            record.push(label.clone());
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        debug!(
            rows = self.len(),
            num_features,
            "Feature table written"
        );
        Ok(())
    }

    /// Read a table produced by [`FeatureTable::write`]: every column except
    /// the last is a non-negative integer count, the last is the label.
    pub fn read<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = rdr
            .headers()
            .map_err(|e| PipelineError::invalid_input(format!("unreadable header: {e}")))?
            .clone();
        let num_features = match headers.iter().last() {
            Some(LABEL_COLUMN) => headers.len() - 1,
            _ => {
                return Err(PipelineError::invalid_input(format!(
                    "feature table must end with a `{LABEL_COLUMN}` column"
                )));
            }
        };

        let mut indptr = vec![0];
        let mut indices = Vec::new();
        let mut data = Vec::new();
        let mut labels = Vec::new();

        for (row, record) in rdr.records().enumerate() {
            let record =
                record.map_err(|e| PipelineError::invalid_input(format!("row {row}: {e}")))?;
            for (col_idx, field) in record.iter().take(num_features).enumerate() {
                let count = field.trim().parse::<u64>().map_err(|e| {
                    PipelineError::invalid_input(format!(
                        "row {row}, column {col_idx}: `{field}` is not a count ({e})"
                    ))
                })?;
                if count > 0 {
                    indices.push(col_idx);
                    data.push(count);
                }
            }
            labels.push(record.get(num_features).unwrap_or_default().to_string());
            indptr.push(indices.len());
        }

        let matrix = CsMat::new((labels.len(), num_features), indptr, indices, data);
        Self::new(matrix, labels)
    }
}
