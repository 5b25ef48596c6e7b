//! Append-only metadata logs.
//!
//! Both logs are headerless CSV files that grow across runs. The writer is shared
//! between replicates and serialises appends behind a lock.

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::core::{IncompatibilityRecord, PairExample};
use crate::errors::{HybridscanError, Result};

pub struct MetaLog {
    path: String,
    file: Mutex<File>,
}

/// Fields of one pair log row: seed, locus a, locus b, label, distance.
pub fn pair_fields(example: &PairExample) -> Vec<String> {
    vec![
        example.seed.to_string(),
        example.pair.a.to_string(),
        example.pair.b.to_string(),
        u8::from(example.pair.label).to_string(),
        example.distance.to_string(),
    ]
}

fn write_rows(
    writer: &mut impl Write,
    rows: impl IntoIterator<Item = Vec<String>>,
) -> std::io::Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);
    for row in rows {
        csv_writer.write_record(&row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

impl MetaLog {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().display().to_string();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| HybridscanError::WriteError(format!("Failed to open {path}: {e}")))?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Append rows as one block so that rows of different replicates never interleave.
    pub fn append(&self, rows: impl IntoIterator<Item = Vec<String>>) -> Result<()> {
        let mut buffer = Vec::new();
        write_rows(&mut buffer, rows)
            .map_err(|e| HybridscanError::WriteError(format!("{}: {e}", self.path)))?;
        let mut file = self.file.lock();
        file.write_all(&buffer)
            .and_then(|_| file.flush())
            .map_err(|e| HybridscanError::WriteError(format!("{}: {e}", self.path)))
    }

    pub fn append_records<'a>(
        &self,
        records: impl IntoIterator<Item = &'a IncompatibilityRecord>,
    ) -> Result<()> {
        self.append(records.into_iter().map(IncompatibilityRecord::to_fields))
    }

    pub fn append_examples(&self, examples: &[PairExample]) -> Result<()> {
        self.append(examples.iter().map(pair_fields))
    }
}
