use ndarray::Ix1;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::archive::{ARCHIVE_VERSION, ArchiveReader, ArchiveWriter};
use crate::core::CompressedHaplotypes;
use crate::errors::{HybridscanError, Result};

pub trait HaplotypeIO: Sized {
    /// Compress a text file with one line of genotype characters per individual.
    fn compress_file(path: impl AsRef<Path>) -> Result<Self>;
    fn read_archive(path: impl AsRef<Path>) -> Result<Self>;
    fn write_archive(&self, path: impl AsRef<Path>) -> Result<()>;
    fn write_text(&self, path: impl AsRef<Path>) -> Result<()>;
}

impl HaplotypeIO for CompressedHaplotypes {
    fn compress_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = path.as_ref().display().to_string();
        let file = File::open(&path)
            .map_err(|e| HybridscanError::ReadError(format!("Failed to read {source}: {e}")))?;
        CompressedHaplotypes::compress(BufReader::new(file), &source)
    }

    fn read_archive(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = ArchiveReader::open(&path)?;
        let source = reader.get_path().to_string();

        if let Some(version) = reader.read_optional::<u8>("version")? {
            if version.iter().any(|&v| v != ARCHIVE_VERSION) {
                return Err(HybridscanError::schema(
                    &source,
                    format!("unsupported version, expected {ARCHIVE_VERSION}"),
                ));
            }
        }

        let values = reader.read_dim::<u8, Ix1>("values")?.to_vec();
        let lengths = reader.read_dim::<i64, Ix1>("lengths")?.to_vec();
        let splits = reader.read_dim::<i64, Ix1>("splits")?.to_vec();
        if values.len() != lengths.len() {
            return Err(HybridscanError::schema(
                &source,
                format!("{} values but {} lengths", values.len(), lengths.len()),
            ));
        }
        log::debug!(
            "Read {} runs of {} individuals from {source}",
            values.len(),
            splits.len() + 1
        );
        Ok(CompressedHaplotypes::new(values, lengths, splits))
    }

    fn write_archive(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = ArchiveWriter::create(path)?;
        writer.write(
            "values",
            &[self.get_values().len()],
            self.get_values().iter().copied(),
        )?;
        writer.write(
            "lengths",
            &[self.get_lengths().len()],
            self.get_lengths().iter().copied(),
        )?;
        writer.write(
            "splits",
            &[self.get_splits().len()],
            self.get_splits().iter().copied(),
        )?;
        writer.write("version", &[1], [ARCHIVE_VERSION])?;
        writer.finish()
    }

    fn write_text(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(&path).map_err(|e| {
            HybridscanError::WriteError(format!("{}: {e}", path.as_ref().display()))
        })?;
        let mut writer = BufWriter::new(file);
        self.write_lines(&mut writer)?;
        writer
            .flush()
            .map_err(|e| HybridscanError::WriteError(format!("{e}")))
    }
}
