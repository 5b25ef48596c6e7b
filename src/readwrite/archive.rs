//! Typed access to `.npz` archives.
//!
//! Archives are written to a temporary sibling file and moved into place once every
//! array is complete. Readers validate the presence, type and rank of each array and
//! report violations as `IncompatibleArchiveSchema`.

use ndarray::{ArrayD, Dimension, IxDyn};
use npyz::WriterBuilder;
use npyz::npz::{NpzArchive, NpzWriter};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::errors::{HybridscanError, Result};

/// Schema version stored alongside compressed ancestry.
pub const ARCHIVE_VERSION: u8 = 1;

pub struct ArchiveWriter {
    path: PathBuf,
    temporary: PathBuf,
    npz: NpzWriter<BufWriter<File>>,
}

impl ArchiveWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut name = path
            .file_name()
            .ok_or_else(|| {
                HybridscanError::WriteError(format!("Invalid archive path {}", path.display()))
            })?
            .to_os_string();
        name.push(".tmp");
        let temporary = path.with_file_name(name);
        let npz = NpzWriter::create(&temporary).map_err(|e| {
            HybridscanError::WriteError(format!("{}: {e}", temporary.display()))
        })?;
        Ok(Self {
            path,
            temporary,
            npz,
        })
    }

    /// Write one array in row-major order.
    pub fn write<T: npyz::AutoSerialize>(
        &mut self,
        name: &str,
        shape: &[usize],
        data: impl IntoIterator<Item = T>,
    ) -> Result<()> {
        let data: Vec<T> = data.into_iter().collect();
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(HybridscanError::WriteError(format!(
                "Array {name} holds {} values, shape {shape:?} needs {expected}",
                data.len()
            )));
        }

        let shape: Vec<u64> = shape.iter().map(|&n| n as u64).collect();
        let mut writer = self
            .npz
            .array(name, Default::default())
            .map_err(|e| HybridscanError::WriteError(format!("{e}")))?
            .default_dtype()
            .shape(&shape)
            .begin_nd()
            .map_err(|e| HybridscanError::WriteError(format!("{e}")))?;
        writer
            .extend(data)
            .map_err(|e| HybridscanError::WriteError(format!("{e}")))?;
        writer
            .finish()
            .map_err(|e| HybridscanError::WriteError(format!("{e}")))?;
        Ok(())
    }

    pub fn write_array<T, D>(&mut self, name: &str, array: &ndarray::Array<T, D>) -> Result<()>
    where
        T: npyz::AutoSerialize + Clone,
        D: Dimension,
    {
        self.write(name, array.shape(), array.iter().cloned())
    }

    /// Close the archive and move it to its final path.
    pub fn finish(self) -> Result<()> {
        let Self {
            path,
            temporary,
            npz,
        } = self;
        // the zip directory is written when the writer is dropped
        drop(npz);
        std::fs::rename(&temporary, &path).map_err(|e| {
            HybridscanError::WriteError(format!(
                "Failed to move {} to {}: {e}",
                temporary.display(),
                path.display()
            ))
        })
    }
}

pub struct ArchiveReader {
    path: String,
    npz: NpzArchive<BufReader<File>>,
}

impl ArchiveReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().display().to_string();
        let npz = NpzArchive::open(&path)
            .map_err(|e| HybridscanError::ReadError(format!("Failed to open {path}: {e}")))?;
        Ok(Self { path, npz })
    }

    pub fn get_path(&self) -> &str {
        &self.path
    }

    pub fn contains(&self, name: &str) -> bool {
        self.npz.array_names().any(|array| array == name)
    }

    /// Read an array that may be absent.
    pub fn read_optional<T: npyz::Deserialize>(&mut self, name: &str) -> Result<Option<ArrayD<T>>> {
        let path = self.path.clone();
        let Some(npy) = self
            .npz
            .by_name(name)
            .map_err(|e| HybridscanError::schema(&path, format!("array {name}: {e}")))?
        else {
            return Ok(None);
        };
        let shape: Vec<usize> = npy.shape().iter().map(|&n| n as usize).collect();
        let data = npy.into_vec::<T>().map_err(|e| {
            HybridscanError::schema(&path, format!("array {name} has an unexpected type: {e}"))
        })?;
        let array = ArrayD::from_shape_vec(IxDyn(&shape), data)
            .map_err(|e| HybridscanError::schema(&path, format!("array {name}: {e}")))?;
        Ok(Some(array))
    }

    pub fn read<T: npyz::Deserialize>(&mut self, name: &str) -> Result<ArrayD<T>> {
        let path = self.path.clone();
        self.read_optional(name)?
            .ok_or_else(|| HybridscanError::schema(&path, format!("missing array {name}")))
    }

    /// Read an array of a fixed rank.
    pub fn read_dim<T: npyz::Deserialize, D: Dimension>(
        &mut self,
        name: &str,
    ) -> Result<ndarray::Array<T, D>> {
        let array = self.read::<T>(name)?;
        let ndim = array.ndim();
        array.into_dimensionality::<D>().map_err(|_| {
            HybridscanError::schema(
                &self.path,
                format!("array {name} has {ndim} dimensions, expected {:?}", D::NDIM),
            )
        })
    }
}
