//! Headerless numeric CSV tables.
//!
//! Fitness and position files hold one row per incompatibility. Any row that does not
//! parse, or that is wider or narrower than the first row, is fatal.

use std::path::Path;
use std::str::FromStr;

use crate::core::Incompatibility;
use crate::errors::{HybridscanError, Result};

/// Read a rectangular table of numbers. Rows are numbered from 1 in errors.
pub fn read_table<T: FromStr>(path: impl AsRef<Path>) -> Result<Vec<Vec<T>>> {
    let source = path.as_ref().display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(&path)
        .map_err(|e| HybridscanError::ReadError(format!("Failed to read {source}: {e}")))?;

    let mut rows: Vec<Vec<T>> = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let row = index + 1;
        let record = record.map_err(|e| HybridscanError::malformed(&source, row, format!("{e}")))?;
        if let Some(first) = rows.first() {
            if record.len() != first.len() {
                return Err(HybridscanError::malformed(
                    &source,
                    row,
                    format!("expected {} fields, found {}", first.len(), record.len()),
                ));
            }
        }
        let values = record
            .iter()
            .map(|field| {
                field.parse::<T>().map_err(|_| {
                    HybridscanError::malformed(&source, row, format!("cannot parse {field:?}"))
                })
            })
            .collect::<Result<Vec<T>>>()?;
        rows.push(values);
    }
    Ok(rows)
}

/// Position rows that hold exactly one pair of loci each.
pub fn read_pair_positions(path: impl AsRef<Path>) -> Result<Vec<[usize; 2]>> {
    let source = path.as_ref().display().to_string();
    read_table::<usize>(&path)?
        .into_iter()
        .enumerate()
        .map(|(index, row)| match row.as_slice() {
            &[a, b] => Ok([a, b]),
            _ => Err(HybridscanError::malformed(
                &source,
                index + 1,
                format!("expected 2 fields, found {}", row.len()),
            )),
        })
        .collect()
}

/// Join fitness and position rows into incompatibilities.
pub fn read_incompatibilities(
    fitness_path: impl AsRef<Path>,
    position_path: impl AsRef<Path>,
) -> Result<Vec<Incompatibility>> {
    let fitness = read_table::<f64>(&fitness_path)?;
    let positions = read_table::<usize>(&position_path)?;
    if fitness.len() != positions.len() {
        let shorter = fitness.len().min(positions.len());
        let source = if fitness.len() < positions.len() {
            fitness_path.as_ref()
        } else {
            position_path.as_ref()
        };
        return Err(HybridscanError::malformed(
            &source.display().to_string(),
            shorter + 1,
            format!(
                "{} fitness rows but {} position rows",
                fitness.len(),
                positions.len()
            ),
        ));
    }
    Ok(positions
        .into_iter()
        .zip(fitness)
        .map(|(positions, fitness)| Incompatibility::new(positions, fitness))
        .collect())
}
