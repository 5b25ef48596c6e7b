//! Settings module.

use serde::{Deserialize, Serialize};
use std::fs;

use crate::batches::DistanceEncoding;
use crate::errors::{HybridscanError, Result as CheckResult};
use crate::stats::Expectation;

/// Processing parameters shared by all commands.
///
/// Every field has a default, so an empty settings file is valid.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Number of loci summarised by one bin of the signal track.
    pub bin_width: usize,

    /// Factor by which a signal peak shrinks per bin.
    pub peak_decay: f64,

    /// Number of individuals per pair example in fixed-width mode.
    pub target_individuals: usize,

    /// Largest p-value a locus may have to be picked as a false locus.
    pub maximum_p_value: f64,

    /// Minimum number of loci between two picked false loci.
    pub minimum_spacing: usize,

    /// False loci must be further than this from every true locus.
    pub minimum_distance: usize,

    /// Offset added per chromosome index when comparing loci across the genome.
    pub chromosome_offset: usize,

    /// Genotype expectation used to rank candidate false loci.
    pub selector_expectation: Expectation,

    /// Rescaling applied to pair distances when inspecting an archive.
    pub distance_encoding: DistanceEncoding,

    /// Samples per batch when inspecting an archive.
    pub batch_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bin_width: 10,
            peak_decay: 1.5,
            target_individuals: 500,
            maximum_p_value: 0.5,
            minimum_spacing: 250,
            minimum_distance: 250,
            chromosome_offset: 100_000,
            selector_expectation: Expectation::HardyWeinberg,
            distance_encoding: DistanceEncoding::Inc10,
            batch_size: 32,
        }
    }
}

#[derive(Debug)]
pub enum SettingsError {
    IoError(std::io::Error),
    YamlError(serde_yaml::Error),
}

impl std::error::Error for SettingsError {}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::IoError(error) => write!(formatter, "IO error: {}", error),
            SettingsError::YamlError(error) => write!(formatter, "YAML error: {}", error),
        }
    }
}

impl std::fmt::Display for Settings {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut output = vec![];
        self.write(&mut output).map_err(|_| std::fmt::Error)?;
        write!(
            formatter,
            "{}",
            String::from_utf8(output).map_err(|_| std::fmt::Error)?
        )
    }
}

impl Settings {
    pub fn write(&self, writer: &mut dyn std::io::Write) -> Result<(), SettingsError> {
        serde_yaml::to_writer(writer, self).map_err(SettingsError::YamlError)
    }

    pub fn read(reader: &mut dyn std::io::Read) -> Result<Settings, SettingsError> {
        serde_yaml::from_reader(reader).map_err(SettingsError::YamlError)
    }

    pub fn write_to_file(&self, filename: &str) -> Result<(), SettingsError> {
        let file = fs::File::create(filename).map_err(SettingsError::IoError)?;
        let mut writer = std::io::BufWriter::new(file);
        self.write(&mut writer)
    }

    pub fn read_from_file(filename: &str) -> Result<Settings, SettingsError> {
        let file = fs::File::open(filename).map_err(SettingsError::IoError)?;
        let mut reader = std::io::BufReader::new(file);
        Self::read(&mut reader)
    }

    /// Reject parameters that no command can work with.
    pub fn validate(&self) -> CheckResult<()> {
        let invalid = |message: String| Err(HybridscanError::InvalidSetting(message));
        if self.bin_width == 0 {
            return invalid("bin_width must be positive".to_string());
        }
        let decay = self.peak_decay;
        if decay.is_nan() || decay <= 0. {
            return invalid(format!("peak_decay must be positive, got {decay}"));
        }
        if self.target_individuals == 0 {
            return invalid("target_individuals must be positive".to_string());
        }
        if self.batch_size == 0 {
            return invalid("batch_size must be positive".to_string());
        }
        Ok(())
    }
}
