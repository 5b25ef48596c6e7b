use anyhow::{Context, Result};

use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use rand::SeedableRng;
use rand::rngs::StdRng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::args::{Args, Command};
use crate::batches::{DistanceEncoding, inspect_archives};
use crate::config::Settings;
use crate::core::{CompressedHaplotypes, PairExample};
use crate::errors::HybridscanError;
use crate::features::{FlmArchive, FlmReplicate, PairArchive, load_replicate};
use crate::readwrite::{HaplotypeIO, MetaLog, ReplicateRecord, compress_population, read_manifest};
use crate::sampling::SampleMode;

pub struct Runner {
    args: Args,
    settings: Settings,
}

impl Runner {
    pub fn new(args: Args) -> Result<Runner> {
        Self::setup_logger(&args);
        #[cfg(feature = "parallel")]
        Self::setup_rayon(&args);

        let settings = Self::load_settings(args.settings.as_deref())?;
        Ok(Self { args, settings })
    }

    pub fn start(&self) -> Result<()> {
        let show_progress = !self.args.disable_progress_bar;
        match &self.args.command {
            Command::Compress { input, output } => {
                log::info!("Compressing {input} to {output}...");
                let compressed = CompressedHaplotypes::compress_file(input)?;
                log::info!(
                    "Compressed {} individuals into {} runs.",
                    compressed.n_individuals(),
                    compressed.get_values().len()
                );
                compressed.write_archive(output)?;
            }
            Command::Decompress { input, output } => {
                log::info!("Decompressing {input} to {output}...");
                CompressedHaplotypes::read_archive(input)?.write_text(output)?;
            }
            Command::CompressPop { input, output } => {
                log::info!("Compressing population {input} to {output}...");
                compress_population(input, output)?;
            }
            Command::Flm {
                manifest,
                output,
                meta,
            } => {
                run_flm(manifest, output, meta, &self.settings, show_progress)?;
            }
            Command::Pair {
                manifest,
                output,
                meta,
                ragged,
            } => {
                let mode = match ragged {
                    0 => SampleMode::Fixed(self.settings.target_individuals),
                    _ => SampleMode::Ragged,
                };
                run_pairs(manifest, output, meta, &self.settings, mode, show_progress)?;
            }
            Command::Inspect {
                archives,
                chromosome_length,
                encoding,
            } => {
                let encoding = match encoding {
                    Some(name) => DistanceEncoding::from_name(name)?,
                    None => self.settings.distance_encoding,
                };
                let summaries = inspect_archives(
                    archives.as_slice(),
                    self.settings.batch_size,
                    encoding,
                    *chromosome_length as f64,
                )?;
                for (archive, summary) in archives.iter().zip(&summaries) {
                    println!(
                        "{archive}: {} samples{}, {} batches of {}",
                        summary.samples,
                        if summary.ragged { " (ragged)" } else { "" },
                        summary.plan.batches_per_file,
                        summary.plan.batch_size
                    );
                    if let Some(distances) = &summary.distances {
                        let (low, high) = distances
                            .iter()
                            .copied()
                            .minmax_by(f64::total_cmp)
                            .into_option()
                            .unwrap_or((0., 0.));
                        println!(
                            "distances: {} unlinked, encoded range [{low}, {high}]",
                            summary.unlinked
                        );
                    }
                }
                if let Some(plan) = summaries.first().map(|summary| &summary.plan) {
                    println!(
                        "{} batches over {} archives",
                        plan.n_batches(archives.len()),
                        archives.len()
                    );
                    for (index, (file, samples)) in plan.batches(archives.len()).enumerate() {
                        log::debug!("Batch {index}: {} samples {samples:?}", archives[file]);
                    }
                }
            }
        }
        log::info!("Finished.");
        Ok(())
    }

    /// Setup logging level and file
    fn setup_logger(args: &Args) {
        let log_level = match args.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        simple_logging::log_to_file(args.log_file.as_str(), log_level).unwrap_or_else(|_| {
            eprintln!("Unable to open log file.");
            std::process::exit(1);
        });
    }

    /// Setup rayon thread pool
    #[cfg(feature = "parallel")]
    fn setup_rayon(args: &Args) {
        if let Some(n_threads) = args.threads {
            println!("Setting number of threads to {}.", n_threads);
            rayon::ThreadPoolBuilder::new()
                .num_threads(n_threads)
                .build_global()
                .unwrap_or_else(|_| {
                    eprintln!("Unable to set number of threads.");
                    std::process::exit(1);
                });
        }
    }

    /// Load settings from file
    fn load_settings(path: Option<&str>) -> Result<Settings> {
        let settings = match path {
            Some(path) => Settings::read_from_file(path)
                .with_context(|| format!("Unable to read settings from {path}"))?,
            None => Settings::default(),
        };
        settings.validate().context("Invalid settings")?;
        log::info!("Loaded settings\n{}", settings);
        Ok(settings)
    }
}

fn progress_bar(length: usize, show: bool) -> Option<ProgressBar> {
    if !show {
        return None;
    }
    let bar = ProgressBar::new(length as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template(
                "[{bar:40}] {pos:>7}/{len:7} [{elapsed_precise} / {duration_precise}] {msg}",
            )
            .ok()?
            .progress_chars("=> "),
    );
    Some(bar)
}

/// Extract population features of every manifest row into one archive.
pub fn run_flm(
    manifest: &str,
    output: &str,
    meta: &str,
    settings: &Settings,
    show_progress: bool,
) -> Result<usize> {
    let records = read_manifest(manifest)?;
    log::info!("Processing {} replicates from {manifest}...", records.len());
    let bar = progress_bar(records.len(), show_progress);

    let process = |record: &ReplicateRecord| -> Result<FlmReplicate, HybridscanError> {
        log::info!("Analysing population {}...", record.population_path);
        let replicate = FlmReplicate::load(record, settings)?;
        if let Some(bar) = bar.as_ref() {
            bar.inc(1);
        }
        Ok(replicate)
    };

    #[cfg(feature = "parallel")]
    let replicates: Vec<FlmReplicate> =
        records.par_iter().map(process).collect::<Result<_, _>>()?;
    #[cfg(not(feature = "parallel"))]
    let replicates: Vec<FlmReplicate> = records.iter().map(process).collect::<Result<_, _>>()?;

    let mut archive = FlmArchive::new();
    for replicate in replicates.iter() {
        archive.push(replicate)?;
    }
    let n_rows = archive.n_rows();
    log::info!("Writing {n_rows} chromosomes to {output}...");
    archive.write(output)?;
    let meta_log = MetaLog::open(meta)?;
    meta_log.append_records(replicates.iter().flat_map(|r| &r.records))?;

    if let Some(bar) = bar {
        bar.finish_with_message("Done.");
    }
    Ok(n_rows)
}

/// Extract balanced locus-pair examples of every manifest row into one archive.
pub fn run_pairs(
    manifest: &str,
    output: &str,
    meta: &str,
    settings: &Settings,
    mode: SampleMode,
    show_progress: bool,
) -> Result<usize> {
    let records = read_manifest(manifest)?;
    log::info!(
        "Processing {} replicates from {manifest} in {mode:?} mode...",
        records.len()
    );
    let bar = progress_bar(records.len(), show_progress);

    let process = |record: &ReplicateRecord| -> Result<Vec<PairExample>, HybridscanError> {
        log::info!("Analysing individuals {}...", record.individual_path);
        let mut rng = StdRng::seed_from_u64(record.seed as u64);
        let examples = load_replicate(record, settings, mode, &mut rng)?;
        if let Some(bar) = bar.as_ref() {
            bar.inc(1);
        }
        Ok(examples)
    };

    #[cfg(feature = "parallel")]
    let replicates: Vec<Vec<PairExample>> =
        records.par_iter().map(process).collect::<Result<_, _>>()?;
    #[cfg(not(feature = "parallel"))]
    let replicates: Vec<Vec<PairExample>> =
        records.iter().map(process).collect::<Result<_, _>>()?;

    let mut archive = PairArchive::new(mode);
    archive.extend(replicates.into_iter().flatten());
    let n_examples = archive.len();
    log::info!("Writing {n_examples} examples to {output}...");
    archive.write(output)?;
    let meta_log = MetaLog::open(meta)?;
    meta_log.append_examples(&archive)?;

    if let Some(bar) = bar {
        bar.finish_with_message("Done.");
    }
    Ok(n_examples)
}
