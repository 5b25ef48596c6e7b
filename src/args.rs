use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about,
    long_about = None,
    name = "hybridscan",
)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,

    /// Path to settings (yaml file); defaults are used when omitted.
    #[clap(long, global = true)]
    pub settings: Option<String>,

    /// Path to log file.
    #[clap(long, global = true, default_value = "hybridscan.log")]
    pub log_file: String,

    /// Verbosity, repeat for more detail.
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable progress bar.
    #[clap(long, global = true)]
    pub disable_progress_bar: bool,

    /// Number of threads when built with the parallel feature.
    #[clap(long, global = true)]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run-length compress individual ancestry, one line of genotype codes per individual.
    Compress {
        /// Text file with one line per individual.
        input: String,

        /// Output archive (npz file).
        output: String,
    },

    /// Expand a compressed ancestry archive back into one line per individual.
    Decompress {
        /// Compressed ancestry archive (npz file).
        input: String,

        /// Output text file.
        output: String,
    },

    /// Store a population count table (csv file) as an archive.
    CompressPop {
        /// Headerless integer table.
        input: String,

        /// Output archive (npz file).
        output: String,
    },

    /// Extract per-chromosome population features for every manifest row.
    Flm {
        /// Replicate manifest (csv file).
        manifest: String,

        /// Output feature archive (npz file).
        output: String,

        /// Incompatibility metadata log (csv file), appended to.
        meta: String,
    },

    /// Extract balanced locus-pair examples for every manifest row.
    Pair {
        /// Replicate manifest (csv file).
        manifest: String,

        /// Output feature archive (npz file).
        output: String,

        /// Pair metadata log (csv file), appended to.
        meta: String,

        /// Keep every individual instead of a fixed number (0 or 1).
        #[clap(default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
        ragged: u8,
    },

    /// Check how feature archives split into batches and rescale their distances.
    Inspect {
        /// Feature archives (npz files) of one training run.
        #[clap(required = true)]
        archives: Vec<String>,

        /// Divisor applied to pair distances.
        #[clap(long, default_value_t = 1000)]
        chromosome_length: usize,

        /// Distance encoding (inc1, inc10, dec0 or dec-1), overrides the settings.
        #[clap(long)]
        encoding: Option<String>,
    },
}
