//! IO traits and readers for archives, manifests and metadata logs.

mod archive;
mod haplotype;
mod manifest;
mod meta_log;
mod population;
mod tables;

pub use archive::{ARCHIVE_VERSION, ArchiveReader, ArchiveWriter};
pub use haplotype::HaplotypeIO;
pub use manifest::{ReplicateRecord, read_manifest};
pub use meta_log::{MetaLog, pair_fields};
pub use population::{PopulationIO, compress_population};
pub use tables::{read_incompatibilities, read_pair_positions, read_table};
