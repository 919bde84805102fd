// Termprint: per-participant term profiles from mailing-list archives
//
// This is the library root. Each module corresponds to a stage of the
// archive → flat records → term statistics pipeline.

pub mod archive;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod records;
pub mod stats;
pub mod text;
