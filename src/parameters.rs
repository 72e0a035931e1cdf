pub use super::F;
use clap::Parser;

/// Merge mesh vertices which lie within a distance of each other ("remove doubles").
#[derive(Parser, Default, Debug)]
pub struct Args {
    /// Input mesh file.
    pub input: String,

    /// Output mesh file.
    pub output: String,

    /// Vertices within this distance of each other are merged. Must be non-negative.
    #[arg(allow_negative_numbers = true)]
    pub threshold: F,
}
