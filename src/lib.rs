pub type F = pars3d::F;

mod vec;
use vec::*;
pub use vec::within;

pub mod grid;
pub mod mesh;
pub use mesh::TriMesh;

mod error;
pub use error::{ErrorKind, WeldError, WeldResult};

pub mod io;
pub use io::{LoadReport, load, load_with_report, save};

mod parameters;
pub use parameters::Args;

mod weld;
pub use weld::{Threshold, WeldReport, clusters, weld, weld_with_report};

/// What [`run`] did to the input mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub load: LoadReport,
    pub weld: WeldReport,
}

/// Loads `args.input`, welds it with `args.threshold`, and saves the result to `args.output`.
/// The threshold is checked before anything is read.
pub fn run(args: &Args) -> WeldResult<RunReport> {
    Threshold::new(args.threshold)?;
    let (mesh, load) = load_with_report(&args.input)?;
    let (mesh, weld) = weld_with_report(mesh, args.threshold)?;
    save(&mesh, &args.output)?;
    Ok(RunReport { load, weld })
}
