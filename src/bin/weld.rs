use clap::Parser;

use weld_doubles::{Args, run};

pub fn main() {
    let args = Args::parse();
    let r = match run(&args) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("[ERROR]: {e}");
            std::process::exit(1);
        }
    };
    if r.load.triangulated_faces > 0 {
        eprintln!(
            "[WARN]: {}: fan triangulated {} non-triangle faces",
            args.input, r.load.triangulated_faces
        );
    }
    if r.load.dropped_faces > 0 {
        eprintln!(
            "[WARN]: {}: dropped {} faces with fewer than three corners",
            args.input, r.load.dropped_faces
        );
    }
    let w = r.weld;
    eprintln!(
        "[INFO]: {} -> {}: {} -> {} vertices, {} -> {} triangles",
        args.input, args.output, w.input_verts, w.output_verts, w.input_tris, w.output_tris
    );
}
