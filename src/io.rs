//! Reading and writing meshes. The container format is chosen by `pars3d` from the file
//! extension.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use pars3d::FaceKind;
use tracing::{debug, warn};

use super::error::{WeldError, WeldResult};
use super::mesh::TriMesh;

/// What had to be changed to turn the loaded faces into triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    /// Faces with more than three corners, which were fan triangulated.
    pub triangulated_faces: usize,
    /// Faces with fewer than three corners, which were dropped.
    pub dropped_faces: usize,
}

/// Loads the mesh at `path`, flattened into a single triangle mesh.
/// Faces with more than three corners are fan triangulated.
pub fn load(path: impl AsRef<Path>) -> WeldResult<TriMesh> {
    load_with_report(path).map(|(m, _)| m)
}

/// Same as [`load`], but also reports which faces were not triangles.
pub fn load_with_report(path: impl AsRef<Path>) -> WeldResult<(TriMesh, LoadReport)> {
    let path = path.as_ref();
    let scene = pars3d::load(path).map_err(|e| WeldError::from_read(path, e))?;
    let mut m = scene.into_flattened_mesh();
    // just the vertices and faces
    m.geometry_only();

    let (f, report) = triangulate(&m.f);
    if report.triangulated_faces > 0 {
        warn!(
            faces = report.triangulated_faces,
            path = %path.display(),
            "fan triangulated non-triangle faces"
        );
    }
    if report.dropped_faces > 0 {
        warn!(
            faces = report.dropped_faces,
            path = %path.display(),
            "dropped faces with fewer than three corners"
        );
    }
    let mesh = TriMesh::new(m.v, f);
    debug!(
        verts = mesh.num_verts(),
        tris = mesh.num_tris(),
        path = %path.display(),
        "loaded mesh"
    );
    Ok((mesh, report))
}

/// Fan triangulates `faces`. Faces with fewer than three corners produce no triangles.
fn triangulate(faces: &[FaceKind]) -> (Vec<[usize; 3]>, LoadReport) {
    let mut out = Vec::with_capacity(faces.len());
    let mut report = LoadReport::default();
    for f in faces {
        let s = f.as_slice();
        match s.len() {
            0..3 => {
                report.dropped_faces += 1;
                continue;
            }
            3 => {}
            _ => report.triangulated_faces += 1,
        }
        let (&root, rest) = (&s[0], &s[1..]);
        for w in rest.windows(2) {
            out.push([root, w[0], w[1]]);
        }
    }
    (out, report)
}

/// Writes `mesh` to `path`.
///
/// The mesh is first written next to `path` under a temporary name and then renamed into
/// place, so `path` is either left untouched or fully written.
pub fn save(mesh: &TriMesh, path: impl AsRef<Path>) -> WeldResult<()> {
    let path = path.as_ref();
    let io_err = |source| WeldError::Io {
        path: path.to_path_buf(),
        source,
    };

    let f = mesh.f.iter().map(|&t| FaceKind::Tri(t)).collect::<Vec<_>>();
    let scene = pars3d::Mesh::new_geometry(mesh.v.clone(), f).into_scene();

    let tmp = tmp_path(path);
    if let Err(e) = pars3d::save(&tmp, &scene) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(e));
    }
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(e));
    }
    debug!(
        verts = mesh.num_verts(),
        tris = mesh.num_tris(),
        path = %path.display(),
        "saved mesh"
    );
    Ok(())
}

/// A hidden sibling of `path` which keeps its extension.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_stem().unwrap_or_default());
    name.push(format!(".tmp{}", std::process::id()));
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}
