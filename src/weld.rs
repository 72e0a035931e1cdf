use std::collections::{HashMap, hash_map::Entry};

use ordered_float::{NotNan, OrderedFloat};
use tracing::{debug, info};
use union_find::{UnionFind, UnionFindOp};

use super::error::{WeldError, WeldResult};
use super::grid::Grid;
use super::mesh::{TriMesh, check_vertex_count, is_degenerate};
use super::{F, within};

/// Distance under which two vertices are considered the same point.
/// Always non-negative and never NaN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Threshold(NotNan<F>);

impl Threshold {
    pub fn new(t: F) -> WeldResult<Self> {
        match NotNan::new(t) {
            Ok(nn) if t >= 0. => Ok(Self(nn)),
            _ => Err(WeldError::InvalidThreshold { threshold: t }),
        }
    }
    #[inline]
    pub fn get(self) -> F {
        self.0.into_inner()
    }
}

impl TryFrom<F> for Threshold {
    type Error = WeldError;
    fn try_from(t: F) -> WeldResult<Self> {
        Self::new(t)
    }
}

/// Counts describing what a weld pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeldReport {
    pub input_verts: usize,
    pub output_verts: usize,
    pub input_tris: usize,
    pub output_tris: usize,
    /// Triangles dropped because two or more corners collapsed together.
    pub degenerate_tris: usize,
    /// Clusters which contained more than one input vertex.
    pub merged_clusters: usize,
}

impl WeldReport {
    pub fn removed_verts(&self) -> usize {
        self.input_verts - self.output_verts
    }
}

/// Groups vertices into clusters, where two vertices share a cluster if they are connected by
/// a chain of vertices each within `t` of the next.
///
/// Returns the remap table from each input vertex to its cluster, and the number of clusters.
/// Clusters are numbered in order of their lowest member index.
pub fn clusters(v: &[[F; 3]], t: Threshold) -> WeldResult<(Vec<usize>, usize)> {
    check_vertex_count(v.len())?;
    let t = t.get();
    let mut uf = UnionFind::new_u32(v.len());

    macro_rules! join {
        ($a: expr, $b: expr) => {{
            let ra = uf.find($a);
            let rb = uf.find($b);
            if ra != rb {
                uf.union(ra, rb);
            }
        }};
    }

    // exactly coincident points, which is everything at a zero threshold. Points at infinity
    // can only ever weld this way.
    let mut first_at: HashMap<[OrderedFloat<F>; 3], usize> = HashMap::new();
    for (vi, &p) in v.iter().enumerate() {
        if p.iter().any(|c| c.is_nan()) || (t > 0. && p.iter().all(|c| c.is_finite())) {
            continue;
        }
        // adding zero folds -0.0 into 0.0
        match first_at.entry(p.map(|c| OrderedFloat(c + 0.))) {
            Entry::Occupied(o) => join!(*o.get(), vi),
            Entry::Vacant(e) => {
                e.insert(vi);
            }
        }
    }

    if t > 0. {
        let (grid, mut far) = Grid::new(v, t);
        debug!(
            verts = v.len(),
            cells = grid.num_cells(),
            cell_size = grid.cell_size(),
            far = far.len(),
            "built weld grid"
        );

        // members of a cell are all within `t` of each other
        for (_, pts) in grid.cells() {
            for &vi in &pts[1..] {
                join!(pts[0] as usize, vi as usize);
            }
        }

        // nearby cells merge wholesale as soon as any pair between them is close enough
        for (c, a) in grid.cells() {
            for (_, b) in grid.neighbours(c) {
                if uf.find(a[0] as usize) == uf.find(b[0] as usize) {
                    continue;
                }
                'pairs: for &vi in a {
                    for &vj in b {
                        if within(v[vi as usize], v[vj as usize], t) {
                            join!(vi as usize, vj as usize);
                            break 'pairs;
                        }
                    }
                }
            }
        }

        // points too far out for the grid, swept along x
        far.sort_unstable_by(|&a, &b| v[a as usize][0].total_cmp(&v[b as usize][0]));
        for (k, &vi) in far.iter().enumerate() {
            let p = v[vi as usize];
            for &vj in &far[k + 1..] {
                let q = v[vj as usize];
                if q[0] - p[0] > t {
                    break;
                }
                if uf.find(vi as usize) != uf.find(vj as usize) && within(p, q, t) {
                    join!(vi as usize, vj as usize);
                }
            }
        }
    }

    let mut remap = vec![usize::MAX; v.len()];
    let mut root_cluster = vec![usize::MAX; v.len()];
    let mut num_clusters = 0;
    for vi in 0..v.len() {
        let r = uf.find(vi);
        if root_cluster[r] == usize::MAX {
            root_cluster[r] = num_clusters;
            num_clusters += 1;
        }
        remap[vi] = root_cluster[r];
    }
    Ok((remap, num_clusters))
}

/// Merges all vertices of `mesh` within `threshold` of each other (transitively), keeping the
/// position of the lowest-index vertex of each cluster. Triangles which become degenerate are
/// removed, the rest keep their order and winding.
pub fn weld(mesh: TriMesh, threshold: F) -> WeldResult<TriMesh> {
    weld_with_report(mesh, threshold).map(|(m, _)| m)
}

/// Same as [`weld`], but also reports what changed.
pub fn weld_with_report(mesh: TriMesh, threshold: F) -> WeldResult<(TriMesh, WeldReport)> {
    let t = Threshold::new(threshold)?;
    mesh.validate()?;
    let TriMesh { v, f } = mesh;
    let (remap, num_clusters) = clusters(&v, t)?;

    let mut new_v = Vec::with_capacity(num_clusters);
    let mut members = vec![0usize; num_clusters];
    for (vi, &ci) in remap.iter().enumerate() {
        // first member seen is the lowest index, and clusters are numbered in that order
        if ci == new_v.len() {
            new_v.push(v[vi]);
        }
        members[ci] += 1;
    }
    debug_assert_eq!(new_v.len(), num_clusters);

    let new_f = f
        .iter()
        .map(|tri| tri.map(|vi| remap[vi]))
        .filter(|&tri| !is_degenerate(tri))
        .collect::<Vec<_>>();

    let report = WeldReport {
        input_verts: v.len(),
        output_verts: new_v.len(),
        input_tris: f.len(),
        output_tris: new_f.len(),
        degenerate_tris: f.len() - new_f.len(),
        merged_clusters: members.iter().filter(|&&n| n > 1).count(),
    };
    info!(
        threshold = t.get(),
        removed_verts = report.removed_verts(),
        degenerate_tris = report.degenerate_tris,
        "welded mesh"
    );
    Ok((TriMesh::new(new_v, new_f), report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn coincident_pairs_collapse_all_triangles() {
        let m = TriMesh::new(
            vec![[0., 0., 0.], [0., 0., 0.], [1., 0., 0.], [1., 0., 0.]],
            vec![[0, 2, 1], [1, 2, 3]],
        );
        let (out, report) = weld_with_report(m, 0.001).unwrap();
        assert_eq!(out.v, vec![[0., 0., 0.], [1., 0., 0.]]);
        assert!(out.f.is_empty());
        assert_eq!(report.degenerate_tris, 2);
        assert_eq!(report.merged_clusters, 2);
        assert_eq!(report.removed_verts(), 2);
    }

    #[test]
    fn chains_merge_transitively() {
        let m = TriMesh::new(vec![[0., 0., 0.], [0., 0., 0.5], [0., 0., 1.]], vec![]);
        let out = weld(m, 0.6).unwrap();
        assert_eq!(out.v, vec![[0., 0., 0.]]);
    }

    #[test]
    fn all_collapse_to_one_vertex() {
        let m = TriMesh::new(
            vec![[0., 0., 0.], [0.01, 0., 0.], [0., 0.01, 0.]],
            vec![[0, 1, 2]],
        );
        let out = weld(m, 0.1).unwrap();
        assert_eq!(out.num_verts(), 1);
        assert_eq!(out.num_tris(), 0);
    }

    #[test]
    fn keeps_lowest_index_position_and_winding() {
        // a quad split along its diagonal, where the second triangle uses a near copy of 1
        let m = TriMesh::new(
            vec![
                [0., 0., 0.],
                [1., 0., 0.],
                [0., 1., 0.],
                [1., 1., 0.],
                [1.0005, 0., 0.],
            ],
            vec![[0, 1, 2], [4, 3, 2]],
        );
        let out = weld(m, 0.001).unwrap();
        assert_eq!(
            out.v,
            vec![[0., 0., 0.], [1., 0., 0.], [0., 1., 0.], [1., 1., 0.]]
        );
        assert_eq!(out.f, vec![[0, 1, 2], [1, 3, 2]]);
    }

    #[test]
    fn output_order_follows_first_appearance() {
        let m = TriMesh::new(
            vec![[5., 0., 0.], [0., 0., 0.], [5., 0., 0.], [9., 0., 0.], [0., 0., 0.]],
            vec![[0, 1, 3], [2, 4, 3]],
        );
        let (remap, n) = clusters(&m.v, Threshold::new(0.).unwrap()).unwrap();
        assert_eq!(n, 3);
        assert_eq!(remap, vec![0, 1, 0, 2, 1]);

        let out = weld(m, 0.).unwrap();
        assert_eq!(out.v, vec![[5., 0., 0.], [0., 0., 0.], [9., 0., 0.]]);
        assert_eq!(out.f, vec![[0, 1, 2], [0, 1, 2]]);
    }

    #[test]
    fn zero_threshold_keeps_distinct_positions() {
        let m = TriMesh::new(
            vec![[0., 0., 0.], [1e-6, 0., 0.], [0., 1e-6, 0.]],
            vec![[0, 1, 2]],
        );
        let out = weld(m.clone(), 0.).unwrap();
        assert_eq!(out, m);
    }

    #[test]
    fn distance_equal_to_threshold_welds() {
        let m = TriMesh::new(vec![[0., 0., 0.], [0.5, 0., 0.]], vec![]);
        assert_eq!(weld(m, 0.5).unwrap().num_verts(), 1);
    }

    #[test]
    fn empty_meshes() {
        assert_eq!(weld(TriMesh::default(), 1.).unwrap(), TriMesh::default());

        let only_verts = TriMesh::new(vec![[0.; 3], [2., 0., 0.]], vec![]);
        assert_eq!(weld(only_verts.clone(), 1.).unwrap(), only_verts);
    }

    #[test]
    fn nan_positions_never_weld() {
        let m = TriMesh::new(vec![[F::NAN, 0., 0.], [F::NAN, 0., 0.]], vec![]);
        assert_eq!(weld(m, F::INFINITY).unwrap().num_verts(), 2);
    }

    #[test]
    fn large_threshold_over_many_vertices() {
        let v = (0..20_000).map(|i| [i as F * 10., 0., 0.]).collect::<Vec<_>>();
        let (remap, n) = clusters(&v, Threshold::new(1e9).unwrap()).unwrap();
        assert_eq!(n, 1);
        assert!(remap.iter().all(|&c| c == 0));
    }

    #[test]
    fn dense_line_spanning_many_cells() {
        let v = (0..5_000).map(|i| [i as F, 0., 0.]).collect::<Vec<_>>();
        assert_eq!(clusters(&v, Threshold::new(100.).unwrap()).unwrap().1, 1);
        assert_eq!(clusters(&v, Threshold::new(1.).unwrap()).unwrap().1, 1);
        assert_eq!(clusters(&v, Threshold::new(0.5).unwrap()).unwrap().1, 5_000);
    }

    #[test]
    fn extreme_magnitudes() {
        let tiny = F::MIN_POSITIVE * 4.;
        let m = TriMesh::new(vec![[0.; 3], [tiny * 1.5, 0., 0.]], vec![]);
        assert_eq!(weld(m, tiny).unwrap().num_verts(), 2);

        let big = F::MAX / 4.;
        let m = TriMesh::new(vec![[0.; 3], [big, 0., 0.]], vec![]);
        assert_eq!(weld(m, F::MAX / 2.).unwrap().num_verts(), 1);
    }

    #[test]
    fn points_far_from_origin_still_weld() {
        let m = TriMesh::new(
            vec![[1e20, 0., 0.], [1e20, 5e5, 0.], [1e20, 2e6, 0.]],
            vec![],
        );
        let out = weld(m, 1e6).unwrap();
        assert_eq!(out.v, vec![[1e20, 0., 0.], [1e20, 2e6, 0.]]);
    }

    #[test]
    fn coincident_points_at_infinity_weld() {
        let inf = [F::INFINITY, 0., 0.];
        for t in [0., 1., F::INFINITY] {
            let m = TriMesh::new(vec![inf, [0.; 3], inf], vec![]);
            assert_eq!(weld(m, t).unwrap().v, vec![inf, [0.; 3]]);
        }
    }

    #[test]
    fn rejects_bad_threshold() {
        for t in [-1e-9, -1., F::NAN, F::NEG_INFINITY] {
            let err = weld(TriMesh::default(), t).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
        assert!(Threshold::new(0.).is_ok());
        assert!(Threshold::try_from(F::INFINITY).is_ok());
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let m = TriMesh::new(vec![[0.; 3]; 2], vec![[0, 1, 2]]);
        let err = weld(m, 0.1).unwrap_err();
        assert!(matches!(err, WeldError::InvalidIndex { index: 2, .. }));
    }
}
