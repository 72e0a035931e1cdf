use super::F;
use super::error::{WeldError, WeldResult};

/// A triangulated surface: vertex positions and triangles indexing into them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriMesh {
    pub v: Vec<[F; 3]>,
    pub f: Vec<[usize; 3]>,
}

impl TriMesh {
    pub fn new(v: Vec<[F; 3]>, f: Vec<[usize; 3]>) -> Self {
        Self { v, f }
    }

    #[inline]
    pub fn num_verts(&self) -> usize {
        self.v.len()
    }

    #[inline]
    pub fn num_tris(&self) -> usize {
        self.f.len()
    }

    pub fn is_empty(&self) -> bool {
        self.v.is_empty() && self.f.is_empty()
    }

    /// Checks that every triangle index is in `[0, num_verts)`, and that the vertex count fits
    /// in the 32 bit indices used while welding.
    pub fn validate(&self) -> WeldResult<()> {
        let vertex_count = self.v.len();
        check_vertex_count(vertex_count)?;
        for (triangle, t) in self.f.iter().enumerate() {
            if let Some(&index) = t.iter().find(|&&vi| vi >= vertex_count) {
                return Err(WeldError::InvalidIndex {
                    triangle,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }
}

pub(crate) fn check_vertex_count(vertex_count: usize) -> WeldResult<()> {
    let max = u32::MAX as usize;
    if vertex_count > max {
        return Err(WeldError::TooManyVertices { vertex_count, max });
    }
    Ok(())
}

/// True if two or more corners of `t` are the same vertex.
#[inline]
pub fn is_degenerate([a, b, c]: [usize; 3]) -> bool {
    a == b || b == c || a == c
}
