use std::panic::{catch_unwind, AssertUnwindSafe};

use csgrs::mesh::{polygon::Polygon, vertex::Vertex, Mesh as CsgMesh};
use csgrs::traits::CSG;

use crate::math::{Point3, TOLERANCE};

use super::{PlanarFace, Solid};

/// Computes the exact boolean intersection of two solids.
///
/// The boolean kernel is treated as a black-box numeric routine: degenerate
/// or non-manifold input yields "no intersection" instead of an error, so a
/// single bad pair never aborts a batch.
pub struct IntersectSolids<'a> {
    a: &'a Solid,
    b: &'a Solid,
}

impl<'a> IntersectSolids<'a> {
    /// Creates a new `IntersectSolids` operation.
    #[must_use]
    pub fn new(a: &'a Solid, b: &'a Solid) -> Self {
        Self { a, b }
    }

    /// Executes the intersection.
    ///
    /// Returns `None` when the solids do not overlap, when either input is
    /// degenerate, or when the kernel fails on the pair.
    #[must_use]
    pub fn execute(&self) -> Option<Solid> {
        // Disjoint bounding outlines cannot intersect
        if !self.a.outline().intersects(&self.b.outline(), 0.0) {
            return None;
        }
        if !is_closed(self.a) || !is_closed(self.b) {
            return None;
        }

        let mesh_a = to_csg(self.a)?;
        let mesh_b = to_csg(self.b)?;

        let result = catch_unwind(AssertUnwindSafe(|| mesh_a.intersection(&mesh_b))).ok()?;

        from_csg(&result)
    }
}

/// Tests whether a face set plausibly closes a volume: the area-weighted
/// outward normals of a closed body sum to zero.
fn is_closed(solid: &Solid) -> bool {
    let mut closure = crate::math::Vector3::zeros();
    let mut total_area = 0.0;
    for face in solid.faces() {
        let area = face.area();
        closure += face.plane().normal() * area;
        total_area += area;
    }
    total_area > TOLERANCE && closure.norm() < 1e-6 * total_area
}

/// Converts a solid into the boolean kernel's mesh representation.
///
/// Faces are triangulated first; each triangle becomes one kernel polygon
/// carrying its geometric normal. Degenerate triangles are dropped, and a
/// solid that yields no usable polygons maps to `None`.
fn to_csg(solid: &Solid) -> Option<CsgMesh<()>> {
    let mut polygons = Vec::new();
    for face in solid.faces() {
        let triangles = face.triangulate().ok()?;
        for tri in triangles {
            let normal = (tri[1] - tri[0]).cross(&(tri[2] - tri[0]));
            let len = normal.norm();
            if len < TOLERANCE {
                continue;
            }
            let normal = normal / len;
            let vertices = vec![
                Vertex::new(tri[0], normal),
                Vertex::new(tri[1], normal),
                Vertex::new(tri[2], normal),
            ];
            polygons.push(Polygon::new(vertices, None));
        }
    }
    if polygons.is_empty() {
        return None;
    }
    Some(CsgMesh::from_polygons(&polygons, None))
}

/// Converts a kernel mesh back into a solid, skipping degenerate fragments.
fn from_csg(mesh: &CsgMesh<()>) -> Option<Solid> {
    let mut faces = Vec::new();
    for polygon in &mesh.polygons {
        if polygon.vertices.len() < 3 {
            continue;
        }
        let boundary: Vec<Point3> = polygon
            .vertices
            .iter()
            .map(|v| Point3::new(v.pos.x, v.pos.y, v.pos.z))
            .collect();
        if let Ok(face) = PlanarFace::new(boundary) {
            faces.push(face);
        }
    }
    Solid::from_faces(faces).ok()
}
