use crate::geometry::Plane;

use super::{Point3, Vector3};

/// Computes the Newell normal of a planar polygon (unnormalized).
///
/// The result points out of the polygon's counter-clockwise side and its
/// length is twice the polygon area.
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Vector3 {
    let mut normal = Vector3::zeros();
    let n = points.len();
    for i in 0..n {
        let current = points[i];
        let next = points[(i + 1) % n];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal
}

/// Area of a planar polygon with the given unit normal.
#[must_use]
pub fn polygon_area(points: &[Point3], normal: &Vector3) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let origin = points[0];
    let mut cross_sum = Vector3::zeros();
    for i in 1..points.len() - 1 {
        let a = points[i] - origin;
        let b = points[i + 1] - origin;
        cross_sum += a.cross(&b);
    }
    (cross_sum.dot(normal) / 2.0).abs()
}

/// Point-in-polygon test for a 3D point coplanar with the polygon.
///
/// Projects to the plane's UV coordinate space and uses the winding number
/// algorithm. Returns `true` if the point is inside or on the boundary.
#[must_use]
pub fn point_in_polygon(point: &Point3, polygon: &[Point3], plane: &Plane) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let (px, py) = plane.uv_of(point);
    let uvs: Vec<(f64, f64)> = polygon.iter().map(|p| plane.uv_of(p)).collect();

    winding_number(px, py, &uvs) != 0
}

/// Winding number of point `(px, py)` with respect to polygon `verts`.
///
/// Non-zero => inside, zero => outside.
fn winding_number(px: f64, py: f64, verts: &[(f64, f64)]) -> i32 {
    let n = verts.len();
    let mut winding = 0i32;
    for i in 0..n {
        let (x0, y0) = verts[i];
        let (x1, y1) = verts[(i + 1) % n];

        if y0 <= py {
            if y1 > py && cross_2d(x1 - x0, y1 - y0, px - x0, py - y0) > 0.0 {
                winding += 1;
            }
        } else if y1 <= py && cross_2d(x1 - x0, y1 - y0, px - x0, py - y0) < 0.0 {
            winding -= 1;
        }
    }
    winding
}

/// 2D cross product: `(ax * by - ay * bx)`.
#[inline]
fn cross_2d(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    ax * by - ay * bx
}
