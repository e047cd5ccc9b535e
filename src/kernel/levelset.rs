//! Marching-tetrahedra discretisation of a scalar level set.
//!
//! Each tetrahedron whose vertex values straddle the threshold contributes one
//! triangle (one vertex on its own side) or two triangles (two on each side)
//! to the iso-surface. Cut points are shared between neighbouring tetrahedra
//! through an edge-keyed map, and a cut that lands on a vertex lying exactly
//! on the threshold reuses that vertex.
//!
//! The result is an overlay, not a conforming discretisation: tetrahedra are
//! not split along the surface, so the new cut points belong to no
//! tetrahedron. Each tetrahedron is retagged as a whole by its mean value.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use super::{KernelMesh, KernelSol};

/// Reference tag of triangles on the extracted iso-surface.
pub const ISO_REF: i32 = 10;

/// Reference tag of tetrahedra below the threshold.
pub const LS_INSIDE_REF: i32 = 3;

/// Reference tag of tetrahedra at or above the threshold.
pub const LS_OUTSIDE_REF: i32 = 2;

struct Cutter {
    cuts: HashMap<(usize, usize), usize>,
}

impl Cutter {
    /// The kernel index of the point where edge `(i, j)` crosses the level set.
    fn cut(
        &mut self,
        mesh: &mut KernelMesh,
        sol: &mut KernelSol,
        values: &[f64],
        iso: f64,
        i: usize,
        j: usize,
    ) -> usize {
        let key = (i.min(j), i.max(j));
        if let Some(&p) = self.cuts.get(&key) {
            return p;
        }
        let (fi, fj) = (values[i], values[j]);
        if fi == 0.0 {
            return i;
        }
        if fj == 0.0 {
            return j;
        }
        let t = fi / (fi - fj);
        let pi = Vector3::from(mesh.point(i).c);
        let pj = Vector3::from(mesh.point(j).c);
        let c = pi + (pj - pi) * t;
        let p = mesh.push_point([c.x, c.y, c.z], 0);
        sol.push(&[iso]);
        self.cuts.insert(key, p);
        p
    }
}

/// Discretise `field = iso` over the tetrahedra of `mesh`.
///
/// Appends the iso-surface triangles (tagged [`ISO_REF`]) and their new
/// points, whose field value is `iso`. Tetrahedra are retagged
/// [`LS_INSIDE_REF`] or [`LS_OUTSIDE_REF`] by the mean of their vertex values.
/// Returns the number of iso-surface triangles.
pub(crate) fn discretize(mesh: &mut KernelMesh, sol: &mut KernelSol, iso: f64) -> usize {
    // values[i] is the shifted field at kernel vertex i; slot 0 unused.
    let np = mesh.nb_points();
    let mut values = vec![0.0; np + 1];
    for (i, v) in values.iter_mut().enumerate().skip(1) {
        *v = sol.value(i)[0] - iso;
    }

    let mut cutter = Cutter {
        cuts: HashMap::new(),
    };
    let mut triangles: Vec<[usize; 3]> = Vec::new();

    for t in 1..=mesh.nb_tetrahedra() {
        let v = mesh.tetra(t).v;
        let f = v.map(|i| values[i]);

        let mean = f.iter().sum::<f64>() / 4.0;
        mesh.tetra_mut(t).tag = if mean < 0.0 { LS_INSIDE_REF } else { LS_OUTSIDE_REF };

        let below: Vec<usize> = v.iter().copied().filter(|&i| values[i] < 0.0).collect();
        let above: Vec<usize> = v.iter().copied().filter(|&i| values[i] >= 0.0).collect();

        let mut cut = |i: usize, j: usize, mesh: &mut KernelMesh, sol: &mut KernelSol| {
            cutter.cut(mesh, sol, &values, iso, i, j)
        };

        let pieces: Vec<[usize; 3]> = match below.len() {
            1 | 3 => {
                let (lone, others) = if below.len() == 1 {
                    (below[0], &above)
                } else {
                    (above[0], &below)
                };
                vec![[
                    cut(lone, others[0], mesh, sol),
                    cut(lone, others[1], mesh, sol),
                    cut(lone, others[2], mesh, sol),
                ]]
            }
            2 => {
                let (a, b) = (below[0], below[1]);
                let (c, d) = (above[0], above[1]);
                let ac = cut(a, c, mesh, sol);
                let ad = cut(a, d, mesh, sol);
                let bd = cut(b, d, mesh, sol);
                let bc = cut(b, c, mesh, sol);
                vec![[ac, ad, bd], [ac, bd, bc]]
            }
            _ => Vec::new(),
        };

        if pieces.is_empty() {
            continue;
        }
        let direction = centroid(mesh, &above) - centroid(mesh, &below);
        for tri in pieces {
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                continue;
            }
            triangles.push(orient(mesh, tri, &direction));
        }
    }

    for tri in &triangles {
        mesh.push_tria(*tri, ISO_REF);
    }
    triangles.len()
}

fn centroid(mesh: &KernelMesh, verts: &[usize]) -> Point3<f64> {
    let sum = verts
        .iter()
        .fold(Vector3::zeros(), |acc, &i| acc + Vector3::from(mesh.point(i).c));
    Point3::from(sum / verts.len() as f64)
}

/// Flip `tri` so its normal points along `direction` (from below to above).
fn orient(mesh: &KernelMesh, tri: [usize; 3], direction: &Vector3<f64>) -> [usize; 3] {
    let p = tri.map(|i| Vector3::from(mesh.point(i).c));
    let normal = (p[1] - p[0]).cross(&(p[2] - p[0]));
    if normal.dot(direction) < 0.0 {
        [tri[0], tri[2], tri[1]]
    } else {
        tri
    }
}
