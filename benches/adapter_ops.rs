//! Benchmarks for kernel adapter operations.

use criterion::{criterion_group, criterion_main, Criterion};
use meshbridge::prelude::*;
use nalgebra::Point3;

/// A grid of `n^3` cubes, each split into six tetrahedra around its main
/// diagonal.
fn create_cube_grid(n: usize) -> HostMesh {
    let index = |i: usize, j: usize, k: usize| (k * (n + 1) + j) * (n + 1) + i;

    let mut vertices = Vec::with_capacity((n + 1).pow(3));
    for k in 0..=n {
        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Point3::new(i as f64, j as f64, k as f64));
            }
        }
    }

    const PATHS: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];

    let mut tets = Vec::with_capacity(n * n * n * 6);
    for k in 0..n {
        for j in 0..n {
            for i in 0..n {
                for path in PATHS {
                    let mut corner = [i, j, k];
                    let mut tet = [index(i, j, k); 4];
                    for (step, &axis) in path.iter().enumerate() {
                        corner[axis] += 1;
                        tet[step + 1] = index(corner[0], corner[1], corner[2]);
                    }
                    tets.push(tet);
                }
            }
        }
    }

    build_from_tetrahedra(&vertices, &tets, &boundary_triangles(&tets)).unwrap()
}

fn bench_round_trip(c: &mut Criterion) {
    let mesh = create_cube_grid(10);
    let kernel = ReferenceKernel::new();

    c.bench_function("round_trip_volume_10", |b| {
        b.iter(|| {
            Remesher::new(&kernel)
                .round_trip_selftest(&mesh, KernelKind::Volume)
                .unwrap()
        });
    });

    c.bench_function("round_trip_surface_10", |b| {
        b.iter(|| {
            Remesher::new(&kernel)
                .round_trip_selftest(&mesh, KernelKind::Surface)
                .unwrap()
        });
    });
}

fn bench_levelset(c: &mut Criterion) {
    let mut mesh = create_cube_grid(10);
    let centre = Point3::new(5.0, 5.0, 5.0);
    let phi: Vec<f64> = mesh
        .vertices
        .points()
        .iter()
        .map(|p| (p - centre).norm() - 3.5)
        .collect();
    mesh.write_vertex_field("phi", 1, phi).unwrap();

    let kernel = ReferenceKernel::new();
    let options = RemeshOptions::default().with_level_set("phi", 0.0);

    c.bench_function("levelset_sphere_10", |b| {
        b.iter(|| Remesher::new(&kernel).extract_levelset(&mesh, &options).unwrap());
    });
}

fn bench_connect(c: &mut Criterion) {
    let mesh = create_cube_grid(15);

    c.bench_function("connect_grid_15", |b| {
        b.iter(|| {
            let mut copy = mesh.clone();
            copy.connect();
            copy
        });
    });
}

criterion_group!(benches, bench_round_trip, bench_levelset, bench_connect);
criterion_main!(benches);
