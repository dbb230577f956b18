//! Benchmarks for QEF edge collapse and the island generators feeding it

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use procmesh_core::{Point3f, TriangleMesh, Vector2f};
use procmesh_procedural::{
    generate_poly, GridData, HeightBlendType, IslandHeightMapTask, MapGenerationInfo, PolyIslandParams,
};
use procmesh_simplification::{MeshSimplifier, QefEdgeCollapseSimplifier, SimplifierOptions};

fn generate_grid_mesh(size: usize) -> TriangleMesh {
    let mut positions = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            let fx = x as f32 / (size - 1) as f32 * std::f32::consts::PI;
            let fy = y as f32 / (size - 1) as f32 * std::f32::consts::PI;
            positions.push(Point3f::new(x as f32, y as f32, (fx.sin() * fy.sin()) * 2.0));
        }
    }
    let mut triangles = Vec::with_capacity((size - 1) * (size - 1) * 2);
    for y in 0..(size - 1) {
        for x in 0..(size - 1) {
            let tl = (y * size + x) as u32;
            let tr = tl + 1;
            let bl = ((y + 1) * size + x) as u32;
            let br = bl + 1;
            triangles.push([tl, bl, tr]);
            triangles.push([tr, bl, br]);
        }
    }
    TriangleMesh::from_triangles(positions, &triangles)
}

fn island_params(size: usize) -> PolyIslandParams {
    PolyIslandParams {
        size: Vector2f::new(size as f32, size as f32),
        side_count: 6,
        subdiv_count: 5,
        subdiv_limit: 0.02,
        displacement_range: Vector2f::new(0.1, 0.4),
        ..PolyIslandParams::default()
    }
}

fn generate_island_mesh(size: usize) -> TriangleMesh {
    let outline = generate_poly(&island_params(size)).unwrap();
    let mut grid = GridData::new(size, size);
    grid.draw_point_mask(&outline);
    IslandHeightMapTask::new(1, 3, MapGenerationInfo::with_target(0, HeightBlendType::Replace))
        .execute(&mut grid)
        .unwrap();
    grid.create_mesh_section(0, 8.0, false)
}

fn bench_simplification(c: &mut Criterion) {
    let sizes = [20, 40, 80];
    let fractions = [0.125, 0.5];

    let mut group = c.benchmark_group("simplification");

    for &size in &sizes {
        let mesh = generate_grid_mesh(size);
        let triangle_count = mesh.triangle_count();

        for &fraction in &fractions {
            let options = SimplifierOptions::new()
                .with_target_percentage(0.25)
                .with_max_iteration(20)
                .with_edge_fraction(fraction);

            group.bench_with_input(
                BenchmarkId::new(
                    "qef_edge_collapse",
                    format!("{}t_f{}", triangle_count, (fraction * 1000.0) as u32),
                ),
                &(&mesh, options),
                |b, &(mesh, options)| {
                    let simplifier = QefEdgeCollapseSimplifier::with_options(options);
                    b.iter(|| {
                        let result = simplifier.simplify(black_box(mesh)).unwrap();
                        black_box(result);
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let sections: Vec<TriangleMesh> = (0..16).map(|_| generate_grid_mesh(32)).collect();
    let simplifier = QefEdgeCollapseSimplifier::with_options(
        SimplifierOptions::new().with_target_percentage(0.25).with_max_iteration(20),
    );

    let mut group = c.benchmark_group("batch");

    group.bench_function("sequential_16x32", |b| {
        b.iter(|| {
            let results: Vec<TriangleMesh> = sections
                .iter()
                .map(|mesh| simplifier.simplify(black_box(mesh)).unwrap())
                .collect();
            black_box(results);
        });
    });

    group.bench_function("parallel_16x32", |b| {
        b.iter(|| {
            let results = simplifier.simplify_batch(black_box(&sections)).unwrap();
            black_box(results);
        });
    });

    group.finish();
}

fn bench_island(c: &mut Criterion) {
    let mut group = c.benchmark_group("island");

    for &size in &[64usize, 128] {
        group.bench_with_input(BenchmarkId::new("generate_poly", size), &size, |b, &size| {
            let params = island_params(size);
            b.iter(|| black_box(generate_poly(black_box(&params)).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("height_map", size), &size, |b, &size| {
            let outline = generate_poly(&island_params(size)).unwrap();
            let mut grid = GridData::new(size, size);
            grid.draw_point_mask(&outline);
            let task = IslandHeightMapTask::new(1, 3, MapGenerationInfo::with_target(0, HeightBlendType::Replace));
            b.iter(|| black_box(task.execute(&mut grid).unwrap()));
        });

        let mesh = generate_island_mesh(size);
        group.bench_with_input(BenchmarkId::new("simplify_section", size), &mesh, |b, mesh| {
            let simplifier = QefEdgeCollapseSimplifier::new();
            b.iter(|| black_box(simplifier.simplify(black_box(mesh)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_simplification, bench_batch, bench_island);
criterion_main!(benches);
