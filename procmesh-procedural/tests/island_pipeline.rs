//! Integration tests for the island outline to height map pipeline

use procmesh_core::{Point2f, RandomStream, Vector2f};
use procmesh_procedural::*;

fn island_params(size: f32, seed: u32) -> PolyIslandParams {
    PolyIslandParams {
        random_seed: seed,
        size: Vector2f::new(size, size),
        side_count: 6,
        subdiv_count: 4,
        subdiv_limit: 0.05,
        displacement_range: Vector2f::new(0.1, 0.4),
        ..PolyIslandParams::default()
    }
}

fn island_grid(size: usize, seed: u32) -> GridData {
    let outline = generate_poly(&island_params(size as f32, seed)).unwrap();
    let mut grid = GridData::new(size, size);
    grid.draw_point_mask(&outline);
    grid
}

#[test]
fn test_outline_rasterizes_into_connected_island() {
    let grid = island_grid(64, 1337);

    assert!(grid.point_set.len() > 64 * 64 / 4);
    assert!(!grid.border_set.is_empty());
    assert!(grid.border_set.is_subset(&grid.point_set));

    let mut rng = RandomStream::new(0);
    let elevation = generate_island_heights(&grid, grid.point_set.iter().copied(), 1, &mut rng);
    assert_eq!(elevation.reached_count(), grid.point_set.len());
}

#[test]
fn test_height_task_then_mesh_section() {
    let mut grid = island_grid(48, 42);
    let task = IslandHeightMapTask::new(
        9,
        3,
        MapGenerationInfo::with_target(0, HeightBlendType::Replace),
    );
    task.setup(&grid).unwrap();
    task.execute(&mut grid).unwrap();

    let heights = grid.height_map(0).unwrap();
    assert!(heights.iter().all(|h| (0.0..=1.0).contains(h)));
    for i in 0..grid.cell_count() {
        if !grid.is_solid(i) {
            assert_eq!(heights[i], 0.0);
        }
    }

    let mesh = grid.create_mesh_section(0, 10.0, false);
    assert_eq!(mesh.vertex_count(), 48 * 48);
    assert_eq!(mesh.triangle_count(), 47 * 47 * 2);
    assert!(mesh.validate_indices().is_ok());
    assert!(mesh.positions.iter().any(|p| p.z > 1.0));
}

#[test]
fn test_pipeline_is_deterministic() {
    let run = || {
        let mut grid = island_grid(40, 7);
        IslandHeightMapTask::new(3, 4, MapGenerationInfo::with_target(1, HeightBlendType::Max))
            .execute(&mut grid)
            .unwrap();
        grid
    };
    assert_eq!(run(), run());
}

#[test]
fn test_second_task_blends_over_first() {
    let mut grid = island_grid(32, 5);
    let replace = IslandHeightMapTask::new(1, 1, MapGenerationInfo::with_target(0, HeightBlendType::Replace));
    let first = replace.execute(&mut grid).unwrap().to_height_map();

    let add = IslandHeightMapTask::new(1, 1, MapGenerationInfo::with_target(0, HeightBlendType::Add));
    add.execute(&mut grid).unwrap();

    let blended = grid.height_map(0).unwrap();
    for (b, f) in blended.iter().zip(&first) {
        assert!((b - 2.0 * f).abs() < 1e-6);
    }
}

#[test]
fn test_flipped_and_offset_outline_stays_in_bounds() {
    let dimension = Vector2f::new(128.0, 128.0);
    let outline = generate_poly(&island_params(128.0, 3)).unwrap();

    let flipped = flip_points(&outline, &dimension);
    for (p, f) in outline.iter().zip(&flipped) {
        assert!((p.x + f.x - 128.0).abs() < 1e-3);
        assert!((p.y + f.y - 128.0).abs() < 1e-3);
    }

    let jittered = generate_point_offsets(11, &flipped, 4.0);
    let refit = fitted_points(&jittered, &dimension, 0.9);
    for p in &refit {
        assert!(p.x >= -1e-3 && p.x <= 128.0 + 1e-3);
        assert!(p.y >= -1e-3 && p.y <= 128.0 + 1e-3);
    }
    assert_eq!(refit.len(), outline.len());
    assert_ne!(refit[0], Point2f::origin());
}
