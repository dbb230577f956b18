//! Smoke tests for the umbrella crate re-exports

use anyhow::{Context, Result};
use procmesh::prelude::*;

#[test]
fn test_island_to_simplified_section() -> Result<()> {
    let params = PolyIslandParams {
        side_count: 5,
        displacement_range: Vector2f::new(0.1, 0.3),
        ..PolyIslandParams::new(Vector2f::new(48.0, 48.0))
    };
    let outline = generate_poly(&params).context("island outline")?;

    let mut grid = GridData::new(48, 48);
    grid.draw_point_mask(&outline);
    let task = IslandHeightMapTask::new(4, 2, MapGenerationInfo::with_target(0, HeightBlendType::Replace));
    task.setup(&grid).context("task setup")?;
    task.execute(&mut grid)?;

    let section = grid.create_mesh_section(0, 5.0, false);
    let simplifier = QefEdgeCollapseSimplifier::with_options(
        SimplifierOptions::new()
            .with_target_percentage(0.5)
            .with_max_iteration(20),
    );
    let (simplified, stats) = simplifier.simplify_with_stats(&section)?;

    assert_eq!(stats.input_triangles, section.triangle_count());
    assert!(simplified.triangle_count() <= section.triangle_count());
    assert!(simplified.has_normals());
    Ok(())
}

#[test]
fn test_errors_convert_into_anyhow() {
    let invalid = PolyIslandParams::default();
    let result: Result<Vec<Point2f>> = generate_poly(&invalid).map_err(anyhow::Error::from);
    let message = result.unwrap_err().to_string();
    assert!(message.starts_with("Invalid parameters"));
}

#[test]
fn test_sub_crate_paths() {
    let stream = procmesh::RandomStream::new(3);
    assert_eq!(stream.seed(), 3);
    assert_eq!(procmesh::procedural::NEIGHBOR_COUNT, 8);
    assert_eq!(procmesh::simplification::DEFAULT_SEED, 1337);
}
