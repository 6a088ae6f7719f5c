// Scripted editing session: sculpt, paint and plant a small terrain, then
// write preview images of every grid.
use glam::Vec3;
use rand::{SeedableRng, rngs::StdRng};
use terrain_core::logging::init_logging;
use terrain_core::preview::{foliage_image, height_image, mask_image};
use terrain_core::{
    EditMode, EditorSettings, FoliageSource, MaskLayer, TerrainDescriptor, TerrainEditor,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let rng = Box::new(StdRng::seed_from_u64(2025));
    let mut editor = TerrainEditor::new(EditorSettings::default(), rng);
    editor.create_with(TerrainDescriptor {
        size_x: 128,
        size_z: 128,
        height_range: 40.0,
        masking_detail: 2,
        foliage_placing_detail: 1,
        foliage_density: 0.3,
        ..Default::default()
    })?;
    editor.create_foliage_cluster(&[FoliageSource::new("pine"), FoliageSource::new("shrub")], 1)?;

    let down = Vec3::NEG_Y;
    let above = |x: f32, z: f32| Vec3::new(x, 100.0, z);

    // A ridge of raised strokes along the diagonal
    editor.set_edit_mode(EditMode::DeltaHeight);
    editor.set_selection_radius(12.0);
    for step in 0..40 {
        let t = step as f32 - 20.0;
        for _ in 0..30 {
            editor.select(above(t * 2.0, t * 1.5), down, true, true);
        }
    }

    // Smooth it out
    editor.set_edit_mode(EditMode::AverageHeight);
    editor.set_selection_radius(8.0);
    for step in 0..40 {
        let t = step as f32 - 20.0;
        editor.select(above(t * 2.0, t * 1.5), down, true, true);
    }

    // A flat plateau
    editor.set_edit_mode(EditMode::SetHeight);
    editor.set_target_height(8.0);
    editor.set_selection_radius(10.0);
    editor.select(above(-30.0, 30.0), down, true, true);

    // Paint rock on the green channel around the plateau
    editor.set_edit_mode(EditMode::Masking);
    editor.set_mask_layer(MaskLayer::G);
    editor.set_selection_radius(14.0);
    editor.select(above(-30.0, 30.0), down, true, true);

    // Plant foliage in the lowlands
    editor.set_edit_mode(EditMode::FoliagePlacing);
    editor.set_selection_radius(20.0);
    editor.select(above(30.0, -30.0), down, true, true);

    let terrain = editor.terrain().ok_or("terrain missing")?;
    height_image(terrain.height()).save("brush_session_height.png")?;
    mask_image(terrain.mask(), false).save("brush_session_mask.png")?;
    foliage_image(terrain.foliage()).save("brush_session_foliage.png")?;

    for entry in terrain.foliage().entries() {
        println!("{}: {} instances", entry.source, entry.pool.iter().count());
    }
    println!("Saved brush_session_*.png");
    Ok(())
}
