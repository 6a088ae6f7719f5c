// Create a terrain, raise a hill, save it to disk and load it back
use glam::Vec3;
use rand::{SeedableRng, rngs::StdRng};
use terrain_core::logging::init_logging;
use terrain_core::{EditMode, EditorSettings, TerrainEditor};
use terrain_storage::codec;

fn new_editor() -> TerrainEditor {
    TerrainEditor::new(EditorSettings::default(), Box::new(StdRng::seed_from_u64(7)))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let mut editor = new_editor();
    editor.create()?;
    editor.set_edit_mode(EditMode::DeltaHeight);
    editor.set_selection_radius(10.0);
    for _ in 0..50 {
        editor.select(Vec3::new(0.0, 100.0, 0.0), Vec3::NEG_Y, true, true);
    }

    let snapshot = editor.save().ok_or("no terrain")?;
    let path = std::env::temp_dir().join("roundtrip_demo.terrain");
    codec::write_file(&path, &snapshot)?;

    let mut reloaded = new_editor();
    reloaded.load(codec::read_file(&path)?)?;
    let same = reloaded.terrain().map(|t| t.snapshot()) == Some(snapshot);
    println!("Reloaded {:?}: identical = {}", path, same);
    Ok(())
}
