use glam::Vec3;
use rand::{SeedableRng, rngs::StdRng};
use terrain_core::{
    EditMode, EditorSettings, FoliageSource, MaskLayer, TerrainDescriptor, TerrainEditor,
    TerrainSnapshot,
};
use terrain_storage::codec;

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("{}_{}.terrain", name, std::process::id()))
}

fn new_editor(seed: u64) -> TerrainEditor {
    TerrainEditor::new(EditorSettings::default(), Box::new(StdRng::seed_from_u64(seed)))
}

// Terrain with edits in every grid
fn edited_editor() -> TerrainEditor {
    let mut editor = new_editor(42);
    editor
        .create_with(TerrainDescriptor {
            size_x: 16,
            size_z: 12,
            height_range: 30.0,
            masking_detail: 2,
            foliage_placing_detail: 2,
            foliage_density: 1.0,
            uniform_scaling_factor: 2.0,
            water_height: -1.25,
            ..Default::default()
        })
        .expect("create failed");
    editor
        .create_foliage_cluster(&[FoliageSource::new("pine"), FoliageSource::new("fern")], 2)
        .expect("cluster failed");
    editor.terrain_mut().unwrap().materials = vec!["base.png".into(), "rock.png".into()];

    let down = Vec3::NEG_Y;
    editor.set_edit_mode(EditMode::DeltaHeight);
    editor.set_selection_radius(6.0);
    for _ in 0..20 {
        editor.select(Vec3::new(3.0, 40.0, -2.0), down, true, true);
    }
    editor.set_edit_mode(EditMode::AverageHeight);
    editor.select(Vec3::new(5.0, 40.0, 0.0), down, true, true);

    editor.set_edit_mode(EditMode::Masking);
    editor.set_mask_layer(MaskLayer::B);
    editor.set_selection_radius(4.0);
    editor.select(Vec3::new(-6.0, 40.0, 4.0), down, true, true);

    editor.set_edit_mode(EditMode::FoliagePlacing);
    editor.set_selection_radius(3.0);
    editor.select(Vec3::new(8.0, 40.0, 6.0), down, true, true);
    editor
}

#[test]
fn test_roundtrip_file() {
    let mut editor = edited_editor();
    let occupancy = editor.terrain().unwrap().foliage().as_bytes().to_vec();
    assert!(occupancy.iter().any(|&c| c != 0));
    let saved = editor.save().expect("no terrain to save");

    let path = temp_path("roundtrip");
    codec::write_file(&path, &saved).expect("write failed");
    let read: TerrainSnapshot = codec::read_file(&path).expect("read failed");
    let _ = std::fs::remove_file(&path);

    assert_eq!(read.descriptor, saved.descriptor);
    assert_eq!(read.height_map, saved.height_map);
    assert_eq!(read.mask_map, saved.mask_map);
    assert_eq!(read.materials, saved.materials);
    assert_eq!(read.foliage, saved.foliage);

    let mut other = new_editor(0);
    other.load(read).expect("load failed");
    let terrain = other.terrain().unwrap();
    assert_eq!(terrain.snapshot(), saved);
    assert_eq!(terrain.foliage().as_bytes(), occupancy.as_slice());
    assert_eq!(terrain.water().height, -1.25);
    assert!(!terrain.needs_save());
}

#[test]
fn test_missing_file_is_an_error() {
    assert!(codec::read_file(temp_path("does_not_exist")).is_err());
}

#[test]
#[ignore = "needs a MongoDB server on localhost:27017"]
fn test_roundtrip_library() {
    use terrain_storage::TerrainLibrary;
    use tokio::runtime::Builder;

    let rt = Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build Tokio runtime");

    rt.block_on(async {
        let mut editor = edited_editor();
        let saved = editor.save().unwrap();

        let library = TerrainLibrary::init("mongodb://localhost:27017", "terrain_db", "terrains")
            .await
            .expect("library init failed");

        library.save("roundtrip", &saved).await.expect("save failed");
        let names = library.list_names().await.expect("list failed");
        assert!(names.iter().any(|n| n == "roundtrip"));

        let found = library
            .read_by_name("roundtrip")
            .await
            .expect("read failed")
            .expect("terrain not found");
        assert_eq!(found, saved);

        library.delete_by_name("roundtrip").await.expect("delete failed");
        assert!(library.read_by_name("roundtrip").await.unwrap().is_none());
    });
}
