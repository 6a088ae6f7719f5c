// Conversions from the terrain's local ground plane into texel space.
//
// Local points are stored in a Vec2 as (x, z) with the terrain centred on the
// origin; texel rows grow towards -Z. The height grid has
// one sample per world unit; the mask and foliage grids use a detail multiplier.

use glam::{IVec2, Vec2, Vec3};

// World point -> local ground plane point (drops Y)
pub fn world_to_local(world: Vec3, translation: Vec3, scale: f32) -> Vec2 {
    let local = (world - translation) / scale;
    Vec2::new(local.x, local.z)
}

// Height grid indices: U = round(x) + SizeX/2, V = round(-z) + SizeZ/2
pub fn height_texel(size_x: u32, size_z: u32, local: Vec2) -> IVec2 {
    IVec2::new(
        (local.x.round() as i32).saturating_add((size_x / 2) as i32),
        ((-local.y).round() as i32).saturating_add((size_z / 2) as i32),
    )
}

// Mask and foliage grid indices, truncated towards zero
pub fn detail_texel(size_x: u32, size_z: u32, detail: u32, local: Vec2) -> IVec2 {
    let half_x = size_x as f32 / 2.0;
    let half_z = size_z as f32 / 2.0;
    let detail = detail as f32;
    IVec2::new(
        ((half_x + local.x) * detail) as i32,
        (-(-half_z + local.y) * detail) as i32,
    )
}

// Inverse of `detail_texel` for the corner of a cell
pub fn detail_cell_to_local(size_x: u32, size_z: u32, detail: u32, cell: IVec2) -> Vec2 {
    let spacing = 1.0 / detail as f32;
    Vec2::new(
        cell.x as f32 * spacing - size_x as f32 / 2.0,
        size_z as f32 / 2.0 - cell.y as f32 * spacing,
    )
}

// Squared brush radius in height texels
pub fn height_radius_sq(radius: f32, scale: f32) -> f32 {
    let r = radius / scale;
    r * r
}

// Squared brush radius in mask/foliage texels
pub fn detail_radius_sq(radius: f32, scale: f32, detail: u32) -> f32 {
    let r = radius / scale * detail as f32;
    r * r
}

// Inclusive texel bounds of a brush, clipped to a `width` x `depth` grid.
// Returns None when the brush misses the grid entirely.
pub fn brush_bounds(
    center: IVec2,
    radius_sq: f32,
    width: usize,
    depth: usize,
) -> Option<(IVec2, IVec2)> {
    if width == 0 || depth == 0 || !(radius_sq >= 0.0) {
        return None;
    }
    let reach = radius_sq.sqrt().ceil() as i32;
    let min = IVec2::new(
        center.x.saturating_sub(reach).max(0),
        center.y.saturating_sub(reach).max(0),
    );
    let max = IVec2::new(
        center.x.saturating_add(reach).min(width as i32 - 1),
        center.y.saturating_add(reach).min(depth as i32 - 1),
    );
    if min.x > max.x || min.y > max.y {
        return None;
    }
    Some((min, max))
}

// Squared distance between two texels
#[inline]
pub fn texel_distance_sq(a: IVec2, b: IVec2) -> f32 {
    let dx = a.x as f32 - b.x as f32;
    let dy = a.y as f32 - b.y as f32;
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_texel_centres_the_grid() {
        assert_eq!(height_texel(4, 4, Vec2::ZERO), IVec2::new(2, 2));
        assert_eq!(height_texel(4, 4, Vec2::new(-2.0, 2.0)), IVec2::new(0, 0));
        assert_eq!(height_texel(4, 4, Vec2::new(2.0, -2.0)), IVec2::new(4, 4));
        // rounding to the nearest sample
        assert_eq!(height_texel(4, 4, Vec2::new(0.6, -0.4)), IVec2::new(3, 2));
    }

    #[test]
    fn detail_texel_scales_with_detail() {
        assert_eq!(detail_texel(4, 4, 2, Vec2::ZERO), IVec2::new(4, 4));
        assert_eq!(detail_texel(4, 4, 2, Vec2::new(-2.0, 2.0)), IVec2::new(0, 0));
        assert_eq!(detail_texel(4, 4, 2, Vec2::new(1.3, -1.3)), IVec2::new(6, 6));
    }

    #[test]
    fn detail_cell_round_trips_through_local() {
        for (u, v) in [(0, 0), (3, 5), (7, 7)] {
            let cell = IVec2::new(u, v);
            let local = detail_cell_to_local(4, 4, 2, cell);
            // nudge into the cell to avoid truncation at the corner
            let inside = local + Vec2::new(0.25, -0.25);
            assert_eq!(detail_texel(4, 4, 2, inside), cell);
        }
    }

    #[test]
    fn radius_thresholds() {
        assert_eq!(height_radius_sq(4.0, 2.0), 4.0);
        assert_eq!(detail_radius_sq(4.0, 2.0, 3), 36.0);
    }

    #[test]
    fn world_to_local_removes_translation_and_scale() {
        let local = world_to_local(Vec3::new(12.0, 5.0, -4.0), Vec3::new(10.0, 0.0, 0.0), 2.0);
        assert_eq!(local, Vec2::new(1.0, -2.0));
    }

    #[test]
    fn brush_bounds_clip_to_grid() {
        let (min, max) = brush_bounds(IVec2::new(0, 0), 4.0, 8, 8).unwrap();
        assert_eq!(min, IVec2::new(0, 0));
        assert_eq!(max, IVec2::new(2, 2));
        assert!(brush_bounds(IVec2::new(-10, -10), 1.0, 8, 8).is_none());
    }

    #[test]
    fn far_away_points_saturate_instead_of_overflowing() {
        let far = Vec2::new(5.0e9, -5.0e9);
        assert_eq!(height_texel(64, 64, far), IVec2::new(i32::MAX, i32::MAX));
        assert_eq!(height_texel(64, 64, -far), IVec2::new(i32::MIN + 32, i32::MIN + 32));
        assert_eq!(detail_texel(64, 64, 4, far), IVec2::new(i32::MAX, i32::MAX));

        assert!(brush_bounds(IVec2::splat(i32::MAX), 1.0e6, 8, 8).is_none());
        assert!(brush_bounds(IVec2::splat(i32::MIN), 1.0e6, 8, 8).is_none());
        assert!(brush_bounds(IVec2::ZERO, f32::NAN, 8, 8).is_none());
    }
}
