// Preview images of the terrain grids for demos and debugging
use image::{GrayImage, Luma, Rgb, RgbImage, RgbaImage};
use palette::{Gradient, LinSrgb};

use crate::foliage::FoliageGrid;
use crate::height::HeightField;
use crate::mask::MaskGrid;

// Sample values are mapped onto this ramp; the water line sits at 0.3
fn terrain_gradient() -> Gradient<LinSrgb> {
    Gradient::with_domain(vec![
        (0.00, LinSrgb::new(0.0, 0.0, 0.5)),  // deep water
        (0.30, LinSrgb::new(0.0, 0.5, 1.0)),  // shallows
        (0.40, LinSrgb::new(0.8, 0.8, 0.5)),  // sand
        (0.60, LinSrgb::new(0.1, 0.6, 0.2)),  // grass
        (0.80, LinSrgb::new(0.5, 0.4, 0.3)),  // rock
        (1.00, LinSrgb::new(1.0, 1.0, 1.0)),  // snow
    ])
}

// Colour-ramped height field, one pixel per sample
pub fn height_image(field: &HeightField) -> RgbImage {
    let gradient = terrain_gradient();
    let mut img = RgbImage::new(field.width() as u32, field.depth() as u32);
    for (u, v, pixel) in img.enumerate_pixels_mut() {
        let t = field.sample(u as i32, v as i32) as f32 / 255.0;
        let rgb = gradient.get(t).into_format::<u8>();
        *pixel = Rgb([rgb.red, rgb.green, rgb.blue]);
    }
    img
}

// Raw blend weights as an RGBA image. Alpha is forced opaque unless `keep_alpha`.
pub fn mask_image(mask: &MaskGrid, keep_alpha: bool) -> RgbaImage {
    let mut bytes = mask.as_bytes().to_vec();
    if !keep_alpha {
        for texel in bytes.chunks_exact_mut(4) {
            texel[3] = 255;
        }
    }
    // the buffer length always matches width * depth * 4
    RgbaImage::from_raw(mask.width() as u32, mask.depth() as u32, bytes).unwrap_or_default()
}

// Occupied foliage cells in white
pub fn foliage_image(foliage: &FoliageGrid) -> GrayImage {
    let mut img = GrayImage::new(foliage.width() as u32, foliage.depth() as u32);
    for (pixel, &cell) in img.pixels_mut().zip(foliage.as_bytes()) {
        *pixel = Luma([cell]);
    }
    img
}
