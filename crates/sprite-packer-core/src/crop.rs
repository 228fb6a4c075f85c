use crate::model::Rect;
use crate::sprite::Crop;
use image::RgbaImage;

/// Measures the transparent border (alpha <= `threshold`) of `region` inside `rgba`.
///
/// A fully transparent region crops to nothing: `left` takes the whole width and `top` the
/// whole height, so the sprite packs as a zero-area item.
pub fn detect_crop(rgba: &RgbaImage, region: Rect, threshold: u8) -> Crop {
    let (iw, ih) = rgba.dimensions();
    let x_end = region.x2().min(iw);
    let y_end = region.y2().min(ih);
    if region.x >= x_end || region.y >= y_end {
        return Crop {
            left: region.w,
            right: 0,
            top: region.h,
            bottom: 0,
        };
    }
    let opaque = |x: u32, y: u32| rgba.get_pixel(x, y)[3] > threshold;
    let column_clear = |x: u32, y1: u32, y2: u32| (y1..=y2).all(|y| !opaque(x, y));
    let row_clear = |y: u32, x1: u32, x2: u32| (x1..=x2).all(|x| !opaque(x, y));

    let (mut x1, mut x2) = (region.x, x_end - 1);
    let (mut y1, mut y2) = (region.y, y_end - 1);
    // left
    while x1 <= x2 && column_clear(x1, y1, y2) {
        x1 += 1;
    }
    if x1 > x2 {
        return Crop {
            left: region.w,
            right: 0,
            top: region.h,
            bottom: 0,
        };
    }
    // right
    while x2 > x1 && column_clear(x2, y1, y2) {
        x2 -= 1;
    }
    // top
    while y1 < y2 && row_clear(y1, x1, x2) {
        y1 += 1;
    }
    // bottom
    while y2 > y1 && row_clear(y2, x1, x2) {
        y2 -= 1;
    }
    Crop {
        left: x1 - region.x,
        right: region.x2() - 1 - x2,
        top: y1 - region.y,
        bottom: region.y2() - 1 - y2,
    }
}
