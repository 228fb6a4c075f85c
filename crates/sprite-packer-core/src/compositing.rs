use crate::error::{Result, SpritePackerError};
use crate::model::{Packing, Rect};
use crate::sprite::Sprite;
use image::{Rgba, RgbaImage};

/// Copies `src_rect` of `src` into `canvas` with its top-left corner at (dx, dy).
/// Pixels falling outside either image are skipped.
pub fn blit_rgba(src: &RgbaImage, src_rect: Rect, canvas: &mut RgbaImage, dx: u32, dy: u32) {
    let (sw, sh) = src.dimensions();
    let (cw, ch) = canvas.dimensions();
    for yy in 0..src_rect.h {
        let (sy, ty) = (src_rect.y + yy, dy + yy);
        if sy >= sh || ty >= ch {
            break;
        }
        for xx in 0..src_rect.w {
            let (sx, tx) = (src_rect.x + xx, dx + xx);
            if sx >= sw || tx >= cw {
                break;
            }
            canvas.put_pixel(tx, ty, *src.get_pixel(sx, sy));
        }
    }
}

/// Bleeds the edge colors of the content at `rect` into the `margin` pixels reserved to its
/// right and below. Bled pixels take the nearest edge pixel's color with zero alpha, so they are
/// invisible but keep filtered sampling from pulling in black.
///
/// The reserved strip belongs to this sprite alone, so no other content is touched.
pub fn bleed(canvas: &mut RgbaImage, rect: Rect, margin: u32) {
    if margin == 0 || rect.w == 0 || rect.h == 0 {
        return;
    }
    let (cw, ch) = canvas.dimensions();
    let x_end = rect.x2().saturating_add(margin).min(cw);
    let y_end = rect.y2().saturating_add(margin).min(ch);
    for ty in rect.y..y_end {
        for tx in rect.x..x_end {
            if tx < rect.x2() && ty < rect.y2() {
                continue;
            }
            let sx = tx.min(rect.x2() - 1);
            let sy = ty.min(rect.y2() - 1);
            if sx >= cw || sy >= ch {
                continue;
            }
            let Rgba([r, g, b, _]) = *canvas.get_pixel(sx, sy);
            canvas.put_pixel(tx, ty, Rgba([r, g, b, 0]));
        }
    }
}

/// Renders one page: transparent background, every placement's cropped pixels copied from its
/// sheet image, then edge colors bled into the margins.
///
/// `page` payloads index into `sprites`; `Sprite::sheet` indexes into `sheets`.
pub fn compose_page(
    page: &Packing<usize>,
    sprites: &[Sprite],
    sheets: &[RgbaImage],
    use_crop: bool,
    margin: u32,
) -> Result<RgbaImage> {
    let mut canvas = RgbaImage::new(page.width, page.height);
    for p in &page.placements {
        let sprite = &sprites[p.payload];
        let sheet = &sheets[sprite.sheet];
        let src_rect = sprite.cropped_source(use_crop);
        let (sw, sh) = sheet.dimensions();
        if src_rect.x2() > sw || src_rect.y2() > sh {
            return Err(SpritePackerError::SpriteOutOfBounds {
                name: sprite.name.clone(),
            });
        }
        blit_rgba(sheet, src_rect, &mut canvas, p.x, p.y);
        bleed(&mut canvas, p.rect(), margin);
    }
    Ok(canvas)
}
