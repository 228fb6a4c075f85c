use crate::model::{Rect, Request};
use serde::{Deserialize, Serialize};

/// Transparent border to strip from each side of a sprite.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Crop {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

/// A data element attached to a sprite (pivot, hitbox, ...). Attributes keep their file order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Guide {
    pub kind: String,
    pub attributes: Vec<(String, String)>,
}

/// One sprite cut out of a sheet image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sprite {
    /// Full exported name (prefix + folder + local name, lower-case).
    pub name: String,
    /// Index of the sheet image the sprite comes from.
    pub sheet: usize,
    /// Uncropped region inside the sheet image.
    pub source: Rect,
    /// `None` when the sheet carries no crop information.
    pub crop: Option<Crop>,
    pub guides: Vec<Guide>,
}

impl Sprite {
    /// Crop that applies when exporting: the sprite's own crop if `use_crop` is on, else none.
    pub fn effective_crop(&self, use_crop: bool) -> Crop {
        if use_crop {
            self.crop.unwrap_or_default()
        } else {
            Crop::default()
        }
    }

    /// Region of the sheet image that ends up on the page.
    pub fn cropped_source(&self, use_crop: bool) -> Rect {
        let c = self.effective_crop(use_crop);
        Rect::new(
            self.source.x + c.left,
            self.source.y + c.top,
            self.source.w.saturating_sub(c.left + c.right),
            self.source.h.saturating_sub(c.top + c.bottom),
        )
    }
}

/// One request per sprite; the payload is the sprite's index in `sprites`.
pub fn sprite_requests(sprites: &[Sprite], use_crop: bool) -> Vec<Request<usize>> {
    sprites
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let r = s.cropped_source(use_crop);
            Request::new(r.w, r.h, i).with_label(s.name.clone())
        })
        .collect()
}
