use crate::model::Packing;
use crate::sprite::{Guide, Sprite};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Guide attributes written as JSON numbers (when they parse as one).
pub const NUMERIC_GUIDE_ATTRIBUTES: &[&str] = &[
    "x", "y", "x1", "y1", "x2", "y2", "x-min", "y-min", "x-max", "y-max", "value",
];

/// Manifest listing every exported sprite: `{ "sprites": [ ... ] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub sprites: Vec<ManifestSprite>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ManifestSprite {
    pub name: String,
    /// Page image the sprite lives on.
    pub src: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub crop_left: u32,
    pub crop_right: u32,
    pub crop_top: u32,
    pub crop_bottom: u32,
    pub guides: Vec<Map<String, Value>>,
}

impl Manifest {
    /// Appends one entry per placement on `page`. `src` names the page image.
    pub fn push_page(
        &mut self,
        src: &str,
        page: &Packing<usize>,
        sprites: &[Sprite],
        use_crop: bool,
    ) {
        for p in &page.placements {
            let sprite = &sprites[p.payload];
            let crop = sprite.effective_crop(use_crop);
            self.sprites.push(ManifestSprite {
                name: sprite.name.clone(),
                src: src.to_string(),
                x: p.x,
                y: p.y,
                width: p.w,
                height: p.h,
                crop_left: crop.left,
                crop_right: crop.right,
                crop_top: crop.top,
                crop_bottom: crop.bottom,
                guides: sprite.guides.iter().map(guide_to_json).collect(),
            });
        }
    }

    /// Pretty-printed with tab indentation.
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        let fmt = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
        self.serialize(&mut ser)?;
        // serde_json only ever writes UTF-8.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Guide attributes as a JSON object.
pub fn guide_to_json(guide: &Guide) -> Map<String, Value> {
    guide
        .attributes
        .iter()
        .map(|(name, value)| {
            let v = if NUMERIC_GUIDE_ATTRIBUTES.contains(&name.as_str()) {
                parse_number(value).unwrap_or_else(|| Value::String(value.clone()))
            } else {
                Value::String(value.clone())
            };
            (name.clone(), v)
        })
        .collect()
}

fn parse_number(s: &str) -> Option<Value> {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::Number(i.into()));
    }
    s.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}
