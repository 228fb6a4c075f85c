//! `.sprsheet` sprite sheet files.
//!
//! ```text
//! <sprite-sheet src="hero.png">
//!   <sprite name="Idle" x="0" y="0" width="32" height="48"
//!           crop-left="2" crop-right="3" crop-top="0" crop-bottom="1">
//!     <pivot x="16" y="46"/>
//!   </sprite>
//! </sprite-sheet>
//! ```
//!
//! `src` is relative to the sheet file. Crop attributes are optional but come as a set of four.
//! Every child element of a sprite becomes a [`Guide`].

use crate::error::{Result, SpritePackerError};
use crate::model::Rect;
use crate::sprite::{Crop, Guide, Sprite};
use roxmltree::Node;
use std::path::{Component, Path};

/// Contents of one sheet file.
#[derive(Debug, Clone)]
pub struct ParsedSheet {
    /// Image path as written in the file.
    pub src: String,
    pub sprites: Vec<Sprite>,
}

/// Name prefix for sprites of a sheet at `relative_path` (relative to the input root):
/// `prefix`, then the sheet's folder with `/` separators when `use_folders` is on.
pub fn sprite_name_prefix(prefix: &str, relative_path: &Path, use_folders: bool) -> String {
    let mut out = prefix.to_string();
    if use_folders {
        if let Some(parent) = relative_path.parent() {
            for c in parent.components() {
                if let Component::Normal(part) = c {
                    out.push_str(&part.to_string_lossy());
                    out.push('/');
                }
            }
        }
    }
    out
}

/// Parses a sheet. Sprites get `sheet` as their sheet index and `name_prefix + name` as their
/// name, lower-cased.
pub fn parse_sheet(xml: &str, sheet: usize, name_prefix: &str) -> Result<ParsedSheet> {
    let doc = roxmltree::Document::parse(xml)?;
    let root = doc
        .descendants()
        .find(|n| n.has_tag_name("sprite-sheet"))
        .ok_or_else(|| SpritePackerError::SheetFormat("missing <sprite-sheet> element".into()))?;
    let src = root
        .attribute("src")
        .ok_or_else(|| SpritePackerError::SheetFormat("<sprite-sheet> has no src".into()))?
        .to_string();

    let sprites = root
        .children()
        .filter(|n| n.has_tag_name("sprite"))
        .map(|n| parse_sprite(n, sheet, name_prefix))
        .collect::<Result<Vec<_>>>()?;
    Ok(ParsedSheet { src, sprites })
}

fn parse_sprite(node: Node, sheet: usize, name_prefix: &str) -> Result<Sprite> {
    let local = node
        .attribute("name")
        .ok_or_else(|| SpritePackerError::SheetFormat("<sprite> has no name".into()))?;
    let name = format!("{name_prefix}{local}").to_lowercase();

    let source = Rect::new(
        attr_u32(node, "x", &name)?,
        attr_u32(node, "y", &name)?,
        attr_u32(node, "width", &name)?,
        attr_u32(node, "height", &name)?,
    );

    let crop = if node.attribute("crop-left").is_some() {
        let crop = Crop {
            left: attr_u32(node, "crop-left", &name)?,
            right: attr_u32(node, "crop-right", &name)?,
            top: attr_u32(node, "crop-top", &name)?,
            bottom: attr_u32(node, "crop-bottom", &name)?,
        };
        if crop.left as u64 + crop.right as u64 > source.w as u64
            || crop.top as u64 + crop.bottom as u64 > source.h as u64
        {
            return Err(SpritePackerError::SheetFormat(format!(
                "sprite {name:?}: crop {crop:?} is larger than {}x{}",
                source.w, source.h
            )));
        }
        Some(crop)
    } else {
        None
    };

    let guides = node
        .children()
        .filter(|n| n.is_element())
        .map(|g| Guide {
            kind: g.tag_name().name().to_string(),
            attributes: g
                .attributes()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect(),
        })
        .collect();

    Ok(Sprite {
        name,
        sheet,
        source,
        crop,
        guides,
    })
}

fn attr_u32(node: Node, attr: &str, sprite: &str) -> Result<u32> {
    let raw = node.attribute(attr).ok_or_else(|| {
        SpritePackerError::SheetFormat(format!("sprite {sprite:?}: missing attribute {attr}"))
    })?;
    raw.trim().parse().map_err(|_| {
        SpritePackerError::SheetFormat(format!(
            "sprite {sprite:?}: attribute {attr}={raw:?} is not a non-negative integer"
        ))
    })
}
