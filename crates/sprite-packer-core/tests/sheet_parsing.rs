use sprite_packer_core::prelude::*;
use sprite_packer_core::sheet::{parse_sheet, sprite_name_prefix};
use std::path::Path;

const HERO: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<sprite-sheet src="hero.png">
  <sprite name="Idle" x="0" y="0" width="32" height="48"
          crop-left="2" crop-right="3" crop-top="0" crop-bottom="1">
    <pivot x="16" y="46"/>
    <hitbox x-min="4" y-min="2" x-max="28" y-max="47" tag="body"/>
  </sprite>
  <!-- comments and text are ignored -->
  <sprite name="Run" x="32" y="0" width="30" height="48"/>
</sprite-sheet>
"#;

#[test]
fn reads_sprites_crops_and_guides() {
    let sheet = parse_sheet(HERO, 3, "game/chars/").expect("parse");
    assert_eq!(sheet.src, "hero.png");
    assert_eq!(sheet.sprites.len(), 2);

    let idle = &sheet.sprites[0];
    assert_eq!(idle.name, "game/chars/idle");
    assert_eq!(idle.sheet, 3);
    assert_eq!(idle.source, Rect::new(0, 0, 32, 48));
    assert_eq!(
        idle.crop,
        Some(Crop {
            left: 2,
            right: 3,
            top: 0,
            bottom: 1
        })
    );
    assert_eq!(idle.cropped_source(true), Rect::new(2, 0, 27, 47));
    assert_eq!(idle.cropped_source(false), Rect::new(0, 0, 32, 48));

    let kinds: Vec<&str> = idle.guides.iter().map(|g| g.kind.as_str()).collect();
    assert_eq!(kinds, vec!["pivot", "hitbox"]);
    let hitbox: Vec<(&str, &str)> = idle.guides[1]
        .attributes
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(
        hitbox,
        vec![("x-min", "4"), ("y-min", "2"), ("x-max", "28"), ("y-max", "47"), ("tag", "body")]
    );

    let run = &sheet.sprites[1];
    assert_eq!(run.name, "game/chars/run");
    assert_eq!(run.crop, None);
    assert!(run.guides.is_empty());
}

#[test]
fn name_prefix_follows_folders() {
    let rel = Path::new("chars").join("heroes").join("hero.sprsheet");
    assert_eq!(sprite_name_prefix("ui_", &rel, true), "ui_chars/heroes/");
    assert_eq!(sprite_name_prefix("ui_", &rel, false), "ui_");
    assert_eq!(sprite_name_prefix("", Path::new("top.sprsheet"), true), "");

    let sheet = parse_sheet(
        r#"<sprite-sheet src="a.png"><sprite name="Big" x="0" y="0" width="1" height="1"/></sprite-sheet>"#,
        0,
        "UI/",
    )
    .expect("parse");
    assert_eq!(sheet.sprites[0].name, "ui/big");
}

#[test]
fn malformed_sheets_are_rejected() {
    let cases = [
        "<sprite-sheet><sprite name=\"a\" x=\"0\" y=\"0\" width=\"1\" height=\"1\"/></sprite-sheet>",
        "<atlas src=\"a.png\"/>",
        "<sprite-sheet src=\"a.png\"><sprite x=\"0\" y=\"0\" width=\"1\" height=\"1\"/></sprite-sheet>",
        "<sprite-sheet src=\"a.png\"><sprite name=\"a\" x=\"-1\" y=\"0\" width=\"1\" height=\"1\"/></sprite-sheet>",
        "<sprite-sheet src=\"a.png\"><sprite name=\"a\" x=\"0\" y=\"0\" height=\"1\"/></sprite-sheet>",
        "<sprite-sheet src=\"a.png\"><sprite name=\"a\" x=\"0\" y=\"0\" width=\"4\" height=\"4\" crop-left=\"1\"/></sprite-sheet>",
        "<sprite-sheet src=\"a.png\"><sprite name=\"a\" x=\"0\" y=\"0\" width=\"4\" height=\"4\" crop-left=\"3\" crop-right=\"2\" crop-top=\"0\" crop-bottom=\"0\"/></sprite-sheet>",
    ];
    for xml in cases {
        assert!(
            matches!(parse_sheet(xml, 0, ""), Err(SpritePackerError::SheetFormat(_))),
            "accepted {xml}"
        );
    }
    assert!(matches!(
        parse_sheet("<sprite-sheet src=", 0, ""),
        Err(SpritePackerError::SheetXml(_))
    ));
}

#[test]
fn parsed_sheet_feeds_the_packer() {
    let sheet = parse_sheet(HERO, 0, "").expect("parse");
    let requests = sprite_requests(&sheet.sprites, true);
    let sizes: Vec<(u32, u32, Option<&str>)> = requests
        .iter()
        .map(|r| (r.w, r.h, r.label.as_deref()))
        .collect();
    assert_eq!(sizes, vec![(27, 47, Some("idle")), (30, 48, Some("run"))]);

    let cfg = PackerConfig::builder().max_size(128).margin(1).build();
    let pages = pack_pages(requests, &cfg).expect("pack");
    assert_eq!(pages.len(), 1);
    assert_eq!((pages[0].width, pages[0].height), (64, 64));
}
