//! Core library for packing sprites into atlas pages.
//!
//! - Algorithm: an occupation grid of cut lines (`packer::grid`), filled largest-area first
//! - Paging: `pack_pages` drains any number of sprites onto pages and optionally shrinks each one
//! - Plumbing: `.sprsheet` parsing, crop detection, export groups, compositing with color
//!   bleeding, JSON manifest
//!
//! Quick example:
//! ```
//! use sprite_packer_core::prelude::*;
//! # fn main() -> sprite_packer_core::Result<()> {
//! let requests = vec![
//!     Request::new(64, 32, "a").with_label("a"),
//!     Request::new(40, 80, "b").with_label("b"),
//! ];
//! let cfg = PackerConfig::builder().max_size(256).margin(1).build();
//! let pages = pack_pages(requests, &cfg)?;
//! assert_eq!(pages.len(), 1);
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod crop;
pub mod error;
pub mod export;
pub mod groups;
pub mod model;
pub mod packer;
pub mod paging;
pub mod sheet;
pub mod sprite;

pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use paging::*;

/// Convenience prelude for common types and functions.
/// Importing `sprite_packer_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{PackerConfig, PackerConfigBuilder, SizeSearch};
    pub use crate::error::SpritePackerError;
    pub use crate::groups::{ExportGroups, pack_groups};
    pub use crate::model::{PackAttempt, PackStats, Packing, Placement, Rect, Request};
    pub use crate::packer::{
        GridPacker, OccupationGrid, Packer, pack_all, pack_as_many_as_possible,
    };
    pub use crate::paging::{minimize_page, pack_pages};
    pub use crate::sprite::{Crop, Guide, Sprite, sprite_requests};
}
