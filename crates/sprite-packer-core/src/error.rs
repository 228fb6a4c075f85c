use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpritePackerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(
        "Sprite {label:?} ({width}x{height} with margin) can never fit a {max_width}x{max_height} page"
    )]
    InfeasibleRequest {
        label: Option<String>,
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },
    #[error("Packing made no progress: {placed} placed, {remaining} left in the backlog")]
    NoProgress { placed: usize, remaining: usize },
    #[error("Sheet XML error: {0}")]
    SheetXml(#[from] roxmltree::Error),
    #[error("Invalid sprite sheet: {0}")]
    SheetFormat(String),
    #[error("Sprite {name:?} lies outside its sheet image")]
    SpriteOutOfBounds { name: String },
    #[error("Group file syntax error at byte {offset}: {message}")]
    GroupSyntax { offset: usize, message: String },
    #[error("Invalid group pattern {pattern:?}: {source}")]
    GroupPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("Nothing to pack")]
    Empty,
}

pub type Result<T> = std::result::Result<T, SpritePackerError>;
