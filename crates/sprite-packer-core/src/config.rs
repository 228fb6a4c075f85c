use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a finished page is shrunk after it has been packed at the maximum size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SizeSearch {
    /// Keep every page at `max_width x max_height`.
    None,
    /// Smallest square side, any integer.
    Exact,
    /// Smallest square side that is a power of two.
    Pow2,
}

impl FromStr for SizeSearch {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(Self::None),
            "exact" => Ok(Self::Exact),
            "pow2" | "poweroftwo" => Ok(Self::Pow2),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackerConfig {
    /// Maximum page width in pixels.
    pub max_width: u32,
    /// Maximum page height in pixels.
    pub max_height: u32,
    /// Minimum gap in pixels reserved to the right of and below every sprite.
    pub margin: u32,
    #[serde(default = "default_size_search")]
    pub size_search: SizeSearch,
    /// Pack export groups in parallel when feature "parallel" is on.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            max_width: 2048,
            max_height: 2048,
            margin: 1,
            size_search: default_size_search(),
            parallel: false,
        }
    }
}

impl PackerConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if a page dimension is zero or the margin alone fills a page.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::SpritePackerError;

        if self.max_width == 0 || self.max_height == 0 {
            return Err(SpritePackerError::InvalidDimensions {
                width: self.max_width,
                height: self.max_height,
            });
        }
        if self.margin >= self.max_width || self.margin >= self.max_height {
            return Err(SpritePackerError::InvalidConfig(format!(
                "margin ({}) leaves no usable space in a {}x{} page",
                self.margin, self.max_width, self.max_height
            )));
        }
        Ok(())
    }
}

fn default_size_search() -> SizeSearch {
    SizeSearch::Pow2
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    pub fn with_max_dimensions(mut self, w: u32, h: u32) -> Self {
        self.cfg.max_width = w;
        self.cfg.max_height = h;
        self
    }
    /// Square pages of side `size`.
    pub fn max_size(self, size: u32) -> Self {
        self.with_max_dimensions(size, size)
    }
    pub fn margin(mut self, v: u32) -> Self {
        self.cfg.margin = v;
        self
    }
    pub fn size_search(mut self, v: SizeSearch) -> Self {
        self.cfg.size_search = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}

impl PackerConfig {
    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}
