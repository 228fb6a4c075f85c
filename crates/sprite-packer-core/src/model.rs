use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn x2(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn y2(&self) -> u32 {
        self.y + self.h
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
    /// True when the two rectangles share at least one pixel.
    /// Zero-area rectangles never intersect anything.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.area() == 0 || other.area() == 0 {
            return false;
        }
        self.x < other.x2() && other.x < self.x2() && self.y < other.y2() && other.y < self.y2()
    }
    /// Returns true if `r` is fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.x2() <= self.x2() && r.y2() <= self.y2()
    }
}

/// A rectangle waiting to be placed. `payload` links it back to the caller's sprite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request<T> {
    pub w: u32,
    pub h: u32,
    pub payload: T,
    /// Human-readable name used in logs and errors.
    pub label: Option<String>,
}

impl<T> Request<T> {
    pub fn new(w: u32, h: u32, payload: T) -> Self {
        Self {
            w,
            h,
            payload,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    pub fn is_degenerate(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

/// A request resolved to a position on a page. `w,h` are the un-inflated size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement<T> {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub payload: T,
    pub label: Option<String>,
}

impl<T> Placement<T> {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

}

/// One packed canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Packing<T> {
    pub width: u32,
    pub height: u32,
    pub placements: Vec<Placement<T>>,
}

impl<T> Packing<T> {
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }
}

/// Result of a best-effort pass: what landed on the canvas and what did not.
#[derive(Debug, Clone)]
pub struct PackAttempt<T> {
    pub packing: Packing<T>,
    /// Requests that did not fit, in the order they were tried.
    pub rejected: Vec<Request<T>>,
}

/// Statistics about atlas packing efficiency.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PackStats {
    /// Total number of pages.
    pub num_pages: usize,
    /// Total number of placed sprites.
    pub num_sprites: usize,
    /// Sum of width * height over all pages.
    pub total_page_area: u64,
    /// Sum of width * height over all placements.
    pub used_area: u64,
    /// used_area / total_page_area (0.0 to 1.0).
    pub occupancy: f64,
    pub max_page_width: u32,
    pub max_page_height: u32,
}

impl PackStats {
    /// Computes statistics over a series of pages, possibly spanning several export groups.
    pub fn from_pages<'a, T: 'a>(pages: impl IntoIterator<Item = &'a Packing<T>>) -> Self {
        let mut stats = PackStats::default();
        for page in pages {
            stats.num_pages += 1;
            stats.total_page_area += page.width as u64 * page.height as u64;
            stats.max_page_width = stats.max_page_width.max(page.width);
            stats.max_page_height = stats.max_page_height.max(page.height);
            for p in &page.placements {
                stats.num_sprites += 1;
                stats.used_area += p.w as u64 * p.h as u64;
            }
        }
        stats.occupancy = if stats.total_page_area > 0 {
            stats.used_area as f64 / stats.total_page_area as f64
        } else {
            0.0
        };
        stats
    }

    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Pages: {}, Sprites: {}, Occupancy: {:.2}%, Total Area: {} px², Used Area: {} px²",
            self.num_pages,
            self.num_sprites,
            self.occupancy * 100.0,
            self.total_page_area,
            self.used_area,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.total_page_area.saturating_sub(self.used_area)
    }
}
