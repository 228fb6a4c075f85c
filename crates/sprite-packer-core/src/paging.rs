use crate::config::{PackerConfig, SizeSearch};
use crate::error::{Result, SpritePackerError};
use crate::model::{PackAttempt, Packing, Request};
use crate::packer::{GridPacker, Packer, pack_all, pack_as_many_as_possible};
use tracing::{debug, instrument};

/// Drains `requests` onto as many pages as needed.
///
/// Every page is packed at `max_width x max_height` first; leftovers roll over to the next page.
/// When `size_search` is enabled, each page is then shrunk to the smallest square that still
/// holds the same sprites.
///
/// Errors:
/// - `Empty` when there is nothing to pack.
/// - `InfeasibleRequest` when a request (with margin) is larger than a page.
/// - `NoProgress` when a page ends up empty while requests remain.
#[instrument(skip_all, fields(requests = requests.len()))]
pub fn pack_pages<T: Clone>(
    requests: Vec<Request<T>>,
    cfg: &PackerConfig,
) -> Result<Vec<Packing<T>>> {
    cfg.validate()?;
    if requests.is_empty() {
        return Err(SpritePackerError::Empty);
    }
    if let Some(r) = requests.iter().find(|r| !fits_empty_page(r, cfg)) {
        return Err(SpritePackerError::InfeasibleRequest {
            label: r.label.clone(),
            width: r.w,
            height: r.h,
            max_width: cfg.max_width,
            max_height: cfg.max_height,
        });
    }

    let total = requests.len();
    let mut backlog = requests;
    let mut pages: Vec<Packing<T>> = Vec::new();
    while !backlog.is_empty() {
        let remaining = backlog.len();
        let PackAttempt { packing, rejected } =
            pack_as_many_as_possible(cfg.margin, cfg.max_width, cfg.max_height, backlog);
        if packing.placements.is_empty() {
            return Err(SpritePackerError::NoProgress {
                placed: total - remaining,
                remaining,
            });
        }
        let page = minimize_page(
            packing,
            cfg.margin,
            cfg.max_width,
            cfg.max_height,
            cfg.size_search,
        );
        debug!(
            page = pages.len(),
            placed = page.placements.len(),
            width = page.width,
            height = page.height,
            remaining = rejected.len(),
            "page packed"
        );
        pages.push(page);
        backlog = rejected;
    }
    Ok(pages)
}

/// Whether `r` fits a fresh page under the packer's own inflation and zero-size rules.
fn fits_empty_page<T>(r: &Request<T>, cfg: &PackerConfig) -> bool {
    let packer = GridPacker::new(cfg.max_width, cfg.max_height, cfg.margin);
    <GridPacker as Packer<T>>::can_pack(&packer, r.w, r.h)
}

/// Shrinks a page packed at `max_width x max_height` to the smallest square side that still
/// takes every one of its placements.
///
/// Candidate sides run from 1 to `min(max_width, max_height)` (powers of two only for
/// [`SizeSearch::Pow2`]) and are binary searched with [`pack_all`]. The page keeps exactly the
/// same sprites; only their positions may change. If no square works the page is returned as is.
pub fn minimize_page<T: Clone>(
    page: Packing<T>,
    margin: u32,
    max_width: u32,
    max_height: u32,
    search: SizeSearch,
) -> Packing<T> {
    let limit = max_width.min(max_height);
    if page.placements.is_empty() || limit == 0 {
        return page;
    }
    let (count, side): (u32, fn(u32) -> u32) = match search {
        SizeSearch::None => return page,
        SizeSearch::Exact => (limit, |i| i + 1),
        SizeSearch::Pow2 => (u32::BITS - limit.leading_zeros(), |i| 1u32 << i),
    };

    let requests: Vec<Request<T>> = page
        .placements
        .iter()
        .map(|p| Request {
            w: p.w,
            h: p.h,
            payload: p.payload.clone(),
            label: p.label.clone(),
        })
        .collect();
    let try_side = |i: u32| {
        let s = side(i);
        pack_all(margin, s, s, &requests)
    };

    // `best` always holds the packing for index `hi`.
    let mut hi = count - 1;
    let Some(mut best) = try_side(hi) else {
        return page;
    };
    let mut lo = 0;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        match try_side(mid) {
            Some(p) => {
                hi = mid;
                best = p;
            }
            None => lo = mid + 1,
        }
    }
    best
}
