use crate::model::{PackAttempt, Packing, Placement, Request};

pub mod grid;

pub use grid::{GridSlot, OccupationGrid};

/// A packer places requests onto one page.
///
/// Implementations must ensure no overlaps and reserve the configured margin.
/// `pack` hands the request back if it cannot be placed on the current page.
pub trait Packer<T> {
    fn can_pack(&self, w: u32, h: u32) -> bool;
    fn pack(&mut self, request: Request<T>) -> Result<Placement<T>, Request<T>>;
}

/// Packs onto a single [`OccupationGrid`], growing every request by `margin` on its right and
/// bottom edges.
#[derive(Debug, Clone)]
pub struct GridPacker {
    grid: OccupationGrid,
    margin: u32,
}

impl GridPacker {
    pub fn new(width: u32, height: u32, margin: u32) -> Self {
        Self {
            grid: OccupationGrid::new(width, height),
            margin,
        }
    }

    pub fn grid(&self) -> &OccupationGrid {
        &self.grid
    }

    /// Reserved size of a `w x h` item: the item plus `margin` to its right and below.
    pub fn inflate(&self, w: u32, h: u32) -> (u32, u32) {
        (w.saturating_add(self.margin), h.saturating_add(self.margin))
    }

    /// Occupies room for a `w x h` item and returns its top-left corner.
    pub fn place(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        let (iw, ih) = self.inflate(w, h);
        self.grid.try_fit(iw, ih)
    }
}

impl<T> Packer<T> for GridPacker {
    fn can_pack(&self, w: u32, h: u32) -> bool {
        let (iw, ih) = self.inflate(w, h);
        self.grid.find(iw, ih).is_some()
    }

    fn pack(&mut self, request: Request<T>) -> Result<Placement<T>, Request<T>> {
        match self.place(request.w, request.h) {
            Some((x, y)) => Ok(Placement {
                x,
                y,
                w: request.w,
                h: request.h,
                payload: request.payload,
                label: request.label,
            }),
            None => Err(request),
        }
    }
}

/// Indices of `requests` ordered by area, largest first. Equal areas keep their input order.
pub fn area_order<T>(requests: &[Request<T>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..requests.len()).collect();
    order.sort_by(|&a, &b| requests[b].area().cmp(&requests[a].area()));
    order
}

/// Places as many requests as fit on one `max_width x max_height` page, largest area first.
///
/// Requests that do not fit come back in [`PackAttempt::rejected`]; the caller decides whether
/// to queue them for another page.
pub fn pack_as_many_as_possible<T>(
    margin: u32,
    max_width: u32,
    max_height: u32,
    requests: Vec<Request<T>>,
) -> PackAttempt<T> {
    let mut requests = requests;
    // Stable, so this is the order `area_order` gives.
    requests.sort_by(|a, b| b.area().cmp(&a.area()));
    let mut packer = GridPacker::new(max_width, max_height, margin);
    let mut placements = Vec::with_capacity(requests.len());
    let mut rejected = Vec::new();
    // Sizes that found no room. The grid only fills up, so anything at least as wide and at
    // least as tall cannot fit either.
    let mut failed: Vec<(u32, u32)> = Vec::new();
    for request in requests {
        let (w, h) = (request.w, request.h);
        if failed.iter().any(|&(fw, fh)| w >= fw && h >= fh) {
            rejected.push(request);
            continue;
        }
        match packer.pack(request) {
            Ok(p) => placements.push(p),
            Err(r) => {
                failed.retain(|&(fw, fh)| !(fw >= w && fh >= h));
                failed.push((w, h));
                rejected.push(r);
            }
        }
    }
    PackAttempt {
        packing: Packing {
            width: max_width,
            height: max_height,
            placements,
        },
        rejected,
    }
}

/// Places every request on one `max_width x max_height` page, or none at all.
///
/// Positions are resolved before any payload is cloned, so a failure leaves nothing behind.
pub fn pack_all<T: Clone>(
    margin: u32,
    max_width: u32,
    max_height: u32,
    requests: &[Request<T>],
) -> Option<Packing<T>> {
    let mut packer = GridPacker::new(max_width, max_height, margin);
    let reserved: u64 = requests
        .iter()
        .map(|r| {
            let (w, h) = packer.inflate(r.w, r.h);
            w as u64 * h as u64
        })
        .sum();
    if reserved > packer.grid().free_area() {
        return None;
    }
    let mut positions = Vec::with_capacity(requests.len());
    for idx in area_order(requests) {
        let r = &requests[idx];
        let (x, y) = packer.place(r.w, r.h)?;
        positions.push((idx, x, y));
    }
    let placements = positions
        .into_iter()
        .map(|(idx, x, y)| {
            let r = &requests[idx];
            Placement {
                x,
                y,
                w: r.w,
                h: r.h,
                payload: r.payload.clone(),
                label: r.label.clone(),
            }
        })
        .collect();
    Some(Packing {
        width: max_width,
        height: max_height,
        placements,
    })
}
