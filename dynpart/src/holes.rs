use crate::helpe::*;

/// A free, contiguous chunk of the address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hole {
    pub start:  MemUnits,
    pub size:   MemUnits,
}

impl Hole {
    pub fn new(start: MemUnits, size: MemUnits) -> Self {
        Self { start, size }
    }

    #[inline(always)]
    pub fn end(&self) -> MemUnits {
        self.start + self.size
    }

    /// Returns `true` if `next` begins exactly where `self` ends.
    #[inline(always)]
    pub fn touches(&self, next: &Self) -> bool {
        self.end() == next.start
    }

    #[inline(always)]
    pub fn overlaps(&self, start: MemUnits, end: MemUnits) -> bool {
        self.start < end && start < self.end()
    }
}

/// The address space `[0, total)`, as seen by the allocator.
///
/// Free memory is described in two ways. Released regions are kept
/// as explicit [Hole]s. Memory that nobody has touched yet is *not*
/// a hole: it is the tail above the highest allocated region, which
/// the caller computes on demand (see [`Memory::place`]).
#[derive(Debug, Clone)]
pub struct Memory {
    total:  MemUnits,
    used:   MemUnits,
    holes:  Vec<Hole>,
}

impl Memory {
    pub fn new(total: MemUnits) -> Self {
        Self {
            total,
            used:   0,
            holes:  vec![],
        }
    }

    pub fn total(&self) -> MemUnits {
        self.total
    }

    pub fn used(&self) -> MemUnits {
        self.used
    }

    pub fn free(&self) -> MemUnits {
        self.total - self.used
    }

    pub fn holes(&self) -> &[Hole] {
        &self.holes
    }

    pub fn hole_space(&self) -> MemUnits {
        self.holes.iter().map(|h| h.size).sum()
    }

    /// First-fit with tail fallback. Returns the start address of
    /// the newly reserved `size` units, or `None` if nothing fits.
    ///
    /// Holes are scanned in stored order and the first one that is
    /// large enough gets consumed from its low end. Only if no hole
    /// fits is `tail` invoked: it must return the lowest address above
    /// every allocated region.
    pub fn place<F>(&mut self, size: MemUnits, tail: F) -> Option<MemUnits>
    where F: FnOnce() -> MemUnits {
        if let Some(idx) = self.holes.iter().position(|h| h.size >= size) {
            let Hole { start, size: room } = self.holes[idx];
            if room == size {
                self.holes.remove(idx);
            } else {
                let h = &mut self.holes[idx];
                h.start += size;
                h.size -= size;
            }
            self.used += size;
            debug!("Placed {} units in hole at {} ({} units wide).", size, start, room);

            return Some(start);
        }

        if self.free() < size {
            return None;
        }
        let candidate = tail();
        if candidate + size <= self.total {
            // Holes lying above every allocated region are part of
            // the tail. Whatever we just claimed stops being free.
            self.carve(candidate, candidate + size);
            self.used += size;
            debug!("Placed {} units at tail address {}.", size, candidate);

            Some(candidate)
        } else {
            None
        }
    }

    /// Hands `[start, start + size)` back and restores the
    /// no-adjacent-holes invariant.
    pub fn release(&mut self, start: MemUnits, size: MemUnits) {
        debug_assert!(self.used >= size, "Released more than was used!");
        debug_assert!(
            self.holes.iter().all(|h| !h.overlaps(start, start + size)),
            "Released region overlaps a hole!"
        );
        self.holes.push(Hole::new(start, size));
        self.used -= size;
        self.coalesce();
    }

    /// Sorts holes by address and merges every run of touching
    /// holes into one. Running it twice is the same as running it once.
    pub fn coalesce(&mut self) {
        let before = self.holes.len();
        self.holes = std::mem::take(&mut self.holes)
            .into_iter()
            .sorted_unstable_by_key(|h| h.start)
            .coalesce(|prev, next| {
                if prev.touches(&next) {
                    Ok(Hole::new(prev.start, prev.size + next.size))
                } else {
                    Err((prev, next))
                }
            })
            .collect();
        trace!("Coalesced {} holes into {}.", before, self.holes.len());
    }

    /// Returns `true` if holes are sorted, non-empty, and
    /// neither overlap nor touch each other.
    pub fn in_normal_form(&self) -> bool {
        self.holes.iter().all(|h| h.size > 0) &&
        self.holes
            .iter()
            .tuple_windows()
            .all(|(a, b)| a.end() < b.start)
    }

    /// Removes `[start, end)` from the hole set, trimming
    /// or splitting whatever intersects it.
    fn carve(&mut self, start: MemUnits, end: MemUnits) {
        if self.holes.iter().all(|h| !h.overlaps(start, end)) {
            return;
        }
        debug!("Tail placement [{}, {}) claims stale holes.", start, end);
        self.holes = std::mem::take(&mut self.holes)
            .into_iter()
            .flat_map(|h| {
                if !h.overlaps(start, end) {
                    return vec![h];
                }
                let mut rest = vec![];
                if h.start < start {
                    rest.push(Hole::new(h.start, start - h.start));
                }
                if h.end() > end {
                    rest.push(Hole::new(end, h.end() - end));
                }

                rest
            })
            .collect();
    }
}
