use crate::mapping::{Mapping, Position};
use crate::mappings::Mappings;
use std::cell::Cell;
use std::cmp::Ordering;

/// Finds the index of the greatest mapping whose generated position is at or
/// before `pos`, or `None` when `pos` precedes every mapping.
pub(crate) fn find_le(mappings: &[Mapping], pos: Position) -> Option<usize> {
    let idx = mappings.partition_point(|m| m.generated() <= pos);
    idx.checked_sub(1)
}

// Column distance on the same line under which the finder scans linearly
// instead of re-running the binary search.
const LINEAR_SCAN_SPAN: u32 = 32;

/// `MappingFinder` is a stateful helper for resolving many generated
/// positions against the same map.
///
/// It remembers where the previous query landed: when a consumer walks a
/// minified file in small increments (the common debugger pattern), the next
/// hit is usually a handful of entries away, and a short linear scan beats
/// restarting the binary search. Queries far from the previous hit fall back
/// to a binary search over the half of the map they can land in.
#[derive(Debug)]
pub struct MappingFinder<'a> {
    mappings: &'a Mappings,
    // generated position and index of the previous hit
    state: Cell<Option<(Position, usize)>>,
}

impl<'a> MappingFinder<'a> {
    pub(crate) fn new(mappings: &'a Mappings) -> Self {
        Self {
            mappings,
            state: Cell::new(None),
        }
    }

    /// Finds the mapping for a given generated position.
    ///
    /// If an exact match is not found, this method returns the closest
    /// preceding mapping. If there are no preceding mappings, it returns
    /// `None`.
    pub fn find_entry<P>(&self, pos: P) -> Option<Mapping>
    where
        P: Into<Position>,
    {
        let pos = pos.into();
        let idx = match self.state.get() {
            None => find_le(self.mappings, pos),
            Some((last_pos, last_idx)) => {
                let near = pos.line == last_pos.line
                    && pos.column.abs_diff(last_pos.column) <= LINEAR_SCAN_SPAN;
                match pos.cmp(&last_pos) {
                    Ordering::Equal => Some(last_idx),
                    Ordering::Greater if near => Some(self.scan_forward(pos, last_idx)),
                    // the hit cannot precede the previous one
                    Ordering::Greater => {
                        find_le(&self.mappings[last_idx..], pos).map(|idx| last_idx + idx)
                    }
                    Ordering::Less if near => self.scan_backward(pos, last_idx),
                    Ordering::Less => find_le(&self.mappings[..last_idx], pos),
                }
            }
        }?;
        self.state.set(Some((self.mappings[idx].generated(), idx)));
        Some(self.mappings[idx])
    }

    fn scan_forward(&self, pos: Position, from: usize) -> usize {
        let mut idx = from;
        while let Some(next) = self.mappings.get(idx + 1) {
            if next.generated() > pos {
                break;
            }
            idx += 1;
        }
        idx
    }

    fn scan_backward(&self, pos: Position, from: usize) -> Option<usize> {
        let mut idx = from;
        loop {
            if self.mappings[idx].generated() <= pos {
                return Some(idx);
            }
            idx = idx.checked_sub(1)?;
        }
    }
}
