//! The edit log that lets positions move between document versions.
//!
//! Every edit is recorded as one xi-rope [`Delta`]; the delta at index `v`
//! turns version `v` into version `v + 1`. Mapping a position forward runs
//! it through xi-rope's [`Transformer`]; mapping it backward walks the
//! delta elements in reverse.

use shaderscope_syntax::{Span, TrackingMode};
use xi_rope::delta::{DeltaElement, Transformer};
use xi_rope::{Delta, RopeInfo};

#[derive(Debug, Default)]
pub struct EditHistory {
    deltas: Vec<Delta<RopeInfo>>,
}

impl EditHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The newest version the history can map to.
    pub fn latest_version(&self) -> u64 {
        self.deltas.len() as u64
    }

    /// Records the edit that produced the next version and returns it.
    pub fn push(&mut self, delta: Delta<RopeInfo>) -> u64 {
        self.deltas.push(delta);
        self.latest_version()
    }

    /// The delta that turned `version - 1` into `version`.
    pub fn delta_to(&self, version: u64) -> Option<&Delta<RopeInfo>> {
        let index = usize::try_from(version.checked_sub(1)?).ok()?;
        self.deltas.get(index)
    }

    /// Byte ranges (in the newer text) that `version`'s edit inserted.
    pub fn changed_spans(&self, version: u64) -> Vec<Span> {
        let Some(delta) = self.delta_to(version) else {
            return Vec::new();
        };
        let mut changed = Vec::new();
        let mut cursor = 0;
        for op in delta.els.iter() {
            match op {
                DeltaElement::Copy(from, to) => cursor += to - from,
                DeltaElement::Insert(inserted) => {
                    changed.push(Span::from_len(cursor, inserted.len()));
                    cursor += inserted.len();
                }
            }
        }
        changed
    }

    /// Maps `position` from version `from` to version `to`. Returns `None`
    /// when either version is unknown to this history.
    pub fn map(&self, from: u64, to: u64, position: usize, mode: TrackingMode) -> Option<usize> {
        let latest = self.latest_version();
        if from > latest || to > latest {
            return None;
        }
        let after = mode.moves_with_insert();
        let (low, high) = (from.min(to) as usize, from.max(to) as usize);
        let deltas = &self.deltas[low..high];
        let position = if from <= to {
            deltas.iter().fold(position, |pos, delta| {
                let pos = pos.min(delta.base_len);
                Transformer::new(delta).transform(pos, after)
            })
        } else {
            deltas
                .iter()
                .rev()
                .fold(position, |pos, delta| untransform(delta, pos, after))
        };
        Some(position)
    }
}

/// Maps a position in the text a delta produces back to the text it was
/// applied to. Positions inside inserted text collapse onto the insertion
/// point: its far side when `after` is set, its near side otherwise.
fn untransform(delta: &Delta<RopeInfo>, position: usize, after: bool) -> usize {
    let mut new_offset = 0;
    let mut old_offset = 0;
    let mut inserted_at: Option<usize> = None;
    for op in delta.els.iter() {
        match *op {
            DeltaElement::Copy(from, to) => {
                if let Some(near) = inserted_at {
                    return if after { from } else { near };
                }
                let len = to - from;
                let end = new_offset + len;
                if position < end || (position == end && !after) {
                    return from + position.saturating_sub(new_offset);
                }
                new_offset = end;
                old_offset = to;
            }
            DeltaElement::Insert(ref text) => {
                let end = new_offset + text.len();
                if inserted_at.is_none() && position < end {
                    inserted_at = Some(old_offset);
                }
                new_offset = end;
            }
        }
    }
    match inserted_at {
        Some(_) if after => delta.base_len,
        Some(near) => near,
        None => old_offset,
    }
}
