use serde::{Deserialize, Serialize};

use crate::FieldConfig;

/// Identifier of a pipe within one [`PipeStream`](crate::PipeStream).
///
/// Ids are assigned in spawn order starting from zero, so a smaller id always
/// belongs to a pipe further left.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub struct PipeId(pub u64);

impl PipeId {
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// An obstacle: a pair of blockers with an opening centered at `gap_y`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipe {
    id: PipeId,
    x: f32,
    gap_y: f32,
    passed: bool,
}

/// Axis-aligned rectangle, `[left, right) x [top, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    /// Returns `true` if the two rectangles share interior area.
    ///
    /// Rectangles that only touch along an edge do not overlap, and an empty
    /// rectangle never overlaps anything.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
            && !self.is_empty()
            && !other.is_empty()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }
}

impl Pipe {
    #[must_use]
    pub fn new(id: PipeId, x: f32, gap_y: f32) -> Self {
        Self {
            id,
            x,
            gap_y,
            passed: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> PipeId {
        self.id
    }

    /// Left edge of the pipe.
    #[must_use]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[must_use]
    pub fn gap_y(&self) -> f32 {
        self.gap_y
    }

    /// Right (trailing) edge of the pipe.
    #[must_use]
    pub fn trailing_x(&self, field: &FieldConfig) -> f32 {
        self.x + field.pipe_width
    }

    /// Shared "already scored" flag.
    ///
    /// Only consulted by [`ScoringMode::SharedFirstCrossing`](crate::ScoringMode).
    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    pub(crate) fn mark_passed(&mut self) {
        self.passed = true;
    }

    pub(crate) fn advance(&mut self, field: &FieldConfig) {
        self.x -= field.pipe_speed;
    }

    /// Returns `true` once the trailing edge has left the field on the left.
    #[must_use]
    pub fn is_off_screen(&self, field: &FieldConfig) -> bool {
        self.trailing_x(field) <= 0.0
    }

    /// Blocker spanning from the field top to the top of the gap.
    #[must_use]
    pub fn top_blocker(&self, field: &FieldConfig) -> Rect {
        Rect {
            left: self.x,
            top: 0.0,
            right: self.trailing_x(field),
            bottom: self.gap_y - field.pipe_gap / 2.0,
        }
    }

    /// Blocker spanning from the bottom of the gap to the field bottom.
    #[must_use]
    pub fn bottom_blocker(&self, field: &FieldConfig) -> Rect {
        Rect {
            left: self.x,
            top: self.gap_y + field.pipe_gap / 2.0,
            right: self.trailing_x(field),
            bottom: field.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blockers_surround_gap() {
        let field = FieldConfig::default();
        let pipe = Pipe::new(PipeId(0), 200.0, 300.0);

        let top = pipe.top_blocker(&field);
        assert_eq!(top.top, 0.0);
        assert_eq!(top.bottom, 225.0);
        assert_eq!(top.right - top.left, field.pipe_width);

        let bottom = pipe.bottom_blocker(&field);
        assert_eq!(bottom.top, 375.0);
        assert_eq!(bottom.bottom, field.height);
    }

    #[test]
    fn test_touching_rects_do_not_overlap() {
        let a = Rect {
            left: 0.0,
            top: 0.0,
            right: 10.0,
            bottom: 10.0,
        };
        let b = Rect {
            left: 10.0,
            top: 0.0,
            right: 20.0,
            bottom: 10.0,
        };
        assert!(!a.overlaps(&b));
        let c = Rect { left: 9.5, ..b };
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn test_off_screen_after_trailing_edge_leaves() {
        let field = FieldConfig::default();
        let mut pipe = Pipe::new(PipeId(3), -field.pipe_width + 3.0, 200.0);
        assert!(!pipe.is_off_screen(&field));
        pipe.advance(&field);
        assert!(pipe.is_off_screen(&field));
    }
}
