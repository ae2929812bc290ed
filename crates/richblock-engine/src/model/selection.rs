use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::Path;

/// A caret position: a text run path plus a character offset into that run
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: impl Into<Path>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.offset)
    }
}

/// Anchor/focus pair. The anchor is where the selection started, the focus is
/// where the caret currently is; either may come first in document order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// True if the focus comes before the anchor
    pub fn is_backward(&self) -> bool {
        self.focus < self.anchor
    }

    /// The (start, end) points in document order
    pub fn ordered(&self) -> (&Point, &Point) {
        if self.is_backward() {
            (&self.focus, &self.anchor)
        } else {
            (&self.anchor, &self.focus)
        }
    }

    pub fn start(&self) -> &Point {
        self.ordered().0
    }

    pub fn end(&self) -> &Point {
        self.ordered().1
    }

    /// Build a selection from ordered points, keeping this selection's direction
    pub(crate) fn with_range(&self, start: Point, end: Point) -> Selection {
        if self.is_backward() {
            Selection::new(end, start)
        } else {
            Selection::new(start, end)
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_collapsed() {
            write!(f, "{}", self.focus)
        } else {
            write!(f, "{}..{}", self.anchor, self.focus)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapsed() {
        let selection = Selection::collapsed(Point::new([1, 0], 0));
        assert!(selection.is_collapsed());
        assert!(!selection.is_backward());
    }

    #[test]
    fn test_ordered_handles_backward_selection() {
        let later = Point::new([1, 0], 2);
        let earlier = Point::new([0, 0], 4);
        let selection = Selection::new(later.clone(), earlier.clone());

        assert!(selection.is_backward());
        assert_eq!(selection.start(), &earlier);
        assert_eq!(selection.end(), &later);
    }

    #[test]
    fn test_points_in_same_run_order_by_offset() {
        assert!(Point::new([0, 1], 3) < Point::new([0, 1], 4));
        assert!(Point::new([0, 1], 9) < Point::new([0, 2], 0));
    }

    #[test]
    fn test_with_range_keeps_direction() {
        let selection = Selection::new(Point::new([0, 0], 5), Point::new([0, 0], 1));
        let remapped = selection.with_range(Point::new([0, 1], 0), Point::new([0, 1], 4));
        assert_eq!(remapped.anchor, Point::new([0, 1], 4));
        assert_eq!(remapped.focus, Point::new([0, 1], 0));
    }

    #[test]
    fn test_display() {
        let selection = Selection::new(Point::new([0, 0], 1), Point::new([1, 0], 2));
        assert_eq!(selection.to_string(), "[0,0]:1..[1,0]:2");
        assert_eq!(Selection::collapsed(Point::new([1, 0], 0)).to_string(), "[1,0]:0");
    }
}
