//! Merging a matching pass's hits into one covering box

use super::types::{BoundingBox, Point};
use crate::error::{LocatorError, LocatorResult};

/// Minimal axis-aligned box covering every input box.
///
/// Fails with [`LocatorError::EmptyMatchSet`] on an empty slice; callers check
/// for an empty match set first.
pub fn encapsulate(boxes: &[BoundingBox]) -> LocatorResult<BoundingBox> {
    let (first, rest) = boxes.split_first().ok_or(LocatorError::EmptyMatchSet)?;

    let (mut min_x, mut min_y) = (first.top_left().x, first.top_left().y);
    let (mut max_x, mut max_y) = (first.bottom_right().x, first.bottom_right().y);
    for b in rest {
        min_x = min_x.min(b.top_left().x);
        min_y = min_y.min(b.top_left().y);
        max_x = max_x.max(b.bottom_right().x);
        max_y = max_y.max(b.bottom_right().y);
    }

    BoundingBox::new(Point::new(min_x, min_y), Point::new(max_x, max_y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bx(x1: i32, y1: i32, x2: i32, y2: i32) -> BoundingBox {
        BoundingBox::new(Point::new(x1, y1), Point::new(x2, y2)).unwrap()
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(matches!(encapsulate(&[]), Err(LocatorError::EmptyMatchSet)));
    }

    #[test]
    fn test_singleton_is_identity() {
        let b = bx(3, 4, 10, 12);
        assert_eq!(encapsulate(&[b]).unwrap(), b);
    }

    #[test]
    fn test_covers_all_boxes_in_any_order() {
        let boxes = [bx(50, 10, 60, 20), bx(5, 30, 15, 40), bx(20, -5, 25, 0)];
        let expected = bx(5, -5, 60, 40);

        assert_eq!(encapsulate(&boxes).unwrap(), expected);

        let mut reversed = boxes;
        reversed.reverse();
        assert_eq!(encapsulate(&reversed).unwrap(), expected);

        let rotated = [boxes[1], boxes[2], boxes[0]];
        assert_eq!(encapsulate(&rotated).unwrap(), expected);
    }
}
