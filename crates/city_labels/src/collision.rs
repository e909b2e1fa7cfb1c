/// Axis-aligned box, in the same coordinate space as the point it is tested against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl TextBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Box spanning two arbitrary corners.
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            x0: a.0.min(b.0),
            y0: a.1.min(b.1),
            x1: a.0.max(b.0),
            y1: a.1.max(b.1),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// True when the point lies strictly inside; the edges do not count.
    pub fn contains_strict(&self, x: f64, y: f64) -> bool {
        self.x0 < x && x < self.x1 && self.y0 < y && y < self.y1
    }
}

/// Whether a marker at `(mx, my)` is hidden behind the text occupying `bbox`.
/// Both must already be in data coordinates.
pub fn marker_is_behind_text(bbox: &TextBox, mx: f64, my: f64) -> bool {
    bbox.contains_strict(mx, my)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inside() {
        let b = TextBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(marker_is_behind_text(&b, 5.0, 5.0));
    }

    #[test]
    fn test_boundary_is_exclusive() {
        let b = TextBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(!marker_is_behind_text(&b, 10.0, 5.0));
        assert!(!marker_is_behind_text(&b, 0.0, 5.0));
        assert!(!marker_is_behind_text(&b, 5.0, 10.0));
        assert!(!marker_is_behind_text(&b, 5.0, 0.0));
    }

    #[test]
    fn test_outside() {
        let b = TextBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(!marker_is_behind_text(&b, -1.0, -1.0));
        assert!(!marker_is_behind_text(&b, 5.0, 11.0));
    }

    #[test]
    fn test_inverted_bounds_never_contain() {
        // Bounds are not reordered; a reversed box encloses nothing
        let b = TextBox::new(10.0, 10.0, 0.0, 0.0);
        assert!(!marker_is_behind_text(&b, 5.0, 5.0));
    }

    #[test]
    fn test_zero_width_box_never_contains() {
        let b = TextBox::new(3.0, 0.0, 3.0, 10.0);
        assert!(!marker_is_behind_text(&b, 3.0, 5.0));
    }

    #[test]
    fn test_from_corners_normalises() {
        let b = TextBox::from_corners((10.0, -2.0), (4.0, 8.0));
        assert_eq!(b, TextBox::new(4.0, -2.0, 10.0, 8.0));
        assert_eq!(b.width(), 6.0);
        assert_eq!(b.height(), 10.0);
    }
}
