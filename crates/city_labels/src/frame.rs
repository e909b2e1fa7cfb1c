//! Figure geometry of one map: figure size in points, the axes rectangle
//! inside it, and the transforms between data (lon/lat), axes-fraction and
//! pixel (point) space. Pixel space has y growing downwards, data space has
//! latitude growing upwards.

use crate::{
    collision::TextBox,
    constants::{
        AXES_BOTTOM, AXES_LEFT, AXES_RIGHT, AXES_TOP, FONT_ASCENT, FONT_DESCENT, MM_PER_INCH,
        POINTS_PER_INCH, WORLD_BOUNDS,
    },
    width::estimate_text_points,
};

pub fn mm_to_pt(mm: f64) -> f64 {
    mm / MM_PER_INCH * POINTS_PER_INCH
}

/// Data-space extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn world() -> Self {
        let (min_x, min_y, max_x, max_y) = WORLD_BOUNDS;
        Self::new(min_x, min_y, max_x, max_y)
    }

    /// Smallest extent covering every point, or `None` for no points.
    pub fn covering<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        points.into_iter().fold(None, |acc, (x, y)| {
            Some(match acc {
                None => Self::new(x, y, x, y),
                Some(b) => Self::new(
                    b.min_x.min(x),
                    b.min_y.min(y),
                    b.max_x.max(x),
                    b.max_y.max(y),
                ),
            })
        })
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Grows a flat extent so that scaling never divides by zero.
    fn non_degenerate(self) -> Self {
        let (mut b, pad) = (self, 0.5);
        if b.width() <= 0.0 {
            b.min_x -= pad;
            b.max_x += pad;
        }
        if b.height() <= 0.0 {
            b.min_y -= pad;
            b.max_y += pad;
        }
        b
    }
}

/// Axes rectangle in pixel space (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub width_pt: f64,
    pub height_pt: f64,
    pub axes: PixelRect,
    pub data: Bounds,
    /// Points per data unit, equal on both axes
    pub scale: f64,
}

impl Frame {
    /// Fits `data` into the subplot area of a `width_mm` x `height_mm` figure
    /// with equal aspect, centred.
    pub fn new(width_mm: f64, height_mm: f64, data: Bounds) -> Self {
        let data = data.non_degenerate();
        let width_pt = mm_to_pt(width_mm);
        let height_pt = mm_to_pt(height_mm);

        let avail_x = AXES_LEFT * width_pt;
        let avail_w = (AXES_RIGHT - AXES_LEFT) * width_pt;
        let avail_y = (1.0 - AXES_TOP) * height_pt;
        let avail_h = (AXES_TOP - AXES_BOTTOM) * height_pt;

        let scale = (avail_w / data.width()).min(avail_h / data.height());
        let w = data.width() * scale;
        let h = data.height() * scale;

        Self {
            width_pt,
            height_pt,
            axes: PixelRect {
                x: avail_x + (avail_w - w) / 2.0,
                y: avail_y + (avail_h - h) / 2.0,
                w,
                h,
            },
            data,
            scale,
        }
    }

    pub fn data_to_px(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.axes.x + (x - self.data.min_x) * self.scale,
            self.axes.y + self.axes.h - (y - self.data.min_y) * self.scale,
        )
    }

    pub fn px_to_data(&self, px: f64, py: f64) -> (f64, f64) {
        (
            self.data.min_x + (px - self.axes.x) / self.scale,
            self.data.min_y + (self.axes.y + self.axes.h - py) / self.scale,
        )
    }

    /// Axes fraction to pixel; `(0, 0)` is the bottom-left corner of the axes.
    pub fn axes_to_px(&self, fx: f64, fy: f64) -> (f64, f64) {
        (
            self.axes.x + fx * self.axes.w,
            self.axes.y + self.axes.h - fy * self.axes.h,
        )
    }

    pub fn box_to_data(&self, px_box: &TextBox) -> TextBox {
        TextBox::from_corners(
            self.px_to_data(px_box.x0, px_box.y0),
            self.px_to_data(px_box.x1, px_box.y1),
        )
    }

    /// Pixel box of `text` drawn left-aligned on the baseline at `anchor`.
    pub fn text_box_px(&self, anchor: (f64, f64), text: &str, font_size: f64) -> TextBox {
        let (x, baseline) = anchor;
        TextBox::new(
            x,
            baseline - FONT_ASCENT * font_size,
            x + estimate_text_points(text, font_size),
            baseline + FONT_DESCENT * font_size,
        )
    }
}
