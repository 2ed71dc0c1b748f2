//! Backend-free description of a composed report.
//!
//! The layout stage produces a [`ReportLayout`]: a list of pages, each holding the
//! drawing operations in paint order.  Every coordinate is in millimetres measured
//! from the top-left corner of the page, which keeps the geometry easy to reason
//! about and to test without a PDF backend.  The renderer in [`crate::render`]
//! flips the vertical axis when it hands the operations to `printpdf`.

use std::f64::consts::FRAC_PI_2;

/// An opaque sRGB colour with 8-bit channels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Shorthand for a neutral grey.
    pub const fn gray(level: u8) -> Self {
        Self::new(level, level, level)
    }

    /// Composites this colour at `opacity` over an opaque `backdrop`.
    ///
    /// Translucent fills are only ever drawn over surfaces of a known colour, so
    /// the result is baked into an opaque colour instead of a PDF graphics state.
    pub fn blend_over(self, backdrop: Rgb, opacity: f64) -> Rgb {
        let alpha = opacity.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| -> u8 {
            let value = f64::from(bg) + (f64::from(fg) - f64::from(bg)) * alpha;
            value.round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(
            mix(self.r, backdrop.r),
            mix(self.g, backdrop.g),
            mix(self.b, backdrop.b),
        )
    }

    /// Channels scaled to the `0.0..=1.0` range.
    pub fn to_unit(self) -> (f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }
}

/// A position on the page in millimetres.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height in millimetres.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle anchored at its top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Grows the rectangle by `amount` on every side.
    pub fn inflate(&self, amount: f64) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + 2.0 * amount,
            self.height + 2.0 * amount,
        )
    }

    /// Corner points in clockwise order starting at the top-left corner.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ]
    }

    /// Approximates a rounded rectangle with a closed polygon.
    ///
    /// Each corner is replaced by an arc of `segments` straight pieces.  The radius
    /// is clamped to half of the shorter side.
    pub fn rounded_outline(&self, radius: f64, segments: usize) -> Vec<Point> {
        let radius = radius.max(0.0).min(self.width / 2.0).min(self.height / 2.0);
        if radius <= f64::EPSILON || segments == 0 {
            return self.corners().to_vec();
        }

        // Arc centres and start angles, clockwise in a y-down coordinate system.
        let arcs = [
            (Point::new(self.right() - radius, self.y + radius), -FRAC_PI_2),
            (Point::new(self.right() - radius, self.bottom() - radius), 0.0),
            (Point::new(self.x + radius, self.bottom() - radius), FRAC_PI_2),
            (Point::new(self.x + radius, self.y + radius), 2.0 * FRAC_PI_2),
        ];

        let mut points = Vec::with_capacity(4 * (segments + 1));
        for (center, start) in arcs {
            for step in 0..=segments {
                let angle = start + FRAC_PI_2 * (step as f64) / (segments as f64);
                points.push(Point::new(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                ));
            }
        }
        points
    }
}

/// Horizontal alignment of a text run relative to its anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    /// The anchor is the left edge of the text.
    #[default]
    Left,
    /// The anchor is the horizontal centre of the text.
    Center,
    /// The anchor is the right edge of the text.
    Right,
}

/// Weight of the built-in Helvetica face used for a text run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// How a text run combines with what is already painted beneath it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Blend {
    #[default]
    Normal,
    /// Darkens the backdrop instead of covering it; a light colour over an image
    /// leaves the image visible.
    Multiply,
}

/// A single run of text positioned by its baseline origin.
#[derive(Clone, Debug, PartialEq)]
pub struct TextOp {
    pub text: String,
    /// Left end of the baseline, after alignment has been resolved.
    pub origin: Point,
    pub size_pt: f64,
    pub weight: FontWeight,
    pub color: Rgb,
    /// Counter-clockwise rotation around `origin` in degrees.
    pub rotation_deg: f64,
    pub blend: Blend,
}

/// Images the report can place; the pixels are supplied at render time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    /// The rasterised runtime chart.
    Chart,
    /// The optional "verified" badge.
    Verification,
}

/// One drawing operation.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    FillRect {
        rect: Rect,
        color: Rgb,
    },
    FillPolygon {
        points: Vec<Point>,
        color: Rgb,
    },
    StrokeRect {
        rect: Rect,
        color: Rgb,
        width_mm: f64,
    },
    Line {
        from: Point,
        to: Point,
        color: Rgb,
        width_mm: f64,
    },
    Text(TextOp),
    Image {
        slot: ImageSlot,
        rect: Rect,
    },
}

/// The drawing operations of a single page in paint order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    ops: Vec<DrawOp>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    pub fn extend<I>(&mut self, ops: I)
    where
        I: IntoIterator<Item = DrawOp>,
    {
        self.ops.extend(ops);
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Text runs on this page.
    pub fn texts(&self) -> impl Iterator<Item = &TextOp> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(text) => Some(text),
            _ => None,
        })
    }

    /// Returns `true` when a text run with exactly `text` is on this page.
    pub fn contains_text(&self, text: &str) -> bool {
        self.texts().any(|run| run.text == text)
    }

    /// Image slots placed on this page.
    pub fn images(&self) -> impl Iterator<Item = (ImageSlot, Rect)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Image { slot, rect } => Some((*slot, *rect)),
            _ => None,
        })
    }
}

/// A fully composed, backend-free report.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportLayout {
    page_size: Size,
    pages: Vec<Page>,
}

impl ReportLayout {
    pub fn new(page_size: Size, pages: Vec<Page>) -> Self {
        Self { page_size, pages }
    }

    pub fn page_size(&self) -> Size {
        self.page_size
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_over_matches_alpha_compositing() {
        let shadow = Rgb::BLACK.blend_over(Rgb::gray(250), 0.08);
        assert_eq!(shadow, Rgb::gray(230));

        let watermark = Rgb::gray(180).blend_over(Rgb::WHITE, 0.2);
        assert_eq!(watermark, Rgb::gray(240));

        assert_eq!(Rgb::new(1, 2, 3).blend_over(Rgb::WHITE, 1.0), Rgb::new(1, 2, 3));
        assert_eq!(Rgb::new(1, 2, 3).blend_over(Rgb::WHITE, 0.0), Rgb::WHITE);
    }

    #[test]
    fn rounded_outline_stays_inside_bounds() {
        let rect = Rect::new(10.0, 20.0, 30.0, 15.0);
        let outline = rect.rounded_outline(3.0, 6);
        assert_eq!(outline.len(), 4 * 7);
        for point in &outline {
            assert!(point.x >= rect.x - 1e-9 && point.x <= rect.right() + 1e-9);
            assert!(point.y >= rect.y - 1e-9 && point.y <= rect.bottom() + 1e-9);
        }
        assert!(outline.iter().all(|p| *p != Point::new(rect.x, rect.y)));
    }

    #[test]
    fn zero_radius_outline_is_the_plain_rectangle() {
        let rect = Rect::new(0.0, 0.0, 4.0, 2.0);
        assert_eq!(rect.rounded_outline(0.0, 8), rect.corners().to_vec());
    }
}
