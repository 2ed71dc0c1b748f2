//! Executes a composed [`ReportLayout`] with `printpdf`.
//!
//! The layout uses millimetres from the top-left corner; PDF user space starts at
//! the bottom-left, so every y coordinate is flipped against the page height here.

use std::io::BufWriter;

use image::DynamicImage;
use log::{debug, warn};
use printpdf::{
    BlendMode, BuiltinFont, Color, CurTransMat, Image, IndirectFontRef, Line, Mm, PdfDocument,
    PdfLayerReference, Pt, SeperableBlendMode,
};

use crate::error::ReportError;
use crate::imaging;
use crate::model::{
    Blend, DrawOp, FontWeight, ImageSlot, Page, Point, Rect, ReportLayout, Rgb, TextOp,
};

/// Pixels available to the image slots of a layout.
#[derive(Clone, Copy, Debug)]
pub struct ReportImages<'a> {
    pub chart: &'a DynamicImage,
    pub verification: Option<&'a DynamicImage>,
}

impl<'a> ReportImages<'a> {
    fn get(&self, slot: ImageSlot) -> Option<&'a DynamicImage> {
        match slot {
            ImageSlot::Chart => Some(self.chart),
            ImageSlot::Verification => self.verification,
        }
    }
}

fn pdf_color(rgb: Rgb) -> Color {
    let (r, g, b) = rgb.to_unit();
    Color::Rgb(printpdf::Rgb::new(r, g, b, None))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, weight: FontWeight) -> &IndirectFontRef {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }
}

/// Converts layout coordinates into PDF user space for one page.
struct PageCanvas<'a> {
    layer: PdfLayerReference,
    page_height: f64,
    fonts: &'a Fonts,
    images: &'a ReportImages<'a>,
}

impl PageCanvas<'_> {
    fn point(&self, point: Point) -> printpdf::Point {
        printpdf::Point::new(Mm(point.x), Mm(self.page_height - point.y))
    }

    fn shape(&self, points: &[Point], closed: bool, fill: bool) -> Line {
        Line {
            points: points.iter().map(|p| (self.point(*p), false)).collect(),
            is_closed: closed,
            has_fill: fill,
            has_stroke: !fill,
            is_clipping_path: false,
        }
    }

    fn draw(&self, op: &DrawOp) {
        match op {
            DrawOp::FillRect { rect, color } => {
                self.layer.set_fill_color(pdf_color(*color));
                self.layer.add_shape(self.shape(&rect.corners(), true, true));
            }
            DrawOp::FillPolygon { points, color } => {
                self.layer.set_fill_color(pdf_color(*color));
                self.layer.add_shape(self.shape(points, true, true));
            }
            DrawOp::StrokeRect {
                rect,
                color,
                width_mm,
            } => {
                self.set_stroke(*color, *width_mm);
                self.layer.add_shape(self.shape(&rect.corners(), true, false));
            }
            DrawOp::Line {
                from,
                to,
                color,
                width_mm,
            } => {
                self.set_stroke(*color, *width_mm);
                self.layer.add_shape(self.shape(&[*from, *to], false, false));
            }
            DrawOp::Text(text) => self.text(text),
            DrawOp::Image { slot, rect } => self.image(*slot, *rect),
        }
    }

    fn set_stroke(&self, color: Rgb, width_mm: f64) {
        self.layer.set_outline_color(pdf_color(color));
        self.layer.set_outline_thickness(Pt::from(Mm(width_mm)).0);
    }

    fn text(&self, text: &TextOp) {
        let font = self.fonts.get(text.weight);
        let x = Mm(text.origin.x);
        let y = Mm(self.page_height - text.origin.y);

        if text.rotation_deg == 0.0 && text.blend == Blend::Normal {
            self.layer.set_fill_color(pdf_color(text.color));
            self.layer
                .use_text(text.text.as_str(), text.size_pt, x, y, font);
            return;
        }

        // Blend mode and transform stay scoped to this run.
        self.layer.save_graphics_state();
        if text.blend == Blend::Multiply {
            self.layer
                .set_blend_mode(BlendMode::Seperable(SeperableBlendMode::Multiply));
        }
        self.layer.set_fill_color(pdf_color(text.color));
        self.layer.set_ctm(CurTransMat::Translate(x, y));
        if text.rotation_deg != 0.0 {
            self.layer.set_ctm(CurTransMat::Rotate(text.rotation_deg));
        }
        self.layer
            .use_text(text.text.as_str(), text.size_pt, Mm(0.0), Mm(0.0), font);
        self.layer.restore_graphics_state();
    }

    fn image(&self, slot: ImageSlot, rect: Rect) {
        let Some(source) = self.images.get(slot) else {
            warn!("no pixels supplied for {:?}, leaving the slot empty", slot);
            return;
        };
        let flattened = DynamicImage::ImageRgb8(imaging::flatten_onto_white(source));
        let (scale_x, scale_y) = imaging::scale_factors(&flattened, rect.size());
        Image::from_dynamic_image(&flattened).add_to_layer(
            self.layer.clone(),
            Some(Mm(rect.x)),
            Some(Mm(self.page_height - rect.bottom())),
            None,
            Some(scale_x),
            Some(scale_y),
            None,
        );
    }
}

/// Renders every page of `layout` and returns the PDF bytes.
pub fn render_pdf(
    layout: &ReportLayout,
    images: &ReportImages<'_>,
    title: &str,
) -> Result<Vec<u8>, ReportError> {
    let size = layout.page_size();
    let (width, height) = (Mm(size.width), Mm(size.height));
    let (doc, first_page, first_layer) = PdfDocument::new(title, width, height, "Page 1");
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
    };

    for (index, page) in layout.pages().iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) =
                doc.add_page(width, height, format!("Page {}", index + 1));
            doc.get_page(page_index).get_layer(layer_index)
        };
        draw_page(
            &PageCanvas {
                layer,
                page_height: size.height,
                fonts: &fonts,
                images,
            },
            page,
        );
    }

    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer)?;
    let bytes = writer
        .into_inner()
        .map_err(|err| printpdf::Error::Io(err.into_error()))?;
    debug!(
        "rendered {} page(s) into {} bytes",
        layout.page_count(),
        bytes.len()
    );
    Ok(bytes)
}

fn draw_page(canvas: &PageCanvas<'_>, page: &Page) {
    for op in page.ops() {
        canvas.draw(op);
    }
}
