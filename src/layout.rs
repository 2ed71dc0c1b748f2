//! Page geometry of the runtime report.
//!
//! Composition happens in two passes: the functions here compute every rectangle,
//! rule and text origin for an A4 portrait page and emit them as
//! [`DrawOp`]s, and [`crate::render`] replays those operations through `printpdf`.
//! Nothing in this module touches a rendering backend, so each piece of geometry
//! can be checked on its own.
//!
//! All coordinates are millimetres from the top-left page corner.

use std::ops::Range;

use chrono::NaiveDate;
use log::debug;
use serde::Deserialize;

use crate::config::Branding;
use crate::dataset::RuntimeDataset;
use crate::format;
use crate::metrics::{self, text_width_mm};
use crate::model::{
    Blend, DrawOp, FontWeight, HorizontalAlignment, ImageSlot, Page, Point, Rect, ReportLayout, Rgb,
    Size, TextOp,
};

pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PAGE_HEIGHT_MM: f64 = 297.0;

const HEADER_HEIGHT_MM: f64 = 30.0;
const CONTENT_LEFT_MM: f64 = 30.0;
const DIVIDER_INSET_MM: f64 = 25.0;
const META_BASELINE_MM: f64 = HEADER_HEIGHT_MM + 15.0;
const DIVIDER_Y_MM: f64 = HEADER_HEIGHT_MM + 20.0;

/// Width the chart snapshot is scaled to.
pub const CHART_DISPLAY_WIDTH_MM: f64 = 150.0;
const CHART_TOP_MM: f64 = HEADER_HEIGHT_MM + 30.0;
const CHART_SHADOW_SPREAD_MM: f64 = 2.0;
const CHART_SHADOW_RADIUS_MM: f64 = 3.0;
const CHART_BACKING_SPREAD_MM: f64 = 1.0;
const CHART_BACKING_RADIUS_MM: f64 = 2.0;
const ARC_SEGMENTS: usize = 6;

const WATERMARK_SIZE_PT: f64 = 40.0;
const WATERMARK_ANGLE_DEG: f64 = 45.0;
const WATERMARK_OPACITY: f64 = 0.2;

const TABLE_TITLE_GAP_MM: f64 = 15.0;
const TABLE_TOP_GAP_MM: f64 = 8.0;
/// Width of the series-name column.
pub const NAME_COLUMN_WIDTH_MM: f64 = 40.0;
/// Width of each load-point column.
pub const DATA_COLUMN_WIDTH_MM: f64 = 16.0;
pub const HEADER_ROW_HEIGHT_MM: f64 = 12.0;
pub const DATA_ROW_HEIGHT_MM: f64 = 8.0;
const CELL_PADDING_MM: f64 = 2.0;
const GRID_WIDTH_MM: f64 = 0.1;
const BORDER_WIDTH_MM: f64 = 0.5;

const NOTES_GAP_MM: f64 = 15.0;
const DISCLAIMER_GAP_MM: f64 = 10.0;
const DISCLAIMER_SIZE_PT: f64 = 10.0;
const CONTENT_WIDTH_MM: f64 = PAGE_WIDTH_MM - 2.0 * CONTENT_LEFT_MM;

const VERIFICATION_SIZE_MM: f64 = 25.0;
const VERIFICATION_TOP_MM: f64 = PAGE_HEIGHT_MM - 40.0;
const VERIFICATION_LABEL_GAP_MM: f64 = 5.0;

const FOOTER_RULE_Y_MM: f64 = PAGE_HEIGHT_MM - 15.0;
const FOOTER_TEXT_Y_MM: f64 = PAGE_HEIGHT_MM - 8.0;

/// Top of the content on pages after the first.
pub const CONTINUATION_TOP_MM: f64 = 20.0;
const LIMIT_CLEARANCE_MM: f64 = 5.0;

const PAGE_BACKGROUND: Rgb = Rgb::gray(250);
const BANNER: Rgb = Rgb::gray(80);
const BANNER_OVERLAY: Rgb = Rgb::gray(60);
const TEXT_PRIMARY: Rgb = Rgb::gray(60);
const TEXT_SECONDARY: Rgb = Rgb::gray(80);
const RULE: Rgb = Rgb::gray(120);
const TABLE_HEADER_FILL: Rgb = Rgb::gray(220);
const ROW_TINT: Rgb = Rgb::gray(245);
const GRID: Rgb = Rgb::gray(200);
const WATERMARK: Rgb = Rgb::gray(180);
const SHADOW_OPACITY: f64 = 0.08;

/// What happens when content would run into the footer area.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Continue table rows and the notes block on further pages.
    #[default]
    Paginate,
    /// Keep everything on one page even if it overlaps the footer or leaves the page.
    Unbounded,
}

/// Lowest baseline content may reach before the footer area.
pub fn content_limit(has_verification: bool) -> f64 {
    if has_verification {
        VERIFICATION_TOP_MM - LIMIT_CLEARANCE_MM
    } else {
        FOOTER_RULE_Y_MM - LIMIT_CLEARANCE_MM
    }
}

/// Scales an image of `native_px` pixels to `width_mm`, preserving its aspect ratio.
pub fn scale_to_width(native_px: (u32, u32), width_mm: f64) -> Size {
    let (native_width, native_height) = native_px;
    if native_width == 0 {
        return Size::new(width_mm, 0.0);
    }
    Size::new(
        width_mm,
        width_mm * f64::from(native_height) / f64::from(native_width),
    )
}

/// Like [`scale_to_width`], shrinking both sides when the height exceeds `max_height_mm`.
pub fn fit_to_box(native_px: (u32, u32), width_mm: f64, max_height_mm: Option<f64>) -> Size {
    let size = scale_to_width(native_px, width_mm);
    match max_height_mm {
        Some(max_height) if size.height > max_height && max_height > 0.0 => {
            let factor = max_height / size.height;
            Size::new(size.width * factor, max_height)
        }
        _ => size,
    }
}

/// The chart image and the two rounded layers drawn underneath it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FramedImage {
    pub shadow: Rect,
    pub backing: Rect,
    pub image: Rect,
}

impl FramedImage {
    /// Centres an image of `size` horizontally on the page with its top edge at `top`.
    pub fn centered(size: Size, top: f64) -> Self {
        let image = Rect::new((PAGE_WIDTH_MM - size.width) / 2.0, top, size.width, size.height);
        Self {
            shadow: image.inflate(CHART_SHADOW_SPREAD_MM),
            backing: image.inflate(CHART_BACKING_SPREAD_MM),
            image,
        }
    }
}

/// Baseline origin that centres a run of `text_width` on `center` when rotated
/// counter-clockwise by `angle_deg`.
pub fn watermark_origin(center: Point, text_width: f64, angle_deg: f64) -> Point {
    let angle = angle_deg.to_radians();
    // The page y axis points down, so a counter-clockwise run climbs towards smaller y.
    Point::new(
        center.x - text_width / 2.0 * angle.cos(),
        center.y + text_width / 2.0 * angle.sin(),
    )
}

/// Total width of a table with `load_count` data columns.
pub fn table_width(load_count: usize) -> f64 {
    NAME_COLUMN_WIDTH_MM + DATA_COLUMN_WIDTH_MM * load_count as f64
}

/// Geometry of one rendered table block: a header row followed by data rows.
#[derive(Clone, Debug, PartialEq)]
pub struct TableGeometry {
    /// Outer border; its left and right sides are the outer vertical borders.
    pub frame: Rect,
    pub header: Rect,
    pub rows: Vec<Rect>,
    /// Left edge of every column, the name column first.
    pub column_lefts: Vec<f64>,
    /// x positions of the internal vertical separators: one after the name
    /// column and one between each pair of data columns.
    pub vertical_separators: Vec<f64>,
    /// y positions of the horizontal rules: under the header and under every row.
    pub horizontal_rules: Vec<f64>,
}

impl TableGeometry {
    /// Lays out a table with `load_count` data columns and `row_count` rows,
    /// horizontally centred with its top edge at `top`.
    pub fn compute(load_count: usize, row_count: usize, top: f64) -> Self {
        let width = table_width(load_count);
        let x = (PAGE_WIDTH_MM - width) / 2.0;
        let header = Rect::new(x, top, width, HEADER_ROW_HEIGHT_MM);
        let data_left = x + NAME_COLUMN_WIDTH_MM;

        let rows = (0..row_count)
            .map(|index| {
                Rect::new(
                    x,
                    header.bottom() + index as f64 * DATA_ROW_HEIGHT_MM,
                    width,
                    DATA_ROW_HEIGHT_MM,
                )
            })
            .collect();

        let vertical_separators: Vec<f64> = (0..load_count)
            .map(|index| data_left + index as f64 * DATA_COLUMN_WIDTH_MM)
            .collect();

        let mut column_lefts = Vec::with_capacity(load_count + 1);
        column_lefts.push(x);
        column_lefts.extend(vertical_separators.iter().copied());

        let horizontal_rules = (0..=row_count)
            .map(|index| header.bottom() + index as f64 * DATA_ROW_HEIGHT_MM)
            .collect();

        Self {
            frame: Rect::new(
                x,
                top,
                width,
                HEADER_ROW_HEIGHT_MM + row_count as f64 * DATA_ROW_HEIGHT_MM,
            ),
            header,
            rows,
            column_lefts,
            vertical_separators,
            horizontal_rules,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.frame.bottom()
    }

    /// Baseline origin of the text in `column` of a row whose bottom edge is at `row_bottom`.
    fn cell_origin(&self, column: usize, row_bottom: f64) -> Point {
        Point::new(
            self.column_lefts[column] + CELL_PADDING_MM,
            row_bottom - CELL_PADDING_MM,
        )
    }
}

/// Part of the table drawn on one page.
#[derive(Clone, Debug, PartialEq)]
pub struct TableSegment {
    /// Page index relative to the first page of the report.
    pub page: usize,
    pub top: f64,
    pub rows: Range<usize>,
}

/// Where the table title and the table rows end up.
#[derive(Clone, Debug, PartialEq)]
pub struct TablePlan {
    pub title_page: usize,
    pub title_baseline: f64,
    pub segments: Vec<TableSegment>,
}

fn rows_fitting(top: f64, limit: f64) -> usize {
    let free = limit - top - HEADER_ROW_HEIGHT_MM;
    if free < DATA_ROW_HEIGHT_MM {
        0
    } else {
        ((free + 1e-9) / DATA_ROW_HEIGHT_MM).floor() as usize
    }
}

/// Splits `row_count` table rows across pages.
///
/// The title stays with the first segment.  Continuation segments repeat the header
/// row and start at [`CONTINUATION_TOP_MM`]; every segment holds at least one row.
pub fn plan_table(
    title_baseline: f64,
    row_count: usize,
    limit: f64,
    policy: OverflowPolicy,
) -> TablePlan {
    if policy == OverflowPolicy::Unbounded {
        return TablePlan {
            title_page: 0,
            title_baseline,
            segments: vec![TableSegment {
                page: 0,
                top: title_baseline + TABLE_TOP_GAP_MM,
                rows: 0..row_count,
            }],
        };
    }

    let mut page = 0;
    let mut title = title_baseline;
    if rows_fitting(title + TABLE_TOP_GAP_MM, limit) == 0 && title > CONTINUATION_TOP_MM {
        page = 1;
        title = CONTINUATION_TOP_MM;
    }

    let mut segments = Vec::new();
    let mut top = title + TABLE_TOP_GAP_MM;
    let mut start = 0;
    while start < row_count {
        let capacity = rows_fitting(top, limit).max(1);
        let end = (start + capacity).min(row_count);
        segments.push(TableSegment {
            page,
            top,
            rows: start..end,
        });
        start = end;
        page += 1;
        top = CONTINUATION_TOP_MM;
    }

    TablePlan {
        title_page: segments.first().map_or(page, |segment| segment.page),
        title_baseline: title,
        segments,
    }
}

/// Inputs of a single composition.
#[derive(Clone, Copy, Debug)]
pub struct ReportContent<'a> {
    pub dataset: &'a RuntimeDataset,
    /// Native pixel size of the chart snapshot.
    pub chart_px: (u32, u32),
    pub generated_on: NaiveDate,
    pub include_verification: bool,
    pub branding: &'a Branding,
    pub policy: OverflowPolicy,
}

fn text(
    content: impl Into<String>,
    anchor: Point,
    size_pt: f64,
    weight: FontWeight,
    color: Rgb,
    alignment: HorizontalAlignment,
) -> DrawOp {
    let content = content.into();
    let width = text_width_mm(&content, size_pt, weight);
    let x = match alignment {
        HorizontalAlignment::Left => anchor.x,
        HorizontalAlignment::Center => anchor.x - width / 2.0,
        HorizontalAlignment::Right => anchor.x - width,
    };
    DrawOp::Text(TextOp {
        text: content,
        origin: Point::new(x, anchor.y),
        size_pt,
        weight,
        color,
        rotation_deg: 0.0,
        blend: Blend::Normal,
    })
}

fn line(from: Point, to: Point, color: Rgb, width_mm: f64) -> DrawOp {
    DrawOp::Line {
        from,
        to,
        color,
        width_mm,
    }
}

fn rounded_fill(rect: Rect, radius: f64, color: Rgb) -> DrawOp {
    DrawOp::FillPolygon {
        points: rect.rounded_outline(radius, ARC_SEGMENTS),
        color,
    }
}

fn blank_page() -> Page {
    let mut page = Page::new();
    page.push(DrawOp::FillRect {
        rect: Rect::new(0.0, 0.0, PAGE_WIDTH_MM, PAGE_HEIGHT_MM),
        color: PAGE_BACKGROUND,
    });
    page
}

fn page_at(pages: &mut Vec<Page>, index: usize) -> &mut Page {
    while pages.len() <= index {
        pages.push(blank_page());
    }
    &mut pages[index]
}

fn header_ops(content: &ReportContent<'_>) -> Vec<DrawOp> {
    let branding = content.branding;
    let center = PAGE_WIDTH_MM / 2.0;
    vec![
        DrawOp::FillRect {
            rect: Rect::new(0.0, 0.0, PAGE_WIDTH_MM, HEADER_HEIGHT_MM),
            color: BANNER,
        },
        DrawOp::FillRect {
            rect: Rect::new(center, 0.0, PAGE_WIDTH_MM / 2.0, HEADER_HEIGHT_MM),
            color: BANNER_OVERLAY.blend_over(BANNER, 0.3),
        },
        text(
            branding.title.as_str(),
            Point::new(center, 15.0),
            20.0,
            FontWeight::Bold,
            Rgb::WHITE,
            HorizontalAlignment::Center,
        ),
        text(
            branding.subtitle.as_str(),
            Point::new(center, 24.0),
            12.0,
            FontWeight::Bold,
            Rgb::WHITE,
            HorizontalAlignment::Center,
        ),
        text(
            format!(
                "Configuration: {}",
                format::rating_label(content.dataset.rating())
            ),
            Point::new(CONTENT_LEFT_MM, META_BASELINE_MM),
            14.0,
            FontWeight::Bold,
            TEXT_PRIMARY,
            HorizontalAlignment::Left,
        ),
        text(
            format!("Generated: {}", format::display_date(content.generated_on)),
            Point::new(PAGE_WIDTH_MM - CONTENT_LEFT_MM, META_BASELINE_MM),
            10.0,
            FontWeight::Regular,
            TEXT_PRIMARY,
            HorizontalAlignment::Right,
        ),
        line(
            Point::new(DIVIDER_INSET_MM, DIVIDER_Y_MM),
            Point::new(PAGE_WIDTH_MM - DIVIDER_INSET_MM, DIVIDER_Y_MM),
            RULE.blend_over(PAGE_BACKGROUND, 0.5),
            BORDER_WIDTH_MM,
        ),
    ]
}

fn chart_ops(framed: &FramedImage, watermark: &str) -> Vec<DrawOp> {
    let mut ops = vec![
        rounded_fill(
            framed.shadow,
            CHART_SHADOW_RADIUS_MM,
            Rgb::BLACK.blend_over(PAGE_BACKGROUND, SHADOW_OPACITY),
        ),
        rounded_fill(framed.backing, CHART_BACKING_RADIUS_MM, Rgb::WHITE),
        DrawOp::Image {
            slot: ImageSlot::Chart,
            rect: framed.image,
        },
    ];

    if !watermark.is_empty() {
        let width = text_width_mm(watermark, WATERMARK_SIZE_PT, FontWeight::Bold);
        ops.push(DrawOp::Text(TextOp {
            text: watermark.to_owned(),
            origin: watermark_origin(framed.image.center(), width, WATERMARK_ANGLE_DEG),
            size_pt: WATERMARK_SIZE_PT,
            weight: FontWeight::Bold,
            color: WATERMARK.blend_over(Rgb::WHITE, WATERMARK_OPACITY),
            rotation_deg: WATERMARK_ANGLE_DEG,
            blend: Blend::Multiply,
        }));
    }
    ops
}

/// Operations for one table segment holding `rows` of the dataset.
pub fn table_ops(
    geometry: &TableGeometry,
    dataset: &RuntimeDataset,
    rows: Range<usize>,
    name_header: &str,
) -> Vec<DrawOp> {
    let mut ops = vec![DrawOp::FillRect {
        rect: geometry.header,
        color: TABLE_HEADER_FILL,
    }];

    let header_bottom = geometry.header.bottom();
    ops.push(text(
        name_header,
        geometry.cell_origin(0, header_bottom),
        7.0,
        FontWeight::Bold,
        TEXT_PRIMARY,
        HorizontalAlignment::Left,
    ));
    for (column, load) in dataset.load_points().iter().enumerate() {
        ops.push(text(
            format::load_label(*load),
            geometry.cell_origin(column + 1, header_bottom),
            7.0,
            FontWeight::Bold,
            TEXT_PRIMARY,
            HorizontalAlignment::Left,
        ));
    }

    for (rect, index) in geometry.rows.iter().zip(rows) {
        let series = &dataset.series()[index];
        if index % 2 == 0 {
            ops.push(DrawOp::FillRect {
                rect: *rect,
                color: ROW_TINT,
            });
        }
        ops.push(text(
            series.name(),
            geometry.cell_origin(0, rect.bottom()),
            6.0,
            FontWeight::Regular,
            TEXT_PRIMARY,
            HorizontalAlignment::Left,
        ));
        for (column, value) in series.values().iter().enumerate() {
            ops.push(text(
                format::runtime_label(*value),
                geometry.cell_origin(column + 1, rect.bottom()),
                6.0,
                FontWeight::Regular,
                TEXT_PRIMARY,
                HorizontalAlignment::Left,
            ));
        }
    }

    let frame = geometry.frame;
    for y in &geometry.horizontal_rules {
        ops.push(line(
            Point::new(frame.x, *y),
            Point::new(frame.right(), *y),
            GRID,
            GRID_WIDTH_MM,
        ));
    }
    for x in &geometry.vertical_separators {
        ops.push(line(
            Point::new(*x, frame.y),
            Point::new(*x, frame.bottom()),
            GRID,
            GRID_WIDTH_MM,
        ));
    }
    ops.push(DrawOp::StrokeRect {
        rect: frame,
        color: RULE,
        width_mm: BORDER_WIDTH_MM,
    });
    ops
}

/// Notes label followed by the justified disclaimer.
fn notes_ops(branding: &Branding, label_baseline: f64) -> Vec<DrawOp> {
    let mut ops = vec![text(
        branding.notes_title.as_str(),
        Point::new(CONTENT_LEFT_MM, label_baseline),
        12.0,
        FontWeight::Bold,
        TEXT_PRIMARY,
        HorizontalAlignment::Left,
    )];

    let line_height = metrics::line_height_mm(DISCLAIMER_SIZE_PT);
    let first = label_baseline + DISCLAIMER_GAP_MM;
    for (index, wrapped) in metrics::justify(
        &branding.disclaimer,
        CONTENT_WIDTH_MM,
        DISCLAIMER_SIZE_PT,
        FontWeight::Regular,
    )
    .into_iter()
    .enumerate()
    {
        let baseline = first + index as f64 * line_height;
        for (word, offset) in wrapped.words.into_iter().zip(wrapped.offsets) {
            ops.push(text(
                word,
                Point::new(CONTENT_LEFT_MM + offset, baseline),
                DISCLAIMER_SIZE_PT,
                FontWeight::Regular,
                TEXT_PRIMARY,
                HorizontalAlignment::Left,
            ));
        }
    }
    ops
}

fn notes_height(branding: &Branding) -> f64 {
    let lines = metrics::wrap_words(
        &branding.disclaimer,
        CONTENT_WIDTH_MM,
        DISCLAIMER_SIZE_PT,
        FontWeight::Regular,
    )
    .len();
    if lines == 0 {
        0.0
    } else {
        DISCLAIMER_GAP_MM + (lines - 1) as f64 * metrics::line_height_mm(DISCLAIMER_SIZE_PT)
    }
}

fn verification_ops(label: &str) -> Vec<DrawOp> {
    let badge = Rect::new(
        CONTENT_LEFT_MM,
        VERIFICATION_TOP_MM,
        VERIFICATION_SIZE_MM,
        VERIFICATION_SIZE_MM,
    );
    vec![
        rounded_fill(
            badge.inflate(1.0),
            2.0,
            Rgb::BLACK.blend_over(PAGE_BACKGROUND, SHADOW_OPACITY),
        ),
        DrawOp::Image {
            slot: ImageSlot::Verification,
            rect: badge,
        },
        text(
            label,
            Point::new(badge.right() + VERIFICATION_LABEL_GAP_MM, badge.y + 15.0),
            10.0,
            FontWeight::Bold,
            TEXT_SECONDARY,
            HorizontalAlignment::Left,
        ),
    ]
}

fn footer_ops(contact: &str) -> Vec<DrawOp> {
    vec![
        line(
            Point::new(CONTENT_LEFT_MM, FOOTER_RULE_Y_MM),
            Point::new(PAGE_WIDTH_MM - CONTENT_LEFT_MM, FOOTER_RULE_Y_MM),
            RULE,
            BORDER_WIDTH_MM,
        ),
        text(
            contact,
            Point::new(PAGE_WIDTH_MM / 2.0, FOOTER_TEXT_Y_MM),
            8.0,
            FontWeight::Regular,
            RULE,
            HorizontalAlignment::Center,
        ),
    ]
}

/// Composes the complete report.
pub fn compose(content: &ReportContent<'_>) -> ReportLayout {
    let branding = content.branding;
    let dataset = content.dataset;
    let limit = content_limit(content.include_verification);
    let mut pages = vec![blank_page()];

    pages[0].extend(header_ops(content));

    let max_height = match content.policy {
        OverflowPolicy::Paginate => Some(limit - CHART_TOP_MM - CHART_SHADOW_SPREAD_MM),
        OverflowPolicy::Unbounded => None,
    };
    let display = fit_to_box(content.chart_px, CHART_DISPLAY_WIDTH_MM, max_height);
    let framed = FramedImage::centered(display, CHART_TOP_MM);
    pages[0].extend(chart_ops(&framed, &branding.watermark));
    debug!(
        "chart placed at {:.1}x{:.1} mm from {}x{} px",
        display.width, display.height, content.chart_px.0, content.chart_px.1
    );

    let plan = plan_table(
        framed.image.bottom() + TABLE_TITLE_GAP_MM,
        dataset.series_count(),
        limit,
        content.policy,
    );
    page_at(&mut pages, plan.title_page).push(text(
        branding.table_title.as_str(),
        Point::new(PAGE_WIDTH_MM / 2.0, plan.title_baseline),
        11.0,
        FontWeight::Bold,
        TEXT_SECONDARY,
        HorizontalAlignment::Center,
    ));

    let mut cursor_page = plan.title_page;
    let mut table_bottom = plan.title_baseline;
    for segment in &plan.segments {
        let geometry = TableGeometry::compute(dataset.load_count(), segment.rows.len(), segment.top);
        page_at(&mut pages, segment.page).extend(table_ops(
            &geometry,
            dataset,
            segment.rows.clone(),
            &branding.name_column_header,
        ));
        cursor_page = segment.page;
        table_bottom = geometry.bottom();
    }

    let mut notes_baseline = table_bottom + NOTES_GAP_MM;
    if content.policy == OverflowPolicy::Paginate
        && notes_baseline + notes_height(branding) > limit
    {
        cursor_page += 1;
        notes_baseline = CONTINUATION_TOP_MM;
    }
    page_at(&mut pages, cursor_page).extend(notes_ops(branding, notes_baseline));

    if content.include_verification {
        let last = pages.len() - 1;
        pages[last].extend(verification_ops(&branding.verified_label));
    }

    for page in &mut pages {
        page.extend(footer_ops(&branding.footer_contact));
    }

    debug!(
        "composed {} kVA report on {} page(s)",
        dataset.rating(),
        pages.len()
    );
    ReportLayout::new(Size::new(PAGE_WIDTH_MM, PAGE_HEIGHT_MM), pages)
}
