//! Rasterization of a render node into a JPEG.

use std::future::Future;
use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use tracing::{debug, instrument};

use super::node::{Chrome, RenderNode};
use super::text::{self, Line};
use crate::error::{BoothError, Result};
use crate::layout::{Arrangement, Cell, Placement};
use crate::style::{AspectRatio, Filter, Layout, Rgb};

/// Margin around the collage content.
pub const CANVAS_PADDING_PX: u32 = 16;

/// Narrowest canvas the rasterizer accepts.
pub const MIN_CANVAS_WIDTH: u32 = 160;

/// Largest canvas edge, matching common browser canvas limits.
pub const MAX_CANVAS_EDGE: u32 = 16_384;

const PRINT_BORDER_PX: u32 = 8;
const PRINT_CHIN_PX: u32 = 32;
const STAGGER_PX: i32 = 6;
const FALLBACK_RATIO: f32 = 4.0 / 3.0;
const PLACEHOLDER: Rgba<u8> = Rgba([209, 213, 219, 255]);
const PRINT_PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);
/// Date line height relative to the caption.
const DATE_SCALE: f32 = 0.75;

/// Output parameters for one rasterization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    /// JPEG quality in `[0.8, 1.0]`.
    pub quality: f32,
    /// Canvas width in pixels.
    pub width: u32,
}

impl RasterOptions {
    /// Quality on the encoder's 1-100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

/// Turns a mounted render node into encoded image bytes.
pub trait Rasterizer {
    fn render(&self, node: &RenderNode, options: &RasterOptions)
    -> impl Future<Output = Result<Vec<u8>>>;
}

/// Rasterizer backed by the `image` crate.
///
/// Photos are cropped to their cells (object-cover), the style filter is
/// emulated with pixel operations, and polaroid prints are framed and tilted.
/// The caption and date are typeset below the photos in the chosen font.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageRasterizer;

impl Rasterizer for ImageRasterizer {
    async fn render(&self, node: &RenderNode, options: &RasterOptions) -> Result<Vec<u8>> {
        let canvas = compose(node, options)?;
        encode_jpeg(&canvas, options.jpeg_quality())
    }
}

/// Pixel rectangle relative to the content origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rect {
    x: i64,
    y: i64,
    w: u32,
    h: u32,
}

/// A cell resolved to pixels.
#[derive(Debug)]
struct Placed<'a> {
    cell: &'a Cell,
    rect: Rect,
    framed: bool,
    z: u32,
}

/// Paint the node onto an RGBA canvas.
#[instrument(skip_all, fields(layout = ?node.arrangement().layout, width = options.width))]
pub fn compose(node: &RenderNode, options: &RasterOptions) -> Result<RgbaImage> {
    if options.width < MIN_CANVAS_WIDTH || options.width > MAX_CANVAS_EDGE {
        return Err(BoothError::RasterizationFailed(format!(
            "canvas width {} outside {MIN_CANVAS_WIDTH}..={MAX_CANVAS_EDGE}",
            options.width
        )));
    }

    let inner = options.width - 2 * CANVAS_PADDING_PX;
    let (mut placed, content_height) = place_cells(node, inner)?;
    let footer = footer_height(node.chrome());
    let height = grow(content_height, CANVAS_PADDING_PX * 2 + footer)?;

    let mut canvas = RgbaImage::from_pixel(options.width, height, opaque(node.chrome().background));

    placed.sort_by_key(|p| p.z);
    for item in &placed {
        paint_cell(&mut canvas, node, item);
    }
    paint_footer(
        &mut canvas,
        node.chrome(),
        CANVAS_PADDING_PX + content_height,
        inner,
    )?;

    debug!(
        width = options.width,
        height,
        cells = placed.len(),
        "Composed collage"
    );
    Ok(canvas)
}

/// Encode an RGBA canvas as JPEG, dropping alpha.
pub fn encode_jpeg(canvas: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = DynamicImage::ImageRgba8(canvas.clone()).to_rgb8();
    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(&rgb)
        .map_err(|e| BoothError::RasterizationFailed(e.to_string()))?;
    Ok(out.into_inner())
}

// === Geometry ===

fn natural_size(node: &RenderNode, cell: &Cell) -> Option<(u32, u32)> {
    node.element_for(cell.snapshot)
        .and_then(|e| e.image())
        .map(|img| img.dimensions())
}

/// Height of a cell `width` wide under the node's aspect ratio.
fn cell_height(width: u32, aspect: AspectRatio, natural: Option<(u32, u32)>) -> u32 {
    let h = match (aspect.ratio(), natural) {
        (Some(ratio), _) => width as f32 / ratio,
        (None, Some((nw, nh))) if nw > 0 => width as f32 * nh as f32 / nw as f32,
        (None, _) => width as f32 / FALLBACK_RATIO,
    };
    (h.round() as u32).max(1)
}

/// Split `total` across `parts` columns separated by `gap`.
fn column_width(total: u32, parts: u32, gap: u32) -> u32 {
    let parts = parts.max(1);
    (total.saturating_sub(gap * (parts - 1)) / parts).max(1)
}

/// Add `by` to a running canvas height, failing past [`MAX_CANVAS_EDGE`].
fn grow(total: u32, by: u32) -> Result<u32> {
    total
        .checked_add(by)
        .filter(|&sum| sum <= MAX_CANVAS_EDGE)
        .ok_or_else(|| {
            BoothError::RasterizationFailed(format!("canvas taller than {MAX_CANVAS_EDGE}px"))
        })
}

fn place_cells(node: &RenderNode, inner: u32) -> Result<(Vec<Placed<'_>>, u32)> {
    let arrangement = node.arrangement();
    if arrangement.is_empty() {
        return Ok((Vec::new(), 0));
    }
    match arrangement.layout {
        Layout::Vertical => place_vertical(node, arrangement, inner),
        Layout::Polaroid => place_polaroid(node, arrangement, inner),
        Layout::Masonry => place_masonry(node, arrangement, inner),
        Layout::Horizontal | Layout::Grid => place_flex(node, arrangement, inner),
    }
}

fn place_vertical<'a>(
    node: &RenderNode,
    arrangement: &'a Arrangement,
    inner: u32,
) -> Result<(Vec<Placed<'a>>, u32)> {
    let gap = arrangement.gap;
    let mut y = 0;
    let mut placed = Vec::with_capacity(arrangement.len());
    for cell in &arrangement.cells {
        let h = cell_height(inner, node.aspect_ratio(), natural_size(node, cell));
        placed.push(Placed {
            cell,
            rect: Rect {
                x: 0,
                y: i64::from(y),
                w: inner,
                h,
            },
            framed: false,
            z: 0,
        });
        y = grow(y, h)?;
        y = grow(y, if cell.emphasized { 2 * gap } else { gap })?;
    }
    Ok((placed, y.saturating_sub(gap)))
}

fn place_polaroid<'a>(
    node: &RenderNode,
    arrangement: &'a Arrangement,
    inner: u32,
) -> Result<(Vec<Placed<'a>>, u32)> {
    let gap = arrangement.gap;
    let columns = arrangement.columns.max(1);
    let print_w = column_width(inner, columns, gap);
    let photo_w = print_w.saturating_sub(2 * PRINT_BORDER_PX).max(1);

    let mut placed = Vec::with_capacity(arrangement.len());
    let mut row_top = 0;
    for row in arrangement.cells.chunks(columns as usize) {
        let mut row_height = 0;
        for (col, cell) in row.iter().enumerate() {
            let photo_h = cell_height(photo_w, node.aspect_ratio(), natural_size(node, cell));
            let print_h = photo_h.saturating_add(PRINT_BORDER_PX + PRINT_CHIN_PX);
            row_height = row_height.max(print_h);

            let (z, nudge) = match cell.placement {
                Placement::Flow { z_index, stagger } => (z_index, stagger.offset(STAGGER_PX)),
                _ => (0, 0),
            };
            placed.push(Placed {
                cell,
                rect: Rect {
                    x: i64::from(col as u32 * (print_w + gap)) + i64::from(nudge),
                    y: i64::from(row_top),
                    w: print_w,
                    h: print_h,
                },
                framed: true,
                z,
            });
        }
        row_top = grow(row_top, row_height)?;
        row_top = grow(row_top, gap)?;
    }
    Ok((placed, row_top.saturating_sub(gap)))
}

fn place_masonry<'a>(
    node: &RenderNode,
    arrangement: &'a Arrangement,
    inner: u32,
) -> Result<(Vec<Placed<'a>>, u32)> {
    let gap = arrangement.gap;
    let track_w = column_width(inner, arrangement.columns, gap);
    let track_h = cell_height(track_w, node.aspect_ratio(), None);
    let span = |tracks: u32, size: u32| tracks * size + tracks.saturating_sub(1) * gap;

    let placed = arrangement
        .cells
        .iter()
        .filter_map(|cell| match cell.placement {
            Placement::Grid {
                row,
                column,
                row_span,
                column_span,
            } => Some(Placed {
                cell,
                rect: Rect {
                    x: i64::from(column * (track_w + gap)),
                    y: i64::from(row * (track_h + gap)),
                    w: span(column_span, track_w),
                    h: span(row_span, track_h),
                },
                framed: false,
                z: 0,
            }),
            _ => None,
        })
        .collect();
    Ok((placed, span(arrangement.row_count() as u32, track_h)))
}

fn place_flex<'a>(
    node: &RenderNode,
    arrangement: &'a Arrangement,
    inner: u32,
) -> Result<(Vec<Placed<'a>>, u32)> {
    let gap = arrangement.gap;
    let mut placed = Vec::with_capacity(arrangement.len());
    let mut y = 0;
    for row in arrangement.flex_rows() {
        let n = row.len() as u32;
        let available = inner.saturating_sub(gap * n.saturating_sub(1));
        let weights: Vec<f32> = row
            .iter()
            .map(|cell| match cell.placement {
                Placement::Flex { weight, .. } => weight,
                _ => 1.0,
            })
            .collect();
        let total: f32 = weights.iter().sum();
        let row_h = cell_height(available / n.max(1), node.aspect_ratio(), None);

        let mut x = 0;
        for (i, (&cell, weight)) in row.iter().zip(&weights).enumerate() {
            let w = if i + 1 == row.len() {
                available.saturating_sub(x)
            } else {
                (available as f32 * weight / total).round() as u32
            };
            placed.push(Placed {
                cell,
                rect: Rect {
                    x: i64::from(x + gap * i as u32),
                    y: i64::from(y),
                    w: w.max(1),
                    h: row_h,
                },
                framed: false,
                z: 0,
            });
            x += w;
        }
        y = grow(y, row_h)?;
        y = grow(y, gap)?;
    }
    Ok((placed, y.saturating_sub(gap)))
}

fn footer_height(chrome: &Chrome) -> u32 {
    let px = chrome.text_size.px();
    let lines = if chrome.date.is_some() { 2 } else { 1 };
    CANVAS_PADDING_PX + px * (lines + 1)
}

// === Painting ===

fn opaque(color: Rgb) -> Rgba<u8> {
    let [r, g, b] = color.channels();
    Rgba([r, g, b, 255])
}

fn paint_cell(canvas: &mut RgbaImage, node: &RenderNode, item: &Placed<'_>) {
    let Rect { x, y, w, h } = item.rect;
    let (photo_w, photo_h) = if item.framed {
        (
            w.saturating_sub(2 * PRINT_BORDER_PX).max(1),
            h.saturating_sub(PRINT_BORDER_PX + PRINT_CHIN_PX).max(1),
        )
    } else {
        (w, h)
    };

    let photo = match node.element_for(item.cell.snapshot).and_then(|e| e.image()) {
        Some(img) => apply_filter(
            img.resize_to_fill(photo_w, photo_h, FilterType::Triangle),
            node.filter(),
        )
        .to_rgba8(),
        None => RgbaImage::from_pixel(photo_w, photo_h, PLACEHOLDER),
    };

    let tile = if item.framed {
        let mut print = RgbaImage::from_pixel(w, h, PRINT_PAPER);
        imageops::overlay(
            &mut print,
            &photo,
            i64::from(PRINT_BORDER_PX),
            i64::from(PRINT_BORDER_PX),
        );
        print
    } else {
        photo
    };

    let rotated = rotate_about_center(&tile, item.cell.rotation_deg as f32);
    let dx = (i64::from(rotated.width()) - i64::from(w)) / 2;
    let dy = (i64::from(rotated.height()) - i64::from(h)) / 2;
    let origin = i64::from(CANVAS_PADDING_PX);
    imageops::overlay(canvas, &rotated, origin + x - dx, origin + y - dy);
}

fn paint_footer(canvas: &mut RgbaImage, chrome: &Chrome, top: u32, inner: u32) -> Result<()> {
    let face = text::face(chrome.font)?;
    let px = chrome.text_size.px();
    let color = opaque(chrome.text_color);

    let caption_top = top + CANVAS_PADDING_PX / 2 + px / 2;
    let caption = Line {
        text: &chrome.caption,
        px: px as f32,
        top: caption_top,
        max_width: inner,
    };
    text::draw_line(canvas, face, &caption, color);

    if let Some(date) = chrome.date {
        let date = date.format("%-m/%-d/%Y").to_string();
        let line = Line {
            text: &date,
            px: px as f32 * DATE_SCALE,
            top: caption_top + px + px / 4,
            max_width: inner,
        };
        text::draw_line(canvas, face, &line, color);
    }
    Ok(())
}

/// Rotate about the center with nearest-neighbour sampling, growing the
/// canvas so no corner is clipped. Uncovered pixels are transparent.
fn rotate_about_center(src: &RgbaImage, degrees: f32) -> RgbaImage {
    if degrees == 0.0 {
        return src.clone();
    }
    let (w, h) = src.dimensions();
    let (sin, cos) = degrees.to_radians().sin_cos();
    let out_w = (w as f32 * cos.abs() + h as f32 * sin.abs()).ceil() as u32;
    let out_h = (w as f32 * sin.abs() + h as f32 * cos.abs()).ceil() as u32;

    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    let (ocx, ocy) = (out_w as f32 / 2.0, out_h as f32 / 2.0);

    let mut out = RgbaImage::new(out_w, out_h);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - ocx;
        let dy = y as f32 + 0.5 - ocy;
        let sx = cos * dx + sin * dy + cx;
        let sy = -sin * dx + cos * dy + cy;
        if sx >= 0.0 && sy >= 0.0 && sx < w as f32 && sy < h as f32 {
            *pixel = *src.get_pixel(sx as u32, sy as u32);
        }
    }
    out
}

// === Filters ===

/// Emulate a presentation filter on decoded pixels.
pub fn apply_filter(img: DynamicImage, filter: Filter) -> DynamicImage {
    match filter {
        Filter::None => img,
        Filter::Grayscale => img.grayscale(),
        Filter::Sepia => sepia(&img, 1.0),
        Filter::Vintage => sepia(&img, 0.5).adjust_contrast(-10.0).brighten(8),
        Filter::Contrast => img.adjust_contrast(35.0),
        Filter::SoftFocus => img.blur(1.5),
    }
}

fn sepia(img: &DynamicImage, amount: f32) -> DynamicImage {
    let mut rgba = img.to_rgba8();
    for pixel in rgba.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let (r, g, b) = (f32::from(r), f32::from(g), f32::from(b));
        let tone = [
            0.393 * r + 0.769 * g + 0.189 * b,
            0.349 * r + 0.686 * g + 0.168 * b,
            0.272 * r + 0.534 * g + 0.131 * b,
        ];
        let mix = |orig: f32, toned: f32| (orig + (toned - orig) * amount).clamp(0.0, 255.0) as u8;
        pixel.0 = [mix(r, tone[0]), mix(g, tone[1]), mix(b, tone[2]), a];
    }
    DynamicImage::ImageRgba8(rgba)
}
