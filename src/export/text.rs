//! Caption typesetting for the rasterizer.
//!
//! Each caption [`Font`] maps to a system face found through `fontdb`. When
//! no installed face matches, the faces bundled with `epaint_default_fonts`
//! stand in; a missing script face is imitated by slanting the fallback.

use std::sync::OnceLock;

use ab_glyph::{Font as _, FontArc, FontVec, GlyphId, PxScale, ScaleFont as _, point};
use fontdb::{Database, Family, Query};
use image::{Rgba, RgbaImage};
use tracing::{debug, warn};

use crate::error::{BoothError, Result};
use crate::style::{Font, StyleAxis};

/// Horizontal shift per pixel of height for a slanted fallback face.
const OBLIQUE_SHEAR: f32 = 0.25;

static FACES: OnceLock<std::result::Result<FaceSet, String>> = OnceLock::new();

/// A loaded typeface.
#[derive(Debug, Clone)]
pub struct Face {
    font: FontArc,
    oblique: bool,
    source: &'static str,
}

impl Face {
    /// Where the face came from: `"system"` or `"bundled"`.
    pub const fn source(&self) -> &'static str {
        self.source
    }

    pub const fn is_oblique(&self) -> bool {
        self.oblique
    }
}

#[derive(Debug)]
struct FaceSet {
    serif: Face,
    sans: Face,
    mono: Face,
    script: Face,
}

impl FaceSet {
    fn load() -> std::result::Result<Self, String> {
        let mut db = Database::new();
        db.load_system_fonts();
        debug!(faces = db.len(), "Loaded system font database");
        Ok(Self {
            serif: resolve(&db, Font::Serif)?,
            sans: resolve(&db, Font::Sans)?,
            mono: resolve(&db, Font::Mono)?,
            script: resolve(&db, Font::Script)?,
        })
    }

    const fn get(&self, font: Font) -> &Face {
        match font {
            Font::Serif => &self.serif,
            Font::Sans => &self.sans,
            Font::Mono => &self.mono,
            Font::Script => &self.script,
        }
    }
}

/// The face used for `font`, loading the font database on first use.
pub fn face(font: Font) -> Result<&'static Face> {
    FACES
        .get_or_init(FaceSet::load)
        .as_ref()
        .map(|set| set.get(font))
        .map_err(|e| BoothError::RasterizationFailed(format!("no caption font: {e}")))
}

fn families(font: Font) -> &'static [Family<'static>] {
    match font {
        Font::Serif => &[
            Family::Name("DejaVu Serif"),
            Family::Name("Liberation Serif"),
            Family::Name("Georgia"),
            Family::Serif,
        ],
        Font::Sans => &[
            Family::Name("DejaVu Sans"),
            Family::Name("Liberation Sans"),
            Family::Name("Helvetica"),
            Family::Name("Arial"),
            Family::SansSerif,
        ],
        Font::Mono => &[
            Family::Name("DejaVu Sans Mono"),
            Family::Name("Liberation Mono"),
            Family::Name("Courier New"),
            Family::Monospace,
        ],
        Font::Script => &[
            Family::Name("Brush Script MT"),
            Family::Name("URW Chancery L"),
            Family::Name("Z003"),
            Family::Cursive,
        ],
    }
}

fn resolve(db: &Database, font: Font) -> std::result::Result<Face, String> {
    let query = Query {
        families: families(font),
        ..Query::default()
    };
    let found = db.query(&query).and_then(|id| {
        db.with_face_data(id, |data, index| {
            FontVec::try_from_vec_and_index(data.to_vec(), index)
        })
    });
    match found {
        Some(Ok(system)) => {
            debug!(font = font.id(), "Using system face");
            Ok(Face {
                font: FontArc::new(system),
                oblique: false,
                source: "system",
            })
        }
        Some(Err(e)) => {
            warn!(font = font.id(), error = %e, "System face unreadable, using bundled face");
            bundled(font)
        }
        None => {
            debug!(font = font.id(), "No system face, using bundled face");
            bundled(font)
        }
    }
}

fn bundled(font: Font) -> std::result::Result<Face, String> {
    let data = match font {
        Font::Mono => epaint_default_fonts::HACK_REGULAR,
        Font::Serif | Font::Sans | Font::Script => epaint_default_fonts::UBUNTU_LIGHT,
    };
    let font_arc = FontArc::try_from_slice(data).map_err(|e| e.to_string())?;
    Ok(Face {
        font: font_arc,
        oblique: font == Font::Script,
        source: "bundled",
    })
}

/// One centered line of caption text.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    pub text: &'a str,
    /// Nominal glyph height in pixels.
    pub px: f32,
    /// Top of the line box on the canvas.
    pub top: u32,
    /// Widest the line may be drawn; wider text is scaled down.
    pub max_width: u32,
}

/// Advance width of `text` at `scale`, kerning included.
pub fn measure(face: &Face, text: &str, scale: PxScale) -> f32 {
    let scaled = face.font.as_scaled(scale);
    let mut width = 0.0;
    let mut prev: Option<GlyphId> = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }
    width
}

/// Draw `line` centered horizontally on the canvas in `color`.
pub fn draw_line(canvas: &mut RgbaImage, face: &Face, line: &Line<'_>, color: Rgba<u8>) {
    let shear = if face.oblique { OBLIQUE_SHEAR } else { 0.0 };
    let mut scale = PxScale::from(line.px);
    let mut width = measure(face, line.text, scale) + shear * line.px;
    let max_width = line.max_width as f32;
    if width > max_width && width > 0.0 {
        let fit = max_width / width;
        scale = PxScale::from(line.px * fit);
        width *= fit;
    }

    let scaled = face.font.as_scaled(scale);
    let baseline = line.top as f32 + scaled.ascent();
    let mut caret = canvas.width() as f32 / 2.0 - width / 2.0;
    let mut prev: Option<GlyphId> = None;
    for c in line.text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, baseline));
        caret += scaled.h_advance(id);
        prev = Some(id);

        let Some(outlined) = face.font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let y = bounds.min.y + gy as f32;
            let x = bounds.min.x + gx as f32 + shear * (baseline - y);
            blend(canvas, x.round() as i64, y.round() as i64, color, coverage);
        });
    }
}

fn blend(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
    let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
        return;
    };
    let Some(dst) = canvas.get_pixel_mut_checked(x, y) else {
        return;
    };
    let alpha = coverage.clamp(0.0, 1.0);
    for (d, s) in dst.0.iter_mut().zip(color.0).take(3) {
        *d = (f32::from(s) * alpha + f32::from(*d) * (1.0 - alpha)).round() as u8;
    }
}
