use std::{borrow::Cow, path::PathBuf, sync::Arc};

use quick_xml::{events::Event, reader::Reader};

use crate::{
    foundation::{
        core::MAX_CANVAS_DIM,
        error::{ConvertError, ConvertResult},
    },
    raster::frame::RasterFrame,
};

/// Renders a vector document into a fixed-size frame.
///
/// Callers pass documents that already passed [`validate`](crate::validate()); implementations do
/// not re-check declared dimensions. Implementations must be usable from several batches at once.
pub trait Rasterizer: Send + Sync {
    /// Render `svg` into a premultiplied RGBA8 frame of exactly `width` x `height` pixels.
    ///
    /// Failures of the renderer are [`ConvertError::Render`]; a surface that cannot be allocated
    /// is [`ConvertError::ResourceExhausted`].
    fn rasterize(&self, svg: &[u8], width: u32, height: u32) -> ConvertResult<RasterFrame>;
}

/// Options for [`SvgRasterizer`].
#[derive(Clone, Debug)]
pub struct SvgRasterizerOpts {
    /// Load the fonts installed on the system for `<text>` elements.
    pub load_system_fonts: bool,
    /// Extra directories scanned (non-recursively) for `.ttf`/`.otf`/`.ttc` files.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for SvgRasterizerOpts {
    fn default() -> Self {
        Self {
            load_system_fonts: true,
            font_dirs: Vec::new(),
        }
    }
}

/// [`Rasterizer`] backed by `usvg` parsing and `resvg` rendering.
///
/// The font database is built once and shared by every render.
pub struct SvgRasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl SvgRasterizer {
    /// Build a rasterizer, loading fonts according to `opts`.
    pub fn new(opts: SvgRasterizerOpts) -> Self {
        Self {
            fontdb: build_fontdb(&opts),
        }
    }

    /// Number of font faces available to `<text>` elements.
    pub fn font_face_count(&self) -> usize {
        self.fontdb.faces().count()
    }

    fn parse(&self, svg: &[u8]) -> ConvertResult<usvg::Tree> {
        let opts = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..Default::default()
        };
        usvg::Tree::from_data(&with_svg_namespace(svg), &opts)
            .map_err(|e| ConvertError::render(format!("parse svg tree: {e}")))
    }
}

impl Default for SvgRasterizer {
    fn default() -> Self {
        Self::new(SvgRasterizerOpts::default())
    }
}

impl std::fmt::Debug for SvgRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgRasterizer")
            .field("font_faces", &self.font_face_count())
            .finish()
    }
}

impl Rasterizer for SvgRasterizer {
    #[tracing::instrument(level = "debug", skip(self, svg), fields(len = svg.len()))]
    fn rasterize(&self, svg: &[u8], width: u32, height: u32) -> ConvertResult<RasterFrame> {
        if width == 0 || height == 0 {
            return Err(ConvertError::render("raster width/height must be non-zero"));
        }
        if width > MAX_CANVAS_DIM || height > MAX_CANVAS_DIM {
            return Err(ConvertError::resource_exhausted(format!(
                "raster size too large: {width}x{height} (max {MAX_CANVAS_DIM}x{MAX_CANVAS_DIM})"
            )));
        }

        let tree = self.parse(svg)?;
        let size = tree.size();
        if !size.width().is_finite()
            || !size.height().is_finite()
            || size.width() <= 0.0
            || size.height() <= 0.0
        {
            return Err(ConvertError::render("svg has invalid width/height"));
        }

        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
            ConvertError::resource_exhausted(format!(
                "failed to allocate {width}x{height} svg pixmap"
            ))
        })?;

        let sx = (width as f32) / size.width();
        let sy = (height as f32) / size.height();
        let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

        resvg::render(&tree, xform, &mut pixmap.as_mut());
        RasterFrame::new(width, height, pixmap.take(), true)
    }
}

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Declare the SVG namespace on an unprefixed root `<svg>` that has no default `xmlns`.
///
/// Validation accepts such documents, but usvg ignores elements outside the SVG namespace.
/// Anything the reader cannot make sense of is passed through untouched for usvg to report.
fn with_svg_namespace(svg: &[u8]) -> Cow<'_, [u8]> {
    let Ok(text) = std::str::from_utf8(svg) else {
        return Cow::Borrowed(svg);
    };
    let mut reader = Reader::from_str(text);
    loop {
        let start = reader.buffer_position();
        let root = match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => e,
            Ok(Event::Eof) | Err(_) => return Cow::Borrowed(svg),
            Ok(_) => continue,
        };
        let name = root.name();
        if name.as_ref() != b"svg" {
            return Cow::Borrowed(svg);
        }
        let declared = root
            .attributes()
            .flatten()
            .any(|a| a.key.as_ref() == b"xmlns");
        let insert_at = start + 1 + name.as_ref().len();
        let at_root = text.get(start..).is_some_and(|rest| rest.starts_with("<svg"));
        if declared || !at_root {
            return Cow::Borrowed(svg);
        }
        let mut patched = Vec::with_capacity(svg.len() + SVG_NS.len() + 9);
        patched.extend_from_slice(&svg[..insert_at]);
        patched.extend_from_slice(format!(" xmlns=\"{SVG_NS}\"").as_bytes());
        patched.extend_from_slice(&svg[insert_at..]);
        return Cow::Owned(patched);
    }
}

fn build_fontdb(opts: &SvgRasterizerOpts) -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    if opts.load_system_fonts {
        db.load_system_fonts();
    }
    for dir in &opts.font_dirs {
        load_fonts_from_dir(&mut db, dir);
    }
    tracing::debug!(faces = db.faces().count(), "svg font database ready");
    Arc::new(db)
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &std::path::Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory is not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/svg.rs"]
mod tests;
