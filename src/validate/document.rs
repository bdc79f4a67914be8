use quick_xml::{events::Event, reader::Reader};

use crate::foundation::core::Canvas;

/// Why a document was refused before any rendering work was done.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// Not well-formed markup, not an `<svg>` root, or no usable numeric size.
    MalformedMarkup {
        /// Parser-level detail, for logs only.
        detail: String,
    },
    /// Declared size differs from the required canvas.
    WrongDimensions {
        /// Required canvas.
        expected: Canvas,
        /// Declared `(width, height)`, truncated to whole pixels.
        actual: (u32, u32),
    },
    /// Input buffer is larger than the configured cap.
    Oversized {
        /// Input length in bytes.
        size: usize,
        /// Configured cap in bytes.
        max: usize,
    },
}

impl RejectReason {
    /// Stable kebab-case name of the reason kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedMarkup { .. } => "malformed-markup",
            Self::WrongDimensions { .. } => "wrong-dimensions",
            Self::Oversized { .. } => "oversized",
        }
    }

    /// Short explanation suitable for the submitter.
    pub fn user_message(&self) -> String {
        match self {
            Self::MalformedMarkup { .. } => "could not be parsed".to_string(),
            Self::WrongDimensions { expected, .. } => format!("not exactly {expected}"),
            Self::Oversized { .. } => "file too large".to_string(),
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedMarkup { detail } => write!(f, "malformed-markup: {detail}"),
            Self::WrongDimensions { expected, actual } => write!(
                f,
                "wrong-dimensions: expected {expected}, got {}×{}",
                actual.0, actual.1
            ),
            Self::Oversized { size, max } => {
                write!(f, "oversized: {size} bytes exceeds the {max} byte limit")
            }
        }
    }
}

/// Outcome of [`validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationResult {
    /// The document may proceed to rasterization.
    Valid {
        /// Declared width in pixels.
        width: u32,
        /// Declared height in pixels.
        height: u32,
        /// Input length in bytes.
        byte_size: usize,
    },
    /// The document must not be rendered.
    Rejected {
        /// Why.
        reason: RejectReason,
    },
}

impl ValidationResult {
    /// Return `true` for [`ValidationResult::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// The rejection reason, if any.
    pub fn reason(&self) -> Option<&RejectReason> {
        match self {
            Self::Valid { .. } => None,
            Self::Rejected { reason } => Some(reason),
        }
    }

    fn malformed(detail: impl Into<String>) -> Self {
        Self::Rejected {
            reason: RejectReason::MalformedMarkup {
                detail: detail.into(),
            },
        }
    }
}

/// Check an input buffer against the size cap and the required canvas.
///
/// Checks run cheapest first: byte size, then markup parsing, then declared dimensions. An
/// oversized buffer is rejected without being parsed. The function is pure.
#[tracing::instrument(level = "debug", skip(buffer), fields(len = buffer.len()))]
pub fn validate(
    buffer: &[u8],
    max_bytes: usize,
    required_width: u32,
    required_height: u32,
) -> ValidationResult {
    if buffer.len() > max_bytes {
        return ValidationResult::Rejected {
            reason: RejectReason::Oversized {
                size: buffer.len(),
                max: max_bytes,
            },
        };
    }

    let root = match parse_root(buffer) {
        Ok(root) => root,
        Err(detail) => return ValidationResult::malformed(detail),
    };

    let Some((width, height)) = root.dimensions() else {
        return ValidationResult::malformed("root element has no numeric width/height or viewBox");
    };

    if width != required_width || height != required_height {
        return ValidationResult::Rejected {
            reason: RejectReason::WrongDimensions {
                expected: Canvas {
                    width: required_width,
                    height: required_height,
                },
                actual: (width, height),
            },
        };
    }

    ValidationResult::Valid {
        width,
        height,
        byte_size: buffer.len(),
    }
}

#[derive(Debug, Default)]
struct RootAttrs {
    width: Option<String>,
    height: Option<String>,
    view_box: Option<String>,
}

impl RootAttrs {
    /// Explicit width/height win; otherwise the viewBox extent is used.
    fn dimensions(&self) -> Option<(u32, u32)> {
        let explicit = self
            .width
            .as_deref()
            .and_then(parse_length)
            .zip(self.height.as_deref().and_then(parse_length));
        explicit.or_else(|| self.view_box.as_deref().and_then(parse_view_box))
    }
}

/// Walk the whole document so that well-formedness is established, keeping the root's size
/// attributes.
fn parse_root(buffer: &[u8]) -> Result<RootAttrs, String> {
    let text = std::str::from_utf8(buffer).map_err(|e| format!("not utf-8: {e}"))?;
    let mut reader = Reader::from_str(text);

    let mut root: Option<RootAttrs> = None;
    let mut depth = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("at byte {}: {e}", reader.buffer_position()))?;
        let is_empty = matches!(event, Event::Empty(_));
        match event {
            Event::Start(e) | Event::Empty(e) => {
                if depth == 0 {
                    if root.is_some() {
                        return Err("more than one root element".to_string());
                    }
                    if e.local_name().as_ref() != b"svg" {
                        return Err(format!(
                            "root element is <{}>, expected <svg>",
                            String::from_utf8_lossy(e.name().as_ref())
                        ));
                    }
                    let mut attrs = RootAttrs::default();
                    for attr in e.attributes() {
                        let attr = attr.map_err(|e| format!("bad root attribute: {e}"))?;
                        let value = attr
                            .unescape_value()
                            .map_err(|e| format!("bad root attribute value: {e}"))?
                            .into_owned();
                        match attr.key.as_ref() {
                            b"width" => attrs.width = Some(value),
                            b"height" => attrs.height = Some(value),
                            b"viewBox" => attrs.view_box = Some(value),
                            _ => {}
                        }
                    }
                    root = Some(attrs);
                } else {
                    for attr in e.attributes() {
                        attr.map_err(|e| format!("bad attribute: {e}"))?;
                    }
                }
                if !is_empty {
                    depth += 1;
                }
            }
            Event::End(_) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| "unexpected closing tag".to_string())?;
            }
            Event::Text(t) if depth == 0 => {
                if !t.iter().all(|b| b.is_ascii_whitespace()) {
                    return Err("text outside the root element".to_string());
                }
            }
            Event::CData(_) if depth == 0 => {
                return Err("character data outside the root element".to_string());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err("unexpected end of document (unclosed element)".to_string());
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

/// Parse a `width`/`height` value: a number with an optional `px`, `pt` or `em` suffix.
///
/// The unit is dropped, not converted: `512pt` counts as 512 pixels.
fn parse_length(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let number = ["px", "pt", "em"]
        .iter()
        .find_map(|unit| raw.strip_suffix(unit))
        .unwrap_or(raw)
        .trim();
    to_pixels(number.parse::<f64>().ok()?)
}

/// Parse `min-x min-y width height`, separated by whitespace and/or commas.
fn parse_view_box(raw: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = raw
        .split(|c: char| c.is_ascii_whitespace() || c == ',')
        .filter(|p| !p.is_empty())
        .collect();
    let [_, _, w, h] = parts.as_slice() else {
        return None;
    };
    let w = to_pixels(w.parse::<f64>().ok()?)?;
    let h = to_pixels(h.parse::<f64>().ok()?)?;
    Some((w, h))
}

fn to_pixels(v: f64) -> Option<u32> {
    if !v.is_finite() || v < 0.0 || v > f64::from(u32::MAX) {
        return None;
    }
    Some(v.trunc() as u32)
}

#[cfg(test)]
#[path = "../../tests/unit/validate/document.rs"]
mod tests;
