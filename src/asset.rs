use std::fmt;
use std::path::Path;

/// A decoded, rasterized motif: straight-alpha RGBA8.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Sprite {
    /// Intrinsic height/width ratio, used so rendered clones keep the
    /// original asset's proportions regardless of the configured size.
    pub fn aspect(&self) -> f64 {
        if self.width == 0 {
            1.0
        } else {
            self.height as f64 / self.width as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    UnsupportedFormat { extension: String },
    Decode(String),
    Io(String),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat { extension } => {
                write!(f, "unsupported asset format: .{extension}")
            }
            Self::Decode(msg) => write!(f, "asset decode failed: {msg}"),
            Self::Io(msg) => write!(f, "asset I/O error: {msg}"),
        }
    }
}

impl std::error::Error for AssetError {}

const RASTER_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Load an asset file into a sprite.
///
/// SVG is parsed with `usvg` and rasterized with `resvg` so its longest side
/// is `target_px`; raster formats are decoded with the `image` crate and
/// downscaled to the same bound (clones each hold an independent copy, so an
/// unbounded source image would multiply). On any failure the caller's
/// current asset stays untouched.
pub fn load(path: &Path, remove_stroke: bool, target_px: u32) -> Result<Sprite, AssetError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if extension == "svg" {
        let text = std::fs::read_to_string(path).map_err(|e| AssetError::Io(e.to_string()))?;
        return load_svg(&text, remove_stroke, target_px);
    }
    if RASTER_EXTENSIONS.contains(&extension.as_str()) {
        let bytes = std::fs::read(path).map_err(|e| AssetError::Io(e.to_string()))?;
        return load_raster(&bytes, target_px);
    }
    Err(AssetError::UnsupportedFormat { extension })
}

pub fn load_svg(text: &str, remove_stroke: bool, target_px: u32) -> Result<Sprite, AssetError> {
    let source = if remove_stroke {
        strip_stroke(text)
    } else {
        text.to_string()
    };

    let tree = usvg::Tree::from_str(&source, &usvg::Options::default())
        .map_err(|e| AssetError::Decode(e.to_string()))?;

    let size = tree.size();
    let (base_w, base_h) = (size.width(), size.height());
    if !base_w.is_finite() || !base_h.is_finite() || base_w <= 0.0 || base_h <= 0.0 {
        return Err(AssetError::Decode("svg has invalid width/height".to_string()));
    }

    let scale = target_px.max(1) as f32 / base_w.max(base_h);
    let w = ((base_w * scale).ceil() as u32).max(1);
    let h = ((base_h * scale).ceil() as u32).max(1);

    let mut pixmap = resvg::tiny_skia::Pixmap::new(w, h)
        .ok_or_else(|| AssetError::Decode("failed to allocate svg pixmap".to_string()))?;
    let xform = resvg::tiny_skia::Transform::from_scale(
        w as f32 / base_w,
        h as f32 / base_h,
    );
    resvg::render(&tree, xform, &mut pixmap.as_mut());

    let mut rgba = pixmap.take();
    unpremultiply_in_place(&mut rgba);
    Ok(Sprite {
        width: w,
        height: h,
        rgba,
    })
}

pub fn load_raster(bytes: &[u8], target_px: u32) -> Result<Sprite, AssetError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| AssetError::Decode(e.to_string()))?;
    let bounded = if decoded.width().max(decoded.height()) > target_px {
        decoded.thumbnail(target_px, target_px)
    } else {
        decoded
    };
    let rgba = bounded.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Sprite {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

/// Fallback motif used when no asset path is given: a soft two-lobed petal
/// with a bright core, enough structure for every oscillator to be visible.
pub fn builtin_motif(size: u32) -> Sprite {
    let size = size.max(8);
    let mut rgba = vec![0u8; (size * size * 4) as usize];
    let s = size as f64;
    for y in 0..size {
        for x in 0..size {
            // Normalized coordinates in [-1, 1].
            let nx = (x as f64 + 0.5) / s * 2.0 - 1.0;
            let ny = (y as f64 + 0.5) / s * 2.0 - 1.0;
            let lobe_a = ((nx * nx + (ny + 0.35) * (ny + 0.35)).sqrt() - 0.55).max(0.0);
            let lobe_b = ((nx * nx + (ny - 0.35) * (ny - 0.35)).sqrt() - 0.45).max(0.0);
            let field = lobe_a.min(lobe_b);
            let alpha = (1.0 - field * 6.0).clamp(0.0, 1.0);
            if alpha <= 0.0 {
                continue;
            }
            let core = (1.0 - (nx * nx + ny * ny).sqrt()).clamp(0.0, 1.0);
            let i = ((y * size + x) * 4) as usize;
            rgba[i] = (140.0 + 115.0 * core) as u8;
            rgba[i + 1] = (60.0 + 140.0 * core * core) as u8;
            rgba[i + 2] = (200.0 + 55.0 * core) as u8;
            rgba[i + 3] = (alpha * 255.0) as u8;
        }
    }
    Sprite {
        width: size,
        height: size,
        rgba,
    }
}

/// Rewrite stroke styling in SVG source so rasterization drops outlines.
///
/// Covers the attribute forms (`stroke="..."`, `stroke-width='...'`) and
/// `stroke`/`stroke-width` declarations inside `style` attributes. Matches
/// the original surface's behavior of forcing `stroke: none` on every
/// element rather than attempting full CSS resolution.
pub fn strip_stroke(svg: &str) -> String {
    let mut out = String::with_capacity(svg.len());
    let mut rest = svg;

    while let Some(pos) = rest.find("stroke") {
        let (head, tail) = rest.split_at(pos);
        out.push_str(head);

        let name_len = tail
            .bytes()
            .take_while(|b| b.is_ascii_alphabetic() || *b == b'-')
            .count();
        let name = &tail[..name_len];
        let after = &tail[name_len..];

        let replacement = match name {
            "stroke" => Some("none"),
            "stroke-width" => Some("0"),
            _ => None,
        };

        let rewritten = match replacement {
            Some(value) => {
                if let Some(stripped) = after.strip_prefix("=\"") {
                    stripped.find('"').map(|end| {
                        out.push_str(name);
                        out.push_str("=\"");
                        out.push_str(value);
                        out.push('"');
                        &stripped[end + 1..]
                    })
                } else if let Some(stripped) = after.strip_prefix("='") {
                    stripped.find('\'').map(|end| {
                        out.push_str(name);
                        out.push_str("='");
                        out.push_str(value);
                        out.push('\'');
                        &stripped[end + 1..]
                    })
                } else if let Some(stripped) = after.strip_prefix(':') {
                    // Style declaration; the value runs to the next ';' or
                    // the closing quote of the style attribute.
                    let end = stripped
                        .find(|c| c == ';' || c == '"' || c == '\'')
                        .unwrap_or(stripped.len());
                    out.push_str(name);
                    out.push(':');
                    out.push_str(value);
                    Some(&stripped[end..])
                } else {
                    None
                }
            }
            None => None,
        };

        match rewritten {
            Some(new_rest) => rest = new_rest,
            None => {
                out.push_str(name);
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a == 0 || a == 255 {
            continue;
        }
        px[0] = ((px[0] as u32 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u32 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u32 * 255 + a / 2) / a).min(255) as u8;
    }
}
