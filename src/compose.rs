use crate::asset::Sprite;
use crate::params::BlendMode;
use crate::solver::{CloneTransform, ColorFilter};

/// RGBA8 framebuffer the animator composites into and the terminal
/// renderers read from.
#[derive(Debug, Clone)]
pub struct Canvas {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rgba: vec![0u8; width * height * 4],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.rgba = vec![0u8; width * height * 4];
        }
    }

    pub fn fill(&mut self, color: [u8; 3]) {
        for px in self.rgba.chunks_exact_mut(4) {
            px[0] = color[0];
            px[1] = color[1];
            px[2] = color[2];
            px[3] = 255;
        }
    }

    /// Commit one solved transform: draw `sprite` rotated about its center,
    /// scaled to the transform's width/height, color-filtered, and blended.
    ///
    /// Destination pixels are inverse-mapped into sprite space with nearest
    /// neighbour sampling, so the cost is bounded by the on-screen bounding
    /// box regardless of sprite resolution.
    pub fn draw_sprite(&mut self, sprite: &Sprite, t: &CloneTransform, blend: BlendMode) {
        if sprite.width == 0 || sprite.height == 0 || t.width <= 0.0 || t.height <= 0.0 {
            return;
        }

        let cx = t.x + t.width / 2.0;
        let cy = t.y + t.height / 2.0;
        let half_diag = ((t.width / 2.0).powi(2) + (t.height / 2.0).powi(2)).sqrt();

        let x0 = ((cx - half_diag).floor().max(0.0)) as usize;
        let y0 = ((cy - half_diag).floor().max(0.0)) as usize;
        let x1 = ((cx + half_diag).ceil().min(self.width as f64)).max(0.0) as usize;
        let y1 = ((cy + half_diag).ceil().min(self.height as f64)).max(0.0) as usize;
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let (sin, cos) = t.rotation.sin_cos();
        let matrix = t.filter.map(filter_matrix);
        let sw = sprite.width as f64;
        let sh = sprite.height as f64;

        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f64 + 0.5 - cx;
                let dy = py as f64 + 0.5 - cy;
                // Rotate back into the sprite's unrotated frame.
                let lx = dx * cos + dy * sin;
                let ly = -dx * sin + dy * cos;
                let u = lx / t.width + 0.5;
                let v = ly / t.height + 0.5;
                if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                    continue;
                }

                let sx = ((u * sw) as usize).min(sprite.width as usize - 1);
                let sy = ((v * sh) as usize).min(sprite.height as usize - 1);
                let si = (sy * sprite.width as usize + sx) * 4;
                let alpha = sprite.rgba[si + 3] as f32 / 255.0;
                if alpha <= 0.0 {
                    continue;
                }

                let mut src = [
                    sprite.rgba[si] as f32 / 255.0,
                    sprite.rgba[si + 1] as f32 / 255.0,
                    sprite.rgba[si + 2] as f32 / 255.0,
                ];
                if let Some(m) = &matrix {
                    src = apply_matrix(m, src);
                }

                let di = (py * self.width + px) * 4;
                let dst = [
                    self.rgba[di] as f32 / 255.0,
                    self.rgba[di + 1] as f32 / 255.0,
                    self.rgba[di + 2] as f32 / 255.0,
                ];

                let mixed = blend_rgb(blend, src, dst);
                for c in 0..3 {
                    let v = mixed[c] * alpha + dst[c] * (1.0 - alpha);
                    self.rgba[di + c] = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
                }
                self.rgba[di + 3] = 255;
            }
        }
    }
}

fn blend_rgb(mode: BlendMode, s: [f32; 3], d: [f32; 3]) -> [f32; 3] {
    let mut out = [0.0f32; 3];
    for c in 0..3 {
        out[c] = match mode {
            BlendMode::Normal => s[c],
            BlendMode::Screen => 1.0 - (1.0 - s[c]) * (1.0 - d[c]),
            BlendMode::Multiply => s[c] * d[c],
            BlendMode::Lighten => s[c].max(d[c]),
            BlendMode::Difference => (s[c] - d[c]).abs(),
        };
    }
    out
}

/// 3x3 color matrix for a [`ColorFilter`], matching the CSS filter shorthand
/// semantics the original surface relied on: brightness gain, then the
/// saturate matrix, then the hue-rotate matrix.
fn filter_matrix(f: ColorFilter) -> [[f32; 3]; 3] {
    let b = f.brightness as f32;
    let s = f.saturation as f32;
    let sat = [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ];
    let (sin, cos) = (f.hue_deg.to_radians() as f32).sin_cos();
    let hue = [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ];

    // hue * sat, with the brightness gain folded in.
    let mut out = [[0.0f32; 3]; 3];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| hue[r][k] * sat[k][c]).sum::<f32>() * b;
        }
    }
    out
}

fn apply_matrix(m: &[[f32; 3]; 3], rgb: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * rgb[0] + m[0][1] * rgb[1] + m[0][2] * rgb[2],
        m[1][0] * rgb[0] + m[1][1] * rgb[1] + m[1][2] * rgb[2],
        m[2][0] * rgb[0] + m[2][1] * rgb[1] + m[2][2] * rgb[2],
    ]
}
