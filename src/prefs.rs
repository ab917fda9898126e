use crate::params::{BackgroundPreset, BlendMode, Direction, Params};
use std::fmt;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Everything persisted between runs: the full parameter snapshot plus the
/// asset that was on screen.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoredSettings {
    pub params: Params,
    pub asset_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefsError {
    Io(String),
    Parse { line: usize, message: String },
    Invalid(String),
}

impl fmt::Display for PrefsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Parse { line, message } => write!(f, "parse error at line {line}: {message}"),
            Self::Invalid(msg) => write!(f, "invalid settings: {msg}"),
        }
    }
}

impl std::error::Error for PrefsError {}

impl StoredSettings {
    /// Load settings from `path`. A missing file (or `None`) yields the
    /// defaults; unknown keys are ignored so older builds can read files
    /// written by newer ones.
    pub fn load(path: Option<&Path>) -> Result<Self, PrefsError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = match std::fs::read_to_string(path) {
            Ok(v) => v,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(PrefsError::Io(err.to_string())),
        };
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, PrefsError> {
        let mut settings = Self::default();
        for (line_idx, raw) in text.lines().enumerate() {
            let line_no = line_idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key_raw, value_raw)) = line.split_once('=') else {
                return Err(PrefsError::Parse {
                    line: line_no,
                    message: "expected <key>=<value>".to_string(),
                });
            };
            settings.apply_field(key_raw.trim(), value_raw.trim(), line_no)?;
        }
        settings
            .params
            .validate()
            .map_err(|e| PrefsError::Invalid(e.to_string()))?;
        Ok(settings)
    }

    fn apply_field(&mut self, key: &str, value: &str, line: usize) -> Result<(), PrefsError> {
        let parse_err = |message: String| PrefsError::Parse { line, message };
        let p = &mut self.params;
        match key {
            "repeats" => {
                p.repeats = value
                    .parse()
                    .map_err(|_| parse_err(format!("repeats must be an integer, got {value:?}")))?;
            }
            "size_px" => p.size_px = parse_f64(key, value, line)?,
            "radius" => p.radius = parse_f64(key, value, line)?,
            "comp_speed" => p.comp_speed = parse_f64(key, value, line)?,
            "comp_direction" => {
                p.comp_direction = Direction::parse(value)
                    .ok_or_else(|| parse_err(format!("{key} must be cw/ccw, got {value:?}")))?;
            }
            "spin_speed" => p.spin_speed = parse_f64(key, value, line)?,
            "spin_direction" => {
                p.spin_direction = Direction::parse(value)
                    .ok_or_else(|| parse_err(format!("{key} must be cw/ccw, got {value:?}")))?;
            }
            "scale_enabled" => p.scale_enabled = parse_flag(key, value, line)?,
            "scale_rate" => p.scale_rate = parse_f64(key, value, line)?,
            "scale_amount" => p.scale_amount = parse_f64(key, value, line)?,
            "scale_per_item" => p.scale_per_item = parse_flag(key, value, line)?,
            "radial_enabled" => p.radial_enabled = parse_flag(key, value, line)?,
            "radial_rate" => p.radial_rate = parse_f64(key, value, line)?,
            "radial_amount" => p.radial_amount = parse_f64(key, value, line)?,
            "radial_per_item" => p.radial_per_item = parse_flag(key, value, line)?,
            "orient_enabled" => p.orient_enabled = parse_flag(key, value, line)?,
            "orient_offset" => p.orient_offset = parse_f64(key, value, line)?,
            "wave_enabled" => p.wave_enabled = parse_flag(key, value, line)?,
            "wave_frequency" => p.wave_frequency = parse_f64(key, value, line)?,
            "wave_amplitude" => p.wave_amplitude = parse_f64(key, value, line)?,
            "wave_speed" => p.wave_speed = parse_f64(key, value, line)?,
            "wave_per_item" => p.wave_per_item = parse_flag(key, value, line)?,
            "hue_enabled" => p.hue_enabled = parse_flag(key, value, line)?,
            "hue_drift_speed" => p.hue_drift_speed = parse_f64(key, value, line)?,
            "bg_color" => {
                p.bg_color = parse_hex_color(value)
                    .ok_or_else(|| parse_err(format!("{key} must be #rrggbb, got {value:?}")))?;
            }
            "bg_shift_enabled" => p.bg_shift_enabled = parse_flag(key, value, line)?,
            "bg_shift_preset" => {
                p.bg_shift_preset = BackgroundPreset::parse(value)
                    .ok_or_else(|| parse_err(format!("unknown background preset {value:?}")))?;
            }
            "bg_shift_speed" => p.bg_shift_speed = parse_f64(key, value, line)?,
            "audio_reactive" => p.audio_reactive = parse_flag(key, value, line)?,
            "audio_sensitivity" => p.audio_sensitivity = parse_f64(key, value, line)?,
            "bass_boost" => p.bass_boost = parse_f64(key, value, line)?,
            "mid_boost" => p.mid_boost = parse_f64(key, value, line)?,
            "treble_boost" => p.treble_boost = parse_f64(key, value, line)?,
            "audio_mod_max" => p.audio_mod_max = parse_f64(key, value, line)?,
            "blend_mode" => {
                p.blend_mode = BlendMode::parse(value)
                    .ok_or_else(|| parse_err(format!("unknown blend mode {value:?}")))?;
            }
            "remove_stroke" => p.remove_stroke = parse_flag(key, value, line)?,
            "asset_path" => {
                self.asset_path = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            // Ignore unknown keys.
            _ => {}
        }
        Ok(())
    }

    pub fn save(&self, path: Option<&Path>) -> Result<(), PrefsError> {
        let Some(path) = path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PrefsError::Io(e.to_string()))?;
        }
        let body = self.serialize();
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, &body).map_err(|e| PrefsError::Io(e.to_string()))?;
        std::fs::rename(&tmp, path).map_err(|e| PrefsError::Io(e.to_string()))
    }

    pub fn serialize(&self) -> String {
        let p = &self.params;
        let mut s = String::from("# mandalaviz settings v1\n");
        let _ = writeln!(s, "repeats={}", p.repeats);
        let _ = writeln!(s, "size_px={}", p.size_px);
        let _ = writeln!(s, "radius={}", p.radius);
        let _ = writeln!(s, "comp_speed={}", p.comp_speed);
        let _ = writeln!(s, "comp_direction={}", p.comp_direction.label());
        let _ = writeln!(s, "spin_speed={}", p.spin_speed);
        let _ = writeln!(s, "spin_direction={}", p.spin_direction.label());
        let _ = writeln!(s, "scale_enabled={}", p.scale_enabled);
        let _ = writeln!(s, "scale_rate={}", p.scale_rate);
        let _ = writeln!(s, "scale_amount={}", p.scale_amount);
        let _ = writeln!(s, "scale_per_item={}", p.scale_per_item);
        let _ = writeln!(s, "radial_enabled={}", p.radial_enabled);
        let _ = writeln!(s, "radial_rate={}", p.radial_rate);
        let _ = writeln!(s, "radial_amount={}", p.radial_amount);
        let _ = writeln!(s, "radial_per_item={}", p.radial_per_item);
        let _ = writeln!(s, "orient_enabled={}", p.orient_enabled);
        let _ = writeln!(s, "orient_offset={}", p.orient_offset);
        let _ = writeln!(s, "wave_enabled={}", p.wave_enabled);
        let _ = writeln!(s, "wave_frequency={}", p.wave_frequency);
        let _ = writeln!(s, "wave_amplitude={}", p.wave_amplitude);
        let _ = writeln!(s, "wave_speed={}", p.wave_speed);
        let _ = writeln!(s, "wave_per_item={}", p.wave_per_item);
        let _ = writeln!(s, "hue_enabled={}", p.hue_enabled);
        let _ = writeln!(s, "hue_drift_speed={}", p.hue_drift_speed);
        let _ = writeln!(
            s,
            "bg_color=#{:02x}{:02x}{:02x}",
            p.bg_color[0], p.bg_color[1], p.bg_color[2]
        );
        let _ = writeln!(s, "bg_shift_enabled={}", p.bg_shift_enabled);
        let _ = writeln!(s, "bg_shift_preset={}", p.bg_shift_preset.label());
        let _ = writeln!(s, "bg_shift_speed={}", p.bg_shift_speed);
        let _ = writeln!(s, "audio_reactive={}", p.audio_reactive);
        let _ = writeln!(s, "audio_sensitivity={}", p.audio_sensitivity);
        let _ = writeln!(s, "bass_boost={}", p.bass_boost);
        let _ = writeln!(s, "mid_boost={}", p.mid_boost);
        let _ = writeln!(s, "treble_boost={}", p.treble_boost);
        let _ = writeln!(s, "audio_mod_max={}", p.audio_mod_max);
        let _ = writeln!(s, "blend_mode={}", p.blend_mode.label());
        let _ = writeln!(s, "remove_stroke={}", p.remove_stroke);
        if let Some(asset) = &self.asset_path {
            let _ = writeln!(s, "asset_path={}", asset.display());
        }
        s
    }
}

/// Default settings location: `$XDG_CONFIG_HOME/mandalaviz/settings.txt`,
/// falling back to `~/.config/mandalaviz/settings.txt`.
pub fn settings_storage_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME")
        && !xdg.trim().is_empty()
    {
        return Some(PathBuf::from(xdg).join("mandalaviz").join("settings.txt"));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("mandalaviz")
            .join("settings.txt"),
    )
}

fn parse_f64(key: &str, value: &str, line: usize) -> Result<f64, PrefsError> {
    value.parse::<f64>().map_err(|_| PrefsError::Parse {
        line,
        message: format!("{key} must be a number, got {value:?}"),
    })
}

fn parse_flag(key: &str, value: &str, line: usize) -> Result<bool, PrefsError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(PrefsError::Parse {
            line,
            message: format!("{key} must be true/false, got {value:?}"),
        }),
    }
}

fn parse_hex_color(raw: &str) -> Option<[u8; 3]> {
    let hex = raw.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}
