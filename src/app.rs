use crate::animator::Animator;
use crate::asset::{self, Sprite};
use crate::compose::Canvas;
use crate::config::{Config, RendererMode};
use crate::params::Params;
use crate::prefs::{StoredSettings, settings_storage_path};
use crate::render::{AsciiRenderer, Frame, HalfBlockRenderer, Renderer};
use crate::terminal::TerminalGuard;
use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Longest side of the rasterized motif sprite. Clones are drawn scaled, so
/// this only bounds sampling quality, not on-screen size.
const SPRITE_TARGET_PX: u32 = 128;

const STATUS_LINGER: Duration = Duration::from_secs(3);

struct Ui {
    show_hud: bool,
    show_help: bool,
    status: Option<(String, Instant)>,
}

impl Ui {
    fn new() -> Self {
        Self {
            show_hud: true,
            show_help: false,
            status: None,
        }
    }

    fn notify(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Instant::now()));
    }

    fn status_line(&mut self, now: Instant) -> Option<&str> {
        if let Some((_, at)) = self.status
            && now.duration_since(at) > STATUS_LINGER
        {
            self.status = None;
        }
        self.status.as_ref().map(|(s, _)| s.as_str())
    }
}

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let settings_path = if cfg.no_settings {
        None
    } else {
        settings_storage_path()
    };
    let mut settings = match StoredSettings::load(settings_path.as_deref()) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("warning: ignoring saved settings: {err}");
            StoredSettings::default()
        }
    };
    if let Some(repeats) = cfg.repeats {
        settings.params.repeats = repeats.max(1) as usize;
    }

    // Resolve the motif before touching the terminal so load errors print
    // normally. A path given on the command line must load; a stale saved
    // path falls back to the built-in motif.
    let (sprite, asset_path) = resolve_asset(&cfg, &settings)?;
    settings.asset_path = asset_path;

    let mut animator = Animator::new(settings.params.clone())?;
    animator.load_asset(sprite);

    if animator.params().audio_reactive && !animator.audio_mut().initialize(cfg.device.as_deref()) {
        let mut params = animator.params().clone();
        params.audio_reactive = false;
        let _ = animator.set_params(params);
    }

    let _term = TerminalGuard::new()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());

    let mut renderer: Box<dyn Renderer> = match cfg.renderer {
        RendererMode::HalfBlock => Box::new(HalfBlockRenderer::new()),
        RendererMode::Ascii => Box::new(AsciiRenderer::new()),
    };
    let (px_w_mul, px_h_mul) = renderer.cell_pixels();

    let mut last_size = crossterm::terminal::size().context("get terminal size")?;
    if last_size.0 < 4 || last_size.1 < 2 {
        return Err(anyhow::anyhow!(
            "terminal too small (need at least 4x2, got {}x{})",
            last_size.0,
            last_size.1
        ));
    }

    let mut ui = Ui::new();
    let mut canvas = Canvas::new(0, 0);
    let mut fps = FpsCounter::new();
    let mut dirty = false;

    loop {
        let now = Instant::now();

        // Drain input events (non-blocking).
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    if handle_key(
                        k.code,
                        k.modifiers,
                        &mut animator,
                        &mut ui,
                        cfg.device.as_deref(),
                        &mut dirty,
                    ) {
                        settings.params = animator.params().clone();
                        save_settings(&settings, settings_path.as_deref());
                        return Ok(());
                    }
                }
                Event::Resize(c, r) => {
                    last_size = (c, r);
                }
                _ => {}
            }
        }

        // Size check once per frame (resize events can be missed in some terminals).
        let sz = crossterm::terminal::size()?;
        if sz != last_size {
            last_size = sz;
        }

        let (term_cols, term_rows) = last_size;
        let hud = if ui.show_hud {
            build_hud(
                term_cols as usize,
                &animator,
                renderer.name(),
                fps.fps(),
                ui.status_line(now),
            )
        } else {
            String::new()
        };
        let hud_rows = hud_rows_for_text(term_rows, ui.show_hud, &hud);
        let visual_rows = term_rows.saturating_sub(hud_rows).max(1);
        let w = (term_cols as usize).saturating_mul(px_w_mul);
        let h = (visual_rows as usize).saturating_mul(px_h_mul);

        canvas.resize(w, h);
        animator.frame(now, &mut canvas);

        let frame = Frame {
            term_cols,
            term_rows,
            visual_rows,
            pixel_width: w,
            pixel_height: h,
            pixels_rgba: &canvas.rgba,
            hud: &hud,
            hud_rows,
            overlay: ui.show_help.then(help_popup_text),
            sync_updates: cfg.sync_updates,
        };
        renderer.render(&frame, &mut out)?;
        fps.tick();

        if dirty {
            settings.params = animator.params().clone();
            save_settings(&settings, settings_path.as_deref());
            dirty = false;
        }

        // Frame pacing.
        let target = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);
        let elapsed = now.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }
}

fn resolve_asset(
    cfg: &Config,
    settings: &StoredSettings,
) -> anyhow::Result<(Sprite, Option<PathBuf>)> {
    let remove_stroke = settings.params.remove_stroke;
    if let Some(path) = &cfg.asset {
        let sprite = asset::load(path, remove_stroke, SPRITE_TARGET_PX)
            .with_context(|| format!("load {}", path.display()))?;
        return Ok((sprite, Some(path.clone())));
    }
    if let Some(path) = &settings.asset_path {
        match asset::load(path, remove_stroke, SPRITE_TARGET_PX) {
            Ok(sprite) => return Ok((sprite, Some(path.clone()))),
            Err(err) => {
                eprintln!("warning: saved asset {}: {err}", path.display());
            }
        }
    }
    Ok((asset::builtin_motif(SPRITE_TARGET_PX), None))
}

fn save_settings(settings: &StoredSettings, path: Option<&Path>) {
    // Settings persistence is best-effort; never take the app down over it.
    let _ = settings.save(path);
}

fn handle_key(
    code: KeyCode,
    mods: KeyModifiers,
    animator: &mut Animator,
    ui: &mut Ui,
    device: Option<&str>,
    dirty: &mut bool,
) -> bool {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return true;
    }

    // Every parameter tweak stays inside validated bounds, so a clone,
    // mutate, set_params round trip cannot fail here.
    let mut tweak = |animator: &mut Animator, f: &dyn Fn(&mut Params)| {
        let mut params = animator.params().clone();
        f(&mut params);
        if animator.set_params(params).is_ok() {
            *dirty = true;
        }
    };

    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        KeyCode::Char(' ') => animator.toggle_pause(),
        KeyCode::Char(']') => tweak(animator, &|p| p.repeats = (p.repeats + 1).min(120)),
        KeyCode::Char('[') => tweak(animator, &|p| p.repeats = (p.repeats - 1).max(1)),
        KeyCode::Char('=') | KeyCode::Char('+') => {
            tweak(animator, &|p| p.size_px = (p.size_px + 4.0).min(256.0));
        }
        KeyCode::Char('-') | KeyCode::Char('_') => {
            tweak(animator, &|p| p.size_px = (p.size_px - 4.0).max(4.0));
        }
        KeyCode::Up => tweak(animator, &|p| p.radius = (p.radius + 4.0).min(400.0)),
        KeyCode::Down => tweak(animator, &|p| p.radius = (p.radius - 4.0).max(0.0)),
        KeyCode::Right => tweak(animator, &|p| {
            p.comp_speed = (p.comp_speed + 0.1).min(5.0);
        }),
        KeyCode::Left => tweak(animator, &|p| {
            p.comp_speed = (p.comp_speed - 0.1).max(0.0);
        }),
        KeyCode::Char('.') => tweak(animator, &|p| {
            p.spin_speed = (p.spin_speed + 0.1).min(5.0);
        }),
        KeyCode::Char(',') => tweak(animator, &|p| {
            p.spin_speed = (p.spin_speed - 0.1).max(0.0);
        }),
        KeyCode::Char('d') => tweak(animator, &|p| {
            p.comp_direction = p.comp_direction.flipped();
        }),
        KeyCode::Char('D') => tweak(animator, &|p| {
            p.spin_direction = p.spin_direction.flipped();
        }),
        KeyCode::Char('s') | KeyCode::Char('S') => {
            tweak(animator, &|p| p.scale_enabled = !p.scale_enabled);
        }
        KeyCode::Char('r') | KeyCode::Char('R') => {
            tweak(animator, &|p| p.radial_enabled = !p.radial_enabled);
        }
        KeyCode::Char('o') | KeyCode::Char('O') => {
            tweak(animator, &|p| p.orient_enabled = !p.orient_enabled);
        }
        KeyCode::Char('w') | KeyCode::Char('W') => {
            tweak(animator, &|p| p.wave_enabled = !p.wave_enabled);
        }
        KeyCode::Char('u') | KeyCode::Char('U') => {
            tweak(animator, &|p| p.hue_enabled = !p.hue_enabled);
        }
        KeyCode::Char('b') => {
            tweak(animator, &|p| p.bg_shift_enabled = !p.bg_shift_enabled);
        }
        KeyCode::Char('B') => {
            tweak(animator, &|p| p.bg_shift_preset = p.bg_shift_preset.next());
        }
        KeyCode::Char('m') | KeyCode::Char('M') => {
            tweak(animator, &|p| p.blend_mode = p.blend_mode.next());
        }
        KeyCode::Char('a') | KeyCode::Char('A') => {
            if animator.params().audio_reactive {
                tweak(animator, &|p| p.audio_reactive = false);
            } else if animator.audio_mut().initialize(device) {
                tweak(animator, &|p| p.audio_reactive = true);
            } else {
                let why = animator
                    .audio()
                    .last_error()
                    .unwrap_or("no input device")
                    .to_string();
                ui.notify(format!("audio unavailable: {why}"));
            }
        }
        KeyCode::Char('i') | KeyCode::Char('I') => ui.show_hud = !ui.show_hud,
        KeyCode::Char('?') | KeyCode::Char('/') | KeyCode::Char('h') | KeyCode::Char('H')
        | KeyCode::F(1) => ui.show_help = !ui.show_help,
        _ => {}
    }
    false
}

fn hud_rows_for_text(term_rows: u16, show_hud: bool, hud: &str) -> u16 {
    if !show_hud {
        return 0;
    }
    let max_rows = term_rows.saturating_sub(1);
    let wanted = hud.lines().count() as u16;
    wanted.min(max_rows)
}

fn build_hud(
    cols: usize,
    animator: &Animator,
    renderer_name: &str,
    fps: f32,
    status: Option<&str>,
) -> String {
    let p = animator.params();
    let on_off = |b: bool| if b { "on" } else { "off" };

    let mut logical_lines = vec![
        format!(
            "Repeats: {} | Size: {:.0} | Radius: {:.0} | Comp: {:.2} {} | Spin: {:.2} {} | Blend: {} | {}",
            p.repeats,
            p.size_px,
            p.radius,
            p.comp_speed,
            p.comp_direction.label(),
            p.spin_speed,
            p.spin_direction.label(),
            p.blend_mode.label(),
            if animator.is_paused() { "PAUSED" } else { "running" },
        ),
        format!(
            "Scale: {} | Radial: {} | Orient: {} | Wave: {} | Hue: {} | BgShift: {} ({}) | Audio: {} lvl {:.2} | {} | FPS: {:>4.1}",
            on_off(p.scale_enabled),
            on_off(p.radial_enabled),
            on_off(p.orient_enabled),
            on_off(p.wave_enabled),
            on_off(p.hue_enabled),
            on_off(p.bg_shift_enabled),
            p.bg_shift_preset.label(),
            on_off(p.audio_reactive),
            animator.last_audio_level(),
            renderer_name,
            fps,
        ),
        "Keys: space pause | [/] repeats | -/= size | up/down radius | left/right comp | ,/. spin | ?/h help | q quit"
            .to_string(),
    ];
    if let Some(msg) = status {
        logical_lines.push(format!("! {msg}"));
    }

    let mut out = Vec::new();
    for line in &logical_lines {
        out.extend(hard_wrap_line(line, cols.max(1)));
    }
    out.join("\n")
}

fn hard_wrap_line(line: &str, width: usize) -> Vec<String> {
    if line.is_empty() {
        return vec![String::new()];
    }

    let mut out = Vec::new();
    let mut cur = String::new();
    let mut cur_len = 0usize;
    for ch in line.chars() {
        cur.push(ch);
        cur_len += 1;
        if cur_len >= width {
            out.push(cur);
            cur = String::new();
            cur_len = 0;
        }
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

fn help_popup_text() -> &'static str {
    "Mandalaviz Hotkeys\n\
space  pause/resume\n\
[ / ]  fewer/more clones\n\
- / =  smaller/larger motif\n\
up/down  ring radius\n\
left/right  composition rotation speed\n\
, / .  clone spin speed\n\
d / D  flip composition / spin direction\n\
s  scale pulse on/off\n\
r  radial oscillation on/off\n\
o  outward orientation on/off\n\
w  tangential wave on/off\n\
u  hue drift on/off\n\
b  background shift on/off\n\
B  cycle background preset\n\
m  cycle blend mode\n\
a  audio reactivity on/off\n\
i  show/hide HUD\n\
? or / or h or F1  toggle this help\n\
q or esc  quit"
}

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = (self.frames as f32) / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
