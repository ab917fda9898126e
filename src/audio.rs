use anyhow::{Context, anyhow};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat};
use ringbuf::HeapRb;
use ringbuf::traits::{Consumer as _, Producer as _, Split as _};
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;
use std::f32::consts::PI;
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

/// Smoothed mean magnitude of the low, middle and top third of the live
/// frequency spectrum, each compressed to [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandLevels {
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
}

/// Mean magnitude per spectral third. The spectrum is split into three equal
/// contiguous bands; when the bin count is not divisible by 3 the last band
/// absorbs the remainder.
pub fn band_means(mags: &[f32]) -> [f32; 3] {
    let third = mags.len() / 3;
    if third == 0 {
        return [0.0; 3];
    }
    let mean = |s: &[f32]| s.iter().sum::<f32>() / s.len() as f32;
    [
        mean(&mags[..third]),
        mean(&mags[third..2 * third]),
        mean(&mags[2 * third..]),
    ]
}

/// Weighted average of the three band levels, scaled by sensitivity.
/// Result is in [0, sensitivity]; zero when the weights sum to zero.
pub fn weighted_level(
    bands: BandLevels,
    bass_w: f64,
    mid_w: f64,
    treble_w: f64,
    sensitivity: f64,
) -> f64 {
    let total = bass_w + mid_w + treble_w;
    if total <= 0.0 {
        return 0.0;
    }
    let weighted =
        bands.bass as f64 * bass_w + bands.mid as f64 * mid_w + bands.treble as f64 * treble_w;
    (weighted / total).clamp(0.0, 1.0) * sensitivity
}

/// Seqlock-published band snapshot: the analyzer thread stores, the render
/// loop loads one coherent value per frame without ever blocking either side.
pub struct AtomicBandLevels {
    seq: AtomicU64,
    bass: AtomicU32,
    mid: AtomicU32,
    treble: AtomicU32,
}

impl AtomicBandLevels {
    pub fn new() -> Self {
        Self {
            seq: AtomicU64::new(0),
            bass: AtomicU32::new(0),
            mid: AtomicU32::new(0),
            treble: AtomicU32::new(0),
        }
    }

    pub fn store(&self, levels: BandLevels) {
        self.seq.fetch_add(1, Ordering::Release); // odd => write in progress
        self.bass.store(levels.bass.to_bits(), Ordering::Relaxed);
        self.mid.store(levels.mid.to_bits(), Ordering::Relaxed);
        self.treble.store(levels.treble.to_bits(), Ordering::Relaxed);
        self.seq.fetch_add(1, Ordering::Release); // even => stable
    }

    pub fn load(&self) -> BandLevels {
        loop {
            let v1 = self.seq.load(Ordering::Acquire);
            if v1 & 1 == 1 {
                continue;
            }
            let snapshot = BandLevels {
                bass: f32::from_bits(self.bass.load(Ordering::Relaxed)),
                mid: f32::from_bits(self.mid.load(Ordering::Relaxed)),
                treble: f32::from_bits(self.treble.load(Ordering::Relaxed)),
            };
            if self.seq.load(Ordering::Acquire) == v1 {
                return snapshot;
            }
        }
    }
}

impl Default for AtomicBandLevels {
    fn default() -> Self {
        Self::new()
    }
}

pub fn list_input_devices() -> anyhow::Result<()> {
    let host = cpal::default_host();
    let devices = host.input_devices().context("enumerate input devices")?;

    let mut out = io::stdout();
    writeln!(out, "Input devices:")?;
    for dev in devices {
        let name = dev.name().unwrap_or_else(|_| "<unknown>".to_string());
        writeln!(out, "  - {name}")?;
    }
    Ok(())
}

/// Microphone-driven audio level source.
///
/// Capture is lazy: the engine constructs this inactive and only opens the
/// input stream when audio-reactive mode is first enabled. A failed
/// initialization (permission denial, no hardware) is a steady state: the
/// level reads 0 and the failure text is kept for the HUD; nothing retries
/// automatically.
pub struct AudioInput {
    capture: Option<CaptureSystem>,
    last_error: Option<String>,
}

impl AudioInput {
    pub fn new() -> Self {
        Self {
            capture: None,
            last_error: None,
        }
    }

    /// Open the input stream and start the analyzer. Returns whether capture
    /// is active afterwards; true immediately if it already was.
    pub fn initialize(&mut self, device_query: Option<&str>) -> bool {
        if self.capture.is_some() {
            return true;
        }
        match CaptureSystem::start(device_query) {
            Ok(capture) => {
                self.capture = Some(capture);
                self.last_error = None;
                true
            }
            Err(err) => {
                self.last_error = Some(format!("{err:#}"));
                false
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.capture.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Current audio level in [0, sensitivity]; 0 while inactive.
    pub fn level(&self, bass_w: f64, mid_w: f64, treble_w: f64, sensitivity: f64) -> f64 {
        match &self.capture {
            Some(capture) => {
                weighted_level(capture.levels.load(), bass_w, mid_w, treble_w, sensitivity)
            }
            None => 0.0,
        }
    }
}

impl Default for AudioInput {
    fn default() -> Self {
        Self::new()
    }
}

struct CaptureSystem {
    // Held for its lifetime; dropping the stream stops the cpal callback.
    _stream: cpal::Stream,
    stop: Arc<AtomicBool>,
    analyzer: Option<thread::JoinHandle<()>>,
    levels: Arc<AtomicBandLevels>,
}

impl CaptureSystem {
    fn start(device_query: Option<&str>) -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = select_input_device(&host, device_query)?;
        let supported = device
            .default_input_config()
            .context("get default input config")?;
        let channels = supported.channels() as usize;
        let sample_rate_hz = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.clone().into();

        let rb = HeapRb::<f32>::new((sample_rate_hz as usize).saturating_mul(2));
        let (mut prod, mut cons) = rb.split();

        let stop = Arc::new(AtomicBool::new(false));
        let levels = Arc::new(AtomicBandLevels::new());
        let stop_for_thread = Arc::clone(&stop);
        let levels_for_thread = Arc::clone(&levels);

        let err_fn = |err| eprintln!("audio stream error: {err}");
        let stream = match supported.sample_format() {
            SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            SampleFormat::U16 => device.build_input_stream(
                &config,
                move |data: &[u16], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            fmt => return Err(anyhow!("unsupported sample format: {fmt:?}")),
        };
        stream.play().context("start input stream")?;

        let analyzer = thread::spawn(move || {
            analyze_loop(&mut cons, &stop_for_thread, &levels_for_thread);
        });

        Ok(Self {
            _stream: stream,
            stop,
            analyzer: Some(analyzer),
            levels,
        })
    }
}

impl Drop for CaptureSystem {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.analyzer.take() {
            let _ = handle.join();
        }
    }
}

fn select_input_device(
    host: &cpal::Host,
    device_query: Option<&str>,
) -> anyhow::Result<cpal::Device> {
    if let Some(query) = device_query {
        let want = query.to_lowercase();
        let devices = host.input_devices().context("enumerate input devices")?;
        for dev in devices {
            if dev
                .name()
                .map(|n| n.to_lowercase().contains(&want))
                .unwrap_or(false)
            {
                return Ok(dev);
            }
        }
        return Err(anyhow!("no input device matching: {want}"));
    }

    host.default_input_device()
        .ok_or_else(|| anyhow!("no default input device found"))
}

fn push_interleaved<T: Sample<Float = f32> + Copy>(
    data: &[T],
    channels: usize,
    prod: &mut ringbuf::HeapProd<f32>,
) {
    for frame in data.chunks(channels.max(1)) {
        let mut acc = 0.0f32;
        for s in frame {
            acc += (*s).to_float_sample();
        }
        let _ = prod.try_push(acc / frame.len() as f32);
    }
}

/// FFT window length; at typical input rates this keeps analysis latency
/// around 20 ms while leaving enough bins for a meaningful three-way split.
const WINDOW: usize = 1024;
const HOP: usize = 256;

fn analyze_loop(cons: &mut ringbuf::HeapCons<f32>, stop: &AtomicBool, levels: &AtomicBandLevels) {
    let hann = (0..WINDOW)
        .map(|i| 0.5 - 0.5 * ((2.0 * PI * i as f32) / (WINDOW as f32)).cos())
        .collect::<Vec<_>>();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(WINDOW);
    let mut fft_buf = vec![Complex { re: 0.0, im: 0.0 }; WINDOW];
    let mut mags = vec![0.0f32; WINDOW / 2];

    let mut scratch = vec![0.0f32; WINDOW];
    let mut write_pos = 0usize;
    let mut filled = 0usize;
    let mut since_last = 0usize;
    let mut smoothed = BandLevels::default();

    while !stop.load(Ordering::Relaxed) {
        let mut got_any = false;
        while let Some(s) = cons.try_pop() {
            got_any = true;
            scratch[write_pos] = s;
            write_pos = (write_pos + 1) % WINDOW;
            if filled < WINDOW {
                filled += 1;
            }
            since_last += 1;
            if filled == WINDOW && since_last >= HOP {
                since_last = 0;

                for i in 0..WINDOW {
                    fft_buf[i].re = scratch[(write_pos + i) % WINDOW] * hann[i];
                    fft_buf[i].im = 0.0;
                }
                fft.process(&mut fft_buf);
                for (i, c) in fft_buf.iter().take(WINDOW / 2).enumerate() {
                    mags[i] = (c.re * c.re + c.im * c.im).sqrt();
                }

                let means = band_means(&mags);
                // Compress raw FFT magnitudes into [0, 1]; tanh keeps quiet
                // material responsive without letting loud peaks clip.
                let compress = |m: f32| (m * 0.02).tanh();
                smoothed.bass = smoothed.bass * 0.85 + compress(means[0]) * 0.15;
                smoothed.mid = smoothed.mid * 0.85 + compress(means[1]) * 0.15;
                smoothed.treble = smoothed.treble * 0.85 + compress(means[2]) * 0.15;
                levels.store(smoothed);
            }
        }

        if !got_any {
            thread::sleep(Duration::from_millis(1));
        }
    }
}
