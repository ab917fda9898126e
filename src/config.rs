use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "mandalaviz",
    version,
    about = "Radially repeated motif animator for the terminal"
)]
pub struct Config {
    /// Image to repeat around the ring (SVG or raster). Falls back to the
    /// saved asset, then to the built-in motif.
    pub asset: Option<PathBuf>,

    /// Override the saved clone count.
    #[arg(long)]
    pub repeats: Option<u32>,

    #[arg(long, value_enum, default_value_t = RendererMode::HalfBlock)]
    pub renderer: RendererMode,

    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Substring match against input device names.
    #[arg(long)]
    pub device: Option<String>,

    #[arg(long, default_value_t = false)]
    pub list_devices: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    /// Skip loading and saving settings; start from defaults.
    #[arg(long, default_value_t = false)]
    pub no_settings: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererMode {
    #[value(alias = "ansi", alias = "text")]
    Ascii,
    #[value(name = "half-block", alias = "halfblock", alias = "half_block", alias = "hb")]
    HalfBlock,
}
