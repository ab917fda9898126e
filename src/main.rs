use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cfg = mandalaviz::config::Config::parse();
    if cfg.list_devices {
        mandalaviz::audio::list_input_devices()?;
        return Ok(());
    }

    mandalaviz::app::run(cfg)
}
