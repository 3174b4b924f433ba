mod alarm;
mod sound;
mod timer;
mod ui;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use env_logger::Env;

use crate::sound::{SelectedSound, SoundSourceKind, select_backend};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliSoundSource {
    Auto,
    Clip,
    Synth,
    Mute,
}

impl From<CliSoundSource> for SoundSourceKind {
    fn from(value: CliSoundSource) -> Self {
        match value {
            CliSoundSource::Auto => SoundSourceKind::Auto,
            CliSoundSource::Clip => SoundSourceKind::Clip,
            CliSoundSource::Synth => SoundSourceKind::Synth,
            CliSoundSource::Mute => SoundSourceKind::Mute,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "chime",
    version,
    about = "Desktop alarm and countdown timer with a looping chime"
)]
struct Cli {
    #[arg(long, default_value = "sound.wav")]
    sound: PathBuf,

    #[arg(long, value_enum, default_value_t = CliSoundSource::Auto)]
    sound_source: CliSoundSource,

    #[arg(long, default_value_t = 1_000)]
    tick_ms: u64,

    #[arg(long, default_value_t = 0.8)]
    volume: f32,

    #[arg(long)]
    check: bool,
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    if cli.tick_ms == 0 {
        bail!("--tick-ms must be greater than zero");
    }
    if !(0.0..=1.0).contains(&cli.volume) {
        bail!("--volume must be between 0.0 and 1.0");
    }

    let selected = select_backend(cli.sound_source.into(), &cli.sound, cli.volume)
        .with_context(|| {
            format!(
                "failed to initialize sound backend from {}",
                cli.sound.display()
            )
        })?;
    log::info!("sound backend: {}", selected.label);

    if cli.check {
        run_check(&selected, cli.tick_ms);
        return Ok(());
    }

    ui::app::run_gui(selected, Duration::from_millis(cli.tick_ms))
}

fn run_check(selected: &SelectedSound, tick_ms: u64) {
    println!("Chime startup check");
    println!("Selected sound backend: {}", selected.label);
    if let Some(reason) = selected.fallback_reason.as_deref() {
        println!("Fallback reason: {reason}");
    }
    println!("Poll interval: {tick_ms} ms");
}
