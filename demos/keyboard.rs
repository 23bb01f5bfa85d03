//! Play the synth from the computer keyboard.
//!
//! `zsxdcvgbhnjm` plays an octave on the harmonica and `,l.;` the four bell notes above
//! it. Esc quits.
//!
//! Most terminals only report presses and auto-repeats, so a key counts as held while
//! it keeps repeating and is released once it goes quiet for `--hold-ms`.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use key_synth::{keyboard::KeyMap, output, output::AudioOutput, Config, Synth};

#[derive(Parser, Debug)]
#[command(name = "keyboard", about = "Play the synth from the computer keyboard")]
struct Args {
    /// Sample rate in Hz
    #[arg(long, default_value_t = key_synth::DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Number of output channels
    #[arg(long, default_value_t = key_synth::DEFAULT_CHANNELS)]
    channels: u16,

    /// Fixed buffer size in frames (device default if omitted)
    #[arg(long)]
    buffer_size: Option<u32>,

    /// Scale applied to the mix
    #[arg(long, default_value_t = key_synth::DEFAULT_HEADROOM)]
    headroom: f64,

    /// How long a key counts as held after its last press or repeat, in milliseconds
    #[arg(long, default_value_t = 500)]
    hold_ms: u64,
}

fn main() -> Result<()> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cfg = Config {
        sample_rate: args.sample_rate,
        channels: args.channels,
        buffer_size: args.buffer_size,
        headroom: args.headroom,
        ..Default::default()
    };

    for name in output::output_devices()? {
        tracing::info!(device = %name, "output device");
    }

    let synth = Arc::new(Synth::new(cfg.clone())?);
    let output = AudioOutput::start(Arc::clone(&synth), &cfg)?;
    tracing::info!(device = output.device_name(), "playing; press Esc to quit");

    enable_raw_mode()?;
    let result = run(&synth, &output, Duration::from_millis(args.hold_ms));
    disable_raw_mode()?;
    println!();
    result
}

fn run(synth: &Synth, output: &AudioOutput, hold: Duration) -> Result<()> {
    let map = KeyMap::default();
    let mut last_seen: HashMap<char, Instant> = HashMap::new();
    let mut stdout = std::io::stdout();

    loop {
        if event::poll(Duration::from_millis(5))? {
            if let Event::Key(key) = event::read()? {
                match (key.code, key.kind) {
                    (KeyCode::Esc, _) => return Ok(()),
                    (KeyCode::Char(c), KeyEventKind::Release) => {
                        last_seen.remove(&c.to_ascii_lowercase());
                    }
                    (KeyCode::Char(c), _) => {
                        if let Some(binding) = map.binding(c) {
                            last_seen.insert(binding.key, Instant::now());
                        }
                    }
                    _ => {}
                }
            }
        }

        let now = Instant::now();
        last_seen.retain(|_, seen| now.duration_since(*seen) < hold);

        let changed = map.poll(synth, output.time(), |key| last_seen.contains_key(&key));
        for (binding, transition) in changed {
            tracing::debug!(key = %binding.key, id = binding.id, ?transition, "key");
        }

        write!(stdout, "\rNotes: {:<3}", synth.active_notes())?;
        stdout.flush()?;
    }
}
