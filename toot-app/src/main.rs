//! toot - live microphone spectrum in the terminal
//!
//! A producer thread pulls microphone frames into the analyzer while the
//! main thread polls the spectrum at a fixed cadence and draws it.

mod config;

use std::fs::{self, File};
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use toot_analysis::{
    bar_level, dominant_frequency, AnalyzerConfig, Binner, SharedAnalyzer, SpectralAnalyzer,
};
use toot_audio::{AudioHost, CancellationToken, Microphone, MicrophoneSource};
use toot_tui::{BinLabel, SpectrumWidget, StatusBarWidget, Theme};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Live microphone spectrum in the terminal
#[derive(Parser, Debug, Default, PartialEq)]
#[command(name = "toot")]
#[command(version)]
struct Args {
    /// Use the input device whose name contains NAME
    #[arg(short, long, value_name = "NAME")]
    device: Option<String>,

    /// List input devices and exit
    #[arg(short, long)]
    list_devices: bool,

    /// Write the current settings to the config file and exit
    #[arg(long)]
    write_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging();

    let mut config = Config::load();
    if let Some(device) = args.device {
        config.device = device;
    }

    if args.write_config {
        let path = Config::config_path();
        config.save_to(&path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let host = AudioHost::acquire()?;

    if args.list_devices {
        for device in host.input_devices()? {
            let channels = if device.stereo { "stereo" } else { "mono" };
            println!("{} ({})", device.name, channels);
        }
        return Ok(());
    }

    let mut microphone = Microphone::open(&host, &config.device)?;
    let format = microphone.format();

    let analyzer_config =
        AnalyzerConfig::new(format.sample_rate, config.buffer_size(format.sample_rate))?;
    let binner = Binner::new(config.lower_hz, config.upper_hz, config.bins)?;
    let theme = Theme::by_name(&config.theme).unwrap_or_else(|| {
        warn!("Unknown theme {:?}, using default", config.theme);
        Theme::default()
    });

    let token = CancellationToken::new();
    let source = microphone.start(token.clone())?;
    let analyzer: SharedAnalyzer<MicrophoneSource> =
        Arc::new(SpectralAnalyzer::new(source, analyzer_config)?);

    // Spawn producer thread
    let producer = {
        let analyzer = Arc::clone(&analyzer);
        let chunk_frames = config.chunk_frames.max(1);
        thread::spawn(move || run_producer(&analyzer, chunk_frames))
    };

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let view = View {
        device: microphone.device_name().to_string(),
        binner,
        theme,
        poll: Duration::from_millis(config.poll_ms.max(1)),
    };
    let result = run_ui(&mut terminal, &analyzer, &view);

    // Cleanup: cancelling unblocks the producer's pending read
    token.cancel();
    microphone.close();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if producer.join().is_err() {
        error!("Producer thread panicked");
    }
    info!("Shut down");

    result
}

/// Log to a file so output does not tear the terminal UI
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let path = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("toot")
        .join("toot.log");

    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }

    // Best effort, run without logs if the file can't be created
    if let Ok(file) = File::create(&path) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
}

fn run_producer(analyzer: &SpectralAnalyzer<MicrophoneSource>, chunk_frames: usize) {
    let mut frames = vec![[0.0f32; 2]; chunk_frames];
    loop {
        let (_, more) = analyzer.stream_chunk(&mut frames);
        if !more {
            info!("Capture ended");
            return;
        }
    }
}

/// Fixed display settings for the UI loop
struct View {
    device: String,
    binner: Binner,
    theme: Theme,
    poll: Duration,
}

fn run_ui(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    analyzer: &SpectralAnalyzer<MicrophoneSource>,
    view: &View,
) -> anyhow::Result<()> {
    let sample_rate = analyzer.sample_rate();
    let (lower, upper) = view.binner.bounds();
    let nyquist = sample_rate as f32 / 2.0;

    let mut levels = vec![0.0f32; view.binner.bins()];
    let mut labels = vec![BinLabel::format(None); view.binner.bins()];
    let mut pitch = None;
    let mut last_frame = Instant::now();

    loop {
        // An empty spectrum means not enough data yet; keep the last frame
        let spectrum = analyzer.compute_spectrum();
        if !spectrum.is_empty() {
            levels = view
                .binner
                .bin(&spectrum)
                .into_iter()
                .map(bar_level)
                .collect();
            labels = view
                .binner
                .group_ranges(&spectrum)
                .into_iter()
                .map(BinLabel::format)
                .collect();
            pitch = dominant_frequency(&spectrum, lower, upper.min(nyquist));
        }

        let error = analyzer.is_exhausted().then_some("Input stream ended");

        terminal.draw(|frame| {
            let [spectrum_area, status_area] =
                Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());

            frame.render_widget(
                SpectrumWidget::new(&levels, &view.theme).labels(&labels),
                spectrum_area,
            );
            frame.render_widget(
                StatusBarWidget::new(&view.device, sample_rate, &view.theme)
                    .window(analyzer.buffered_len(), analyzer.buffer_size())
                    .pitch(pitch)
                    .error(error),
                status_area,
            );
        })?;

        // Any key quits
        let timeout = view.poll.saturating_sub(last_frame.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(());
                }
            }
        }

        // Maintain polling cadence
        let elapsed = last_frame.elapsed();
        if elapsed < view.poll {
            thread::sleep(view.poll - elapsed);
        }
        last_frame = Instant::now();
    }
}
