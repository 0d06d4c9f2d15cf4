use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use media_capture::{CaptureProvider, DeniedCaptureProvider, StagedCaptureProvider};
use session_core::{SessionController, SessionSurface};
use shared::domain::{ChatSender, Panel};
use tracing::info;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
struct Args {
    /// Display name shown to the fake peer.
    #[arg(long, default_value = "Guest")]
    name: String,
    /// Settings file; defaults to ./demo.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Simulate the user refusing camera/microphone access.
    #[arg(long)]
    deny_capture: bool,
    /// Switch to the next peer every N seconds until the paywall locks.
    #[arg(long)]
    switch_every_secs: Option<u64>,
}

/// Renders session surface calls as terminal lines.
struct TerminalSurface {
    videos: Vec<String>,
}

impl SessionSurface for TerminalSurface {
    fn set_video_source(&self, index: usize) {
        let source = self
            .videos
            .get(index)
            .map(String::as_str)
            .unwrap_or("<missing>");
        println!("[video] now playing {source}");
    }

    fn show_panel(&self, panel: Panel) {
        println!("[ui] show {panel:?}");
    }

    fn hide_panel(&self, panel: Panel) {
        println!("[ui] hide {panel:?}");
    }

    fn render_message(&self, sender: ChatSender, text: &str) {
        let tag = match sender {
            ChatSender::User => "you",
            ChatSender::Remote => "peer",
        };
        println!("[chat] {tag}: {text}");
    }

    fn clear_messages(&self) {
        println!("[chat] (cleared)");
    }

    fn set_timer_text(&self, text: &str) {
        println!("[timer] {text}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let settings = load_settings(args.config.as_deref())?;
    let session_config = settings.session_config()?;

    let surface = Arc::new(TerminalSurface {
        videos: settings.videos.clone(),
    });
    let capture: Arc<dyn CaptureProvider> = if args.deny_capture {
        Arc::new(DeniedCaptureProvider)
    } else {
        Arc::new(StagedCaptureProvider)
    };

    let mut session = SessionController::new(session_config, surface, capture);
    if let Err(err) = session.start(&args.name) {
        // Denial is surfaced to the user and nothing else happens.
        eprintln!("{err}");
        return Ok(());
    }

    let step = Duration::from_millis(100);
    let mut pump = tokio::time::interval(step);
    let mut since_switch = Duration::ZERO;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, ending session");
                break;
            }
            _ = pump.tick() => {
                session.advance(step);
                since_switch += step;

                if let Some(every) = args.switch_every_secs {
                    if since_switch >= Duration::from_secs(every) && !session.is_locked() {
                        since_switch = Duration::ZERO;
                        session.switch_peer();
                    }
                }

                if session.is_locked() {
                    info!("paywall reached, demo finished");
                    break;
                }
            }
        }
    }

    Ok(())
}
