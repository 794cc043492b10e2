//! slat: an always-on-top status bar strip.
//!
//! Single-threaded: one loop services platform events, the refresh and
//! fullscreen-watcher timers, the fade animation, and rendering. Metric
//! queries are cheap enough that nothing here warrants a worker thread.

use std::process::ExitCode;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use slat_bar::platform::NativeBar;
use slat_bar::{StatusBar, Tray, logging, signals};
use slat_core::{BarConfig, FadeController, SystemSampler, Visibility};

/// Minimum spacing between commits; ticks land on 1 s boundaries anyway
const FRAME_INTERVAL: Duration = Duration::from_millis(16);
/// Sleep between loop iterations to keep idle CPU near zero
const IDLE_SLEEP: Duration = Duration::from_millis(1);

fn main() -> ExitCode {
    let _log_guard = logging::init();

    let config = BarConfig::load();
    signals::install();

    let mut bar = match StatusBar::<NativeBar>::new(&config) {
        Ok(bar) => bar,
        Err(e) => {
            error!("failed to create bar window: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Non-fatal: without the reservation maximized windows overlap the bar
    if let Err(e) = bar.reserve_work_area() {
        warn!("could not reserve work area: {}", e);
    }

    let tray = match Tray::new(&config) {
        Ok(tray) => Some(tray),
        Err(e) => {
            warn!("tray unavailable, exit via signals only: {}", e);
            None
        }
    };

    let mut sampler = SystemSampler::new();
    let mut fade = FadeController::new(config.fade_duration());

    // First labels before the first paint, not a refresh interval later
    bar.refresh(&mut sampler);

    let refresh_interval = config.refresh_interval();
    let watch_interval = config.fullscreen_poll();

    let mut last_refresh = Instant::now();
    let mut last_watch = Instant::now();
    let mut last_frame = Instant::now() - FRAME_INTERVAL;

    info!("slat running");

    loop {
        if !bar.poll_events() {
            info!("bar window closed");
            break;
        }
        if signals::exit_requested() {
            info!("exit signal received");
            break;
        }
        if tray.as_ref().is_some_and(|t| t.exit_requested()) {
            info!("exit selected from tray");
            break;
        }

        let now = Instant::now();

        if now.duration_since(last_refresh) >= refresh_interval {
            last_refresh = now;
            bar.refresh(&mut sampler);
        }

        if now.duration_since(last_watch) >= watch_interval {
            last_watch = now;
            let target = if bar.fullscreen_active() {
                Visibility::Hidden
            } else {
                Visibility::Visible
            };
            if target != fade.target() || !fade.is_animating() {
                fade.set_target(target, now);
            }
        }

        bar.set_opacity(fade.tick(now));

        if now.duration_since(last_frame) >= FRAME_INTERVAL {
            last_frame = now;
            bar.render();
        }

        std::thread::sleep(IDLE_SLEEP);
    }

    // Every exit path funnels through here; Drop covers the panicky ones
    if let Err(e) = bar.restore_work_area() {
        error!("failed to restore work area: {}", e);
    }

    info!("slat stopped");
    ExitCode::SUCCESS
}
