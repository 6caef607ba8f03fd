pub mod algorithm;
pub mod bridge;
pub mod master;
pub mod models;
pub mod pipeline;
pub mod tab;
pub mod tracker;

use std::path::PathBuf;
use std::time::Duration;

use master::Master;
use models::settings::Settings;
use tracker::mouse::MousePosition;

fn load_settings() -> Settings {
    let path = match std::env::args_os().nth(1) {
        Some(arg) => Ok(PathBuf::from(arg)),
        None => Settings::default_path(),
    };
    let loaded = path.and_then(|path| {
        log::info!("settings: {}", path.display());
        Settings::load_or_create(&path)
    });
    match loaded {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("settings: {e}, using defaults");
            Settings::default()
        }
    }
}

#[cfg(feature = "mouse-hook")]
fn start_mouse_hook(mouse: &MousePosition) {
    if let Err(e) = tracker::mouse::spawn_mouse_hook(mouse.clone()) {
        log::error!("mouse: failed to start hook thread: {e}");
    }
}

#[cfg(not(feature = "mouse-hook"))]
fn start_mouse_hook(_mouse: &MousePosition) {
    log::info!("mouse: built without mouse-hook, pointer stays at its last set position");
}

pub fn run() {
    env_logger::init();

    let settings = load_settings();
    let mouse = MousePosition::new();
    start_mouse_hook(&mouse);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("error while building the frame loop runtime");

    runtime.block_on(async move {
        let fps = settings.window.frames_per_second.max(1);
        let start_url = settings.window.start_url.clone();
        let mut master = Master::start(settings, mouse);
        master.open_tab(&start_url);

        let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / fps as f64));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut last_frame = tokio::time::Instant::now();
        let mut frames: u64 = 0;
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        log::info!("master: running at {fps} fps, ctrl-c to quit");
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let now = tokio::time::Instant::now();
                    let tpf = now.duration_since(last_frame).as_secs_f32();
                    last_frame = now;
                    master.frame(tpf, false);
                    frames += 1;
                }
                _ = &mut ctrl_c => {
                    log::info!("master: shutting down after {frames} frames");
                    break;
                }
            }
        }
    });
}
