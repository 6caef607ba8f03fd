//! Last known mouse position in screen pixels.
//!
//! With the `mouse-hook` feature a global rdev hook (`gazebrowse-mouse-hook`
//! thread) keeps the position current. Without it the embedding host pushes
//! positions through [`MousePosition::set`].

use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct MousePosition {
    last_pos: Arc<Mutex<(f64, f64)>>,
}

impl MousePosition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> (f64, f64) {
        match self.last_pos.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn set(&self, x: f64, y: f64) {
        match self.last_pos.lock() {
            Ok(mut guard) => *guard = (x, y),
            Err(poisoned) => *poisoned.into_inner() = (x, y),
        }
    }
}

/// Starts the global mouse hook. Runs for the lifetime of the process.
#[cfg(feature = "mouse-hook")]
pub fn spawn_mouse_hook(position: MousePosition) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("gazebrowse-mouse-hook".to_string())
        .spawn(move || {
            if let Err(e) = rdev::listen(move |event| {
                if let rdev::EventType::MouseMove { x, y } = event.event_type {
                    position.set(x, y);
                }
            }) {
                log::error!("mouse: rdev::listen error: {e:?}");
            }
        })
        .map(|_| ())
}
