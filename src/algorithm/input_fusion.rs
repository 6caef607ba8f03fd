//! Decides per frame whether gaze or mouse drives the pointer.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::settings::InputSettings;

/// Mouse override of the eye tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MouseOverride {
    Idle,
    /// Mouse started moving; measures the travelled distance until `remaining` runs out.
    InitFrame {
        anchor_x: f64,
        anchor_y: f64,
        remaining: f32,
    },
    /// Mouse owns the pointer until it rests for `remaining` seconds.
    Active { remaining: f32 },
}

impl MouseOverride {
    pub fn is_active(self) -> bool {
        matches!(self, MouseOverride::Active { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionFrame {
    pub gaze_x: f64,
    pub gaze_y: f64,
    pub tracker_connected: bool,
    pub tracking: bool,
    pub mouse_x: f64,
    pub mouse_y: f64,
    pub tpf: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusedPointer {
    pub x: f64,
    pub y: f64,
    /// Coordinates come from the eye tracker.
    pub gaze_used: bool,
}

#[derive(Debug)]
pub struct InputFusion {
    settings: InputSettings,
    state: MouseOverride,
    last_mouse: Option<(f64, f64)>,
    noise: StdRng,
}

impl InputFusion {
    pub fn new(settings: &InputSettings) -> Self {
        Self {
            settings: settings.clone(),
            state: MouseOverride::Idle,
            last_mouse: None,
            noise: StdRng::seed_from_u64(settings.distortion.seed),
        }
    }

    pub fn state(&self) -> MouseOverride {
        self.state
    }

    pub fn update(&mut self, frame: FusionFrame) -> FusedPointer {
        self.advance_override(frame.mouse_x, frame.mouse_y, frame.tpf);
        self.last_mouse = Some((frame.mouse_x, frame.mouse_y));

        let gaze_emulated =
            !frame.tracker_connected || !frame.tracking || self.state.is_active();
        if gaze_emulated {
            return FusedPointer {
                x: frame.mouse_x,
                y: frame.mouse_y,
                gaze_used: false,
            };
        }

        let (x, y) = self.distort(frame.gaze_x, frame.gaze_y);
        FusedPointer {
            x,
            y,
            gaze_used: true,
        }
    }

    fn advance_override(&mut self, mouse_x: f64, mouse_y: f64, tpf: f32) {
        let moved = match self.last_mouse {
            Some((last_x, last_y)) => {
                (mouse_x - last_x).hypot(mouse_y - last_y) > self.settings.stationary_epsilon
            }
            None => false,
        };

        self.state = match self.state {
            MouseOverride::Idle if moved => {
                log::debug!("input_fusion: mouse movement, measuring override distance");
                MouseOverride::InitFrame {
                    anchor_x: mouse_x,
                    anchor_y: mouse_y,
                    remaining: self.settings.override_init_duration,
                }
            }
            MouseOverride::Idle => MouseOverride::Idle,
            MouseOverride::InitFrame {
                anchor_x,
                anchor_y,
                remaining,
            } => {
                let remaining = remaining - tpf;
                if remaining > 0.0 {
                    MouseOverride::InitFrame {
                        anchor_x,
                        anchor_y,
                        remaining,
                    }
                } else if (mouse_x - anchor_x).hypot(mouse_y - anchor_y)
                    >= self.settings.override_init_distance
                {
                    log::info!("input_fusion: mouse override active");
                    MouseOverride::Active {
                        remaining: self.settings.override_stop_duration,
                    }
                } else {
                    MouseOverride::Idle
                }
            }
            MouseOverride::Active { .. } if moved => MouseOverride::Active {
                remaining: self.settings.override_stop_duration,
            },
            MouseOverride::Active { remaining } => {
                let remaining = remaining - tpf;
                if remaining <= 0.0 {
                    log::info!("input_fusion: mouse override ended, gaze resumes");
                    MouseOverride::Idle
                } else {
                    MouseOverride::Active { remaining }
                }
            }
        };
    }

    fn distort(&mut self, x: f64, y: f64) -> (f64, f64) {
        let distortion = &self.settings.distortion;
        if !distortion.enabled {
            return (x, y);
        }

        let amplitude = distortion.noise_amplitude.abs();
        let (noise_x, noise_y) = if amplitude > 0.0 {
            (
                self.noise.gen_range(-amplitude..=amplitude),
                self.noise.gen_range(-amplitude..=amplitude),
            )
        } else {
            (0.0, 0.0)
        };

        (
            x + distortion.bias_x + noise_x,
            y + distortion.bias_y + noise_y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::DistortionSettings;

    fn settings() -> InputSettings {
        InputSettings {
            override_init_duration: 0.15,
            override_init_distance: 10.0,
            override_stop_duration: 1.0,
            stationary_epsilon: 0.5,
            distortion: DistortionSettings::default(),
        }
    }

    fn frame(mouse: (f64, f64), tpf: f32) -> FusionFrame {
        FusionFrame {
            gaze_x: 300.0,
            gaze_y: 200.0,
            tracker_connected: true,
            tracking: true,
            mouse_x: mouse.0,
            mouse_y: mouse.1,
            tpf,
        }
    }

    fn activate_override(fusion: &mut InputFusion) {
        fusion.update(frame((0.0, 0.0), 0.1));
        fusion.update(frame((5.0, 0.0), 0.1));
        fusion.update(frame((30.0, 0.0), 0.1));
        fusion.update(frame((50.0, 50.0), 0.1));
        assert!(fusion.state().is_active(), "state: {:?}", fusion.state());
    }

    #[test]
    fn disconnected_tracker_always_uses_mouse() {
        let mut fusion = InputFusion::new(&InputSettings {
            distortion: DistortionSettings {
                enabled: true,
                bias_x: 50.0,
                bias_y: 50.0,
                noise_amplitude: 3.0,
                seed: 1,
            },
            ..settings()
        });
        for step in 0..10 {
            let mut current = frame((step as f64 * 7.0, 11.0), 0.016);
            current.tracker_connected = false;
            let pointer = fusion.update(current);
            assert_eq!((pointer.x, pointer.y), (current.mouse_x, current.mouse_y));
            assert!(!pointer.gaze_used);
        }
    }

    #[test]
    fn not_tracking_falls_back_to_mouse() {
        let mut fusion = InputFusion::new(&settings());
        let mut current = frame((12.0, 13.0), 0.016);
        current.tracking = false;
        let pointer = fusion.update(current);
        assert!(!pointer.gaze_used);
        assert_eq!((pointer.x, pointer.y), (12.0, 13.0));
    }

    #[test]
    fn resting_mouse_keeps_gaze() {
        let mut fusion = InputFusion::new(&settings());
        for _ in 0..5 {
            let pointer = fusion.update(frame((10.0, 10.0), 0.1));
            assert!(pointer.gaze_used);
            assert_eq!((pointer.x, pointer.y), (300.0, 200.0));
        }
        assert_eq!(fusion.state(), MouseOverride::Idle);
    }

    #[test]
    fn deliberate_movement_activates_override() {
        let mut fusion = InputFusion::new(&settings());
        fusion.update(frame((0.0, 0.0), 0.1));
        fusion.update(frame((5.0, 0.0), 0.1));
        assert!(matches!(fusion.state(), MouseOverride::InitFrame { .. }));
        fusion.update(frame((30.0, 0.0), 0.1));
        let pointer = fusion.update(frame((50.0, 50.0), 0.1));
        assert!(fusion.state().is_active());
        assert!(!pointer.gaze_used);
        assert_eq!((pointer.x, pointer.y), (50.0, 50.0));
    }

    #[test]
    fn small_jitter_returns_to_idle() {
        let mut fusion = InputFusion::new(&settings());
        fusion.update(frame((0.0, 0.0), 0.1));
        fusion.update(frame((2.0, 0.0), 0.1));
        fusion.update(frame((3.0, 0.0), 0.1));
        fusion.update(frame((4.0, 0.0), 0.1));
        assert_eq!(fusion.state(), MouseOverride::Idle);
    }

    #[test]
    fn override_deactivates_after_stop_duration() {
        let mut fusion = InputFusion::new(&settings());
        activate_override(&mut fusion);

        // Stationary at (50, 50) with tpf = 0.4 and stop duration 1.0.
        fusion.update(frame((50.0, 50.0), 0.4));
        assert!(fusion.state().is_active());
        fusion.update(frame((50.0, 50.0), 0.4));
        assert!(fusion.state().is_active());
        let pointer = fusion.update(frame((50.0, 50.0), 0.4));
        assert_eq!(fusion.state(), MouseOverride::Idle);
        assert!(pointer.gaze_used);
    }

    #[test]
    fn movement_while_active_resets_stop_timer() {
        let mut fusion = InputFusion::new(&settings());
        activate_override(&mut fusion);
        fusion.update(frame((50.0, 50.0), 0.6));
        fusion.update(frame((80.0, 50.0), 0.6));
        fusion.update(frame((80.0, 50.0), 0.6));
        assert!(fusion.state().is_active());
    }

    #[test]
    fn transitions_follow_episode_order() {
        let mut fusion = InputFusion::new(&settings());
        let mut path = vec![(0.0, 0.0), (5.0, 0.0), (30.0, 0.0), (50.0, 50.0), (60.0, 50.0)];
        path.extend(std::iter::repeat((60.0, 50.0)).take(12));
        let mut previous = fusion.state();
        for mouse in path {
            fusion.update(frame(mouse, 0.1));
            let current = fusion.state();
            if previous.is_active() {
                assert!(
                    !matches!(current, MouseOverride::InitFrame { .. }),
                    "active override must never fall back into init frame"
                );
            }
            previous = current;
        }
        assert_eq!(fusion.state(), MouseOverride::Idle);
    }

    #[test]
    fn distortion_only_touches_gaze() {
        let mut fusion = InputFusion::new(&InputSettings {
            distortion: DistortionSettings {
                enabled: true,
                bias_x: 10.0,
                bias_y: -5.0,
                noise_amplitude: 0.0,
                seed: 3,
            },
            ..settings()
        });
        let pointer = fusion.update(frame((1.0, 1.0), 0.016));
        assert!(pointer.gaze_used);
        assert_eq!((pointer.x, pointer.y), (310.0, 195.0));
    }

    #[test]
    fn distortion_noise_is_deterministic_per_seed() {
        let distorted = InputSettings {
            distortion: DistortionSettings {
                enabled: true,
                bias_x: 0.0,
                bias_y: 0.0,
                noise_amplitude: 4.0,
                seed: 99,
            },
            ..settings()
        };
        let mut first = InputFusion::new(&distorted);
        let mut second = InputFusion::new(&distorted);
        for _ in 0..5 {
            let a = first.update(frame((1.0, 1.0), 0.016));
            let b = second.update(frame((1.0, 1.0), 0.016));
            assert_eq!(a, b);
            assert!((a.x - 300.0).abs() <= 4.0);
            assert!((a.y - 200.0).abs() <= 4.0);
        }
    }
}
