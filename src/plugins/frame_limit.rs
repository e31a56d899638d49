//! Frame limit plugin - Optional frame rate cap
//!
//! Physics advances once per frame, so capping the frame rate also caps the
//! simulation speed. Without a cap the app runs at the display's pace.

use crate::prelude::*;
use std::time::{Duration, Instant};

pub struct FrameLimitPlugin;

impl Plugin for FrameLimitPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, configure_frame_limiter)
            .add_systems(Last, limit_frame_rate.run_if(resource_exists::<FrameLimiter>));
    }
}

/// Sleeps away whatever is left of the frame budget at the end of each update.
#[derive(Resource, Debug, Clone)]
pub struct FrameLimiter {
    frame_duration: Duration,
    last_frame: Option<Instant>,
}

impl FrameLimiter {
    /// Returns `None` for a limit of zero, which means unlimited.
    pub fn new(frames_per_second: u32) -> Option<Self> {
        (frames_per_second > 0).then(|| Self {
            frame_duration: Duration::from_secs(1) / frames_per_second,
            last_frame: None,
        })
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Time left in the current frame's budget at `now`.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last_frame {
            Some(last) => self.frame_duration.saturating_sub(now.duration_since(last)),
            None => Duration::ZERO,
        }
    }

    fn mark(&mut self, now: Instant) {
        self.last_frame = Some(now);
    }
}

fn configure_frame_limiter(mut commands: Commands, config: Res<SimulationConfig>) {
    match config.window.frame_rate_limit.and_then(FrameLimiter::new) {
        Some(limiter) => {
            info!("Frame rate limited to {} FPS", config.window.frame_rate_limit.unwrap_or_default());
            commands.insert_resource(limiter);
        }
        None => debug!("Frame rate unlimited"),
    }
}

fn limit_frame_rate(mut limiter: ResMut<FrameLimiter>) {
    let remaining = limiter.remaining(Instant::now());
    if !remaining.is_zero() {
        std::thread::sleep(remaining);
    }
    limiter.mark(Instant::now());
}
