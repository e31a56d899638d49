//! Display and input surface contract
//!
//! The simulation never talks to Bevy directly. It consumes [`SurfaceEvent`]s,
//! asks a [`Surface`] for the cursor position, and issues immediate-mode draw
//! calls against it. [`Canvas`] is the recording implementation: the frame
//! loop renders into it and the canvas plugin turns each presented frame into
//! entities on screen.

use crate::physics::math::{Scalar, Vector};
use crate::physics::trail::Stamp;
use bevy::prelude::*;

/// Input delivered by the display surface, in window coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SurfaceEvent {
    Closed,
    KeyPressed { code: KeyCode },
    MouseButtonPressed { button: MouseButton, position: Vector },
    MouseButtonReleased { button: MouseButton },
    CursorMoved { position: Vector },
}

impl SurfaceEvent {
    pub fn is_release(&self) -> bool {
        matches!(self, Self::MouseButtonReleased { .. })
    }

    /// Whether this event asks the frame loop to stop.
    pub fn requests_exit(&self) -> bool {
        matches!(
            self,
            Self::Closed
                | Self::KeyPressed {
                    code: KeyCode::Escape
                }
        )
    }
}

/// Filled circle with an outline drawn outside its radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleShape {
    pub center: Vector,
    pub radius: Scalar,
    pub fill_color: Color,
    pub outline_color: Color,
    pub outline_thickness: Scalar,
}

pub trait Surface {
    /// Current cursor position in window coordinates.
    fn cursor_position(&self) -> Vector;

    fn clear(&mut self, color: Color);

    fn draw_circle(&mut self, shape: &CircleShape);

    fn draw_stamp(&mut self, stamp: &Stamp);

    fn present(&mut self);
}

/// A draw call with its stacking depth; higher depths are drawn on top.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layered<T> {
    pub depth: u32,
    pub item: T,
}

/// Everything drawn between one `clear` and the following `present`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub clear_color: Option<Color>,
    pub circles: Vec<Layered<CircleShape>>,
    pub stamps: Vec<Layered<Stamp>>,
}

impl Frame {
    // Circle k sits at depth 2k + 1; stamps drawn after it sit at 2k + 2,
    // between it and the next circle.
    fn circle_depth(&self) -> u32 {
        2 * self.circles.len() as u32 + 1
    }

    fn stamp_depth(&self) -> u32 {
        2 * self.circles.len() as u32
    }

    pub fn max_depth(&self) -> u32 {
        self.circles
            .iter()
            .map(|c| c.depth)
            .chain(self.stamps.iter().map(|s| s.depth))
            .max()
            .unwrap_or(0)
    }
}

/// Recording surface shared between the frame loop and the presenter.
#[derive(Resource, Debug, Default)]
pub struct Canvas {
    cursor: Vector,
    pending: Frame,
    presented: Option<Frame>,
    frames_presented: u64,
}

impl Canvas {
    pub fn set_cursor(&mut self, position: Vector) {
        self.cursor = position;
    }

    /// The most recently presented frame, if the presenter has not taken it yet.
    pub fn presented(&self) -> Option<&Frame> {
        self.presented.as_ref()
    }

    pub fn take_presented(&mut self) -> Option<Frame> {
        self.presented.take()
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl Surface for Canvas {
    fn cursor_position(&self) -> Vector {
        self.cursor
    }

    fn clear(&mut self, color: Color) {
        self.pending = Frame {
            clear_color: Some(color),
            ..default()
        };
    }

    fn draw_circle(&mut self, shape: &CircleShape) {
        let depth = self.pending.circle_depth();
        self.pending.circles.push(Layered {
            depth,
            item: *shape,
        });
    }

    fn draw_stamp(&mut self, stamp: &Stamp) {
        let depth = self.pending.stamp_depth();
        self.pending.stamps.push(Layered {
            depth,
            item: *stamp,
        });
    }

    fn present(&mut self) {
        self.presented = Some(std::mem::take(&mut self.pending));
        self.frames_presented += 1;
    }
}
