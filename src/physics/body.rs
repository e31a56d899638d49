//! Gravitating, drawable, interactive point mass

use crate::physics::math::{Scalar, Vector, constrain, distance, magnitude};
use crate::physics::trail::{Stamp, Trail};
use crate::surface::{CircleShape, Surface, SurfaceEvent};
use bevy::color::palettes::css;
use bevy::prelude::*;

/// Closest distance used when computing gravity between two bodies.
pub const DEFAULT_MIN_DISTANCE: Scalar = 5.0;

/// Farthest distance used when computing gravity between two bodies.
pub const DEFAULT_MAX_DISTANCE: Scalar = 25.0;

/// Mouse bindings and highlight styling for a body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyControls {
    pub drag_button: MouseButton,
    pub select_button: MouseButton,
    pub highlight_thickness: Scalar,
    pub outline_color: Color,
}

impl Default for BodyControls {
    fn default() -> Self {
        Self {
            drag_button: MouseButton::Left,
            select_button: MouseButton::Right,
            highlight_thickness: 2.0,
            outline_color: css::RED.into(),
        }
    }
}

/// Clamp applied to the separation of two bodies before computing their attraction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceClamp {
    pub min: Scalar,
    pub max: Scalar,
}

impl Default for DistanceClamp {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_DISTANCE,
            max: DEFAULT_MAX_DISTANCE,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Body {
    name: String,
    position: Vector,
    velocity: Vector,
    acceleration: Vector,
    radius: Scalar,
    mass: Scalar,
    gravitational_constant: Scalar,
    fill_color: Color,
    outline_thickness: Scalar,
    controls: BodyControls,
    clamp: DistanceClamp,
    stick_to_cursor: bool,
    is_selected: bool,
    trail: Vec<Stamp>,
}

impl Body {
    /// Creates a body at rest at the origin.
    ///
    /// `gravitational_constant` is used when this body attracts another one,
    /// so two bodies with different constants pull on each other unequally.
    pub fn new(radius: Scalar, mass: Scalar, gravitational_constant: Scalar, fill_color: Color) -> Self {
        Self {
            name: String::from("body"),
            position: Vector::ZERO,
            velocity: Vector::ZERO,
            acceleration: Vector::ZERO,
            radius,
            mass,
            gravitational_constant,
            fill_color,
            outline_thickness: 0.0,
            controls: BodyControls::default(),
            clamp: DistanceClamp::default(),
            stick_to_cursor: false,
            is_selected: false,
            trail: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_controls(mut self, controls: BodyControls) -> Self {
        self.controls = controls;
        if self.is_selected {
            self.outline_thickness = controls.highlight_thickness;
        }
        self
    }

    pub fn with_distance_clamp(mut self, clamp: DistanceClamp) -> Self {
        self.clamp = clamp;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn position(&self) -> Vector {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> Vector {
        self.velocity
    }

    #[inline]
    pub fn acceleration(&self) -> Vector {
        self.acceleration
    }

    pub fn radius(&self) -> Scalar {
        self.radius
    }

    pub fn mass(&self) -> Scalar {
        self.mass
    }

    pub fn gravitational_constant(&self) -> Scalar {
        self.gravitational_constant
    }

    pub fn fill_color(&self) -> Color {
        self.fill_color
    }

    pub fn outline_thickness(&self) -> Scalar {
        self.outline_thickness
    }

    pub fn is_selected(&self) -> bool {
        self.is_selected
    }

    pub fn is_stuck_to_cursor(&self) -> bool {
        self.stick_to_cursor
    }

    /// Trail stamps, oldest first.
    pub fn trail(&self) -> &[Stamp] {
        &self.trail
    }

    pub fn shape(&self) -> CircleShape {
        CircleShape {
            center: self.position,
            radius: self.radius,
            fill_color: self.fill_color,
            outline_color: self.controls.outline_color,
            outline_thickness: self.outline_thickness,
        }
    }

    pub fn contains(&self, point: Vector) -> bool {
        distance(self.position, point) < self.radius
    }

    pub fn set_position(&mut self, x: Scalar, y: Scalar) {
        self.position = Vector::new(x, y);
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
    }

    /// Ignored while the body is held by the cursor.
    pub fn set_velocity(&mut self, velocity: Vector) {
        if !self.stick_to_cursor {
            self.velocity = velocity;
        }
    }

    /// Advances one frame and consumes the accumulated acceleration.
    pub fn integrate(&mut self) {
        self.velocity += self.acceleration;
        self.position += self.velocity;
        self.acceleration = Vector::ZERO;
    }

    /// Accumulates the pull of `other` into this body's acceleration.
    ///
    /// Every call adds another contribution; nothing is deduplicated within
    /// a frame. Bodies held by the cursor feel no gravity.
    pub fn apply_gravity_from(&mut self, other: &Body) {
        if self.stick_to_cursor {
            return;
        }

        let displacement = other.position - self.position;
        let direction = displacement.normalize_or_zero();
        let separation = constrain(magnitude(displacement), self.clamp.min, self.clamp.max);

        // F = G * m1 * m2 * n / r^2
        let force = other.gravitational_constant * self.mass * other.mass * direction
            / (separation * separation);
        self.acceleration += force / self.mass;
    }

    /// Toggles selection when the select button is pressed over the body.
    pub fn select_toggle(&mut self, event: &SurfaceEvent, surface: &impl Surface) {
        let SurfaceEvent::MouseButtonPressed { button, .. } = *event else {
            return;
        };

        if button != self.controls.select_button || !self.contains(surface.cursor_position()) {
            return;
        }

        self.is_selected = !self.is_selected;
        self.outline_thickness = if self.is_selected {
            self.controls.highlight_thickness
        } else {
            0.0
        };
        debug!("{} selected: {}", self.name, self.is_selected);
    }

    /// Drives the drag state machine.
    ///
    /// A drag-button press over the body grabs it. Once grabbed, every event
    /// other than a press pins the body to the cursor. Any release lets go.
    pub fn drag_update(&mut self, event: &SurfaceEvent, surface: &impl Surface) {
        let cursor = surface.cursor_position();

        if let SurfaceEvent::MouseButtonPressed { button, .. } = *event {
            if button == self.controls.drag_button && self.contains(cursor) {
                self.pin_to(cursor);
                if !self.stick_to_cursor {
                    debug!("{} grabbed at {cursor}", self.name);
                }
                self.stick_to_cursor = true;
            }
        } else if self.stick_to_cursor {
            self.pin_to(cursor);
        }

        if event.is_release() && self.stick_to_cursor {
            debug!("{} released at {}", self.name, self.position);
            self.stick_to_cursor = false;
        }
    }

    fn pin_to(&mut self, cursor: Vector) {
        self.position = cursor;
        self.velocity = Vector::ZERO;
        self.acceleration = Vector::ZERO;
    }

    /// Leaves a mark at the current position unless the body is being dragged.
    pub fn stamp_trail(&mut self, trail: &Trail) {
        if !self.stick_to_cursor {
            self.trail.push(trail.stamp().at(self.position));
        }
    }

    pub fn render(&self, surface: &mut impl Surface) {
        surface.draw_circle(&self.shape());

        for stamp in &self.trail {
            surface.draw_stamp(stamp);
        }
    }
}
