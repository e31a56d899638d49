//! Frame loop state: bodies, trail prototypes, and who pulls on whom

use crate::config::SimulationConfig;
use crate::physics::body::Body;
use crate::physics::math::{Scalar, Vector};
use crate::physics::trail::Trail;
use crate::surface::{Surface, SurfaceEvent};
use bevy::prelude::*;
use std::fmt;

/// Index of a body in construction order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TrailId(pub usize);

/// Explicit list of attractors pulling on one receiver each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Interaction {
    pub receiver: BodyId,
    pub attractors: Vec<BodyId>,
    pub trail: Option<TrailId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioError {
    UnknownBody(String),
    UnknownTrail(TrailId),
    DuplicateBody(String),
    DuplicateReceiver(String),
    SelfAttraction(String),
    InvalidBody { name: String, reason: &'static str },
    InvalidClamp { min: Scalar, max: Scalar },
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioError::UnknownBody(name) => write!(f, "unknown body '{name}'"),
            ScenarioError::UnknownTrail(id) => write!(f, "unknown trail #{}", id.0),
            ScenarioError::DuplicateBody(name) => write!(f, "body '{name}' is defined twice"),
            ScenarioError::DuplicateReceiver(name) => {
                write!(f, "body '{name}' has more than one interaction list")
            }
            ScenarioError::SelfAttraction(name) => write!(f, "body '{name}' cannot attract itself"),
            ScenarioError::InvalidBody { name, reason } => write!(f, "body '{name}': {reason}"),
            ScenarioError::InvalidClamp { min, max } => write!(
                f,
                "distance clamp [{min}, {max}] needs 0 < min_distance <= max_distance"
            ),
        }
    }
}

impl std::error::Error for ScenarioError {}

#[derive(Resource, Clone, Debug)]
pub struct Simulation {
    bodies: Vec<Body>,
    trails: Vec<Trail>,
    interactions: Vec<Interaction>,
    dispatch_order: Vec<BodyId>,
    render_order: Vec<BodyId>,
    background: Color,
    frame_count: u64,
}

impl Simulation {
    pub fn new(background: Color) -> Self {
        Self {
            bodies: Vec::new(),
            trails: Vec::new(),
            interactions: Vec::new(),
            dispatch_order: Vec::new(),
            render_order: Vec::new(),
            background,
            frame_count: 0,
        }
    }

    /// Builds the scenario described by `config`, placing bodies relative to
    /// the center of a window of `window_size`.
    pub fn from_config(config: &SimulationConfig, window_size: Vector) -> Result<Self, ScenarioError> {
        let center = window_size / 2.0;
        let controls = config.interaction.controls();
        let clamp = config.physics.distance_clamp();
        validate_clamp(clamp.min, clamp.max)?;
        let mut simulation = Self::new(config.window.background.into());

        for body_config in &config.scenario.bodies {
            validate_body(&body_config.name, body_config.radius, body_config.mass)?;
            if simulation.find(&body_config.name).is_some() {
                return Err(ScenarioError::DuplicateBody(body_config.name.clone()));
            }

            let mut body = Body::new(
                body_config.radius,
                body_config.mass,
                body_config.gravitational_constant,
                body_config.color.into(),
            )
            .with_name(&body_config.name)
            .with_controls(controls)
            .with_distance_clamp(clamp);

            let position = center + Vector::from(body_config.offset);
            body.set_position(position.x, position.y);
            body.set_velocity(Vector::from(body_config.velocity));
            simulation.add_body(body);
        }

        for attraction in &config.scenario.interactions {
            let receiver = simulation.resolve(&attraction.receiver)?;
            let attractors = attraction
                .attractors
                .iter()
                .map(|name| simulation.resolve(name))
                .collect::<Result<Vec<_>, _>>()?;

            let trail = config
                .scenario
                .bodies
                .iter()
                .find(|body| body.name == attraction.receiver)
                .and_then(|body| body.trail)
                .map(|color| simulation.add_trail(Trail::new(color.into())));

            simulation.attract(receiver, attractors, trail)?;
        }

        let dispatch_order = simulation.resolve_all(&config.scenario.dispatch_order)?;
        simulation.set_dispatch_order(dispatch_order);
        let render_order = simulation.resolve_all(&config.scenario.render_order)?;
        simulation.set_render_order(render_order);

        info!(
            "Simulation ready: {} bodies, {} moving, {} interactive",
            simulation.bodies.len(),
            simulation.interactions.len(),
            simulation.dispatch_order.len()
        );

        Ok(simulation)
    }

    pub fn add_body(&mut self, body: Body) -> BodyId {
        self.bodies.push(body);
        BodyId(self.bodies.len() - 1)
    }

    pub fn add_trail(&mut self, trail: Trail) -> TrailId {
        self.trails.push(trail);
        TrailId(self.trails.len() - 1)
    }

    /// Makes `receiver` a moving body pulled by `attractors`, in that order.
    pub fn attract(
        &mut self,
        receiver: BodyId,
        attractors: Vec<BodyId>,
        trail: Option<TrailId>,
    ) -> Result<(), ScenarioError> {
        let name = self.name_of(receiver)?.to_owned();

        if self.interactions.iter().any(|i| i.receiver == receiver) {
            return Err(ScenarioError::DuplicateReceiver(name));
        }
        for &attractor in &attractors {
            self.name_of(attractor)?;
            if attractor == receiver {
                return Err(ScenarioError::SelfAttraction(name));
            }
        }
        if let Some(trail) = trail.filter(|trail| trail.0 >= self.trails.len()) {
            return Err(ScenarioError::UnknownTrail(trail));
        }

        self.interactions.push(Interaction {
            receiver,
            attractors,
            trail,
        });
        Ok(())
    }

    pub fn set_dispatch_order(&mut self, order: Vec<BodyId>) {
        self.dispatch_order = order;
    }

    pub fn set_render_order(&mut self, order: Vec<BodyId>) {
        self.render_order = order;
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.0)
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn find(&self, name: &str) -> Option<BodyId> {
        self.bodies
            .iter()
            .position(|body| body.name() == name)
            .map(BodyId)
    }

    pub fn body_by_name(&self, name: &str) -> Option<&Body> {
        self.find(name).and_then(|id| self.body(id))
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Bodies that only ever act as attractors.
    pub fn stationary(&self) -> impl Iterator<Item = BodyId> + '_ {
        (0..self.bodies.len())
            .map(BodyId)
            .filter(|id| !self.is_receiver(*id))
    }

    fn is_receiver(&self, id: BodyId) -> bool {
        self.interactions.iter().any(|i| i.receiver == id)
    }

    fn name_of(&self, id: BodyId) -> Result<&str, ScenarioError> {
        self.body(id)
            .map(Body::name)
            .ok_or_else(|| ScenarioError::UnknownBody(format!("#{}", id.0)))
    }

    fn resolve(&self, name: &str) -> Result<BodyId, ScenarioError> {
        self.find(name)
            .ok_or_else(|| ScenarioError::UnknownBody(name.to_owned()))
    }

    fn resolve_all(&self, names: &[String]) -> Result<Vec<BodyId>, ScenarioError> {
        names.iter().map(|name| self.resolve(name)).collect()
    }

    /// Forwards one input event to every interactive body.
    pub fn handle_event(&mut self, event: &SurfaceEvent, surface: &impl Surface) -> LoopControl {
        for id in &self.dispatch_order {
            if let Some(body) = self.bodies.get_mut(id.0) {
                body.drag_update(event, surface);
                body.select_toggle(event, surface);
            }
        }

        if event.requests_exit() {
            LoopControl::Exit
        } else {
            LoopControl::Continue
        }
    }

    /// Advances physics by one frame.
    ///
    /// Stationary bodies integrate first. Each receiver then gathers gravity,
    /// integrates and stamps its trail before the next receiver runs, so later
    /// receivers see the updated positions of earlier ones.
    pub fn step(&mut self) {
        let stationary: Vec<BodyId> = self.stationary().collect();
        for id in stationary {
            self.bodies[id.0].integrate();
        }

        for interaction in &self.interactions {
            for &attractor in &interaction.attractors {
                let (receiver, source) = pair_mut(&mut self.bodies, interaction.receiver, attractor);
                receiver.apply_gravity_from(source);
            }

            let receiver = &mut self.bodies[interaction.receiver.0];
            receiver.integrate();
            if let Some(trail) = interaction.trail {
                receiver.stamp_trail(&self.trails[trail.0]);
            }
        }

        self.frame_count += 1;
    }

    pub fn render(&self, surface: &mut impl Surface) {
        surface.clear(self.background);

        for id in &self.render_order {
            if let Some(body) = self.bodies.get(id.0) {
                body.render(surface);
            }
        }

        surface.present();
    }

    /// Runs one full iteration: dispatch input, step, render.
    pub fn frame<S: Surface>(
        &mut self,
        events: impl IntoIterator<Item = SurfaceEvent>,
        surface: &mut S,
    ) -> LoopControl {
        let mut control = LoopControl::Continue;
        for event in events {
            if self.handle_event(&event, &*surface) == LoopControl::Exit {
                control = LoopControl::Exit;
            }
        }

        if control == LoopControl::Exit {
            return control;
        }

        self.step();
        self.render(surface);
        control
    }
}

fn validate_body(name: &str, radius: Scalar, mass: Scalar) -> Result<(), ScenarioError> {
    let invalid = |reason| {
        Err(ScenarioError::InvalidBody {
            name: name.to_owned(),
            reason,
        })
    };

    if !(radius.is_finite() && radius > 0.0) {
        return invalid("radius must be positive");
    }
    if !(mass.is_finite() && mass > 0.0) {
        return invalid("mass must be positive");
    }
    Ok(())
}

// The lower bound keeps the gravity divisor away from zero.
fn validate_clamp(min: Scalar, max: Scalar) -> Result<(), ScenarioError> {
    if min.is_finite() && max.is_finite() && min > 0.0 && max >= min {
        Ok(())
    } else {
        Err(ScenarioError::InvalidClamp { min, max })
    }
}

/// Borrows the receiver mutably and the source immutably from the same slice.
fn pair_mut(bodies: &mut [Body], receiver: BodyId, source: BodyId) -> (&mut Body, &Body) {
    debug_assert_ne!(receiver, source);

    if receiver.0 < source.0 {
        let (head, tail) = bodies.split_at_mut(source.0);
        (&mut head[receiver.0], &tail[0])
    } else {
        let (head, tail) = bodies.split_at_mut(receiver.0);
        (&mut tail[0], &head[source.0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AttractionConfig, BodyConfig, Rgba};
    use crate::surface::Canvas;

    const WINDOW: Vector = Vector::new(1920.0, 1080.0);
    const EPSILON: Scalar = 1e-4;

    fn default_simulation() -> Simulation {
        Simulation::from_config(&SimulationConfig::default(), WINDOW)
            .expect("default scenario should be valid")
    }

    fn id(simulation: &Simulation, name: &str) -> BodyId {
        simulation.find(name).expect("body should exist")
    }

    fn press_left_at(canvas: &mut Canvas, position: Vector) -> SurfaceEvent {
        canvas.set_cursor(position);
        SurfaceEvent::MouseButtonPressed {
            button: MouseButton::Left,
            position,
        }
    }

    #[test]
    fn test_default_scenario_layout() {
        let simulation = default_simulation();

        let sun = simulation.body_by_name("sun").unwrap();
        let earth = simulation.body_by_name("earth").unwrap();
        let planet = simulation.body_by_name("planet").unwrap();

        assert_eq!(sun.position(), Vector::new(960.0, 540.0));
        assert_eq!(earth.position(), Vector::new(1260.0, 340.0));
        assert_eq!(planet.position(), Vector::new(660.0, 740.0));
        assert_eq!(earth.velocity(), Vector::new(2.0, 0.0));
        assert_eq!(planet.velocity(), Vector::new(-2.0, 0.0));
        assert_eq!(simulation.background(), Color::WHITE);

        let stationary: Vec<BodyId> = simulation.stationary().collect();
        assert_eq!(stationary, vec![id(&simulation, "sun")]);

        let receivers: Vec<BodyId> = simulation.interactions().iter().map(|i| i.receiver).collect();
        assert_eq!(receivers, vec![id(&simulation, "earth"), id(&simulation, "planet")]);
    }

    #[test]
    fn test_sun_never_moves() {
        let mut simulation = default_simulation();

        for _ in 0..100 {
            simulation.step();
        }

        let sun = simulation.body_by_name("sun").unwrap();
        assert_eq!(sun.position(), Vector::new(960.0, 540.0));
        assert!(sun.trail().is_empty());
    }

    #[test]
    fn test_trails_grow_one_stamp_per_frame() {
        let mut simulation = default_simulation();

        for _ in 0..10 {
            simulation.step();
        }

        assert_eq!(simulation.body_by_name("earth").unwrap().trail().len(), 10);
        assert_eq!(simulation.body_by_name("planet").unwrap().trail().len(), 10);
        assert_eq!(simulation.frame_count(), 10);
    }

    #[test]
    fn test_step_order_matches_explicit_list() {
        let mut simulation = default_simulation();
        let mut earth = simulation.body_by_name("earth").unwrap().clone();
        let mut planet = simulation.body_by_name("planet").unwrap().clone();
        let sun = simulation.body_by_name("sun").unwrap().clone();

        earth.apply_gravity_from(&planet);
        earth.apply_gravity_from(&sun);
        earth.integrate();
        // The planet is pulled towards where the earth is after its update
        planet.apply_gravity_from(&earth);
        planet.apply_gravity_from(&sun);
        planet.integrate();

        simulation.step();

        let stepped_earth = simulation.body_by_name("earth").unwrap();
        let stepped_planet = simulation.body_by_name("planet").unwrap();
        assert!((stepped_earth.position() - earth.position()).length() < EPSILON);
        assert!((stepped_planet.position() - planet.position()).length() < EPSILON);
        assert!((stepped_planet.velocity() - planet.velocity()).length() < EPSILON);
    }

    #[test]
    fn test_dragging_pauses_trail_and_physics() {
        let mut simulation = default_simulation();
        let mut canvas = Canvas::default();
        let earth_id = id(&simulation, "earth");
        let grab = press_left_at(&mut canvas, Vector::new(1265.0, 345.0));

        simulation.handle_event(&grab, &canvas);
        simulation.step();
        simulation.step();

        let earth = simulation.body(earth_id).unwrap();
        assert!(earth.is_stuck_to_cursor());
        assert_eq!(earth.position(), Vector::new(1265.0, 345.0));
        assert_eq!(earth.velocity(), Vector::ZERO);
        assert!(earth.trail().is_empty());

        // Other bodies keep moving and stamping
        assert_eq!(simulation.body_by_name("planet").unwrap().trail().len(), 2);

        simulation.handle_event(
            &SurfaceEvent::MouseButtonReleased {
                button: MouseButton::Left,
            },
            &canvas,
        );
        simulation.step();
        assert_eq!(simulation.body(earth_id).unwrap().trail().len(), 1);
    }

    #[test]
    fn test_sun_ignores_mouse() {
        let mut simulation = default_simulation();
        let mut canvas = Canvas::default();
        let grab = press_left_at(&mut canvas, Vector::new(960.0, 540.0));

        simulation.handle_event(&grab, &canvas);
        simulation.handle_event(
            &SurfaceEvent::MouseButtonPressed {
                button: MouseButton::Right,
                position: Vector::new(960.0, 540.0),
            },
            &canvas,
        );

        let sun = simulation.body_by_name("sun").unwrap();
        assert!(!sun.is_stuck_to_cursor());
        assert!(!sun.is_selected());
    }

    #[test]
    fn test_exit_events() {
        let mut simulation = default_simulation();
        let canvas = Canvas::default();

        assert_eq!(
            simulation.handle_event(&SurfaceEvent::Closed, &canvas),
            LoopControl::Exit
        );
        assert_eq!(
            simulation.handle_event(
                &SurfaceEvent::KeyPressed {
                    code: KeyCode::Escape
                },
                &canvas
            ),
            LoopControl::Exit
        );
        assert_eq!(
            simulation.handle_event(
                &SurfaceEvent::KeyPressed {
                    code: KeyCode::Enter
                },
                &canvas
            ),
            LoopControl::Continue
        );
    }

    #[test]
    fn test_frame_steps_and_renders() {
        let mut simulation = default_simulation();
        let mut canvas = Canvas::default();

        let control = simulation.frame(Vec::new(), &mut canvas);

        assert_eq!(control, LoopControl::Continue);
        assert_eq!(simulation.frame_count(), 1);
        let frame = canvas.take_presented().expect("frame should be presented");
        assert_eq!(frame.clear_color, Some(Color::WHITE));
        let fills: Vec<Color> = frame.circles.iter().map(|c| c.item.fill_color).collect();
        assert_eq!(
            fills,
            vec![
                Color::from(Rgba::rgb(253, 184, 19)),
                Color::from(Rgba::rgb(0, 255, 255)),
                Color::from(Rgba::rgb(255, 0, 255)),
            ]
        );
        assert_eq!(frame.stamps.len(), 2);
    }

    #[test]
    fn test_frame_stops_on_exit() {
        let mut simulation = default_simulation();
        let mut canvas = Canvas::default();

        let control = simulation.frame([SurfaceEvent::Closed], &mut canvas);

        assert_eq!(control, LoopControl::Exit);
        assert_eq!(simulation.frame_count(), 0);
        assert!(canvas.presented().is_none());
    }

    #[test]
    fn test_unknown_body_in_interactions() {
        let mut config = SimulationConfig::default();
        config.scenario.interactions.push(AttractionConfig {
            receiver: String::from("moon"),
            attractors: vec![String::from("earth")],
        });

        let error = Simulation::from_config(&config, WINDOW).unwrap_err();
        assert_eq!(error, ScenarioError::UnknownBody(String::from("moon")));
    }

    #[test]
    fn test_unknown_body_in_render_order() {
        let mut config = SimulationConfig::default();
        config.scenario.render_order.push(String::from("pluto"));

        assert!(matches!(
            Simulation::from_config(&config, WINDOW),
            Err(ScenarioError::UnknownBody(name)) if name == "pluto"
        ));
    }

    #[test]
    fn test_self_attraction_rejected() {
        let mut config = SimulationConfig::default();
        config.scenario.interactions[0].attractors.push(String::from("earth"));

        assert_eq!(
            Simulation::from_config(&config, WINDOW).unwrap_err(),
            ScenarioError::SelfAttraction(String::from("earth"))
        );
    }

    #[test]
    fn test_duplicate_body_rejected() {
        let mut config = SimulationConfig::default();
        let sun = config.scenario.bodies[0].clone();
        config.scenario.bodies.push(sun);

        assert_eq!(
            Simulation::from_config(&config, WINDOW).unwrap_err(),
            ScenarioError::DuplicateBody(String::from("sun"))
        );
    }

    #[test]
    fn test_zero_min_distance_rejected() {
        let mut config = SimulationConfig::default();
        config.physics.min_distance = 0.0;

        assert_eq!(
            Simulation::from_config(&config, WINDOW).unwrap_err(),
            ScenarioError::InvalidClamp { min: 0.0, max: 25.0 }
        );
    }

    #[test]
    fn test_inverted_or_non_finite_clamp_rejected() {
        let mut inverted = SimulationConfig::default();
        inverted.physics.min_distance = 30.0;
        inverted.physics.max_distance = 10.0;
        assert!(matches!(
            Simulation::from_config(&inverted, WINDOW),
            Err(ScenarioError::InvalidClamp { .. })
        ));

        let mut unbounded = SimulationConfig::default();
        unbounded.physics.max_distance = Scalar::INFINITY;
        assert!(matches!(
            Simulation::from_config(&unbounded, WINDOW),
            Err(ScenarioError::InvalidClamp { .. })
        ));
    }

    #[test]
    fn test_coincident_bodies_stay_finite() {
        let mut simulation = Simulation::new(Color::WHITE);
        let attractor = simulation.add_body(Body::new(10.0, 10.0, 1.0, Color::BLACK));
        let receiver = simulation.add_body(Body::new(10.0, 10.0, 1.0, Color::BLACK));
        simulation.attract(receiver, vec![attractor], None).unwrap();

        simulation.step();

        let body = simulation.body(receiver).unwrap();
        assert!(body.position().is_finite());
        assert!(body.velocity().is_finite());
    }

    #[test]
    fn test_invalid_mass_rejected() {
        let mut config = SimulationConfig::default();
        config.scenario.bodies.push(BodyConfig {
            name: String::from("ghost"),
            radius: 10.0,
            mass: 0.0,
            gravitational_constant: 1.0,
            color: Rgba::rgb(0, 0, 0),
            offset: [0.0, 0.0],
            velocity: [0.0, 0.0],
            trail: None,
        });

        let error = Simulation::from_config(&config, WINDOW).unwrap_err();
        assert_eq!(error.to_string(), "body 'ghost': mass must be positive");
    }

    #[test]
    fn test_programmatic_setup() {
        let mut simulation = Simulation::new(Color::BLACK);
        let attractor = simulation.add_body(Body::new(10.0, 10.0, 0.01, Color::WHITE).with_name("a"));
        let mut moving = Body::new(10.0, 10.0, 0.01, Color::WHITE).with_name("b");
        moving.set_position(10.0, 0.0);
        let receiver = simulation.add_body(moving);
        let trail = simulation.add_trail(Trail::new(Color::WHITE));

        simulation
            .attract(receiver, vec![attractor], Some(trail))
            .expect("interaction should be valid");
        assert_eq!(
            simulation.attract(receiver, vec![attractor], None),
            Err(ScenarioError::DuplicateReceiver(String::from("b")))
        );
        assert_eq!(
            simulation.attract(attractor, vec![receiver], Some(TrailId(7))),
            Err(ScenarioError::UnknownTrail(TrailId(7)))
        );

        simulation.step();

        let moved = simulation.body(receiver).unwrap();
        assert!((moved.position() - Vector::new(9.999, 0.0)).length() < EPSILON);
        assert_eq!(moved.trail().len(), 1);
        assert_eq!(simulation.body(attractor).unwrap().position(), Vector::ZERO);
    }
}
