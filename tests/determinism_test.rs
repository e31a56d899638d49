//! Integration test to verify the frame loop is deterministic

use bevy::math::Vec2;
use gravitoy::config::SimulationConfig;
use gravitoy::prelude::*;

const WINDOW: Vec2 = Vec2::new(1920.0, 1080.0);

fn run_frames(frames: usize) -> (Simulation, Canvas) {
    let mut simulation = Simulation::from_config(&SimulationConfig::default(), WINDOW).unwrap();
    let mut canvas = Canvas::default();
    for _ in 0..frames {
        simulation.frame(std::iter::empty(), &mut canvas);
    }
    (simulation, canvas)
}

#[test]
fn test_identical_runs_match() {
    let (first, first_canvas) = run_frames(500);
    let (second, second_canvas) = run_frames(500);

    for (a, b) in first.bodies().iter().zip(second.bodies()) {
        assert_eq!(a.position(), b.position(), "{} diverged", a.name());
        assert_eq!(a.velocity(), b.velocity(), "{} diverged", a.name());
        assert_eq!(a.trail(), b.trail(), "{} trail diverged", a.name());
    }

    assert_eq!(first_canvas.presented(), second_canvas.presented());
}

#[test]
fn test_sun_never_moves() {
    let (simulation, _) = run_frames(200);

    let sun = simulation.body_by_name("sun").unwrap();
    assert_eq!(sun.position(), WINDOW / 2.0);
    assert!(sun.trail().is_empty());
}

#[test]
fn test_trails_grow_one_stamp_per_frame() {
    let (simulation, canvas) = run_frames(250);

    for name in ["earth", "planet"] {
        let body = simulation.body_by_name(name).unwrap();
        assert_eq!(body.trail().len(), 250, "{name} trail length");
        assert_eq!(body.trail().last().unwrap().position, body.position());
    }

    let frame = canvas.presented().unwrap();
    assert_eq!(frame.circles.len(), 3);
    assert_eq!(frame.stamps.len(), 500);
}

#[test]
fn test_escape_stops_before_stepping() {
    let mut simulation = Simulation::from_config(&SimulationConfig::default(), WINDOW).unwrap();
    let mut canvas = Canvas::default();

    let control = simulation.frame(
        [SurfaceEvent::KeyPressed {
            code: KeyCode::Escape,
        }],
        &mut canvas,
    );

    assert_eq!(control, LoopControl::Exit);
    assert_eq!(simulation.frame_count(), 0);
    assert!(canvas.presented().is_none());
}
