//! Canvas plugin - Self-contained plugin pattern
//!
//! Turns each frame presented on the [`Canvas`] into 2D entities. Entities are
//! kept in slots indexed by draw order and reused between frames, so a frame
//! that looks like the previous one only touches the components that changed.

use crate::physics::math::{Scalar, Vector};
use crate::plugins::simulation::SimulationSet;
use crate::prelude::*;
use crate::surface::{CircleShape, Frame, Layered};

/// World-space distance between two consecutive draw depths.
const DEPTH_STEP: f32 = 0.1;

/// Offset placing a circle's outline disc just beneath its fill.
const OUTLINE_OFFSET: f32 = DEPTH_STEP * 0.5;

/// Maps surface coordinates (origin top-left, y down) to and from the world.
///
/// The surface keeps the configured size even when the window ends up a
/// different size, centered in it.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct SurfaceLayout {
    pub size: Vector,
}

impl SurfaceLayout {
    pub fn new(size: Vector) -> Self {
        Self { size }
    }

    pub fn to_world(&self, position: Vector) -> Vec2 {
        Vec2::new(position.x - self.size.x / 2.0, self.size.y / 2.0 - position.y)
    }

    /// Converts a window cursor position to surface coordinates.
    pub fn from_window(&self, cursor: Vec2, window_size: Vec2) -> Vector {
        cursor - window_size / 2.0 + self.size / 2.0
    }
}

pub struct CanvasPlugin;

impl Plugin for CanvasPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Canvas>()
            .init_resource::<CanvasEntities>()
            .add_systems(Update, present_canvas.in_set(SimulationSet::Present));
    }
}

#[derive(Component)]
pub struct CanvasCircle;

#[derive(Component)]
pub struct CanvasStamp;

#[derive(Debug)]
struct CircleSlot {
    fill: Entity,
    outline: Entity,
    fill_material: Handle<ColorMaterial>,
    outline_material: Handle<ColorMaterial>,
    shape: CircleShape,
    depth: u32,
}

/// Entities currently standing in for the last presented frame.
#[derive(Resource, Default, Debug)]
pub struct CanvasEntities {
    unit_circle: Option<Handle<Mesh>>,
    circles: Vec<CircleSlot>,
    stamps: Vec<Entity>,
}

impl CanvasEntities {
    pub fn circle_count(&self) -> usize {
        self.circles.len()
    }

    pub fn stamp_count(&self) -> usize {
        self.stamps.len()
    }
}

fn depth_to_z(depth: u32) -> f32 {
    depth as f32 * DEPTH_STEP
}

fn circle_transform(layout: &SurfaceLayout, center: Vector, radius: Scalar, z: f32) -> Transform {
    Transform::from_translation(layout.to_world(center).extend(z))
        .with_scale(Vec3::new(radius, radius, 1.0))
}

fn outline_visibility(shape: &CircleShape) -> Visibility {
    if shape.outline_thickness > 0.0 {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    }
}

pub fn present_canvas(
    mut commands: Commands,
    mut canvas: ResMut<Canvas>,
    mut entities: ResMut<CanvasEntities>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut clear_color: ResMut<ClearColor>,
    layout: Res<SurfaceLayout>,
    mut circles: Query<(&mut Transform, &mut Visibility), (With<CanvasCircle>, Without<CanvasStamp>)>,
    mut stamps: Query<(&mut Sprite, &mut Transform), (With<CanvasStamp>, Without<CanvasCircle>)>,
) {
    let Some(frame) = canvas.take_presented() else {
        return;
    };

    if let Some(color) = frame.clear_color {
        if clear_color.0 != color {
            clear_color.0 = color;
        }
    }

    let unit_circle = entities
        .unit_circle
        .get_or_insert_with(|| meshes.add(Circle::new(1.0)))
        .clone();

    present_circles(
        &mut commands,
        &frame,
        &mut entities,
        &unit_circle,
        &mut materials,
        &layout,
        &mut circles,
    );
    present_stamps(&mut commands, &frame, &mut entities, &layout, &mut stamps);
}

fn present_circles(
    commands: &mut Commands,
    frame: &Frame,
    entities: &mut CanvasEntities,
    unit_circle: &Handle<Mesh>,
    materials: &mut Assets<ColorMaterial>,
    layout: &SurfaceLayout,
    circles: &mut Query<(&mut Transform, &mut Visibility), (With<CanvasCircle>, Without<CanvasStamp>)>,
) {
    for (index, Layered { depth, item: shape }) in frame.circles.iter().enumerate() {
        let z = depth_to_z(*depth);
        let fill_transform = circle_transform(layout, shape.center, shape.radius, z);
        let outline_transform = circle_transform(
            layout,
            shape.center,
            shape.radius + shape.outline_thickness,
            z - OUTLINE_OFFSET,
        );

        let Some(slot) = entities.circles.get_mut(index) else {
            let fill_material = materials.add(ColorMaterial::from(shape.fill_color));
            let outline_material = materials.add(ColorMaterial::from(shape.outline_color));
            let fill = commands
                .spawn((
                    Name::new(format!("Circle {index}")),
                    CanvasCircle,
                    Mesh2d(unit_circle.clone()),
                    MeshMaterial2d(fill_material.clone()),
                    fill_transform,
                    Visibility::Inherited,
                ))
                .id();
            let outline = commands
                .spawn((
                    Name::new(format!("Circle {index} Outline")),
                    CanvasCircle,
                    Mesh2d(unit_circle.clone()),
                    MeshMaterial2d(outline_material.clone()),
                    outline_transform,
                    outline_visibility(shape),
                ))
                .id();
            entities.circles.push(CircleSlot {
                fill,
                outline,
                fill_material,
                outline_material,
                shape: *shape,
                depth: *depth,
            });
            continue;
        };

        if slot.shape == *shape && slot.depth == *depth {
            continue;
        }

        if slot.shape.fill_color != shape.fill_color {
            if let Some(material) = materials.get_mut(&slot.fill_material) {
                material.color = shape.fill_color;
            }
        }
        if slot.shape.outline_color != shape.outline_color {
            if let Some(material) = materials.get_mut(&slot.outline_material) {
                material.color = shape.outline_color;
            }
        }
        if let Ok((mut transform, _)) = circles.get_mut(slot.fill) {
            *transform = fill_transform;
        }
        if let Ok((mut transform, mut visibility)) = circles.get_mut(slot.outline) {
            *transform = outline_transform;
            *visibility = outline_visibility(shape);
        }

        slot.shape = *shape;
        slot.depth = *depth;
    }

    for slot in entities.circles.drain(frame.circles.len()..) {
        commands.entity(slot.fill).despawn();
        commands.entity(slot.outline).despawn();
    }
}

fn present_stamps(
    commands: &mut Commands,
    frame: &Frame,
    entities: &mut CanvasEntities,
    layout: &SurfaceLayout,
    stamps: &mut Query<(&mut Sprite, &mut Transform), (With<CanvasStamp>, Without<CanvasCircle>)>,
) {
    for (index, Layered { depth, item: stamp }) in frame.stamps.iter().enumerate() {
        let translation = layout.to_world(stamp.position).extend(depth_to_z(*depth));

        match entities.stamps.get(index).copied() {
            Some(entity) => {
                if let Ok((mut sprite, mut transform)) = stamps.get_mut(entity) {
                    if sprite.color != stamp.color {
                        sprite.color = stamp.color;
                    }
                    if sprite.custom_size != Some(stamp.size) {
                        sprite.custom_size = Some(stamp.size);
                    }
                    if transform.translation != translation {
                        transform.translation = translation;
                    }
                }
            }
            None => {
                let entity = commands
                    .spawn((
                        CanvasStamp,
                        Sprite::from_color(stamp.color, stamp.size),
                        Transform::from_translation(translation),
                    ))
                    .id();
                entities.stamps.push(entity);
            }
        }
    }

    for entity in entities.stamps.drain(frame.stamps.len()..) {
        commands.entity(entity).despawn();
    }
}
