use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use rand::Rng;

use crate::camera::MainCamera;
use crate::graph::Registry;
use crate::visual::nodes::animations::{LABEL_SIZE, glow_radius};
use crate::visual::nodes::{UNRATED, status_color};
use crate::visual::render::{Frame, RenderAdapter, RenderError};

const CORE_RADIUS: f32 = 0.5;
const GLOW_ALPHA: f32 = 0.8;
/// Labels float this far above their node, world units
const LABEL_LIFT: f32 = 2.5;
/// Text height as a fraction of the label box
const LABEL_TEXT_RATIO: f32 = 0.22;
const LABEL_COLOR: Srgba = Srgba::rgb(0.973, 0.980, 0.988);

const STAR_COUNT: usize = 3000;
const STAR_SPREAD: f32 = 800.0;

#[derive(Component)]
pub struct NodeCore;

#[derive(Component)]
pub struct NodeGlow;

/// Absolutely positioned label box that follows its node on screen
#[derive(Component)]
pub struct NodeLabel;

#[derive(Component)]
pub struct NodeLabelText;

#[derive(Component)]
pub struct StarField;

struct NodeEntities {
    core: Entity,
    glow: Entity,
    label: Entity,
    text: Entity,
    glow_material: Handle<StandardMaterial>,
}

/// Entities and assets owned by the current allocation
#[derive(Resource, Default)]
pub struct SceneHandles {
    nodes: Vec<NodeEntities>,
    core_mesh: Option<Handle<Mesh>>,
    core_material: Option<Handle<StandardMaterial>>,
}

/// Bevy-backed [`RenderAdapter`]: an unlit core sphere, an additive glow
/// sphere and a UI text label per node, plus gizmo lines for links.
#[derive(SystemParam)]
pub struct SceneRenderer<'w, 's> {
    commands: Commands<'w, 's>,
    meshes: ResMut<'w, Assets<Mesh>>,
    materials: ResMut<'w, Assets<StandardMaterial>>,
    handles: ResMut<'w, SceneHandles>,
    cameras: Query<'w, 's, (&'static Camera, &'static GlobalTransform), With<MainCamera>>,
    bodies: Query<
        'w,
        's,
        (&'static mut Transform, &'static mut Visibility),
        (Or<(With<NodeCore>, With<NodeGlow>)>, Without<NodeLabel>),
    >,
    labels: Query<
        'w,
        's,
        (&'static mut Node, &'static mut Visibility, &'static mut ZIndex),
        (With<NodeLabel>, Without<NodeCore>, Without<NodeGlow>),
    >,
    texts: Query<'w, 's, (&'static mut TextColor, &'static mut TextFont), With<NodeLabelText>>,
    gizmos: Gizmos<'w, 's>,
}

impl RenderAdapter for SceneRenderer<'_, '_> {
    fn allocate(&mut self, registry: &Registry) -> Result<(), RenderError> {
        if self.cameras.is_empty() {
            return Err(RenderError::BackendUnavailable(
                "no main camera to draw the graph with".to_string(),
            ));
        }

        let core_mesh = self.meshes.add(Sphere::new(CORE_RADIUS).mesh().uv(16, 16));
        let core_material = self.materials.add(StandardMaterial {
            base_color: Color::WHITE,
            unlit: true,
            ..default()
        });

        for node in registry.nodes() {
            let glow_material = self.materials.add(StandardMaterial {
                base_color: status_color(node.status).with_alpha(GLOW_ALPHA).into(),
                unlit: true,
                alpha_mode: AlphaMode::Add,
                ..default()
            });

            let core = self
                .commands
                .spawn((
                    NodeCore,
                    Mesh3d(core_mesh.clone()),
                    MeshMaterial3d(core_material.clone()),
                    Transform::from_translation(node.position),
                    Visibility::Hidden,
                ))
                .id();

            let glow = self
                .commands
                .spawn((
                    NodeGlow,
                    Mesh3d(core_mesh.clone()),
                    MeshMaterial3d(glow_material.clone()),
                    Transform::from_translation(node.position)
                        .with_scale(glow_scale(node.base_glow_size())),
                    Visibility::Hidden,
                ))
                .id();

            let mut text = Entity::PLACEHOLDER;
            let label = self
                .commands
                .spawn((
                    NodeLabel,
                    Node {
                        position_type: PositionType::Absolute,
                        justify_content: JustifyContent::Center,
                        ..default()
                    },
                    Visibility::Hidden,
                    ZIndex(0),
                ))
                .with_children(|parent| {
                    text = parent
                        .spawn((
                            NodeLabelText,
                            Text::new(node.label.to_uppercase()),
                            TextFont::default(),
                            TextColor(LABEL_COLOR.with_alpha(0.5).into()),
                        ))
                        .id();
                })
                .id();

            self.handles.nodes.push(NodeEntities {
                core,
                glow,
                label,
                text,
                glow_material,
            });
        }

        self.handles.core_mesh = Some(core_mesh);
        self.handles.core_material = Some(core_material);
        debug!("Allocated scene entities for {} nodes", registry.len());
        Ok(())
    }

    fn present(&mut self, frame: &Frame) {
        let camera = self.cameras.single().ok();

        for (node, entities) in frame.nodes.iter().zip(&self.handles.nodes) {
            let visibility = if node.visible {
                Visibility::Inherited
            } else {
                Visibility::Hidden
            };

            if let Ok((mut transform, mut shown)) = self.bodies.get_mut(entities.core) {
                transform.translation = node.position;
                *shown = visibility;
            }
            if let Ok((mut transform, mut shown)) = self.bodies.get_mut(entities.glow) {
                transform.translation = node.position;
                transform.scale = glow_scale(node.glow_size);
                *shown = visibility;
            }

            // Project the top and bottom of the world-sized label box
            let half_height = LABEL_SIZE.1 * node.label_scale * 0.5;
            let anchor = node.position + Vec3::Y * LABEL_LIFT;
            let projected = camera.and_then(|(camera, transform)| {
                let top = camera
                    .world_to_viewport(transform, anchor + Vec3::Y * half_height)
                    .ok()?;
                let bottom = camera
                    .world_to_viewport(transform, anchor - Vec3::Y * half_height)
                    .ok()?;
                Some((top, bottom))
            });

            let Ok((mut style, mut shown, mut order)) = self.labels.get_mut(entities.label) else {
                continue;
            };
            order.0 = node.draw_order;
            let Some((top, bottom)) = projected.filter(|_| node.visible) else {
                *shown = Visibility::Hidden;
                continue;
            };

            let box_height = (bottom.y - top.y).max(1.0);
            let box_width = box_height * LABEL_SIZE.0 / LABEL_SIZE.1;
            let center = (top + bottom) * 0.5;
            style.left = Val::Px(center.x - box_width * 0.5);
            style.top = Val::Px(top.y);
            style.width = Val::Px(box_width);
            style.height = Val::Px(box_height);
            *shown = Visibility::Inherited;

            if let Ok((mut color, mut font)) = self.texts.get_mut(entities.text) {
                color.0 = LABEL_COLOR.with_alpha(node.label_opacity).into();
                font.font_size = (box_height * LABEL_TEXT_RATIO).clamp(4.0, 64.0);
            }
        }

        for link in frame.links.iter().filter(|link| link.visible) {
            self.gizmos
                .line(link.from, link.to, UNRATED.with_alpha(link.opacity));
        }
    }

    fn release(&mut self) {
        let count = self.handles.nodes.len();
        for entities in self.handles.nodes.drain(..) {
            self.commands.entity(entities.core).despawn();
            self.commands.entity(entities.glow).despawn();
            self.commands.entity(entities.label).despawn();
            self.materials.remove(&entities.glow_material);
        }
        if let Some(mesh) = self.handles.core_mesh.take() {
            self.meshes.remove(&mesh);
        }
        if let Some(material) = self.handles.core_material.take() {
            self.materials.remove(&material);
        }
        debug!("Released scene entities for {} nodes", count);
    }
}

/// Scale of the unit core mesh that draws a glow of `glow_size`
fn glow_scale(glow_size: f32) -> Vec3 {
    Vec3::splat(glow_radius(glow_size) / CORE_RADIUS)
}

/// Decorative backdrop, spawned once per mounted view
pub fn spawn_star_field(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mesh = meshes.add(Sphere::new(0.35).mesh().uv(4, 3));
    let material = materials.add(StandardMaterial {
        base_color: Color::srgba(0.392, 0.455, 0.545, 0.4),
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        ..default()
    });

    let half = STAR_SPREAD * 0.5;
    let mut rng = rand::rng();
    for _ in 0..STAR_COUNT {
        let position = Vec3::new(
            rng.random_range(-half..half),
            rng.random_range(-half..half),
            rng.random_range(-half..half),
        );
        commands.spawn((
            StarField,
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_translation(position),
        ));
    }
    debug!("Spawned {} background stars", STAR_COUNT);
}

pub fn despawn_star_field(mut commands: Commands, stars: Query<Entity, With<StarField>>) {
    for star in &stars {
        commands.entity(star).despawn();
    }
}
