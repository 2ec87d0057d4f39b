use bevy::math::{Dir3, EulerRot, Quat, Ray3d, Vec2, Vec3};
use bevy::pbr::{DistanceFog, FogFalloff};
use bevy::prelude::*;

use crate::visual::interactions::pointer::Viewport;
use crate::visual::plugin::GraphSystems;
use crate::visual::view::GraphView;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(BACKGROUND))
            .add_systems(Startup, setup_camera)
            .add_systems(
                Update,
                (
                    track_viewport.in_set(GraphSystems::Sync),
                    sync_camera_transform.in_set(GraphSystems::React),
                )
                    .run_if(resource_exists::<GraphView>),
            );
    }
}

/// Deep-space backdrop (#020617)
pub const BACKGROUND: Color = Color::srgb(0.008, 0.024, 0.090);

/// Camera tuning. All rates are per frame.
#[derive(Debug, Clone, Copy)]
pub struct CameraPreset {
    /// Radians of spin per dragged pixel
    pub drag_scale: f32,
    /// Spin velocity multiplier after each frame (inertial flick)
    pub spin_decay: f32,
    /// Constant yaw applied to the scene group so an idle graph keeps moving
    pub auto_rotation: f32,
    pub position_lerp: f32,
    pub look_lerp: f32,
    /// How far in front of a focused node the camera parks
    pub focus_distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// World units per wheel delta unit
    pub wheel_scale: f32,
    /// Vertical field of view, radians
    pub fov_y: f32,
    /// Height of the initial camera above the scene
    pub start_height: f32,
}

pub const CAMERA: CameraPreset = CameraPreset {
    drag_scale: 0.005,
    spin_decay: 0.95,
    auto_rotation: 0.0005,
    position_lerp: 0.02,
    look_lerp: 0.05,
    focus_distance: 14.0,
    min_distance: 20.0,
    max_distance: 400.0,
    wheel_scale: 0.05,
    fov_y: std::f32::consts::FRAC_PI_3,
    start_height: 20.0,
};

/// Default framing so graphs of different sizes fit without user action
pub fn initial_distance(node_count: usize) -> f32 {
    (50.0 + 1.5 * node_count as f32).clamp(60.0, 300.0)
}

/// Headless camera state: pose, look-at target and the rotation of the
/// scene group the nodes live in.
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub position: Vec3,
    pub look_target: Vec3,
    pub aspect: f32,
    pub preset: CameraPreset,
    yaw: f32,
    pitch: f32,
    /// Yaw/pitch velocity fed by drags
    spin: Vec2,
}

impl CameraRig {
    pub fn new(node_count: usize, aspect: f32) -> Self {
        let preset = CAMERA;
        CameraRig {
            position: Vec3::new(0.0, preset.start_height, initial_distance(node_count)),
            look_target: Vec3::ZERO,
            aspect,
            preset,
            yaw: 0.0,
            pitch: 0.0,
            spin: Vec2::ZERO,
        }
    }

    /// Unit vector the camera looks along
    pub fn forward(&self) -> Vec3 {
        (self.look_target - self.position).normalize_or(Vec3::NEG_Z)
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.look_target)
    }

    /// Rotation of the scene group (drag + auto-rotation)
    pub fn scene_rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.pitch, self.yaw, 0.0)
    }

    #[cfg(test)]
    pub fn spin(&self) -> Vec2 {
        self.spin
    }

    /// Ray from the camera through normalized screen coordinates
    pub fn ray_through(&self, ndc: Vec2) -> Option<Ray3d> {
        let forward = self.forward();
        let right = forward.cross(Vec3::Y).normalize_or(Vec3::X);
        let up = right.cross(forward);
        let half_height = (self.preset.fov_y * 0.5).tan();
        let half_width = half_height * self.aspect;

        let direction = forward + right * (ndc.x * half_width) + up * (ndc.y * half_height);
        let direction = Dir3::new(direction).ok()?;
        Some(Ray3d::new(self.position, direction))
    }

    /// Feed a drag delta in device pixels
    pub fn add_drag(&mut self, delta: Vec2) {
        self.spin += delta * self.preset.drag_scale;
    }

    /// Apply auto-rotation and inertial spin to the scene group
    pub fn advance_rotation(&mut self) {
        self.yaw += self.preset.auto_rotation + self.spin.x;
        self.pitch += self.spin.y;
        self.spin *= self.preset.spin_decay;
    }

    /// Dolly along the view axis, clamped so the camera neither clips into
    /// nodes nor loses the graph
    pub fn zoom(&mut self, wheel_delta: f32) {
        if wheel_delta == 0.0 {
            return;
        }
        let forward = self.forward();
        let distance = (self.distance() + wheel_delta * self.preset.wheel_scale)
            .clamp(self.preset.min_distance, self.preset.max_distance);
        self.position = self.look_target - forward * distance;
    }

    /// Ease toward the focused node (world space) or back to the origin.
    ///
    /// With a focus the camera glides to a point `focus_distance` in front of
    /// the node and turns to face it; without one only the look-at target
    /// drifts home and the position is left to the user.
    pub fn follow(&mut self, focus: Option<Vec3>) {
        match focus {
            Some(node) => {
                let park = node - self.forward() * self.preset.focus_distance;
                self.look_target = self.look_target.lerp(node, self.preset.look_lerp);
                self.position = self.position.lerp(park, self.preset.position_lerp);
            }
            None => {
                self.look_target = self.look_target.lerp(Vec3::ZERO, self.preset.look_lerp);
            }
        }
    }
}

#[derive(Component)]
pub struct MainCamera;

/// Perspective camera matching the rig's field of view, with distance fog
fn setup_camera(mut commands: Commands) {
    let rig = CameraRig::new(0, 16.0 / 9.0);
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: rig.preset.fov_y,
            near: 0.1,
            far: 3000.0,
            ..default()
        }),
        Transform::from_translation(rig.position).looking_at(rig.look_target, Vec3::Y),
        DistanceFog {
            color: BACKGROUND,
            falloff: FogFalloff::Exponential { density: 0.0025 },
            ..default()
        },
        MainCamera,
    ));
}

/// Keep the view's viewport (pointer normalization, aspect) in sync with the window
fn track_viewport(windows: Query<&Window>, mut view: ResMut<GraphView>) {
    let Ok(window) = windows.single() else {
        return;
    };

    let viewport = Viewport::new(window.width(), window.height());
    if view.viewport() != viewport && viewport.width > 0.0 {
        view.resize(viewport);
        debug!("Viewport resized to {}x{}", viewport.width, viewport.height);
    }
}

/// Copy the rig pose onto the Bevy camera
fn sync_camera_transform(
    view: Res<GraphView>,
    mut cameras: Query<&mut Transform, With<MainCamera>>,
) {
    let Some(rig) = view.camera() else {
        return;
    };
    let Ok(mut transform) = cameras.single_mut() else {
        return;
    };

    *transform = Transform::from_translation(rig.position).looking_at(rig.look_target, Vec3::Y);
}
