//! First-person player controller.
//!
//! The controller never integrates physics itself. Each tick it reads the
//! rigid body through [`PhysicsBody`], decides the horizontal velocity
//! from the input snapshot and the camera yaw, keeps whatever vertical
//! velocity the physics engine produced and writes the result back.
//!
//! Orientation uses the usual right-handed, Y-up convention: at yaw 0 the
//! camera looks down -Z and positive yaw turns left.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::ControllerConfig;
use crate::layout::ZoneId;

/// Raw input for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub sprint: bool,
    pub jump: bool,
    /// Pointer movement since the previous tick, in pixels.
    pub pointer_dx: f32,
    pub pointer_dy: f32,
}

/// What the controller needs from the host physics engine.
pub trait PhysicsBody {
    fn translation(&self) -> Vec3;
    fn set_translation(&mut self, translation: Vec3);
    fn linear_velocity(&self) -> Vec3;
    fn set_linear_velocity(&mut self, velocity: Vec3);
    /// Distance to the first surface straight below `origin`, if one is
    /// within `max_distance`.
    fn cast_ray_down(&self, origin: Vec3, max_distance: f32) -> Option<f32>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraRig {
    pub yaw: f32,
    pub pitch: f32,
}

impl CameraRig {
    /// Accumulate pointer deltas; pitch is clamped.
    pub fn apply_pointer(&mut self, dx: f32, dy: f32, config: &ControllerConfig) {
        self.yaw -= dx * config.pointer_sensitivity;
        self.pitch = (self.pitch - dy * config.pointer_sensitivity)
            .clamp(config.pitch_min, config.pitch_max);
    }
}

/// Read-only view of the player for everyone but the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Avatar yaw; follows the last horizontal movement direction.
    pub facing: f32,
    pub camera: CameraRig,
    pub grounded: bool,
    pub sprinting: bool,
    pub zone: ZoneId,
    pub input: InputSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeleportCause {
    ZoneChange(ZoneId),
    Fell,
}

/// Per-step result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub teleported: Option<TeleportCause>,
}

/// Unit horizontal direction for `input` relative to the camera yaw, or
/// zero when no (or cancelling) direction keys are held.
pub fn movement_direction(input: &InputSnapshot, yaw: f32) -> Vec3 {
    let strafe = f32::from(u8::from(input.right)) - f32::from(u8::from(input.left));
    let ahead = f32::from(u8::from(input.forward)) - f32::from(u8::from(input.backward));
    if strafe == 0.0 && ahead == 0.0 {
        return Vec3::ZERO;
    }
    let (sin, cos) = yaw.sin_cos();
    let forward = Vec3::new(-sin, 0.0, -cos);
    let right = Vec3::new(cos, 0.0, -sin);
    (forward * ahead + right * strafe).normalize_or_zero()
}

/// Yaw that points the avatar along `dir`.
fn facing_of(dir: Vec3) -> f32 {
    (-dir.x).atan2(-dir.z)
}

pub struct PlayerController {
    config: ControllerConfig,
    state: PlayerState,
    respawn: Vec3,
    pending_teleport: Option<(Vec3, ZoneId)>,
}

impl PlayerController {
    pub fn new(config: ControllerConfig, spawn: Vec3, zone: ZoneId) -> Self {
        Self {
            config,
            state: PlayerState {
                position: spawn,
                zone,
                ..PlayerState::default()
            },
            respawn: spawn,
            pending_teleport: None,
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn respawn_point(&self) -> Vec3 {
        self.respawn
    }

    /// Queue a move to `spawn`; applied at the start of the next step.
    pub fn request_teleport(&mut self, spawn: Vec3, zone: ZoneId) {
        self.pending_teleport = Some((spawn, zone));
    }

    /// Change where the player returns after falling out of the world.
    pub fn set_respawn(&mut self, spawn: Vec3, zone: ZoneId) {
        self.respawn = spawn;
        self.state.zone = zone;
    }

    fn teleport(&mut self, body: &mut dyn PhysicsBody, to: Vec3) {
        body.set_translation(to);
        body.set_linear_velocity(Vec3::ZERO);
        self.state.position = to;
        self.state.velocity = Vec3::ZERO;
        self.state.grounded = false;
    }

    /// Advance one tick.
    pub fn step(&mut self, input: InputSnapshot, body: &mut dyn PhysicsBody) -> StepOutcome {
        let jump_edge = input.jump && !self.state.input.jump;
        self.state.input = input;
        self.state.sprinting = input.sprint;
        self.state
            .camera
            .apply_pointer(input.pointer_dx, input.pointer_dy, &self.config);

        if let Some((spawn, zone)) = self.pending_teleport.take() {
            self.respawn = spawn;
            self.state.zone = zone;
            self.teleport(body, spawn);
            return StepOutcome {
                teleported: Some(TeleportCause::ZoneChange(zone)),
            };
        }

        let position = body.translation();
        if position.y < self.config.fall_limit {
            let respawn = self.respawn;
            self.teleport(body, respawn);
            return StepOutcome {
                teleported: Some(TeleportCause::Fell),
            };
        }

        self.state.grounded = body
            .cast_ray_down(position, self.config.ground_ray_length())
            .is_some();

        let dir = movement_direction(&input, self.state.camera.yaw);
        let speed = if input.sprint {
            self.config.sprint_speed
        } else {
            self.config.walk_speed
        };
        let mut velocity = dir * speed;
        velocity.y = body.linear_velocity().y;
        if jump_edge && self.state.grounded {
            velocity.y = self.config.jump_impulse;
        }
        body.set_linear_velocity(velocity);

        if dir != Vec3::ZERO {
            self.state.facing = facing_of(dir);
        }
        self.state.position = position;
        self.state.velocity = velocity;
        StepOutcome::default()
    }
}

/// Minimal body over an infinite flat ground plane at `ground_y`, with
/// gravity. Enough to drive the controller without a physics engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPlaneBody {
    pub translation: Vec3,
    pub velocity: Vec3,
    /// `None` removes the floor entirely.
    pub ground_y: Option<f32>,
    /// Distance from the body origin to its feet.
    pub half_height: f32,
    pub gravity: f32,
}

impl GroundPlaneBody {
    pub fn standing_at(position: Vec3, config: &ControllerConfig) -> Self {
        let half_height = config.capsule_height / 2.0;
        Self {
            translation: Vec3::new(position.x, half_height, position.z),
            velocity: Vec3::ZERO,
            ground_y: Some(0.0),
            half_height,
            gravity: -9.81,
        }
    }

    /// Semi-implicit Euler step with a hard floor.
    pub fn integrate(&mut self, dt: f32) {
        self.velocity.y += self.gravity * dt;
        self.translation += self.velocity * dt;
        if let Some(ground) = self.ground_y {
            let floor = ground + self.half_height;
            if self.translation.y < floor {
                self.translation.y = floor;
                self.velocity.y = self.velocity.y.max(0.0);
            }
        }
    }
}

impl PhysicsBody for GroundPlaneBody {
    fn translation(&self) -> Vec3 {
        self.translation
    }

    fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
    }

    fn linear_velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn cast_ray_down(&self, origin: Vec3, max_distance: f32) -> Option<f32> {
        let distance = origin.y - self.ground_y?;
        (0.0..=max_distance).contains(&distance).then_some(distance)
    }
}
