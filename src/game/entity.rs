//! Moving entities and the capabilities the camera draws through

use crate::net::protocol::{AgentState, BulletState, PlayerKey};
use crate::render::{Color, ContextGuard, DrawContext};
use crate::util::vec2::Vec2;

/// Anything the camera can cull and draw
///
/// The camera only ever sees this trait, never a concrete entity kind.
pub trait SceneObject {
    /// World-space centre
    fn position(&self) -> Vec2;
    /// World-space extent
    fn size(&self) -> Vec2;
    /// Draw centred on `screen_pos` at `screen_size`; must leave the
    /// context's style and transform as it found them
    fn draw_sprite(&self, ctx: &mut dyn DrawContext, screen_pos: Vec2, screen_size: Vec2);
}

/// Locally simulated state that snaps to authoritative snapshots
pub trait Kinematic {
    type State;

    /// Extrapolate forward by `dt` seconds
    fn update(&mut self, dt: f32);

    /// Replace the live kinematic fields with a snapshot's values
    fn apply_server_update(&mut self, state: &Self::State);
}

/// A player aircraft
#[derive(Debug, Clone)]
pub struct Agent {
    pub key: PlayerKey,
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Heading in radians
    pub orientation: f32,
    pub size: Vec2,
    pub color: Color,
}

impl Agent {
    pub fn new(key: PlayerKey, state: &AgentState, size: Vec2) -> Self {
        Self {
            key,
            position: state.position,
            velocity: state.velocity,
            acceleration: state.acceleration,
            orientation: state.orientation,
            size,
            color: Color::AGENT,
        }
    }
}

impl Kinematic for Agent {
    type State = AgentState;

    fn update(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        self.velocity += self.acceleration * dt;
    }

    fn apply_server_update(&mut self, state: &AgentState) {
        self.position = state.position;
        self.velocity = state.velocity;
        self.acceleration = state.acceleration;
        self.orientation = state.orientation;
    }
}

impl SceneObject for Agent {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn size(&self) -> Vec2 {
        self.size
    }

    fn draw_sprite(&self, ctx: &mut dyn DrawContext, screen_pos: Vec2, screen_size: Vec2) {
        let mut ctx = ContextGuard::new(ctx);
        ctx.set_fill_color(self.color);
        // Rotate about the sprite's own centre
        ctx.translate(screen_pos);
        ctx.rotate(self.orientation);
        ctx.fill_rect(screen_size * -0.5, screen_size);
    }
}

/// A projectile travelling at constant velocity
#[derive(Debug, Clone)]
pub struct Bullet {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub color: Color,
}

impl Bullet {
    pub fn new(state: &BulletState, radius: f32) -> Self {
        Self {
            position: state.position,
            velocity: state.velocity,
            radius,
            color: Color::BULLET,
        }
    }
}

impl Kinematic for Bullet {
    type State = BulletState;

    fn update(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    fn apply_server_update(&mut self, state: &BulletState) {
        self.position = state.position;
        self.velocity = state.velocity;
    }
}

impl SceneObject for Bullet {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn size(&self) -> Vec2 {
        Vec2::splat(self.radius * 2.0)
    }

    fn draw_sprite(&self, ctx: &mut dyn DrawContext, screen_pos: Vec2, screen_size: Vec2) {
        let mut ctx = ContextGuard::new(ctx);
        ctx.set_fill_color(self.color);
        ctx.fill_circle(screen_pos, screen_size.x * 0.5);
    }
}
