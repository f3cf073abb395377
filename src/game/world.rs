//! Per-frame orchestration
//!
//! Each tick runs, in this order:
//! 1. start the snapshot source (once, lazily, retried until it succeeds)
//! 2. accumulate elapsed time; bail out until a frame period has passed
//! 3. clear the surface
//! 4. ingest the pending snapshot, if any
//! 5. advance local physics by the accumulated time
//! 6. update the active camera, then render through it
//!
//! Scheduling the next tick belongs to the caller.

use std::time::Duration;

use hashbrown::HashMap;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::game::camera::{Camera, CameraMode, FollowTarget};
use crate::game::constants::frame::MONITOR_WINDOW;
use crate::game::entity::{Agent, Bullet, Kinematic, SceneObject};
use crate::game::overlay::{DebugOverlay, SharedDiagnostics};
use crate::game::performance::FrameMonitor;
use crate::input::{Directions, InputIntent};
use crate::net::protocol::{PlayerKey, WorldSnapshot};
use crate::net::snapshot_slot::{SnapshotSink, SnapshotSlot};
use crate::net::transport::{SnapshotSource, TransportError};
use crate::render::background::BorderedGridBackground;
use crate::render::DrawContext;
use crate::util::vec2::Vec2;

/// Result of one call to [`GameWorld::tick`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Less than a frame period has accumulated
    Skipped,
    Rendered {
        /// Seconds simulated this frame
        dt: f32,
        /// Scene objects that passed culling
        drawn: usize,
    },
}

pub struct GameWorld {
    config: ClientConfig,
    cameras: Vec<Camera>,
    active_camera: usize,
    agents: HashMap<PlayerKey, Agent>,
    /// Agent keys in first-seen order, each exactly once
    render_order: Vec<PlayerKey>,
    bullets: HashMap<PlayerKey, Vec<Bullet>>,
    /// Bullet group keys in first-seen order, each exactly once
    bullet_order: Vec<PlayerKey>,
    slot: SnapshotSlot,
    source: Box<dyn SnapshotSource>,
    started: bool,
    accumulated: Duration,
    frame_period: Duration,
    frame: u64,
    directions: Directions,
    monitor: FrameMonitor,
    diagnostics: SharedDiagnostics,
}

impl GameWorld {
    pub fn new(config: ClientConfig, source: Box<dyn SnapshotSource>) -> Self {
        let diagnostics = SharedDiagnostics::default();

        let follow = Camera::new("follow", config.viewport_size, config.camera.clone())
            .with_background(Box::new(BorderedGridBackground::new(
                config.world_min,
                config.world_max,
            )))
            .with_cell_size(config.grid_cell_size);
        let debug_camera = Camera::debug(
            "debug",
            config.viewport_size,
            config.camera.clone(),
            DebugOverlay::with_diagnostics(diagnostics.clone()),
            config.debug_mode,
        )
        .with_background(Box::new(BorderedGridBackground::new(
            config.world_min,
            config.world_max,
        )))
        .with_cell_size(config.grid_cell_size);

        let active_camera = if config.debug_mode { 1 } else { 0 };

        Self {
            frame_period: config.frame_period(),
            monitor: FrameMonitor::new(config.target_fps, MONITOR_WINDOW),
            config,
            cameras: vec![follow, debug_camera],
            active_camera,
            agents: HashMap::new(),
            render_order: Vec::new(),
            bullets: HashMap::new(),
            bullet_order: Vec::new(),
            slot: SnapshotSlot::new(),
            source,
            started: false,
            accumulated: Duration::ZERO,
            frame: 0,
            directions: Directions::default(),
            diagnostics,
        }
    }

    /// Writer handle onto this world's pending-snapshot slot
    pub fn sink(&self) -> SnapshotSink {
        self.slot.sink()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn agent(&self, key: &str) -> Option<&Agent> {
        self.agents.get(key)
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn render_order(&self) -> &[PlayerKey] {
        &self.render_order
    }

    pub fn bullets_for(&self, key: &str) -> &[Bullet] {
        self.bullets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn bullet_count(&self) -> usize {
        self.bullets.values().map(Vec::len).sum()
    }

    pub fn active_camera(&self) -> &Camera {
        &self.cameras[self.active_camera]
    }

    pub fn active_camera_mut(&mut self) -> &mut Camera {
        &mut self.cameras[self.active_camera]
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    pub fn diagnostics(&self) -> SharedDiagnostics {
        self.diagnostics.clone()
    }

    pub fn frame_monitor(&self) -> &FrameMonitor {
        &self.monitor
    }

    /// Directional keys currently held, forwarded to the active camera
    pub fn set_directions(&mut self, directions: Directions) {
        self.directions = directions;
    }

    /// Apply a discrete input intent
    pub fn apply_intent(&mut self, intent: InputIntent) {
        match intent {
            InputIntent::ToggleDebug => {
                let debug_camera = self
                    .cameras
                    .iter_mut()
                    .find(|c| matches!(c.mode(), CameraMode::FreeDebug(_)));
                if let Some(camera) = debug_camera {
                    camera.toggle_debug();
                }
            }
            InputIntent::Shake => self.active_camera_mut().shake(),
            InputIntent::SwitchCamera => self.switch_camera(),
            InputIntent::Zoom(delta) => self.active_camera_mut().add_scroll(delta),
        }
    }

    /// Make the next camera active, starting it where the previous one was looking
    pub fn switch_camera(&mut self) {
        let view = self.active_camera().augmented_position();
        self.active_camera = (self.active_camera + 1) % self.cameras.len();
        let camera = &mut self.cameras[self.active_camera];
        camera.jump_to(view);
        info!("Switched to camera '{}'", camera.name());
    }

    /// Stop the snapshot source
    pub fn stop(&mut self) {
        self.source.stop();
        self.started = false;
    }

    /// Run one loop iteration; `elapsed` is wall-clock time since the
    /// previous call
    pub fn tick(&mut self, elapsed: Duration, ctx: &mut dyn DrawContext) -> TickOutcome {
        self.ensure_started();

        // Time is zeroed after each rendered frame, so long frames drift
        self.accumulated += elapsed;
        if self.accumulated < self.frame_period {
            return TickOutcome::Skipped;
        }
        let frame_time = std::mem::take(&mut self.accumulated);
        let dt = frame_time.as_secs_f32();
        self.frame += 1;
        self.monitor.record(frame_time);

        ctx.clear_rect(Vec2::ZERO, self.config.viewport_size);

        if let Some(snapshot) = self.slot.take() {
            self.ingest(snapshot);
        }

        self.advance_physics(dt);

        let drawn = self.update_and_render(dt, ctx);
        self.publish_diagnostics();

        TickOutcome::Rendered { dt, drawn }
    }

    fn ensure_started(&mut self) {
        if self.started {
            return;
        }
        match self.source.start(self.slot.sink()) {
            Ok(()) => {
                info!("Snapshot source started");
                self.started = true;
            }
            Err(TransportError::AlreadyStarted) => self.started = true,
            Err(e) => warn!("Snapshot source failed to start, retrying next tick: {}", e),
        }
    }

    /// Create or update agents and replace the bullet groups a snapshot names.
    /// Keys new in the same snapshot are taken in ascending order, so
    /// render order and the default follow target are deterministic.
    pub fn ingest(&mut self, snapshot: WorldSnapshot) {
        let mut players: Vec<_> = snapshot.players.into_iter().collect();
        players.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        for (key, state) in players {
            match self.agents.get_mut(&key) {
                Some(agent) => agent.apply_server_update(&state),
                None => {
                    info!("New agent '{}' at ({:.1}, {:.1})", key, state.position.x, state.position.y);
                    let agent = Agent::new(key.clone(), &state, self.config.agent_size);
                    self.agents.insert(key.clone(), agent);
                    self.render_order.push(key.clone());
                    self.maybe_follow(&key);
                }
            }
        }

        let mut groups: Vec<_> = snapshot.bullets.into_iter().collect();
        groups.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        for (key, states) in groups {
            let group: Vec<Bullet> = states
                .iter()
                .map(|s| Bullet::new(s, self.config.bullet_radius))
                .collect();
            debug!("Bullet group '{}' replaced with {} bullets", key, group.len());
            if self.bullets.insert(key.clone(), group).is_none() {
                self.bullet_order.push(key);
            }
        }
    }

    /// Lock the follow cameras onto a newly seen agent when it is the
    /// local player, or the first agent when no local player is configured
    /// (the smallest key of the first snapshot carrying players)
    fn maybe_follow(&mut self, key: &PlayerKey) {
        let wanted = match &self.config.local_player {
            Some(local) => local == key,
            None => self.render_order.len() == 1,
        };
        if !wanted {
            return;
        }
        for camera in &mut self.cameras {
            camera.center_on(FollowTarget::Player(key.clone()));
        }
    }

    fn advance_physics(&mut self, dt: f32) {
        self.agents.par_values_mut().for_each(|agent| agent.update(dt));
        self.bullets.par_values_mut().for_each(|group| {
            for bullet in group.iter_mut() {
                bullet.update(dt);
            }
        });
    }

    fn update_and_render(&mut self, dt: f32, ctx: &mut dyn DrawContext) -> usize {
        let camera = &mut self.cameras[self.active_camera];
        let destination = match camera.target() {
            FollowTarget::Fixed(point) => Some(*point),
            FollowTarget::Player(key) => self.agents.get(key).map(|a| a.position),
        };
        camera.set_held_directions(self.directions);
        camera.update(dt, destination);

        let agents = self
            .render_order
            .iter()
            .filter_map(|key| self.agents.get(key))
            .map(|agent| agent as &dyn SceneObject);
        let bullets = self
            .bullet_order
            .iter()
            .filter_map(|key| self.bullets.get(key))
            .flatten()
            .map(|bullet| bullet as &dyn SceneObject);
        camera.render_all(ctx, agents.chain(bullets));
        camera.drawn_last_frame()
    }

    fn publish_diagnostics(&self) {
        let camera = self.active_camera();
        let mut d = self.diagnostics.write();
        d.frame = self.frame;
        d.fps = self.monitor.fps();
        d.camera_position = camera.augmented_position();
        d.scale = camera.scale();
        d.agents = self.agents.len();
        d.bullets = self.bullet_count();
        d.drawn = camera.drawn_last_frame();
        d.snapshots_received = self.slot.published_count();
        d.snapshots_overwritten = self.slot.overwritten_count();
    }
}

impl Drop for GameWorld {
    fn drop(&mut self) {
        self.source.stop();
    }
}
