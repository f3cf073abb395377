//! Scene camera: follow smoothing, shake, zoom, culling and the
//! world-to-screen transform
//!
//! Per frame the owner calls [`Camera::update`] once, then
//! [`Camera::render_all`]. Two behaviours share the same state:
//! - `Follow` chases a [`FollowTarget`] with capped lag
//! - `FreeDebug` pans from held keys and zooms from the scroll wheel while
//!   its debug flag is on, and falls back to following when it is off

use tracing::{debug, info};

use crate::game::constants::{camera, debug as debug_consts};
use crate::game::entity::SceneObject;
use crate::game::overlay::DebugOverlay;
use crate::input::Directions;
use crate::net::protocol::PlayerKey;
use crate::render::background::Background;
use crate::render::DrawContext;
use crate::util::vec2::Vec2;

/// Camera tuning
#[derive(Debug, Clone)]
pub struct CameraSettings {
    pub follow_distance: f32,
    pub lerp_factor: f32,
    pub snap_threshold: f32,
    pub shake_duration: f32,
    pub shake_frequency: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Debug pan velocity, world units per second
    pub pan_speed: f32,
    /// Scale change per scroll unit
    pub zoom_step: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            follow_distance: camera::FOLLOW_DISTANCE,
            lerp_factor: camera::LERP_FACTOR,
            snap_threshold: camera::SNAP_THRESHOLD,
            shake_duration: camera::SHAKE_DURATION,
            shake_frequency: camera::SHAKE_FREQUENCY,
            min_scale: camera::MIN_SCALE,
            max_scale: camera::MAX_SCALE,
            pan_speed: debug_consts::PAN_SPEED,
            zoom_step: debug_consts::ZOOM_STEP,
        }
    }
}

/// What the camera follows, resolved to a point every frame
#[derive(Debug, Clone, PartialEq)]
pub enum FollowTarget {
    Fixed(Vec2),
    Player(PlayerKey),
}

impl Default for FollowTarget {
    fn default() -> Self {
        FollowTarget::Fixed(Vec2::ZERO)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShakeState {
    pub active: bool,
    /// Seconds since the shake began
    pub elapsed: f32,
}

/// Vertical shake displacement `sin(k t) / t`, zero at `t == 0`
pub fn shake_offset(t: f32, frequency: f32) -> f32 {
    if t == 0.0 {
        0.0
    } else {
        (frequency * t).sin() / t
    }
}

/// Free-roam state of a debug camera
pub struct DebugState {
    pub enabled: bool,
    pub held: Directions,
    /// Scroll accumulated since the last update
    pub pending_scroll: f32,
    pub overlay: DebugOverlay,
}

pub enum CameraMode {
    Follow,
    FreeDebug(DebugState),
}

pub struct Camera {
    name: String,
    path_position: Vec2,
    augmented_position: Vec2,
    axes_radii: Vec2,
    scale: f32,
    half_viewport: Vec2,
    cell_size: Vec2,
    target: FollowTarget,
    shake: ShakeState,
    settings: CameraSettings,
    mode: CameraMode,
    background: Option<Box<dyn Background>>,
    drawn_last_frame: usize,
}

impl Camera {
    /// Follow camera for a viewport of `viewport_size` screen pixels
    pub fn new(name: impl Into<String>, viewport_size: Vec2, settings: CameraSettings) -> Self {
        let half_viewport = viewport_size * 0.5;
        let scale = camera::DEFAULT_SCALE.clamp(settings.min_scale, settings.max_scale);
        Self {
            name: name.into(),
            path_position: Vec2::ZERO,
            augmented_position: Vec2::ZERO,
            axes_radii: half_viewport * scale,
            scale,
            half_viewport,
            cell_size: Vec2::splat(crate::game::constants::world::GRID_CELL),
            target: FollowTarget::default(),
            shake: ShakeState::default(),
            settings,
            mode: CameraMode::Follow,
            background: None,
            drawn_last_frame: 0,
        }
    }

    /// Free-roam camera; starts with its debug flag set to `enabled`
    pub fn debug(
        name: impl Into<String>,
        viewport_size: Vec2,
        settings: CameraSettings,
        overlay: DebugOverlay,
        enabled: bool,
    ) -> Self {
        let mut camera = Self::new(name, viewport_size, settings);
        camera.mode = CameraMode::FreeDebug(DebugState {
            enabled,
            held: Directions::default(),
            pending_scroll: 0.0,
            overlay,
        });
        camera
    }

    pub fn with_background(mut self, background: Box<dyn Background>) -> Self {
        self.background = Some(background);
        self
    }

    pub fn with_cell_size(mut self, cell_size: Vec2) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path_position(&self) -> Vec2 {
        self.path_position
    }

    pub fn augmented_position(&self) -> Vec2 {
        self.augmented_position
    }

    pub fn axes_radii(&self) -> Vec2 {
        self.axes_radii
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn target(&self) -> &FollowTarget {
        &self.target
    }

    pub fn shake_state(&self) -> ShakeState {
        self.shake
    }

    pub fn mode(&self) -> &CameraMode {
        &self.mode
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Objects drawn by the last [`render_all`](Camera::render_all)
    pub fn drawn_last_frame(&self) -> usize {
        self.drawn_last_frame
    }

    /// Place the camera without smoothing
    pub fn jump_to(&mut self, position: Vec2) {
        self.path_position = position;
        self.augmented_position = position;
    }

    /// Rebind what the camera follows
    pub fn center_on(&mut self, target: FollowTarget) {
        if self.target != target {
            info!("Camera '{}' now following {:?}", self.name, target);
            self.target = target;
        }
    }

    /// Start a shake; a shake already running just continues
    pub fn shake(&mut self) {
        if !self.shake.active {
            debug!("Camera '{}' shake started", self.name);
            self.shake = ShakeState {
                active: true,
                elapsed: 0.0,
            };
        }
    }

    pub fn is_shaking(&self) -> bool {
        self.shake.active
    }

    /// Set the zoom factor, clamped to the configured range
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale.clamp(self.settings.min_scale, self.settings.max_scale);
        self.axes_radii = self.half_viewport * self.scale;
    }

    /// Whether this is a debug camera with its flag on
    pub fn debug_enabled(&self) -> bool {
        matches!(&self.mode, CameraMode::FreeDebug(state) if state.enabled)
    }

    /// Flip the debug flag; `None` for a follow camera
    pub fn toggle_debug(&mut self) -> Option<bool> {
        match &mut self.mode {
            CameraMode::FreeDebug(state) => {
                state.enabled = !state.enabled;
                info!("Camera '{}' debug mode {}", self.name, state.enabled);
                Some(state.enabled)
            }
            CameraMode::Follow => None,
        }
    }

    /// Directional keys for debug panning; ignored by follow cameras
    pub fn set_held_directions(&mut self, held: Directions) {
        if let CameraMode::FreeDebug(state) = &mut self.mode {
            state.held = held;
        }
    }

    /// Scroll-wheel delta for debug zoom; ignored by follow cameras
    pub fn add_scroll(&mut self, delta: f32) {
        if let CameraMode::FreeDebug(state) = &mut self.mode {
            state.pending_scroll += delta;
        }
    }

    /// Advance one frame. `destination` is the resolved follow target,
    /// `None` when it cannot be resolved yet.
    pub fn update(&mut self, dt: f32, destination: Option<Vec2>) {
        let free_roam = match &mut self.mode {
            CameraMode::FreeDebug(state) if state.enabled => {
                let pan = state.held.vector().normalize() * (self.settings.pan_speed * dt);
                let zoom = std::mem::take(&mut state.pending_scroll) * self.settings.zoom_step;
                Some((pan, zoom))
            }
            CameraMode::FreeDebug(state) => {
                state.pending_scroll = 0.0;
                None
            }
            CameraMode::Follow => None,
        };

        match free_roam {
            Some((pan, zoom)) => {
                self.path_position += pan;
                if zoom != 0.0 {
                    self.set_scale(self.scale + zoom);
                }
            }
            None => {
                if let Some(destination) = destination {
                    self.follow(destination);
                }
            }
        }

        self.step_shake(dt);
    }

    fn follow(&mut self, destination: Vec2) {
        let diff = destination - self.path_position;
        let snap = self.settings.snap_threshold;
        if diff.x.abs() <= snap && diff.y.abs() <= snap {
            self.path_position = destination;
            return;
        }

        let distance = self.settings.follow_distance;
        let lerp = self.settings.lerp_factor;
        self.path_position = Vec2::new(
            follow_axis(self.path_position.x, destination.x, distance, lerp),
            follow_axis(self.path_position.y, destination.y, distance, lerp),
        );
    }

    fn step_shake(&mut self, dt: f32) {
        if self.shake.active {
            self.shake.elapsed += dt;
            if self.shake.elapsed < self.settings.shake_duration {
                let offset = shake_offset(self.shake.elapsed, self.settings.shake_frequency);
                self.augmented_position = self.path_position + Vec2::new(0.0, offset);
                return;
            }
            debug!("Camera '{}' shake finished", self.name);
            self.shake = ShakeState::default();
        }
        self.augmented_position = self.path_position;
    }

    /// Screen position of a world point; the single transform used for
    /// culling, background and sprites
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        self.half_viewport + (world - self.augmented_position) * self.scale
    }

    /// World position under a screen point
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.half_viewport) / self.scale + self.augmented_position
    }

    /// Visible world window as (top-left, bottom-right): the screen
    /// rectangle mapped back through [`world_to_screen`](Camera::world_to_screen)
    pub fn visible_bounds(&self) -> (Vec2, Vec2) {
        let half_extent = self.half_viewport / self.scale;
        (
            self.augmented_position - half_extent,
            self.augmented_position + half_extent,
        )
    }

    /// Inclusive visibility test against [`visible_bounds`](Camera::visible_bounds)
    pub fn is_visible(&self, world: Vec2) -> bool {
        let (top_left, bottom_right) = self.visible_bounds();
        world.within(top_left, bottom_right)
    }

    /// Draw background then every visible object
    pub fn render_all<'a, I>(&mut self, ctx: &mut dyn DrawContext, objects: I)
    where
        I: IntoIterator<Item = &'a dyn SceneObject>,
    {
        let (top_left, bottom_right) = self.visible_bounds();

        if let Some(background) = &self.background {
            let to_screen = |p: Vec2| self.world_to_screen(p);
            background.draw(ctx, top_left, bottom_right, self.cell_size, &to_screen);
        }

        let mut drawn = 0;
        for object in objects {
            let position = object.position();
            if !position.within(top_left, bottom_right) {
                continue;
            }
            object.draw_sprite(
                ctx,
                self.world_to_screen(position),
                object.size() * self.scale,
            );
            drawn += 1;
        }
        self.drawn_last_frame = drawn;

        if let CameraMode::FreeDebug(state) = &self.mode {
            if state.enabled {
                state.overlay.render(ctx);
            }
        }
    }
}

/// One axis of the follow step: exponential smoothing inside
/// `follow_distance`, otherwise held exactly `follow_distance` behind
fn follow_axis(current: f32, destination: f32, follow_distance: f32, lerp: f32) -> f32 {
    let diff = destination - current;
    if diff.abs() <= follow_distance {
        current + diff * lerp
    } else {
        destination - diff.signum() * follow_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::{Agent, Bullet};
    use crate::net::protocol::{AgentState, BulletState};
    use crate::render::background::GridBackground;
    use crate::render::recording::RecordingContext;

    const EPSILON: f32 = 1e-4;

    fn follow_camera(viewport: Vec2) -> Camera {
        Camera::new("test", viewport, CameraSettings::default())
    }

    fn debug_camera(enabled: bool) -> Camera {
        Camera::debug(
            "debug",
            Vec2::new(200.0, 200.0),
            CameraSettings::default(),
            DebugOverlay::new(),
            enabled,
        )
    }

    fn agent_at(position: Vec2) -> Agent {
        Agent::new(
            "a".to_string(),
            &AgentState {
                position,
                ..Default::default()
            },
            Vec2::splat(10.0),
        )
    }

    #[test]
    fn test_axes_radii_track_scale() {
        let mut cam = follow_camera(Vec2::new(200.0, 100.0));
        assert_eq!(cam.axes_radii(), Vec2::new(100.0, 50.0));
        cam.set_scale(2.0);
        assert_eq!(cam.axes_radii(), Vec2::new(200.0, 100.0));
        cam.set_scale(10.0);
        assert_eq!(cam.scale(), camera::MAX_SCALE);
        assert_eq!(cam.axes_radii(), Vec2::new(100.0, 50.0) * camera::MAX_SCALE);
        cam.set_scale(0.0);
        assert_eq!(cam.scale(), camera::MIN_SCALE);
    }

    #[test]
    fn test_follow_converges_without_overshoot() {
        let mut cam = follow_camera(Vec2::splat(200.0));
        let destination = Vec2::new(camera::FOLLOW_DISTANCE + 1.0, 0.0);

        let mut last = (destination - cam.path_position()).length();
        for _ in 0..200 {
            cam.update(1.0 / 60.0, Some(destination));
            let distance = (destination - cam.path_position()).length();
            assert!(distance < last || distance == 0.0);
            assert!(cam.path_position().x <= destination.x);
            last = distance;
        }
        assert_eq!(cam.path_position(), destination);
    }

    #[test]
    fn test_follow_clamps_to_follow_distance() {
        let mut cam = follow_camera(Vec2::splat(200.0));
        cam.update(0.016, Some(Vec2::new(300.0, -500.0)));
        assert_eq!(cam.path_position(), Vec2::new(250.0, -450.0));
        assert_eq!(300.0 - cam.path_position().x, camera::FOLLOW_DISTANCE);
        assert_eq!(cam.path_position().y - -500.0, camera::FOLLOW_DISTANCE);
    }

    #[test]
    fn test_follow_mixes_clamp_and_lerp_per_axis() {
        let mut cam = follow_camera(Vec2::splat(200.0));
        cam.update(0.016, Some(Vec2::new(200.0, 20.0)));
        assert!((cam.path_position().x - 150.0).abs() < EPSILON);
        assert!((cam.path_position().y - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_follow_snaps_inside_threshold() {
        let mut cam = follow_camera(Vec2::splat(200.0));
        cam.update(0.016, Some(Vec2::new(0.75, -1.0)));
        assert_eq!(cam.path_position(), Vec2::new(0.75, -1.0));
        assert_eq!(cam.augmented_position(), cam.path_position());
    }

    #[test]
    fn test_unresolved_target_holds_position() {
        let mut cam = follow_camera(Vec2::splat(200.0));
        cam.jump_to(Vec2::new(5.0, 5.0));
        cam.update(0.016, None);
        assert_eq!(cam.path_position(), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_shake_offset_guard() {
        assert_eq!(shake_offset(0.0, camera::SHAKE_FREQUENCY), 0.0);
        let t = 0.1;
        assert!((shake_offset(t, 40.0) - (4.0f32).sin() / t).abs() < EPSILON);
    }

    #[test]
    fn test_shake_ends_within_duration() {
        for dt in [0.125f32, 0.25, 0.0625] {
            let mut cam = follow_camera(Vec2::splat(200.0));
            cam.shake();
            let limit = (camera::SHAKE_DURATION / dt).ceil() as usize;
            let mut calls = 0;
            while cam.is_shaking() {
                cam.update(dt, None);
                calls += 1;
                assert!(calls <= limit, "shake outlived {} calls at dt {}", limit, dt);
            }
            assert_eq!(cam.augmented_position(), cam.path_position());
            assert_eq!(cam.shake_state().elapsed, 0.0);
        }
    }

    #[test]
    fn test_shake_only_moves_y() {
        let mut cam = follow_camera(Vec2::splat(200.0));
        cam.shake();
        cam.update(0.03, None);
        let offset = cam.augmented_position() - cam.path_position();
        assert_eq!(offset.x, 0.0);
        assert!(offset.y != 0.0);
    }

    #[test]
    fn test_shake_is_idempotent() {
        let mut cam = follow_camera(Vec2::splat(200.0));
        cam.shake();
        cam.update(0.25, None);
        cam.shake();
        assert_eq!(cam.shake_state().elapsed, 0.25);
        cam.update(0.25, None);
        assert!(!cam.is_shaking());
    }

    #[test]
    fn test_world_to_screen() {
        let mut cam = follow_camera(Vec2::new(800.0, 600.0));
        cam.jump_to(Vec2::new(100.0, 100.0));
        assert_eq!(cam.world_to_screen(Vec2::new(100.0, 100.0)), Vec2::new(400.0, 300.0));
        cam.set_scale(2.0);
        assert_eq!(cam.world_to_screen(Vec2::new(110.0, 90.0)), Vec2::new(420.0, 280.0));
        let world = Vec2::new(37.0, -12.5);
        assert!(cam.screen_to_world(cam.world_to_screen(world)).approx_eq(world, EPSILON));
    }

    #[test]
    fn test_culling() {
        let cam = follow_camera(Vec2::splat(200.0));
        assert_eq!(cam.axes_radii(), Vec2::splat(100.0));
        assert!(cam.is_visible(Vec2::new(50.0, 50.0)));
        assert!(!cam.is_visible(Vec2::new(150.0, 0.0)));
        // Inclusive edges
        assert!(cam.is_visible(Vec2::new(100.0, -100.0)));
    }

    #[test]
    fn test_visible_bounds_match_screen_edges() {
        for scale in [0.5f32, 1.0, 2.0] {
            let mut cam = follow_camera(Vec2::new(400.0, 200.0));
            cam.jump_to(Vec2::new(30.0, -20.0));
            cam.set_scale(scale);
            let (top_left, bottom_right) = cam.visible_bounds();
            assert!(cam.world_to_screen(top_left).approx_eq(Vec2::ZERO, EPSILON));
            assert!(cam
                .world_to_screen(bottom_right)
                .approx_eq(Vec2::new(400.0, 200.0), EPSILON));
        }
    }

    #[test]
    fn test_render_draws_only_visible_scaled() {
        let mut cam = follow_camera(Vec2::splat(200.0));
        cam.set_scale(2.0);
        let near = agent_at(Vec2::new(10.0, 0.0));
        let far = agent_at(Vec2::new(80.0, 0.0));
        let bullet = Bullet::new(
            &BulletState {
                position: Vec2::new(0.0, -20.0),
                velocity: Vec2::ZERO,
            },
            4.0,
        );

        let mut ctx = RecordingContext::new();
        let objects: Vec<&dyn SceneObject> = vec![&near, &far, &bullet];
        cam.render_all(&mut ctx, objects);

        assert_eq!(cam.drawn_last_frame(), 2);
        let rects: Vec<_> = ctx.fill_rects().collect();
        assert_eq!(rects.len(), 1);
        assert_eq!(rects[0].1, Vec2::splat(20.0));
        assert_eq!(
            ctx.circles().collect::<Vec<_>>(),
            vec![(Vec2::new(100.0, 60.0), 8.0)]
        );
        assert_eq!(ctx.save_depth(), 0);
    }

    #[test]
    fn test_background_drawn_first() {
        let mut cam = follow_camera(Vec2::splat(200.0))
            .with_background(Box::new(GridBackground::default()))
            .with_cell_size(Vec2::splat(50.0));
        let agent = agent_at(Vec2::ZERO);
        let mut ctx = RecordingContext::new();
        cam.render_all(&mut ctx, [&agent as &dyn SceneObject]);

        let first_rect = ctx
            .commands()
            .iter()
            .position(|c| matches!(c, crate::render::recording::DrawCommand::FillRect { .. }))
            .unwrap();
        let last_line = ctx
            .commands()
            .iter()
            .rposition(|c| matches!(c, crate::render::recording::DrawCommand::Line { .. }))
            .unwrap();
        assert!(last_line < first_rect);
        // Lines at -100, -50, 0, 50, 100 on each axis
        assert_eq!(ctx.lines().count(), 10);
    }

    #[test]
    fn test_center_on_rebinds() {
        let mut cam = follow_camera(Vec2::splat(200.0));
        assert_eq!(cam.target(), &FollowTarget::Fixed(Vec2::ZERO));
        cam.center_on(FollowTarget::Player("p2".to_string()));
        assert_eq!(cam.target(), &FollowTarget::Player("p2".to_string()));
    }

    #[test]
    fn test_debug_camera_pans_and_zooms() {
        let mut cam = debug_camera(true);
        cam.set_held_directions(Directions {
            right: true,
            ..Default::default()
        });
        cam.add_scroll(500.0);
        cam.update(0.5, Some(Vec2::new(-1000.0, -1000.0)));

        let expected = Vec2::new(debug_consts::PAN_SPEED * 0.5, 0.0);
        assert!(cam.augmented_position().approx_eq(expected, EPSILON));
        assert!((cam.scale() - 1.5).abs() < EPSILON);
        assert!((cam.axes_radii().x - 150.0).abs() < 1e-3);

        cam.add_scroll(1.0e6);
        cam.update(0.0, None);
        assert_eq!(cam.scale(), camera::MAX_SCALE);
    }

    #[test]
    fn test_debug_camera_off_follows() {
        let mut cam = debug_camera(false);
        cam.set_held_directions(Directions {
            up: true,
            ..Default::default()
        });
        cam.add_scroll(100.0);
        cam.update(0.5, Some(Vec2::new(0.5, 0.5)));
        assert_eq!(cam.path_position(), Vec2::new(0.5, 0.5));
        assert_eq!(cam.scale(), 1.0);

        assert_eq!(cam.toggle_debug(), Some(true));
        // Scroll received while off was discarded
        cam.update(0.0, None);
        assert_eq!(cam.scale(), 1.0);
    }

    #[test]
    fn test_follow_camera_ignores_debug_input() {
        let mut cam = follow_camera(Vec2::splat(200.0));
        assert_eq!(cam.toggle_debug(), None);
        cam.set_held_directions(Directions {
            left: true,
            ..Default::default()
        });
        cam.add_scroll(300.0);
        cam.update(1.0, None);
        assert_eq!(cam.path_position(), Vec2::ZERO);
        assert_eq!(cam.scale(), 1.0);
    }

    #[test]
    fn test_overlay_only_when_enabled() {
        let mut overlay = DebugOverlay::new();
        overlay.push(|| "hello".to_string());
        let mut cam = Camera::debug(
            "debug",
            Vec2::splat(200.0),
            CameraSettings::default(),
            overlay,
            false,
        );

        let mut ctx = RecordingContext::new();
        cam.render_all(&mut ctx, std::iter::empty());
        assert_eq!(ctx.texts().count(), 0);

        cam.toggle_debug();
        cam.render_all(&mut ctx, std::iter::empty());
        assert_eq!(ctx.texts().collect::<Vec<_>>()[0].0, "hello");
    }
}
