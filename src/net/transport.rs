//! Snapshot sources
//!
//! The transport is an external collaborator; the core only needs a way
//! to start it with a [`SnapshotSink`] and to stop it. Two sources are
//! provided: a scripted one for tests and a tokio-driven mock that flies
//! agents in circles for the headless client.

use std::time::Duration;

use crossbeam_channel::Receiver;
use hashbrown::HashSet;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::protocol::{encode_snapshot, AgentState, BulletState, ClientMessage, WorldSnapshot};
use super::snapshot_slot::SnapshotSink;
use crate::input::Key;
use crate::util::random::random_int_with;
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Snapshot source already started")]
    AlreadyStarted,
    #[error("No async runtime available to drive the source")]
    NoRuntime,
}

/// Supplier of authoritative snapshots
pub trait SnapshotSource: Send {
    /// Begin pushing snapshots into `sink`
    fn start(&mut self, sink: SnapshotSink) -> Result<(), TransportError>;

    /// Stop pushing; idempotent
    fn stop(&mut self);
}

/// Publishes a fixed list of snapshots when started
#[derive(Debug, Default)]
pub struct ScriptedSource {
    script: Vec<WorldSnapshot>,
    sink: Option<SnapshotSink>,
}

impl ScriptedSource {
    pub fn new(script: Vec<WorldSnapshot>) -> Self {
        Self { script, sink: None }
    }

    /// Publish another snapshot after start; ignored before start
    pub fn publish(&self, snapshot: WorldSnapshot) {
        if let Some(sink) = &self.sink {
            sink.publish(snapshot);
        }
    }

    pub fn is_started(&self) -> bool {
        self.sink.is_some()
    }
}

impl SnapshotSource for ScriptedSource {
    fn start(&mut self, sink: SnapshotSink) -> Result<(), TransportError> {
        if self.sink.is_some() {
            return Err(TransportError::AlreadyStarted);
        }
        for snapshot in self.script.drain(..) {
            sink.publish(snapshot);
        }
        self.sink = Some(sink);
        Ok(())
    }

    fn stop(&mut self) {
        self.sink = None;
    }
}

/// Mock source configuration
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Publish period
    pub period: Duration,
    /// Number of circling agents
    pub agent_count: usize,
    /// Agent steered by inbound input intents
    pub local_key: String,
    pub seed: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(crate::game::constants::net::MOCK_SNAPSHOT_MS),
            agent_count: 4,
            local_key: "local".to_string(),
            seed: 42,
        }
    }
}

/// Thrust applied to the local agent per held direction, units/s^2
const MOCK_THRUST: f32 = 150.0;
const MOCK_BULLET_SPEED: f32 = 300.0;

/// Simulated server flying agents around the origin
pub struct MockSource {
    config: MockConfig,
    intents: Option<Receiver<ClientMessage>>,
    task: Option<JoinHandle<()>>,
}

impl MockSource {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            intents: None,
            task: None,
        }
    }

    /// Consume outbound input intents to steer the local agent
    pub fn with_intents(mut self, intents: Receiver<ClientMessage>) -> Self {
        self.intents = Some(intents);
        self
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl SnapshotSource for MockSource {
    fn start(&mut self, sink: SnapshotSink) -> Result<(), TransportError> {
        if self.task.is_some() {
            return Err(TransportError::AlreadyStarted);
        }
        let handle = tokio::runtime::Handle::try_current().map_err(|_| TransportError::NoRuntime)?;

        let config = self.config.clone();
        let intents = self.intents.take();
        info!(
            "Mock snapshot source started: {} agents every {:?}",
            config.agent_count, config.period
        );

        self.task = Some(handle.spawn(async move {
            let mut sim = MockSimulation::new(&config);
            let mut interval = tokio::time::interval(config.period);
            loop {
                interval.tick().await;
                if let Some(rx) = &intents {
                    for message in rx.try_iter() {
                        sim.apply_intent(&message);
                    }
                }
                sim.advance(config.period.as_secs_f32());
                // Round-trip through the wire format like a real transport
                match encode_snapshot(&sim.snapshot()) {
                    Ok(json) => {
                        if let Err(e) = sink.publish_json(&json) {
                            warn!("Mock snapshot rejected: {}", e);
                        }
                    }
                    Err(e) => warn!("Mock snapshot encode failed: {}", e),
                }
            }
        }));
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Mock snapshot source stopped");
        }
    }
}

impl Drop for MockSource {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Server-side state of the mock
struct MockSimulation {
    tick: u64,
    time: f32,
    local_key: String,
    local: AgentState,
    held: HashSet<Key>,
    others: usize,
    rng: StdRng,
}

impl MockSimulation {
    fn new(config: &MockConfig) -> Self {
        Self {
            tick: 0,
            time: 0.0,
            local_key: config.local_key.clone(),
            local: AgentState::default(),
            held: HashSet::new(),
            others: config.agent_count.saturating_sub(1),
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    fn apply_intent(&mut self, message: &ClientMessage) {
        match message {
            ClientMessage::InputIntent { held } => {
                debug!("Mock received held keys {:?}", held);
                self.held = held.iter().copied().collect();
            }
        }
    }

    fn advance(&mut self, dt: f32) {
        self.tick += 1;
        self.time += dt;

        let mut thrust = Vec2::ZERO;
        for key in &self.held {
            if let Some(dir) = key.direction() {
                thrust += dir;
            }
        }
        self.local.acceleration = thrust.normalize() * MOCK_THRUST;
        self.local.position += self.local.velocity * dt;
        self.local.velocity += self.local.acceleration * dt;
        if self.local.velocity.length_sq() > 0.0 {
            self.local.orientation = self.local.velocity.y.atan2(self.local.velocity.x);
        }
    }

    fn circling(&self, index: usize) -> AgentState {
        let radius = 200.0 + index as f32 * 80.0;
        let omega = 0.6 / (1.0 + index as f32 * 0.25);
        let angle = self.time * omega + index as f32;
        let (sin, cos) = angle.sin_cos();
        AgentState {
            position: Vec2::new(cos, sin) * radius,
            velocity: Vec2::new(-sin, cos) * (radius * omega),
            acceleration: Vec2::new(cos, sin) * (-radius * omega * omega),
            orientation: angle + std::f32::consts::FRAC_PI_2,
        }
    }

    fn volley(&mut self, shooter: &AgentState) -> Vec<BulletState> {
        let count = random_int_with(&mut self.rng, 0, 3);
        let heading = Vec2::new(shooter.orientation.cos(), shooter.orientation.sin());
        (0..count)
            .map(|i| BulletState {
                position: shooter.position + heading * (20.0 + i as f32 * 15.0),
                velocity: shooter.velocity + heading * MOCK_BULLET_SPEED,
            })
            .collect()
    }

    fn snapshot(&mut self) -> WorldSnapshot {
        let mut snapshot = WorldSnapshot {
            tick: self.tick,
            ..Default::default()
        };
        let local = self.local.clone();
        let bullets = self.volley(&local);
        snapshot.bullets.insert(self.local_key.clone(), bullets);
        snapshot.players.insert(self.local_key.clone(), local);

        for index in 0..self.others {
            let key = format!("bot-{}", index);
            let state = self.circling(index);
            let bullets = self.volley(&state);
            snapshot.bullets.insert(key.clone(), bullets);
            snapshot.players.insert(key, state);
        }
        snapshot
    }
}
