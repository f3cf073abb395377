use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use dogfight_client::config::ClientConfig;
use dogfight_client::game::world::{GameWorld, TickOutcome};
use dogfight_client::input::{InputDispatcher, InputEvent, Key};
use dogfight_client::net::transport::{MockConfig, MockSource};
use dogfight_client::render::recording::RecordingContext;

/// Steering pattern for the headless run: one heading per phase
const PILOT_PHASE: Duration = Duration::from_secs(2);
const PILOT_HEADINGS: [Key; 4] = [Key::Up, Key::Right, Key::Down, Key::Left];
const SHAKE_EVERY: u64 = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Dogfight Client v{}", env!("CARGO_PKG_VERSION"));

    let mut config = ClientConfig::load_or_default();
    config.validate().context("invalid client configuration")?;
    info!(
        "Configuration loaded: {}x{} at {} fps, debug={}",
        config.viewport_size.x, config.viewport_size.y, config.target_fps, config.debug_mode
    );

    let run_for = std::env::var("RUN_SECONDS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs);
    let dump_path = std::env::var("FRAME_DUMP").ok();

    // The camera follows the agent the scripted pilot steers
    let local_key = config
        .local_player
        .get_or_insert_with(|| MockConfig::default().local_key)
        .clone();

    let mut dispatcher = InputDispatcher::default();
    let source = MockSource::new(MockConfig {
        period: config.mock_snapshot_period,
        local_key,
        ..Default::default()
    })
    .with_intents(dispatcher.outbound());

    let frame_period = config.frame_period();
    let mut world = GameWorld::new(config, Box::new(source));
    let mut ctx = RecordingContext::new();
    let mut last_frame = RecordingContext::new();

    let shutdown = async {
        match run_for {
            Some(limit) => {
                tokio::select! {
                    _ = tokio::time::sleep(limit) => info!("Run time of {:?} elapsed", limit),
                    _ = tokio::signal::ctrl_c() => info!("Shutdown signal received"),
                }
            }
            None => {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Shutdown signal received");
                }
            }
        }
    };
    tokio::pin!(shutdown);

    let mut interval = tokio::time::interval(frame_period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let started = Instant::now();
    let mut last_tick = started;
    let mut last_summary = started;
    let mut heading: Option<Key> = None;
    let mut shakes = 0u64;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut shutdown => break,
        }

        let now = Instant::now();
        let uptime = now.duration_since(started);

        // Scripted pilot
        let phase = (uptime.as_millis() / PILOT_PHASE.as_millis()) as usize;
        let next = PILOT_HEADINGS[phase % PILOT_HEADINGS.len()];
        if heading != Some(next) {
            if let Some(previous) = heading {
                dispatcher.handle(InputEvent::KeyUp(previous));
            }
            dispatcher.handle(InputEvent::KeyDown(next));
            heading = Some(next);
        }
        if uptime.as_secs() / SHAKE_EVERY > shakes {
            shakes = uptime.as_secs() / SHAKE_EVERY;
            if let Some(intent) = dispatcher.handle(InputEvent::KeyDown(Key::Shake)) {
                world.apply_intent(intent);
            }
        }
        world.set_directions(dispatcher.directions());

        let outcome = world.tick(now.duration_since(last_tick), &mut ctx);
        last_tick = now;
        if let TickOutcome::Rendered { .. } = outcome {
            last_frame = std::mem::take(&mut ctx);
        }

        if now.duration_since(last_summary) >= Duration::from_secs(1) {
            last_summary = now;
            let diagnostics = world.diagnostics();
            let d = diagnostics.read();
            info!(
                "frame {} | {:.1} fps | camera ({:.0}, {:.0}) | agents {} bullets {} drawn {} | snapshots {} ({} overwritten)",
                d.frame,
                d.fps,
                d.camera_position.x,
                d.camera_position.y,
                d.agents,
                d.bullets,
                d.drawn,
                d.snapshots_received,
                d.snapshots_overwritten
            );
            debug!(
                "{} draw commands last frame, {} intents dropped",
                last_frame.commands().len(),
                dispatcher.dropped_count()
            );
        }
    }

    info!("Shutting down...");
    world.stop();

    if let Some(path) = dump_path {
        let json = last_frame.to_json().context("failed to serialize last frame")?;
        std::fs::write(&path, json).with_context(|| format!("failed to write {}", path))?;
        info!("Last frame written to {}", path);
    }

    info!("Client stopped");
    Ok(())
}
