/// Camera follow and shake tuning
pub mod camera {
    /// Per-axis lag beyond which the camera is clamped instead of smoothed
    pub const FOLLOW_DISTANCE: f32 = 50.0;
    /// Fraction of the remaining distance closed per tick while smoothing
    /// (frame-rate dependent)
    pub const LERP_FACTOR: f32 = 0.1;
    /// Per-axis distance at which the camera snaps onto its destination
    pub const SNAP_THRESHOLD: f32 = 1.0;
    /// Shake duration in seconds
    pub const SHAKE_DURATION: f32 = 0.5;
    /// Shake oscillation frequency in radians per second
    pub const SHAKE_FREQUENCY: f32 = 40.0;
    /// Zoom range
    pub const MIN_SCALE: f32 = 0.125;
    pub const MAX_SCALE: f32 = 3.0;
    pub const DEFAULT_SCALE: f32 = 1.0;
}

/// Free-roam debug camera
pub mod debug {
    /// Pan velocity in world units per second
    pub const PAN_SPEED: f32 = 400.0;
    /// Scale change per scroll-wheel unit
    pub const ZOOM_STEP: f32 = 0.001;
    /// Screen position of the first overlay line
    pub const OVERLAY_ORIGIN_X: f32 = 10.0;
    pub const OVERLAY_ORIGIN_Y: f32 = 20.0;
    /// Vertical advance per overlay line
    pub const OVERLAY_LINE_HEIGHT: f32 = 16.0;
    pub const OVERLAY_FONT: &str = "14px monospace";
}

/// Default entity dimensions in world units
pub mod entity {
    pub const AGENT_WIDTH: f32 = 32.0;
    pub const AGENT_HEIGHT: f32 = 32.0;
    pub const BULLET_RADIUS: f32 = 4.0;
}

/// World and viewport defaults
pub mod world {
    pub const MIN_X: f32 = -1000.0;
    pub const MIN_Y: f32 = -1000.0;
    pub const MAX_X: f32 = 1000.0;
    pub const MAX_Y: f32 = 1000.0;
    pub const VIEWPORT_WIDTH: f32 = 1280.0;
    pub const VIEWPORT_HEIGHT: f32 = 720.0;
    pub const GRID_CELL: f32 = 50.0;
    /// Upper bound on grid lines drawn per axis in one frame
    pub const MAX_GRID_LINES: usize = 512;
}

/// Frame pacing
pub mod frame {
    /// Default render rate in Hz
    pub const TARGET_FPS: u32 = 60;
    /// Frames kept for the rolling FPS average
    pub const MONITOR_WINDOW: usize = 120;
}

/// Snapshot transport
pub mod net {
    /// Mock source publish period in milliseconds
    pub const MOCK_SNAPSHOT_MS: u64 = 100;
    /// Outbound input-intent queue capacity
    pub const INTENT_QUEUE_SIZE: usize = 64;
}
