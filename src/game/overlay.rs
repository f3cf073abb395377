//! On-screen diagnostic text for the debug camera

use std::sync::Arc;

use parking_lot::RwLock;

use crate::game::constants::debug::{
    OVERLAY_FONT, OVERLAY_LINE_HEIGHT, OVERLAY_ORIGIN_X, OVERLAY_ORIGIN_Y,
};
use crate::render::{Color, ContextGuard, DrawContext};
use crate::util::vec2::Vec2;

/// Per-frame figures published by the world for the overlay to read
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub frame: u64,
    pub fps: f32,
    pub camera_position: Vec2,
    pub scale: f32,
    pub agents: usize,
    pub bullets: usize,
    pub drawn: usize,
    pub snapshots_received: u64,
    pub snapshots_overwritten: u64,
}

pub type SharedDiagnostics = Arc<RwLock<Diagnostics>>;

/// Zero-argument line producer
pub type OverlayLine = Box<dyn Fn() -> String + Send + Sync>;

/// Stacked text lines starting at a fixed screen offset
pub struct DebugOverlay {
    lines: Vec<OverlayLine>,
    origin: Vec2,
    line_height: f32,
    color: Color,
}

impl DebugOverlay {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            origin: Vec2::new(OVERLAY_ORIGIN_X, OVERLAY_ORIGIN_Y),
            line_height: OVERLAY_LINE_HEIGHT,
            color: Color::OVERLAY_TEXT,
        }
    }

    /// Overlay showing frame rate, camera state, entity and snapshot counts
    pub fn with_diagnostics(diagnostics: SharedDiagnostics) -> Self {
        let mut overlay = Self::new();

        let d = diagnostics.clone();
        overlay.push(move || {
            let d = d.read();
            format!("frame {}  fps {:.1}", d.frame, d.fps)
        });
        let d = diagnostics.clone();
        overlay.push(move || {
            let d = d.read();
            format!(
                "camera ({:.1}, {:.1})  scale {:.3}",
                d.camera_position.x, d.camera_position.y, d.scale
            )
        });
        let d = diagnostics.clone();
        overlay.push(move || {
            let d = d.read();
            format!("agents {}  bullets {}  drawn {}", d.agents, d.bullets, d.drawn)
        });
        let d = diagnostics;
        overlay.push(move || {
            let d = d.read();
            format!(
                "snapshots {}  overwritten {}",
                d.snapshots_received, d.snapshots_overwritten
            )
        });

        overlay
    }

    pub fn push<F>(&mut self, line: F)
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.lines.push(Box::new(line));
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn render(&self, ctx: &mut dyn DrawContext) {
        let mut ctx = ContextGuard::new(ctx);
        ctx.set_font(OVERLAY_FONT);
        ctx.set_fill_color(self.color);

        let mut cursor = self.origin;
        for line in &self.lines {
            ctx.fill_text(&line(), cursor);
            cursor.y += self.line_height;
        }
    }
}

impl Default for DebugOverlay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::RecordingContext;

    #[test]
    fn test_lines_stack_downward() {
        let mut overlay = DebugOverlay::new();
        overlay.push(|| "one".to_string());
        overlay.push(|| "two".to_string());
        overlay.push(|| "three".to_string());

        let mut ctx = RecordingContext::new();
        overlay.render(&mut ctx);

        let texts: Vec<_> = ctx.texts().collect();
        assert_eq!(texts.len(), 3);
        assert_eq!(texts[0], ("one", Vec2::new(OVERLAY_ORIGIN_X, OVERLAY_ORIGIN_Y)));
        assert_eq!(texts[2].1.y, OVERLAY_ORIGIN_Y + 2.0 * OVERLAY_LINE_HEIGHT);
        assert_eq!(ctx.save_depth(), 0);
        assert_ne!(ctx.style().font, OVERLAY_FONT);
    }

    #[test]
    fn test_lines_read_live_diagnostics() {
        let shared: SharedDiagnostics = Arc::default();
        let overlay = DebugOverlay::with_diagnostics(shared.clone());
        assert_eq!(overlay.len(), 4);

        shared.write().agents = 7;
        let mut ctx = RecordingContext::new();
        overlay.render(&mut ctx);
        let (third, _) = ctx.texts().nth(2).unwrap();
        assert!(third.starts_with("agents 7"));
    }
}
