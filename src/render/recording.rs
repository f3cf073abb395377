//! In-memory [`DrawContext`] that records every primitive
//!
//! Used by the headless binary and by tests to assert on draw output and
//! on save/restore balance.

use serde::Serialize;
use tracing::warn;

use super::{Color, DrawContext};
use crate::util::vec2::Vec2;

/// One recorded primitive, with the style that was active when issued
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Save,
    Restore,
    ClearRect { origin: Vec2, size: Vec2 },
    FillRect { origin: Vec2, size: Vec2, color: Color },
    Line { from: Vec2, to: Vec2, color: Color, width: f32 },
    Circle { center: Vec2, radius: f32, color: Color },
    Translate { offset: Vec2 },
    Rotate { radians: f32 },
    Text { text: String, at: Vec2, font: String, color: Color },
}

/// Style and transform state covered by save/restore
#[derive(Debug, Clone, PartialEq)]
pub struct DrawState {
    pub fill: Color,
    pub stroke: Color,
    pub line_width: f32,
    pub font: String,
    /// Accumulated translation (not composed with rotation)
    pub translation: Vec2,
    pub rotation: f32,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            fill: Color::BLACK,
            stroke: Color::BLACK,
            line_width: 1.0,
            font: "10px sans-serif".to_string(),
            translation: Vec2::ZERO,
            rotation: 0.0,
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingContext {
    commands: Vec<DrawCommand>,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the log, keeping the current style state
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn style(&self) -> &DrawState {
        &self.state
    }

    /// Number of saves not yet matched by a restore
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn lines(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Line { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
    }

    pub fn fill_rects(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::FillRect { origin, size, .. } => Some((*origin, *size)),
            _ => None,
        })
    }

    pub fn circles(&self) -> impl Iterator<Item = (Vec2, f32)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Circle { center, radius, .. } => Some((*center, *radius)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = (&str, Vec2)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, at, .. } => Some((text.as_str(), *at)),
            _ => None,
        })
    }

    /// Serialize the log as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.commands)
    }
}

impl DrawContext for RecordingContext {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(state) => self.state = state,
            None => warn!("restore() without matching save()"),
        }
        self.commands.push(DrawCommand::Restore);
    }

    fn clear_rect(&mut self, origin: Vec2, size: Vec2) {
        self.commands.push(DrawCommand::ClearRect { origin, size });
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2) {
        self.commands.push(DrawCommand::FillRect {
            origin,
            size,
            color: self.state.fill,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color: self.state.stroke,
            width: self.state.line_width,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color: self.state.fill,
        });
    }

    fn translate(&mut self, offset: Vec2) {
        self.state.translation += offset;
        self.commands.push(DrawCommand::Translate { offset });
    }

    fn rotate(&mut self, radians: f32) {
        self.state.rotation += radians;
        self.commands.push(DrawCommand::Rotate { radians });
    }

    fn set_font(&mut self, font: &str) {
        self.state.font = font.to_string();
    }

    fn fill_text(&mut self, text: &str, at: Vec2) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            at,
            font: self.state.font.clone(),
            color: self.state.fill,
        });
    }

    fn set_fill_color(&mut self, color: Color) {
        self.state.fill = color;
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.state.stroke = color;
    }

    fn set_line_width(&mut self, width: f32) {
        self.state.line_width = width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_active_style() {
        let mut ctx = RecordingContext::new();
        ctx.set_fill_color(Color::AGENT);
        ctx.fill_rect(Vec2::ZERO, Vec2::splat(4.0));
        ctx.set_stroke_color(Color::BORDER);
        ctx.set_line_width(2.0);
        ctx.stroke_line(Vec2::ZERO, Vec2::ONE);

        assert_eq!(
            ctx.commands(),
            &[
                DrawCommand::FillRect {
                    origin: Vec2::ZERO,
                    size: Vec2::splat(4.0),
                    color: Color::AGENT,
                },
                DrawCommand::Line {
                    from: Vec2::ZERO,
                    to: Vec2::ONE,
                    color: Color::BORDER,
                    width: 2.0,
                },
            ]
        );
    }

    #[test]
    fn test_save_restore_round_trip() {
        let mut ctx = RecordingContext::new();
        ctx.save();
        ctx.set_font("16px monospace");
        ctx.rotate(1.0);
        ctx.restore();
        assert_eq!(ctx.style(), &DrawState::default());
        assert_eq!(ctx.save_depth(), 0);
    }

    #[test]
    fn test_unbalanced_restore_keeps_state() {
        let mut ctx = RecordingContext::new();
        ctx.set_line_width(3.0);
        ctx.restore();
        assert_eq!(ctx.style().line_width, 3.0);
    }

    #[test]
    fn test_json_log() {
        let mut ctx = RecordingContext::new();
        ctx.fill_circle(Vec2::new(1.0, 2.0), 3.0);
        let json = ctx.to_json().unwrap();
        assert!(json.contains(r#""op":"circle""#));
        assert_eq!(ctx.take_commands().len(), 1);
        assert!(ctx.commands().is_empty());
    }
}
