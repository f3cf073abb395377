//! Rendering surface abstraction
//!
//! The core issues only the primitive operations on [`DrawContext`]; the
//! bootstrap collaborator owns the concrete surface and hands a mutable
//! handle into every draw call.

pub mod background;
pub mod recording;

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::util::vec2::Vec2;

/// RGBA colour, 8 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GRID: Color = Color::rgba(255, 255, 255, 40);
    pub const BORDER: Color = Color::rgb(220, 60, 60);
    pub const AGENT: Color = Color::rgb(90, 170, 255);
    pub const BULLET: Color = Color::rgb(255, 210, 80);
    pub const OVERLAY_TEXT: Color = Color::rgb(120, 255, 120);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Primitive 2D drawing operations, in screen coordinates
pub trait DrawContext {
    /// Push the current style and transform state
    fn save(&mut self);
    /// Pop the state pushed by the matching [`save`](DrawContext::save)
    fn restore(&mut self);

    fn clear_rect(&mut self, origin: Vec2, size: Vec2);
    fn fill_rect(&mut self, origin: Vec2, size: Vec2);
    fn stroke_line(&mut self, from: Vec2, to: Vec2);
    fn fill_circle(&mut self, center: Vec2, radius: f32);

    fn translate(&mut self, offset: Vec2);
    /// Rotate subsequent drawing about the current origin, in radians
    fn rotate(&mut self, radians: f32);

    fn set_font(&mut self, font: &str);
    fn fill_text(&mut self, text: &str, at: Vec2);

    fn set_fill_color(&mut self, color: Color);
    fn set_stroke_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f32);
}

/// Scoped save/restore on a [`DrawContext`]
///
/// Saves on construction and restores on drop, including during unwinding,
/// so style and transform changes made through the guard never leak out.
pub struct ContextGuard<'a> {
    ctx: &'a mut dyn DrawContext,
}

impl<'a> ContextGuard<'a> {
    pub fn new(ctx: &'a mut dyn DrawContext) -> Self {
        ctx.save();
        Self { ctx }
    }
}

impl<'a> Deref for ContextGuard<'a> {
    type Target = dyn DrawContext + 'a;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl<'a> DerefMut for ContextGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.ctx.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::recording::{DrawCommand, RecordingContext};
    use super::*;

    #[test]
    fn test_guard_restores_style() {
        let mut ctx = RecordingContext::new();
        ctx.set_fill_color(Color::WHITE);
        {
            let mut guard = ContextGuard::new(&mut ctx);
            guard.set_fill_color(Color::BULLET);
            guard.set_line_width(4.0);
        }
        assert_eq!(ctx.style().fill, Color::WHITE);
        assert_eq!(ctx.style().line_width, 1.0);
        assert_eq!(ctx.save_depth(), 0);
    }

    #[test]
    fn test_guard_restores_on_panic() {
        let mut ctx = RecordingContext::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut guard = ContextGuard::new(&mut ctx);
            guard.translate(Vec2::new(10.0, 10.0));
            panic!("draw failed");
        }));
        assert!(result.is_err());
        assert_eq!(ctx.save_depth(), 0);
        assert_eq!(ctx.style().translation, Vec2::ZERO);
        assert!(matches!(ctx.commands().last(), Some(DrawCommand::Restore)));
    }
}
