//! Background strategies drawn beneath the scene
//!
//! Each strategy receives the visible window in world coordinates and a
//! world-to-screen transform; every endpoint goes through that transform
//! so the background stays aligned with culled scene objects.

use super::{Color, ContextGuard, DrawContext};
use crate::game::constants::world::MAX_GRID_LINES;
use crate::util::vec2::Vec2;

/// Pluggable background renderer
pub trait Background: Send {
    fn draw(
        &self,
        ctx: &mut dyn DrawContext,
        viewport_top_left: Vec2,
        viewport_bottom_right: Vec2,
        cell_size: Vec2,
        world_to_screen: &dyn Fn(Vec2) -> Vec2,
    );
}

/// Offset of the viewport corner past the nearest grid line
///
/// The remainder keeps the dividend's sign, so for a negative corner the
/// offset is negative too.
pub fn grid_origin_offset(viewport_top_left: Vec2, cell_size: Vec2) -> Vec2 {
    viewport_top_left % cell_size
}

/// World position of the first grid line on each axis
pub fn first_grid_line(viewport_top_left: Vec2, cell_size: Vec2) -> Vec2 {
    viewport_top_left - grid_origin_offset(viewport_top_left, cell_size)
}

/// Infinite coordinate grid clipped to the viewport
#[derive(Debug, Clone)]
pub struct GridBackground {
    pub color: Color,
    pub line_width: f32,
}

impl Default for GridBackground {
    fn default() -> Self {
        Self {
            color: Color::GRID,
            line_width: 1.0,
        }
    }
}

impl Background for GridBackground {
    fn draw(
        &self,
        ctx: &mut dyn DrawContext,
        viewport_top_left: Vec2,
        viewport_bottom_right: Vec2,
        cell_size: Vec2,
        world_to_screen: &dyn Fn(Vec2) -> Vec2,
    ) {
        if cell_size.x <= 0.0 || cell_size.y <= 0.0 {
            return;
        }

        let mut ctx = ContextGuard::new(ctx);
        ctx.set_stroke_color(self.color);
        ctx.set_line_width(self.line_width);

        let first = first_grid_line(viewport_top_left, cell_size);

        for i in 0..grid_line_count(first.x, viewport_bottom_right.x, cell_size.x) {
            let x = first.x + i as f32 * cell_size.x;
            ctx.stroke_line(
                world_to_screen(Vec2::new(x, viewport_top_left.y)),
                world_to_screen(Vec2::new(x, viewport_bottom_right.y)),
            );
        }

        for i in 0..grid_line_count(first.y, viewport_bottom_right.y, cell_size.y) {
            let y = first.y + i as f32 * cell_size.y;
            ctx.stroke_line(
                world_to_screen(Vec2::new(viewport_top_left.x, y)),
                world_to_screen(Vec2::new(viewport_bottom_right.x, y)),
            );
        }
    }
}

/// Lines on one axis from `first` up to `last` inclusive, capped at
/// [`MAX_GRID_LINES`]. Zero when one cell is below the float resolution
/// at `first`.
fn grid_line_count(first: f32, last: f32, cell: f32) -> usize {
    if first + cell == first || last.is_nan() || last < first {
        return 0;
    }
    let steps = ((last - first) / cell).floor();
    if !steps.is_finite() {
        return 0;
    }
    (steps as usize).saturating_add(1).min(MAX_GRID_LINES)
}

/// Rectangle outlining the playable world
#[derive(Debug, Clone)]
pub struct WorldBorderBackground {
    pub min: Vec2,
    pub max: Vec2,
    pub color: Color,
    pub line_width: f32,
}

impl WorldBorderBackground {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min,
            max,
            color: Color::BORDER,
            line_width: 3.0,
        }
    }

    fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
    }
}

impl Background for WorldBorderBackground {
    fn draw(
        &self,
        ctx: &mut dyn DrawContext,
        _viewport_top_left: Vec2,
        _viewport_bottom_right: Vec2,
        _cell_size: Vec2,
        world_to_screen: &dyn Fn(Vec2) -> Vec2,
    ) {
        let mut ctx = ContextGuard::new(ctx);
        ctx.set_stroke_color(self.color);
        ctx.set_line_width(self.line_width);

        let corners = self.corners();
        for i in 0..corners.len() {
            let from = corners[i];
            let to = corners[(i + 1) % corners.len()];
            ctx.stroke_line(world_to_screen(from), world_to_screen(to));
        }
    }
}

/// World border with the grid drawn over it
#[derive(Debug, Clone)]
pub struct BorderedGridBackground {
    pub border: WorldBorderBackground,
    pub grid: GridBackground,
}

impl BorderedGridBackground {
    pub fn new(world_min: Vec2, world_max: Vec2) -> Self {
        Self {
            border: WorldBorderBackground::new(world_min, world_max),
            grid: GridBackground::default(),
        }
    }
}

impl Background for BorderedGridBackground {
    fn draw(
        &self,
        ctx: &mut dyn DrawContext,
        viewport_top_left: Vec2,
        viewport_bottom_right: Vec2,
        cell_size: Vec2,
        world_to_screen: &dyn Fn(Vec2) -> Vec2,
    ) {
        self.border.draw(
            ctx,
            viewport_top_left,
            viewport_bottom_right,
            cell_size,
            world_to_screen,
        );
        self.grid.draw(
            ctx,
            viewport_top_left,
            viewport_bottom_right,
            cell_size,
            world_to_screen,
        );
    }
}
