//! Dogfight Client Library
//!
//! Client-side core of a 2D arcade dogfight: agents and bullets
//! extrapolated between server snapshots, drawn through a smoothing,
//! shaking, zooming camera onto any [`render::DrawContext`].
//!
//! # Layout
//!
//! - `game` - camera, entities, debug overlay and the per-frame world loop
//! - `net` - snapshot wire format, the pending-snapshot slot and sources
//! - `render` - the drawing surface abstraction and backgrounds
//! - `input` - key state and intent dispatch

pub mod config;
pub mod util;
pub mod game;
pub mod net;
pub mod render;
pub mod input;
