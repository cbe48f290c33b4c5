//! # snapwrap
//!
//! Frame a photo for sharing: padding, a white border, rounded corners, a
//! drop shadow and a background (solid, gradient, a palette-driven "Aurora"
//! mesh, or a wallpaper image), then export a PNG that matches the on-screen
//! preview pixel for pixel.
//!
//! # Architecture: One Geometry, Two Renderers
//!
//! ```text
//!                 ┌────────────┐
//! image ─────────►│  palette   │── Palette ───────┐
//!                 └────────────┘                  ▼
//! image size ──┐  ┌────────────┐          ┌──────────────┐   ┌──────────┐
//! settings ────┼─►│   layout   │─────────►│              │──►│ preview  │ CSS
//!              │  ├────────────┤          │   compose    │   └──────────┘
//!              ├─►│   shadow   │─────────►│ (Composition)│   ┌──────────┐
//!              │  ├────────────┤          │              │──►│  export  │ PNG
//!              └─►│ background │─────────►│              │   └──────────┘
//!                 └────────────┘          └──────────────┘
//! ```
//!
//! Every formula (fit scale, shadow offsets, gradient endpoints, mesh
//! anchors, corner radii) lives in exactly one pure function. [`compose`]
//! runs them once and returns a [`compose::Composition`]; the declarative
//! preview and the raster export both only read it. Neither renderer does
//! layout math of its own.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`color`] | RGBA color value and CSS color parsing |
//! | [`settings`] | `StyleSettings` snapshot, `StylePatch` deltas, presets |
//! | [`asset`] | Decoded source image with a content-derived id |
//! | [`palette`] | 5×5 color sampling into a 9-color palette and gradient |
//! | [`layout`] | Export size, card size and effective scale |
//! | [`shadow`] | Shadow offsets/blur/spread and transparent-canvas margins |
//! | [`gradient`] | `linear-gradient(...)` parser |
//! | [`background`] | Background resolution into a `FillInstruction` |
//! | [`compose`] | The shared geometry contract |
//! | [`preview`] | CSS renderer, viewport fit, hit-testing, pan gesture |
//! | [`imaging`] | Codec backend and the tiny-skia raster surface |
//! | [`export`] | PNG export renderer and file sink |
//! | [`session`] | Owning session: snapshots, palette tagging, export guard |
//! | [`suggestion`] | Interface to an external style-suggestion model |
//! | [`config`] | `snapwrap.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Logical Units Everywhere
//!
//! All geometry is in logical (1x) pixels. The raster surface multiplies by
//! its pixel density once, when converting a rect to device pixels, so the
//! export at 2x and the preview at any zoom share the same numbers.
//!
//! ## Stale Palettes Are Dropped, Not Cancelled
//!
//! Palette extraction always completes. Each request carries the id of the
//! image it was made for and the [`session::Session`] ignores results for an
//! image that is no longer active. No cancellation plumbing needed.
//!
//! ## Failures With A Safe Fallback Are Absorbed
//!
//! Unreadable pixels give the fallback palette, a bad gradient stop is
//! skipped, a missing wallpaper is left out. These are logged, never
//! returned. Only an undecodable source image or an empty PNG fail an export.

pub mod asset;
pub mod background;
pub mod color;
pub mod compose;
pub mod config;
pub mod export;
pub mod gradient;
pub mod imaging;
pub mod layout;
pub mod output;
pub mod palette;
pub mod preview;
pub mod session;
pub mod settings;
pub mod shadow;
pub mod suggestion;

#[cfg(test)]
pub(crate) mod test_helpers;
