//! UI-facing pieces of Area Router
//!
//! - [`marker`] - Declarative route markers
//! - [`slot`] - Area slots that collect markers and drive navigation
//! - [`render_cache`] - Render memoization keyed by route identity

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod marker;
pub mod render_cache;
pub mod slot;

pub use marker::{MarkerMessage, MarkerSender, RouteConfig, RouteMarker};
pub use render_cache::RenderCache;
pub use slot::{AreaSlot, SlotError};
