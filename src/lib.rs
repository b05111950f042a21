//! Area Router
//!
//! Client-side navigation for independent named areas. Each area keeps its
//! own committed route; navigations run through guards and lazy component
//! loading, dedup against what is already shown, and record history by
//! strategy.
//!
//! ```no_run
//! use area_router::{AreaRouter, RouteAction, RouterConfig};
//!
//! # async fn demo() -> Result<(), area_router::NavigationError> {
//! let router = AreaRouter::new(RouterConfig::default());
//! router
//!     .push(RouteAction::new("main", "user-profile").with_param("userId", "123"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use area_core::{
    build_query_string, cache_key, decode, deep_merge, encode, extract_query_params,
    get_tag_name, lazy, normalize_tag, same_component, same_route, sanitize, to_kebab_case,
    ActiveRoute, CodecError, ComponentClass, ComponentModule, ComponentRef, Element,
    ElementHandle, GuardError, GuardStream, GuardVerdict, HistoryStrategy, LazyComponent,
    LoadError, PrototypeShape, RouteAction, RouteGuard, RouteIdentity, RouteParams,
    RouteProps, RouteState, DEFAULT_DENY_LIST,
};
pub use area_state::{
    AreaOutlet, AreaRouter, AreaStatus, ConfigError, ElementRegistry, HistoryBackend,
    HistoryEntry, HistoryError, MemoryHistory, NavigationError, NavigationOutcome,
    RegistryError, RouterConfig, RouterEvent, RouterState,
};
pub use area_ui::{
    AreaSlot, MarkerMessage, MarkerSender, RenderCache, RouteConfig, RouteMarker, SlotError,
};

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "area_router=info,area_state=info,area_core=warn";

/// Install a global fmt subscriber
///
/// `RUST_LOG` wins over `default_filter`. Fails if a global subscriber is
/// already installed.
pub fn try_init_logging(
    default_filter: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
}

/// Install a global fmt subscriber with [`DEFAULT_LOG_FILTER`], ignoring repeat calls
pub fn init_logging() {
    if let Err(e) = try_init_logging(DEFAULT_LOG_FILTER) {
        tracing::debug!(error = %e, "Logging already initialized");
    }
}
