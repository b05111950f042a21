//! Navigation engine
//!
//! [`AreaRouter`] accepts push/replace/pop requests per named area, runs
//! guards, resolves components (lazily if needed), records history according
//! to the requested strategy and publishes the new [`ActiveRoute`].
//!
//! Navigation looks atomic to subscribers: nothing is published until the
//! route commits. Pushes for the same area supersede each other; each push
//! holds a ticket and is dropped as stale if a newer push or a pop for its
//! area happened while it was waiting on a guard or an import.

use area_core::codec;
use area_core::component::{get_tag_name, ElementHandle};
use area_core::equality::{cache_key, same_route};
use area_core::guard::{GuardError, GuardVerdict};
use area_core::lazy::LoadError;
use area_core::route::{ActiveRoute, HistoryStrategy, RouteAction};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::config::RouterConfig;
use crate::history::{HistoryBackend, HistoryEntry, MemoryHistory};
use crate::registry::ElementRegistry;
use crate::state::RouterState;

/// Navigation errors
#[derive(Debug, Error)]
pub enum NavigationError {
    /// The area name was empty
    #[error("Area name must not be empty")]
    EmptyArea,

    /// The guard emitted `false`
    #[error("Navigation to '{area}' rejected by guard")]
    GuardRejected {
        /// Target area
        area: String,
    },

    /// The guard stream errored
    #[error("Guard for '{area}' failed: {source}")]
    GuardFailed {
        /// Target area
        area: String,
        /// Guard error
        #[source]
        source: GuardError,
    },

    /// The guard stream ended without emitting
    #[error("Guard for '{area}' completed without a decision")]
    GuardIncomplete {
        /// Target area
        area: String,
    },

    /// The component could not be materialized
    #[error("Failed to resolve component for '{area}': {source}")]
    Resolve {
        /// Target area
        area: String,
        /// Load error
        #[source]
        source: LoadError,
    },

    /// A history entry without a tag cannot be restored
    #[error("History entry for '{area}' has no tag")]
    MissingTag {
        /// Target area
        area: String,
    },
}

/// Result type for navigation
pub type Result<T> = std::result::Result<T, NavigationError>;

/// What a successful push did
#[derive(Debug, Clone)]
pub enum NavigationOutcome {
    /// The route was committed and published
    Committed(ActiveRoute),
    /// The same route was already committed; nothing happened
    Unchanged,
    /// A newer navigation for the area took over; nothing happened
    Superseded,
}

impl NavigationOutcome {
    /// Whether the navigation committed
    pub fn is_committed(&self) -> bool {
        matches!(self, NavigationOutcome::Committed(_))
    }
}

/// A container that renders whatever is mounted into an area
#[cfg_attr(test, mockall::automock)]
pub trait AreaOutlet: Send + Sync {
    /// Replace the area's content with `element`
    fn mount(&self, area: &str, element: &ElementHandle);

    /// Clear the area's content
    fn unmount(&self, area: &str);
}

/// The area router
#[derive(Clone)]
pub struct AreaRouter {
    state: RouterState,
    registry: ElementRegistry,
    history: Arc<dyn HistoryBackend>,
    outlets: Arc<RwLock<HashMap<String, Arc<dyn AreaOutlet>>>>,
    config: RouterConfig,
}

impl AreaRouter {
    /// Create a router with in-memory history and an empty registry
    pub fn new(config: RouterConfig) -> Self {
        Self {
            state: RouterState::new(config.event_capacity),
            registry: ElementRegistry::new(),
            history: Arc::new(MemoryHistory::new()),
            outlets: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Use a different history backend
    pub fn with_history(mut self, history: Arc<dyn HistoryBackend>) -> Self {
        self.history = history;
        self
    }

    /// Use a shared element registry
    pub fn with_registry(mut self, registry: ElementRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Router state, for reading and subscribing
    pub fn state(&self) -> &RouterState {
        &self.state
    }

    /// Element registry
    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// History backend
    pub fn history(&self) -> &Arc<dyn HistoryBackend> {
        &self.history
    }

    /// Configuration
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Render `area` into `outlet`
    pub fn attach_outlet(&self, area: impl Into<String>, outlet: Arc<dyn AreaOutlet>) {
        let area = area.into();
        if let Some(element) = self.state.element(&area) {
            outlet.mount(&area, &element);
        }
        self.outlets.write().insert(area, outlet);
    }

    /// Stop rendering `area` into its outlet
    pub fn detach_outlet(&self, area: &str) -> Option<Arc<dyn AreaOutlet>> {
        self.outlets.write().remove(area)
    }

    /// Cache key of the route committed for `area`
    pub fn cache_key(&self, area: &str) -> Option<String> {
        self.state.active(area).map(|route| cache_key(&route))
    }

    /// Navigate an area
    ///
    /// Returns [`NavigationOutcome::Unchanged`] when the same route is already
    /// committed (unless `exact` forces a re-render). Guard rejections and
    /// load failures are errors and leave the committed route in place.
    pub async fn push(&self, action: RouteAction) -> Result<NavigationOutcome> {
        if action.area.is_empty() {
            return Err(NavigationError::EmptyArea);
        }
        let area = action.area.clone();

        // Taken before the dedup check so a repeat of the committed route
        // still supersedes anything in flight for the area
        let ticket = self.state.begin(&area);

        if !action.exact {
            if let Some(active) = self.state.active(&area) {
                if same_route(&action, &active) {
                    tracing::debug!(area = %area, "Route already committed, skipping");
                    return Ok(NavigationOutcome::Unchanged);
                }
            }
        }

        if let Some(guard) = &action.guard {
            let verdict = guard.evaluate().await;
            if !self.state.is_current(&area, ticket) {
                tracing::debug!(area = %area, "Navigation superseded during guard");
                return Ok(NavigationOutcome::Superseded);
            }
            if let Some(err) = guard_error(&area, verdict) {
                tracing::info!(area = %area, error = %err, "Navigation aborted by guard");
                self.state.report_abort(&area, err.to_string());
                return Err(err);
            }
        }

        let element = match self.registry.resolve(&action.component).await {
            Ok(element) => element,
            Err(source) => {
                if !self.state.is_current(&area, ticket) {
                    return Ok(NavigationOutcome::Superseded);
                }
                let err = NavigationError::Resolve { area: area.clone(), source };
                tracing::warn!(area = %area, error = %err, "Navigation aborted");
                self.state.report_abort(&area, err.to_string());
                return Err(err);
            }
        };

        for (name, value) in action.params.iter().chain(action.props.iter()) {
            element.set_property(name.clone(), value.clone());
        }

        let route = ActiveRoute::from_action(&action);
        if self.state.commit(ticket, route.clone(), element.clone()).is_err() {
            tracing::debug!(area = %area, "Navigation superseded before commit");
            return Ok(NavigationOutcome::Superseded);
        }

        self.mount(&area, &element);

        let strategy = action
            .history_strategy
            .unwrap_or(self.config.default_history_strategy);
        self.record_history(&action, &element, strategy);

        self.state.publish(&area);

        tracing::debug!(
            area = %area,
            tag = %element.tag_name(),
            strategy = %strategy,
            params = %serde_json::Value::Object(codec::sanitize(&action.params, &self.config.deny_list)),
            state = %serde_json::Value::Object(codec::sanitize(&action.state, &self.config.deny_list)),
            "Committed route"
        );

        Ok(NavigationOutcome::Committed(route))
    }

    /// Navigate an area, replacing the current history entry
    pub async fn replace(&self, action: RouteAction) -> Result<NavigationOutcome> {
        self.push(action.with_history_strategy(HistoryStrategy::Replace)).await
    }

    /// Clear an area, returning what was committed
    ///
    /// In-flight pushes for the area are superseded. History is not touched.
    pub fn pop(&self, area: &str) -> Option<ActiveRoute> {
        let (route, _element) = self.state.clear(area)?;

        let outlet = self.outlets.read().get(area).cloned();
        if let Some(outlet) = outlet {
            outlet.unmount(area);
        }

        tracing::debug!(area, "Popped area");
        Some(route)
    }

    /// Re-apply a stored history entry without writing history again
    pub async fn restore(&self, entry: &HistoryEntry) -> Result<NavigationOutcome> {
        let tag = entry.tag.clone().ok_or_else(|| NavigationError::MissingTag {
            area: entry.area.clone(),
        })?;

        let action = RouteAction::new(entry.area.clone(), tag)
            .with_params(entry.params())
            .with_state(entry.state())
            .with_history_strategy(HistoryStrategy::Silent);

        self.push(action).await
    }

    fn mount(&self, area: &str, element: &ElementHandle) {
        let outlet = self.outlets.read().get(area).cloned();
        if let Some(outlet) = outlet {
            outlet.mount(area, element);
        }
    }

    fn record_history(&self, action: &RouteAction, element: &ElementHandle, strategy: HistoryStrategy) {
        if strategy == HistoryStrategy::Silent {
            return;
        }

        let state = if self.config.sanitize_history {
            codec::sanitize(&action.state, &self.config.deny_list)
        } else {
            action.state.clone()
        };

        let tag = get_tag_name(&action.component).or_else(|| Some(element.tag_name()));
        let entry = HistoryEntry::new(action.area.clone())
            .with_tag(tag)
            .with_state(&state)
            .with_params(&action.params);

        let result = match strategy {
            HistoryStrategy::Push => self.history.push_entry(entry),
            HistoryStrategy::Replace => self.history.replace_entry(entry),
            HistoryStrategy::Silent => Ok(()),
        };

        if let Err(e) = result {
            tracing::warn!(area = %action.area, error = %e, "Failed to record history entry");
        }
    }
}

fn guard_error(area: &str, verdict: GuardVerdict) -> Option<NavigationError> {
    let area = area.to_string();
    match verdict {
        GuardVerdict::Allow => None,
        GuardVerdict::Deny => Some(NavigationError::GuardRejected { area }),
        GuardVerdict::Error(source) => Some(NavigationError::GuardFailed { area, source }),
        GuardVerdict::Completed => Some(NavigationError::GuardIncomplete { area }),
    }
}

impl std::fmt::Debug for AreaRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AreaRouter")
            .field("state", &self.state)
            .field("registry", &self.registry)
            .field("outlets", &self.outlets.read().keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}
