//! Declarative route markers
//!
//! A [`RouteMarker`] is the element a page author drops into an area slot to
//! declare "when `when` is requested, mount `component`". Markers publish
//! their [`RouteConfig`] to the slot they are connected to over a channel,
//! and withdraw it again on disconnect (or drop).

use area_core::component::ComponentRef;
use area_core::guard::RouteGuard;
use area_core::route::RouteAction;
use std::fmt;
use tokio::sync::mpsc;

/// A declarative route entry
#[derive(Clone)]
pub struct RouteConfig {
    /// Opaque route key
    pub when: String,
    /// Component to mount
    pub component: ComponentRef,
    /// Force re-render of an identical route
    pub exact: bool,
    /// Guard that must approve navigation
    pub guard: Option<RouteGuard>,
}

impl RouteConfig {
    /// Create a config for `when`
    pub fn new(when: impl Into<String>, component: impl Into<ComponentRef>) -> Self {
        Self {
            when: when.into(),
            component: component.into(),
            exact: false,
            guard: None,
        }
    }

    /// Translate into a navigation request for `area`
    pub fn to_action(&self, area: impl Into<String>) -> RouteAction {
        let mut action = RouteAction::new(area, self.component.clone()).exact(self.exact);
        if let Some(guard) = &self.guard {
            action = action.with_guard(guard.clone());
        }
        action
    }
}

impl fmt::Debug for RouteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteConfig")
            .field("when", &self.when)
            .field("component", &self.component.kind())
            .field("exact", &self.exact)
            .field("has_guard", &self.guard.is_some())
            .finish()
    }
}

/// Messages a marker sends to its slot
#[derive(Debug, Clone)]
pub enum MarkerMessage {
    /// A marker connected with its config
    Connected {
        /// Marker id
        id: String,
        /// Declared route
        config: RouteConfig,
    },
    /// A marker disconnected
    Disconnected {
        /// Marker id
        id: String,
    },
}

/// Channel end markers publish on
pub type MarkerSender = mpsc::UnboundedSender<MarkerMessage>;

/// A route marker element
pub struct RouteMarker {
    id: String,
    config: RouteConfig,
    slot: Option<MarkerSender>,
}

impl RouteMarker {
    /// Create a disconnected marker
    pub fn new(when: impl Into<String>, component: impl Into<ComponentRef>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            config: RouteConfig::new(when, component),
            slot: None,
        }
    }

    /// Force re-render of an identical route
    pub fn exact(mut self, exact: bool) -> Self {
        self.config.exact = exact;
        self
    }

    /// Require a guard
    pub fn guard(mut self, guard: RouteGuard) -> Self {
        self.config.guard = Some(guard);
        self
    }

    /// Marker id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Declared route
    pub fn get_config(&self) -> RouteConfig {
        self.config.clone()
    }

    /// Whether the marker is attached to a slot
    pub fn is_connected(&self) -> bool {
        self.slot.is_some()
    }

    /// Attach to a slot and publish the config
    pub fn connect(&mut self, slot: MarkerSender) {
        self.disconnect();

        let message = MarkerMessage::Connected {
            id: self.id.clone(),
            config: self.get_config(),
        };
        if slot.send(message).is_err() {
            tracing::debug!(when = %self.config.when, "Slot closed before marker connected");
            return;
        }
        self.slot = Some(slot);
    }

    /// Withdraw the config from the slot
    pub fn disconnect(&mut self) {
        if let Some(slot) = self.slot.take() {
            let _ = slot.send(MarkerMessage::Disconnected { id: self.id.clone() });
        }
    }
}

impl Drop for RouteMarker {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl fmt::Debug for RouteMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMarker")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("connected", &self.slot.is_some())
            .finish()
    }
}
