//! Area slots
//!
//! An [`AreaSlot`] is the container side of the marker contract: it owns the
//! route table for one area, fed by [`MarkerMessage`]s, and turns a requested
//! `when` key into a push on the router.

use area_core::route::{ActiveRoute, RouteParams};
use area_state::navigator::{AreaRouter, NavigationError, NavigationOutcome};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::marker::{MarkerMessage, MarkerSender, RouteConfig};

/// Slot errors
#[derive(Debug, Error)]
pub enum SlotError {
    /// No connected marker declares this key
    #[error("No route declared for '{0}'")]
    UnknownRoute(String),

    /// The router refused the navigation
    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

/// Result type for slot operations
pub type Result<T> = std::result::Result<T, SlotError>;

/// Route table and navigation entry point for one area
#[derive(Debug)]
pub struct AreaSlot {
    area: String,
    /// Connected markers in connection order
    routes: Vec<(String, RouteConfig)>,
    tx: MarkerSender,
    rx: mpsc::UnboundedReceiver<MarkerMessage>,
}

impl AreaSlot {
    /// Create an empty slot for `area`
    pub fn new(area: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            area: area.into(),
            routes: Vec::new(),
            tx,
            rx,
        }
    }

    /// Area name
    pub fn area(&self) -> &str {
        &self.area
    }

    /// Sender for markers to connect with
    pub fn sender(&self) -> MarkerSender {
        self.tx.clone()
    }

    /// Apply all pending marker messages; returns how many were applied
    pub fn sync(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.apply(message);
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, message: MarkerMessage) {
        match message {
            MarkerMessage::Connected { id, config } => {
                tracing::debug!(area = %self.area, when = %config.when, "Route marker connected");
                self.routes.retain(|(existing, _)| *existing != id);
                self.routes.push((id, config));
            }
            MarkerMessage::Disconnected { id } => {
                self.routes.retain(|(existing, _)| *existing != id);
            }
        }
    }

    /// Declared route keys, in connection order
    pub fn routes(&self) -> Vec<&str> {
        self.routes.iter().map(|(_, config)| config.when.as_str()).collect()
    }

    /// Config for `when`; the most recently connected marker wins
    pub fn config(&self, when: &str) -> Option<&RouteConfig> {
        self.routes
            .iter()
            .rev()
            .map(|(_, config)| config)
            .find(|config| config.when == when)
    }

    /// Navigate the area to the route declared for `when`
    pub async fn navigate(
        &mut self,
        router: &AreaRouter,
        when: &str,
        params: RouteParams,
    ) -> Result<NavigationOutcome> {
        self.sync();

        let action = self
            .config(when)
            .ok_or_else(|| SlotError::UnknownRoute(when.to_string()))?
            .to_action(self.area.clone())
            .with_params(params);

        Ok(router.push(action).await?)
    }

    /// Clear the area
    pub fn clear(&self, router: &AreaRouter) -> Option<ActiveRoute> {
        router.pop(&self.area)
    }
}
