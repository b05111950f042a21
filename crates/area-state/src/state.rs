//! Per-area router state
//!
//! [`RouterState`] holds the committed [`ActiveRoute`] of every area. It is an
//! explicit object handed to whoever needs to read or subscribe; the
//! navigation engine is its only writer.

use area_core::component::ElementHandle;
use area_core::route::ActiveRoute;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Events broadcast when an area changes
#[derive(Debug, Clone)]
pub enum RouterEvent {
    /// A navigation committed
    Committed(ActiveRoute),
    /// An area was cleared
    Popped(ActiveRoute),
    /// A navigation was aborted before committing
    Aborted {
        /// Target area
        area: String,
        /// Why it was aborted
        reason: String,
    },
}

/// Lifecycle of an area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaStatus {
    /// No route committed
    Idle,
    /// A route is committed
    Committed,
}

/// Returned when a navigation ticket is no longer the latest for its area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StaleTicket;

struct AreaEntry {
    active: Option<ActiveRoute>,
    element: Option<ElementHandle>,
    /// Bumped by every push and pop; a push only applies with the latest value
    generation: u64,
    tx: watch::Sender<Option<ActiveRoute>>,
}

impl AreaEntry {
    fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            active: None,
            element: None,
            generation: 0,
            tx,
        }
    }
}

struct StateInner {
    areas: RwLock<HashMap<String, AreaEntry>>,
    events_tx: broadcast::Sender<RouterEvent>,
}

/// Committed routes per area
#[derive(Clone)]
pub struct RouterState {
    inner: Arc<StateInner>,
}

impl RouterState {
    /// Create empty state; `event_capacity` bounds lagging event subscribers
    pub fn new(event_capacity: usize) -> Self {
        let (events_tx, _) = broadcast::channel(event_capacity.max(1));
        Self {
            inner: Arc::new(StateInner {
                areas: RwLock::new(HashMap::new()),
                events_tx,
            }),
        }
    }

    /// Committed route for `area`
    pub fn active(&self, area: &str) -> Option<ActiveRoute> {
        self.inner.areas.read().get(area).and_then(|entry| entry.active.clone())
    }

    /// Element mounted for `area`
    pub fn element(&self, area: &str) -> Option<ElementHandle> {
        self.inner.areas.read().get(area).and_then(|entry| entry.element.clone())
    }

    /// Lifecycle of `area`
    pub fn status(&self, area: &str) -> AreaStatus {
        match self.inner.areas.read().get(area) {
            Some(entry) if entry.active.is_some() => AreaStatus::Committed,
            _ => AreaStatus::Idle,
        }
    }

    /// Names of areas with a committed route, sorted
    pub fn areas(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .areas
            .read()
            .iter()
            .filter(|(_, entry)| entry.active.is_some())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Subscribe to the committed route of `area`
    pub fn subscribe(&self, area: &str) -> watch::Receiver<Option<ActiveRoute>> {
        let mut areas = self.inner.areas.write();
        areas
            .entry(area.to_string())
            .or_insert_with(AreaEntry::new)
            .tx
            .subscribe()
    }

    /// Subscribe to events for all areas
    pub fn events(&self) -> broadcast::Receiver<RouterEvent> {
        self.inner.events_tx.subscribe()
    }

    /// Take a navigation ticket for `area`, invalidating older ones
    pub(crate) fn begin(&self, area: &str) -> u64 {
        let mut areas = self.inner.areas.write();
        let entry = areas.entry(area.to_string()).or_insert_with(AreaEntry::new);
        entry.generation += 1;
        entry.generation
    }

    /// Whether `ticket` is still the latest for `area`
    pub(crate) fn is_current(&self, area: &str, ticket: u64) -> bool {
        self.inner
            .areas
            .read()
            .get(area)
            .is_some_and(|entry| entry.generation == ticket)
    }

    /// Store `route` if `ticket` is still current; returns the replaced element
    pub(crate) fn commit(
        &self,
        ticket: u64,
        route: ActiveRoute,
        element: ElementHandle,
    ) -> Result<Option<ElementHandle>, StaleTicket> {
        let mut areas = self.inner.areas.write();
        let entry = areas.entry(route.area.clone()).or_insert_with(AreaEntry::new);
        if entry.generation != ticket {
            return Err(StaleTicket);
        }
        entry.active = Some(route);
        Ok(entry.element.replace(element))
    }

    /// Notify subscribers of the committed route of `area`
    pub(crate) fn publish(&self, area: &str) {
        let active = self.active(area);
        if let Some(entry) = self.inner.areas.read().get(area) {
            entry.tx.send_replace(active.clone());
        }
        if let Some(route) = active {
            let _ = self.inner.events_tx.send(RouterEvent::Committed(route));
        }
    }

    /// Clear `area`, invalidating in-flight navigations; returns what was committed
    pub(crate) fn clear(&self, area: &str) -> Option<(ActiveRoute, Option<ElementHandle>)> {
        let mut areas = self.inner.areas.write();
        let entry = areas.get_mut(area)?;
        entry.generation += 1;
        let route = entry.active.take()?;
        let element = entry.element.take();
        entry.tx.send_replace(None);
        drop(areas);

        let _ = self.inner.events_tx.send(RouterEvent::Popped(route.clone()));
        Some((route, element))
    }

    /// Broadcast an aborted navigation
    pub(crate) fn report_abort(&self, area: &str, reason: impl Into<String>) {
        let _ = self.inner.events_tx.send(RouterEvent::Aborted {
            area: area.to_string(),
            reason: reason.into(),
        });
    }
}

impl Default for RouterState {
    fn default() -> Self {
        Self::new(64)
    }
}

impl std::fmt::Debug for RouterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterState").field("areas", &self.areas()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use area_core::component::Element;
    use area_core::route::RouteAction;

    fn route(area: &str, tag: &str) -> ActiveRoute {
        ActiveRoute::from_action(&RouteAction::new(area, tag))
    }

    fn element(tag: &str) -> ElementHandle {
        ElementHandle::new(Element::new(tag))
    }

    #[test]
    fn test_initial_state_is_idle() {
        let state = RouterState::default();
        assert_eq!(state.status("main"), AreaStatus::Idle);
        assert!(state.active("main").is_none());
        assert!(state.areas().is_empty());
    }

    #[test]
    fn test_commit_with_current_ticket() {
        let state = RouterState::default();
        let ticket = state.begin("main");
        let previous = state.commit(ticket, route("main", "x-home"), element("x-home")).unwrap();

        assert!(previous.is_none());
        assert_eq!(state.status("main"), AreaStatus::Committed);
        assert_eq!(state.element("main").unwrap().tag_name(), "x-home");
        assert_eq!(state.areas(), vec!["main".to_string()]);
    }

    #[test]
    fn test_stale_ticket_is_rejected() {
        let state = RouterState::default();
        let first = state.begin("main");
        let second = state.begin("main");

        assert!(!state.is_current("main", first));
        assert!(state.is_current("main", second));
        assert_eq!(state.commit(first, route("main", "x-a"), element("x-a")).unwrap_err(), StaleTicket);
        assert!(state.active("main").is_none());
    }

    #[test]
    fn test_tickets_are_per_area() {
        let state = RouterState::default();
        let main = state.begin("main");
        state.begin("drawer");
        assert!(state.is_current("main", main));
    }

    #[tokio::test]
    async fn test_subscribers_see_publish_and_clear() {
        let state = RouterState::default();
        let mut rx = state.subscribe("main");
        let mut events = state.events();
        assert!(rx.borrow().is_none());

        let ticket = state.begin("main");
        state.commit(ticket, route("main", "x-home"), element("x-home")).unwrap();
        state.publish("main");

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_ref().unwrap().area, "main");
        assert!(matches!(events.recv().await.unwrap(), RouterEvent::Committed(_)));

        let (cleared, element) = state.clear("main").unwrap();
        assert_eq!(cleared.area, "main");
        assert!(element.is_some());
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
        assert!(matches!(events.recv().await.unwrap(), RouterEvent::Popped(_)));

        assert!(state.clear("main").is_none());
    }

    #[test]
    fn test_clear_invalidates_tickets() {
        let state = RouterState::default();
        let ticket = state.begin("main");
        state.commit(ticket, route("main", "x-a"), element("x-a")).unwrap();

        let in_flight = state.begin("main");
        state.clear("main");
        assert!(!state.is_current("main", in_flight));
    }
}
