//! Route actions and active routes
//!
//! A [`RouteAction`] is a requested navigation; an [`ActiveRoute`] is what an
//! area has committed to after the navigation succeeded.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::component::ComponentRef;
use crate::guard::RouteGuard;

/// Navigation parameters (scalar values)
pub type RouteParams = Map<String, Value>;

/// Arbitrary navigation state
pub type RouteState = Map<String, Value>;

/// Properties assigned to the mounted element
pub type RouteProps = Map<String, Value>;

/// How a navigation interacts with browser history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStrategy {
    /// Create a new history entry
    #[default]
    Push,
    /// Replace the current history entry
    Replace,
    /// Leave history untouched
    Silent,
}

impl HistoryStrategy {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryStrategy::Push => "push",
            HistoryStrategy::Replace => "replace",
            HistoryStrategy::Silent => "silent",
        }
    }
}

impl fmt::Display for HistoryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "push" => Ok(HistoryStrategy::Push),
            "replace" => Ok(HistoryStrategy::Replace),
            "silent" => Ok(HistoryStrategy::Silent),
            other => Err(format!("unknown history strategy: {}", other)),
        }
    }
}

// =============================================================================
// Route Action
// =============================================================================

/// A requested navigation, not yet committed
#[derive(Clone)]
pub struct RouteAction {
    /// Target area
    pub area: String,
    /// Component to mount
    pub component: ComponentRef,
    /// Navigation parameters
    pub params: RouteParams,
    /// Navigation state
    pub state: RouteState,
    /// Extra properties for the mounted element
    pub props: RouteProps,
    /// Force a re-render even if the same route is committed
    pub exact: bool,
    /// History strategy; the router default applies when unset
    pub history_strategy: Option<HistoryStrategy>,
    /// Guard that must approve the navigation
    pub guard: Option<RouteGuard>,
}

impl RouteAction {
    /// Create an action targeting `area`
    pub fn new(area: impl Into<String>, component: impl Into<ComponentRef>) -> Self {
        Self {
            area: area.into(),
            component: component.into(),
            params: RouteParams::new(),
            state: RouteState::new(),
            props: RouteProps::new(),
            exact: false,
            history_strategy: None,
            guard: None,
        }
    }

    /// Add a parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Replace all parameters
    pub fn with_params(mut self, params: RouteParams) -> Self {
        self.params = params;
        self
    }

    /// Add a state entry
    pub fn with_state_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.state.insert(key.into(), value.into());
        self
    }

    /// Replace the state bag
    pub fn with_state(mut self, state: RouteState) -> Self {
        self.state = state;
        self
    }

    /// Add a property
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Force re-render of an identical route
    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    /// Set the history strategy
    pub fn with_history_strategy(mut self, strategy: HistoryStrategy) -> Self {
        self.history_strategy = Some(strategy);
        self
    }

    /// Require a guard to approve the navigation
    pub fn with_guard(mut self, guard: RouteGuard) -> Self {
        self.guard = Some(guard);
        self
    }
}

impl fmt::Debug for RouteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteAction")
            .field("area", &self.area)
            .field("component", &self.component.kind())
            .field("params", &self.params)
            .field("exact", &self.exact)
            .field("history_strategy", &self.history_strategy)
            .field("has_guard", &self.guard.is_some())
            .finish()
    }
}

// =============================================================================
// Active Route
// =============================================================================

/// The committed route for one area
#[derive(Debug, Clone)]
pub struct ActiveRoute {
    /// Area name
    pub area: String,
    /// Committed component reference
    pub component: ComponentRef,
    /// Committed parameters
    pub params: RouteParams,
    /// Committed state
    pub state: RouteState,
}

impl ActiveRoute {
    /// Build the committed route for an action
    pub fn from_action(action: &RouteAction) -> Self {
        Self {
            area: action.area.clone(),
            component: action.component.clone(),
            params: action.params.clone(),
            state: action.state.clone(),
        }
    }
}

/// Read access to the parts of a route that define its identity
pub trait RouteIdentity {
    /// Area name
    fn area(&self) -> &str;
    /// Component reference
    fn component(&self) -> &ComponentRef;
    /// Parameters
    fn params(&self) -> &RouteParams;
    /// State
    fn state(&self) -> &RouteState;
}

impl RouteIdentity for RouteAction {
    fn area(&self) -> &str {
        &self.area
    }
    fn component(&self) -> &ComponentRef {
        &self.component
    }
    fn params(&self) -> &RouteParams {
        &self.params
    }
    fn state(&self) -> &RouteState {
        &self.state
    }
}

impl RouteIdentity for ActiveRoute {
    fn area(&self) -> &str {
        &self.area
    }
    fn component(&self) -> &ComponentRef {
        &self.component
    }
    fn params(&self) -> &RouteParams {
        &self.params
    }
    fn state(&self) -> &RouteState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_builder() {
        let action = RouteAction::new("main", "user-profile")
            .with_param("userId", "123")
            .with_state_value("scroll", 40)
            .with_prop("compact", true)
            .with_history_strategy(HistoryStrategy::Replace)
            .exact(true);

        assert_eq!(action.area, "main");
        assert_eq!(action.params.get("userId"), Some(&Value::from("123")));
        assert_eq!(action.state.get("scroll"), Some(&Value::from(40)));
        assert_eq!(action.props.get("compact"), Some(&Value::Bool(true)));
        assert_eq!(action.history_strategy, Some(HistoryStrategy::Replace));
        assert!(action.exact);
        assert!(action.guard.is_none());
    }

    #[test]
    fn test_active_route_from_action() {
        let action = RouteAction::new("main", "user-profile").with_param("userId", "123");
        let active = ActiveRoute::from_action(&action);
        assert_eq!(active.area(), "main");
        assert_eq!(active.params(), action.params());
    }

    #[test]
    fn test_history_strategy_parsing() {
        assert_eq!("replace".parse::<HistoryStrategy>(), Ok(HistoryStrategy::Replace));
        assert!("back".parse::<HistoryStrategy>().is_err());
        assert_eq!(HistoryStrategy::default(), HistoryStrategy::Push);
        assert_eq!(serde_json::to_string(&HistoryStrategy::Silent).unwrap(), "\"silent\"");
    }
}
