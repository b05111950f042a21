//! Core routing primitives for Area Router
//!
//! This crate holds the synchronous building blocks the navigation engine is
//! made of: component references and their identity rules, the route state
//! codec, route equality and cache keys, lazy component loading and guards.
//!
//! # Modules
//!
//! - [`component`] - Component references, classes and elements
//! - [`codec`] - Encode, decode, sanitize and merge navigation state
//! - [`equality`] - Route equality and cache keys
//! - [`lazy`] - Memoized component imports
//! - [`guard`] - Navigation guards
//! - [`route`] - Route actions and active routes
//! - [`query`] - Query-string helpers

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod component;
pub mod equality;
pub mod guard;
pub mod lazy;
pub mod query;
pub mod route;

pub use codec::{decode, deep_merge, encode, sanitize, CodecError, DEFAULT_DENY_LIST};
pub use component::{
    get_tag_name, same_component, to_kebab_case, ComponentClass, ComponentRef, Element,
    ElementHandle, PrototypeShape,
};
pub use equality::{cache_key, normalize_tag, same_route};
pub use guard::{GuardError, GuardStream, GuardVerdict, RouteGuard};
pub use lazy::{lazy, ComponentModule, LazyComponent, LoadError};
pub use query::{build_query_string, extract_query_params};
pub use route::{
    ActiveRoute, HistoryStrategy, RouteAction, RouteIdentity, RouteParams, RouteProps,
    RouteState,
};
