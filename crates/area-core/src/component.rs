//! Component references
//!
//! A navigation target can be named four different ways: by tag name, by the
//! class that constructs it, by an already-built element, or by a lazy loader
//! that produces the class on demand. [`ComponentRef`] is the tagged union of
//! those four, and [`same_component`] / [`get_tag_name`] give every variant a
//! comparable identity.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::lazy::LazyComponent;

/// Tag used when a class has neither a registered tag nor a usable name
pub const ANONYMOUS_TAG: &str = "anonymous-element";

// =============================================================================
// Elements
// =============================================================================

/// A custom-element-like object: a tag plus a bag of assigned properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Lowercase tag name
    tag_name: String,
    /// Properties assigned to the element
    #[serde(default)]
    properties: Map<String, Value>,
}

impl Element {
    /// Create an element with the given tag
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into().to_lowercase(),
            properties: Map::new(),
        }
    }

    /// Get the tag name
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Assign a property
    pub fn set_property(&mut self, name: impl Into<String>, value: Value) {
        self.properties.insert(name.into(), value);
    }

    /// Read a property
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// All assigned properties
    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }
}

/// Shared handle to a mounted (or mountable) element
///
/// Two handles are the same element only if they point at the same allocation.
#[derive(Clone)]
pub struct ElementHandle(Arc<RwLock<Element>>);

impl ElementHandle {
    /// Wrap an element in a shared handle
    pub fn new(element: Element) -> Self {
        Self(Arc::new(RwLock::new(element)))
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Get the element's tag name
    pub fn tag_name(&self) -> String {
        self.0.read().tag_name().to_string()
    }

    /// Assign a property on the shared element
    pub fn set_property(&self, name: impl Into<String>, value: Value) {
        self.0.write().set_property(name, value);
    }

    /// Read a property
    pub fn property(&self, name: &str) -> Option<Value> {
        self.0.read().property(name).cloned()
    }

    /// Copy of the element's current contents
    pub fn snapshot(&self) -> Element {
        self.0.read().clone()
    }
}

impl From<Element> for ElementHandle {
    fn from(element: Element) -> Self {
        Self::new(element)
    }
}

impl fmt::Debug for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ElementHandle").field(&*self.0.read()).finish()
    }
}

// =============================================================================
// Component classes
// =============================================================================

/// Shape of a class prototype, used as the last-resort structural comparison
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrototypeShape {
    /// Name of the parent prototype, if known
    pub parent: Option<String>,
    /// Own property names declared on the prototype
    pub own_properties: Vec<String>,
}

impl PrototypeShape {
    /// Create a prototype shape
    pub fn new<I, S>(parent: impl Into<String>, own_properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parent: Some(parent.into()),
            own_properties: own_properties.into_iter().map(Into::into).collect(),
        }
    }

    fn sorted_properties(&self) -> Vec<&str> {
        let mut props: Vec<&str> = self.own_properties.iter().map(String::as_str).collect();
        props.sort_unstable();
        props
    }

    /// Whether both shapes extend the same parent with the same own properties
    pub fn matches(&self, other: &Self) -> bool {
        match (&self.parent, &other.parent) {
            (Some(a), Some(b)) if a == b => self.sorted_properties() == other.sorted_properties(),
            _ => false,
        }
    }
}

type Factory = Arc<dyn Fn() -> Element + Send + Sync>;

#[derive(Clone)]
struct ClassInner {
    name: String,
    tag: Option<String>,
    observed_attributes: Option<Vec<String>>,
    prototype: Option<PrototypeShape>,
    factory: Option<Factory>,
}

/// The constructor of a component
///
/// Cloning shares the class; [`ComponentClass::ptr_eq`] is true between clones.
#[derive(Clone)]
pub struct ComponentClass {
    inner: Arc<ClassInner>,
}

impl ComponentClass {
    /// Create a class with the given name (may be empty for anonymous classes)
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ClassInner {
                name: name.into(),
                tag: None,
                observed_attributes: None,
                prototype: None,
                factory: None,
            }),
        }
    }

    /// Set the tag this class is registered under
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).tag = Some(tag.into().to_lowercase());
        self
    }

    /// Declare the attributes this class observes
    pub fn with_observed_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::make_mut(&mut self.inner).observed_attributes =
            Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    /// Describe the class prototype
    pub fn with_prototype(mut self, prototype: PrototypeShape) -> Self {
        Arc::make_mut(&mut self.inner).prototype = Some(prototype);
        self
    }

    /// Use a custom factory to construct instances
    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Element + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.inner).factory = Some(Arc::new(factory));
        self
    }

    /// Class name; empty when anonymous
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Observed attributes, if the class declares any
    pub fn observed_attributes(&self) -> Option<&[String]> {
        self.inner.observed_attributes.as_deref()
    }

    /// Prototype shape, if described
    pub fn prototype(&self) -> Option<&PrototypeShape> {
        self.inner.prototype.as_ref()
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Tag name for this class: the registered tag, else the kebab-cased name
    pub fn tag_name(&self) -> Option<String> {
        if let Some(tag) = &self.inner.tag {
            return Some(tag.clone());
        }
        if self.inner.name.is_empty() {
            None
        } else {
            Some(to_kebab_case(&self.inner.name))
        }
    }

    /// Construct a fresh element
    pub fn construct(&self) -> Element {
        match &self.inner.factory {
            Some(factory) => factory(),
            None => Element::new(self.tag_name().unwrap_or_else(|| ANONYMOUS_TAG.to_string())),
        }
    }
}

impl fmt::Debug for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentClass")
            .field("name", &self.inner.name)
            .field("tag", &self.inner.tag)
            .field("observed_attributes", &self.inner.observed_attributes)
            .field("has_factory", &self.inner.factory.is_some())
            .finish()
    }
}

// =============================================================================
// Component references
// =============================================================================

/// A navigation target
#[derive(Debug, Clone)]
pub enum ComponentRef {
    /// A custom element tag name
    TagName(String),
    /// A component class
    Constructor(ComponentClass),
    /// An existing element instance
    Instance(ElementHandle),
    /// A lazily imported component
    LazyLoader(LazyComponent),
}

impl ComponentRef {
    /// Short name of the variant, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            ComponentRef::TagName(_) => "tag",
            ComponentRef::Constructor(_) => "constructor",
            ComponentRef::Instance(_) => "instance",
            ComponentRef::LazyLoader(_) => "lazy",
        }
    }
}

impl From<&str> for ComponentRef {
    fn from(tag: &str) -> Self {
        ComponentRef::TagName(tag.to_string())
    }
}

impl From<String> for ComponentRef {
    fn from(tag: String) -> Self {
        ComponentRef::TagName(tag)
    }
}

impl From<ComponentClass> for ComponentRef {
    fn from(class: ComponentClass) -> Self {
        ComponentRef::Constructor(class)
    }
}

impl From<ElementHandle> for ComponentRef {
    fn from(element: ElementHandle) -> Self {
        ComponentRef::Instance(element)
    }
}

impl From<LazyComponent> for ComponentRef {
    fn from(lazy: LazyComponent) -> Self {
        ComponentRef::LazyLoader(lazy)
    }
}

/// Whether two references name the same component
///
/// Identity first, then class name, then observed attributes, then prototype
/// shape. The later tiers are heuristics; a false negative only costs a
/// re-render.
pub fn same_component(a: &ComponentRef, b: &ComponentRef) -> bool {
    match (a, b) {
        (ComponentRef::TagName(x), ComponentRef::TagName(y)) => x == y,
        (ComponentRef::Instance(x), ComponentRef::Instance(y)) => x.ptr_eq(y),
        (ComponentRef::LazyLoader(x), ComponentRef::LazyLoader(y)) => x.ptr_eq(y),
        (ComponentRef::Constructor(x), ComponentRef::Constructor(y)) => same_class(x, y),
        _ => false,
    }
}

fn same_class(a: &ComponentClass, b: &ComponentClass) -> bool {
    if a.ptr_eq(b) {
        return true;
    }

    if !a.name().is_empty() && a.name() == b.name() {
        return true;
    }

    if let (Some(x), Some(y)) = (a.observed_attributes(), b.observed_attributes()) {
        if x == y {
            return true;
        }
    }

    match (a.prototype(), b.prototype()) {
        (Some(x), Some(y)) => x.matches(y),
        _ => false,
    }
}

/// Resolve the tag name a reference will mount as
///
/// `None` means the identity is unknown and callers must re-render.
pub fn get_tag_name(component: &ComponentRef) -> Option<String> {
    match component {
        ComponentRef::TagName(tag) if tag.is_empty() => None,
        ComponentRef::TagName(tag) => Some(tag.to_lowercase()),
        ComponentRef::Instance(element) => Some(element.tag_name().to_lowercase()),
        ComponentRef::Constructor(class) => class.tag_name(),
        ComponentRef::LazyLoader(lazy) => lazy.loaded().and_then(|module| module.class().tag_name()),
    }
}

/// Convert a PascalCase identifier into a kebab-case tag (`UserProfile` -> `user-profile`)
pub fn to_kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;

    for ch in name.chars() {
        if ch.is_uppercase() {
            if matches!(prev, Some(p) if p.is_lowercase() || p.is_ascii_digit()) {
                out.push('-');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
        prev = Some(ch);
    }

    out
}
