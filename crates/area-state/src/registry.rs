//! Element registry and component resolution
//!
//! The registry plays the part of the custom-element definition table: it
//! maps tag names to the classes that construct them. [`ElementRegistry::resolve`]
//! turns any [`ComponentRef`] into a mountable element.

use area_core::component::{ComponentClass, ComponentRef, Element, ElementHandle};
use area_core::lazy::LoadError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The tag is already defined
    #[error("Tag already defined: {0}")]
    AlreadyDefined(String),

    /// Tag names must contain a hyphen and start with a letter
    #[error("Invalid custom element tag: {0}")]
    InvalidTag(String),
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Tag name to component class table
#[derive(Clone, Default)]
pub struct ElementRegistry {
    classes: Arc<RwLock<HashMap<String, ComponentClass>>>,
}

impl ElementRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `tag` as constructed by `class`
    pub fn define(&self, tag: &str, class: ComponentClass) -> Result<()> {
        let tag = tag.to_lowercase();
        if !is_valid_tag(&tag) {
            return Err(RegistryError::InvalidTag(tag));
        }

        let mut classes = self.classes.write();
        if classes.contains_key(&tag) {
            return Err(RegistryError::AlreadyDefined(tag));
        }

        tracing::debug!(tag = %tag, class = class.name(), "Defined element");
        classes.insert(tag.clone(), class.with_tag(tag));
        Ok(())
    }

    /// Class registered for `tag`
    pub fn get(&self, tag: &str) -> Option<ComponentClass> {
        self.classes.read().get(&tag.to_lowercase()).cloned()
    }

    /// Whether `tag` has been defined
    pub fn is_defined(&self, tag: &str) -> bool {
        self.classes.read().contains_key(&tag.to_lowercase())
    }

    /// Create an element for `tag`, upgraded if the tag is defined
    pub fn create_element(&self, tag: &str) -> Element {
        match self.get(tag) {
            Some(class) => class.construct(),
            None => {
                tracing::debug!(tag, "Creating undefined element");
                Element::new(tag)
            }
        }
    }

    /// Materialize a component reference into a mountable element
    ///
    /// Lazy references are loaded first; their errors propagate.
    pub async fn resolve(&self, component: &ComponentRef) -> std::result::Result<ElementHandle, LoadError> {
        match component {
            ComponentRef::TagName(tag) => Ok(ElementHandle::new(self.create_element(tag))),
            ComponentRef::Constructor(class) => Ok(ElementHandle::new(class.construct())),
            ComponentRef::Instance(element) => Ok(element.clone()),
            ComponentRef::LazyLoader(lazy) => {
                let module = lazy.load().await?;
                Ok(ElementHandle::new(module.class().construct()))
            }
        }
    }
}

fn is_valid_tag(tag: &str) -> bool {
    tag.starts_with(|c: char| c.is_ascii_lowercase())
        && tag.contains('-')
        && tag.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.' || c == '_')
}

impl std::fmt::Debug for ElementRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementRegistry")
            .field("tags", &self.classes.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use area_core::lazy::{lazy, ComponentModule};

    #[test]
    fn test_define_and_create() {
        let registry = ElementRegistry::new();
        registry.define("User-Profile", ComponentClass::new("UserProfile")).unwrap();

        assert!(registry.is_defined("user-profile"));
        assert_eq!(registry.create_element("user-profile").tag_name(), "user-profile");
        assert_eq!(registry.get("user-profile").unwrap().tag_name().as_deref(), Some("user-profile"));
    }

    #[test]
    fn test_define_rejects_duplicates_and_invalid_tags() {
        let registry = ElementRegistry::new();
        registry.define("x-card", ComponentClass::new("Card")).unwrap();

        assert_eq!(
            registry.define("x-card", ComponentClass::new("Other")),
            Err(RegistryError::AlreadyDefined("x-card".to_string()))
        );
        assert!(matches!(registry.define("card", ComponentClass::new("Card")), Err(RegistryError::InvalidTag(_))));
        assert!(matches!(registry.define("1-card", ComponentClass::new("Card")), Err(RegistryError::InvalidTag(_))));
    }

    #[test]
    fn test_define_gives_anonymous_class_a_tag() {
        let registry = ElementRegistry::new();
        registry.define("x-anon", ComponentClass::new("")).unwrap();
        assert_eq!(registry.create_element("x-anon").tag_name(), "x-anon");
    }

    #[tokio::test]
    async fn test_resolve_variants() {
        let registry = ElementRegistry::new();

        let from_tag = registry.resolve(&"nav-rail".into()).await.unwrap();
        assert_eq!(from_tag.tag_name(), "nav-rail");

        let from_class = registry.resolve(&ComponentClass::new("UserProfile").into()).await.unwrap();
        assert_eq!(from_class.tag_name(), "user-profile");

        let existing = ElementHandle::new(Element::new("x-card"));
        let from_instance = registry.resolve(&existing.clone().into()).await.unwrap();
        assert!(from_instance.ptr_eq(&existing));

        let component = lazy(|| async { Ok(ComponentModule::new(ComponentClass::new("LazyPanel"))) });
        let from_lazy = registry.resolve(&component.clone().into()).await.unwrap();
        assert_eq!(from_lazy.tag_name(), "lazy-panel");
        assert!(component.is_loaded());
    }

    #[tokio::test]
    async fn test_resolve_propagates_load_errors() {
        let registry = ElementRegistry::new();
        let component = lazy(|| async { Err(LoadError::Import("offline".to_string())) });
        let err = registry.resolve(&component.into()).await.unwrap_err();
        assert_eq!(err, LoadError::Import("offline".to_string()));
    }
}
