//! Key bindings owned by mounted components.
//!
//! The [`KeyBus`] plays the role of the document: every key press goes
//! through it first. Components install bindings with [`KeyBus::subscribe`]
//! and hold the returned [`Subscription`] for as long as they are mounted;
//! dropping the subscription removes the binding.

use crate::config::Key;
use crate::types::{CardAction, IdType};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, Weak};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("component {0} is already mounted")]
    AlreadyMounted(IdType),
    #[error("component {0} is not mounted")]
    NotMounted(IdType),
    #[error("duplicate binding for {key} owned by {owner}")]
    Duplicate { owner: IdType, key: Key },
    #[error("key bus lock poisoned")]
    Poisoned,
}

/// Where a binding listens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Fires regardless of focus.
    Document,
    /// Fires only while the given field has focus.
    Field(IdType),
}

#[derive(Debug, Clone)]
struct Binding {
    owner: IdType,
    scope: Scope,
    key: Key,
    action: CardAction,
}

#[derive(Debug, Default)]
struct Registry {
    next: u64,
    bindings: BTreeMap<u64, Binding>,
    focus: Option<IdType>,
}

#[derive(Debug, Clone, Default)]
pub struct KeyBus {
    inner: Arc<RwLock<Registry>>,
}

impl KeyBus {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn subscribe(
        &self,
        owner: IdType,
        scope: Scope,
        key: Key,
        action: CardAction,
    ) -> Result<Subscription, Error> {
        let mut registry = self.inner.write().map_err(|_| Error::Poisoned)?;
        if registry
            .bindings
            .values()
            .any(|b| b.owner == owner && b.scope == scope && b.key == key)
        {
            return Err(Error::Duplicate { owner, key });
        }
        let id = registry.next;
        registry.next += 1;
        registry.bindings.insert(
            id,
            Binding {
                owner,
                scope,
                key,
                action,
            },
        );
        log::debug!("installed binding {id}: {key} ({scope:?}) for {owner}");
        Ok(Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        })
    }
    /// Moves focus to a field, or clears it.
    pub fn focus(&self, field: Option<IdType>) {
        if let Ok(mut registry) = self.inner.write() {
            registry.focus = field;
        }
    }
    /// Clears focus if it is held by `field`.
    pub fn blur(&self, field: IdType) {
        if let Ok(mut registry) = self.inner.write() {
            if registry.focus == Some(field) {
                registry.focus = None;
            }
        }
    }
    pub fn focused(&self) -> Option<IdType> {
        self.inner.read().ok().and_then(|registry| registry.focus)
    }
    /// Resolves a key press into the actions of every matching binding.
    pub fn dispatch(&self, key: &Key) -> Vec<(IdType, CardAction)> {
        let Ok(registry) = self.inner.read() else {
            log::error!("key bus lock poisoned");
            return Vec::new();
        };
        registry
            .bindings
            .values()
            .filter(|b| &b.key == key)
            .filter(|b| match b.scope {
                Scope::Document => true,
                Scope::Field(field) => registry.focus == Some(field),
            })
            .map(|b| (b.owner, b.action.clone()))
            .collect()
    }
    pub fn len(&self) -> usize {
        self.inner.read().map_or(0, |registry| registry.bindings.len())
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A binding installed on a [`KeyBus`], removed on drop.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<RwLock<Registry>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        match registry.write() {
            Ok(mut registry) => {
                if registry.bindings.remove(&self.id).is_some() {
                    log::debug!("removed binding {}", self.id);
                }
            }
            Err(e) => log::error!("failed to remove binding {}: {e}", self.id),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;

    fn enter() -> Key {
        Key::from(KeyCode::Enter)
    }

    fn esc() -> Key {
        Key::from(KeyCode::Esc)
    }

    #[test]
    fn document_binding_ignores_focus() {
        let bus = KeyBus::new();
        let _sub = bus
            .subscribe(1, Scope::Document, esc(), CardAction::Cancel)
            .expect("failed to subscribe");
        assert_eq!(bus.dispatch(&esc()), vec![(1, CardAction::Cancel)]);
        bus.focus(Some(2));
        assert_eq!(bus.dispatch(&esc()), vec![(1, CardAction::Cancel)]);
        assert!(bus.dispatch(&enter()).is_empty());
    }

    #[test]
    fn field_binding_requires_focus() {
        let bus = KeyBus::new();
        let _sub = bus
            .subscribe(1, Scope::Field(1), enter(), CardAction::Commit)
            .expect("failed to subscribe");
        assert!(bus.dispatch(&enter()).is_empty());
        bus.focus(Some(1));
        assert_eq!(bus.dispatch(&enter()), vec![(1, CardAction::Commit)]);
        bus.blur(2);
        assert_eq!(bus.focused(), Some(1));
        bus.blur(1);
        assert!(bus.dispatch(&enter()).is_empty());
    }

    #[test]
    fn drop_removes_binding() {
        let bus = KeyBus::new();
        let sub = bus
            .subscribe(1, Scope::Document, esc(), CardAction::Cancel)
            .expect("failed to subscribe");
        assert_eq!(bus.len(), 1);
        drop(sub);
        assert!(bus.is_empty());
        assert!(bus.dispatch(&esc()).is_empty());
    }

    #[test]
    fn duplicate_binding() {
        let bus = KeyBus::new();
        let _sub = bus
            .subscribe(1, Scope::Document, esc(), CardAction::Cancel)
            .expect("failed to subscribe");
        assert_eq!(
            bus.subscribe(1, Scope::Document, esc(), CardAction::Cancel)
                .map(|_| ()),
            Err(Error::Duplicate {
                owner: 1,
                key: esc()
            })
        );
        // other owners may bind the same key
        assert!(bus
            .subscribe(2, Scope::Document, esc(), CardAction::Cancel)
            .is_ok());
    }

    #[test]
    fn subscription_outliving_bus() {
        let bus = KeyBus::new();
        let sub = bus
            .subscribe(1, Scope::Document, esc(), CardAction::Cancel)
            .expect("failed to subscribe");
        drop(bus);
        drop(sub);
    }
}
