//! Explicit handler registry: name → statically linked implementation.
//!
//! Implementations are never loaded from computed paths at run time. They
//! are registered at startup into an ordered list of layers — a user layer
//! consulted before the builtin layer — giving the same override precedence
//! as the catalog's root order. A handler may also be registered without any
//! on-disk package; with an inline manifest it covers the legacy single-file
//! action form (typed contract embedded with the implementation).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use pai_types::ActionManifest;
use serde_json::Value;

use crate::context::ActionContext;

/// An action implementation.
///
/// The engine owns resolution, validation, and capability injection; the
/// handler owns only its business logic. A handler is invoked with the
/// already-validated input and a context scoped to its declared
/// capabilities.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Inline manifest for handlers registered without an on-disk package.
    ///
    /// When present, the runner validates input/output against it exactly
    /// as it would a packaged manifest.
    fn manifest(&self) -> Option<ActionManifest> {
        None
    }

    /// Execute the action.
    async fn execute(&self, input: Value, ctx: &ActionContext) -> anyhow::Result<Value>;
}

/// One priority layer of the registry.
#[derive(Default)]
struct RegistryLayer {
    handlers: HashMap<String, Arc<dyn ActionHandler>>,
}

/// Ordered layers of registered handlers, user before builtin.
#[derive(Default)]
pub struct HandlerRegistry {
    user: RegistryLayer,
    builtin: RegistryLayer,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler in the user layer, shadowing any builtin handler
    /// with the same name.
    pub fn register_user(&mut self, name: impl Into<String>, handler: Arc<dyn ActionHandler>) {
        self.user.handlers.insert(name.into(), handler);
    }

    /// Register a handler in the builtin layer.
    pub fn register_builtin(&mut self, name: impl Into<String>, handler: Arc<dyn ActionHandler>) {
        self.builtin.handlers.insert(name.into(), handler);
    }

    /// Look up a handler, consulting layers in priority order.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ActionHandler>> {
        self.user
            .handlers
            .get(name)
            .or_else(|| self.builtin.handlers.get(name))
            .cloned()
    }

    /// All registered names, de-duplicated with user entries winning.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.user.handlers.keys().cloned().collect();
        for name in self.builtin.handlers.keys() {
            if !self.user.handlers.contains_key(name) {
                names.push(name.clone());
            }
        }
        names.sort();
        names
    }
}
