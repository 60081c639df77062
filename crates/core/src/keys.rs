//! Store key namespacing
//!
//! Every key the engine touches lives under a scope. The layout is shared
//! with existing deployments and must not change:
//!
//! | key | structure | holds |
//! |---|---|---|
//! | `db:{scope}` | field map | item id → JSON payload |
//! | `index:{scope}` | set | every prefix with at least one member |
//! | `index:{scope}:{prefix}` | ranked set | item id → score |
//! | `hot:{scope}` | ranked set | query → issue count |
//!
//! Composite query results live in their own `cache:` namespace so they can
//! never overwrite a prefix set, whatever characters a term contains.

/// Marker for the kind of composite set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    /// Members present under every token
    Intersection,
    /// Members present under at least one token
    Union,
}

impl CompositeKind {
    /// Short marker used inside composite keys
    pub fn marker(&self) -> &'static str {
        match self {
            CompositeKind::Intersection => "and",
            CompositeKind::Union => "or",
        }
    }
}

/// Key builder for one scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    scope: String,
    items: String,
    registry: String,
    hot: String,
    composites: String,
}

impl KeySpace {
    /// Create the key layout for `scope`
    pub fn new(scope: impl Into<String>) -> Self {
        let scope = scope.into();
        KeySpace {
            items: format!("db:{}", scope),
            registry: format!("index:{}", scope),
            hot: format!("hot:{}", scope),
            composites: format!("cache:{}", scope),
            scope,
        }
    }

    /// Scope name
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Field map holding item payloads
    pub fn items(&self) -> &str {
        &self.items
    }

    /// Set of registered prefixes
    pub fn registry(&self) -> &str {
        &self.registry
    }

    /// Ranked set for one prefix
    pub fn prefix(&self, prefix: &str) -> String {
        format!("{}:{}", self.registry, prefix)
    }

    /// Ranked set of query popularity
    pub fn hot(&self) -> &str {
        &self.hot
    }

    /// Set of persisted composite keys
    pub fn composite_registry(&self) -> &str {
        &self.composites
    }

    /// Composite key for a token combination
    ///
    /// `tokens` are expected sorted and deduplicated so that the same
    /// combination always maps to the same key.
    pub fn composite(&self, kind: CompositeKind, tokens: &[String]) -> String {
        format!("{}:{}:{}", self.composites, kind.marker(), tokens.join("|"))
    }
}
