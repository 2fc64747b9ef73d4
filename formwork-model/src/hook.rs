use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Context handed to every hook invocation.
///
/// Carries the identity of the value in flight; hooks that need more reach
/// for their own captured state.
#[derive(Debug, Clone)]
pub struct HookContext {
    pub table: String,
    pub field: String,
    /// Record id for row-backed sessions; `None` for flat stores.
    pub record_id: Option<String>,
}

/// A single load/save value transform.
///
/// Hooks receive the in-flight value and return its replacement. They run
/// synchronously, in declaration order.
pub type FieldHook = Arc<dyn Fn(Value, &HookContext) -> Value + Send + Sync>;

/// An ordered chain of bound hooks attached to a field during merge.
#[derive(Clone, Default)]
pub struct HookChain(Vec<FieldHook>);

impl HookChain {
    #[must_use]
    pub fn new(hooks: Vec<FieldHook>) -> Self {
        Self(hooks)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Threads a value through every hook in order.
    #[must_use]
    pub fn apply(&self, value: Value, ctx: &HookContext) -> Value {
        self.0.iter().fold(value, |v, hook| hook(v, ctx))
    }
}

impl fmt::Debug for HookChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HookChain").field(&self.0.len()).finish()
    }
}

/// By-name table of hook functions.
///
/// Fragments reference hooks by name; [`Schema::merge`](crate::Schema::merge)
/// resolves every name against this registry exactly once, so a typo fails
/// at initialization instead of silently skipping a transform on the save
/// path.
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: BTreeMap<String, FieldHook>,
}

impl HookRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a hook under a name, replacing any previous registration.
    pub fn register<F>(&mut self, name: impl Into<String>, hook: F)
    where
        F: Fn(Value, &HookContext) -> Value + Send + Sync + 'static,
    {
        self.hooks.insert(name.into(), Arc::new(hook));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldHook> {
        self.hooks.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.hooks.contains_key(name)
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("names", &self.hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}
