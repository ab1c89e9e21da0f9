//! Authentication capability injected into edit sessions.
//!
//! Session storage and credential checks live outside the core; editing only
//! needs a read-only yes/no answer at the moment an edit starts.

/// Read-only capability check backed by externally managed session state.
pub trait AuthCapability {
    fn is_authenticated(&self) -> bool;
}

/// Fixed answer, used by tests and by single-operator tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticAuth(pub bool);

impl StaticAuth {
    pub fn operator() -> Self {
        Self(true)
    }

    pub fn visitor() -> Self {
        Self(false)
    }
}

impl AuthCapability for StaticAuth {
    fn is_authenticated(&self) -> bool {
        self.0
    }
}

impl<F> AuthCapability for F
where
    F: Fn() -> bool,
{
    fn is_authenticated(&self) -> bool {
        self()
    }
}
