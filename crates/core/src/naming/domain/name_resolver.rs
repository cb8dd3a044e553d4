use std::collections::HashSet;

/// Read-only view of the names already present in a namespace.
pub trait NameLookup {
    fn is_taken(&self, name: &str) -> bool;
}

impl NameLookup for HashSet<String> {
    fn is_taken(&self, name: &str) -> bool {
        self.contains(name)
    }
}

/// Derives a stored name for an upload from its declared name.
///
/// Implementations are pure: the same inputs against the same namespace view
/// give an equivalent answer, and nothing is reserved here. Callers that need
/// the answer to stay valid must hold the namespace lock across the call and
/// the reservation.
pub trait NameResolver: Send + Sync {
    fn resolve(&self, requested_name: &str, namespace: &dyn NameLookup) -> String;
}
