//! Unique element ids, scoped to whoever owns the [`IdSource`].

use std::cell::Cell;

/// Hands out `prefix1`, `prefix2`, ... Each form owns its own source, so ids
/// are unique within a form and deterministic across runs.
#[derive(Debug)]
pub struct IdSource {
    prefix: String,
    next: Cell<u64>,
}

impl IdSource {
    pub fn new(prefix: impl Into<String>) -> Self {
        IdSource {
            prefix: prefix.into(),
            next: Cell::new(1),
        }
    }

    pub fn next_id(&self) -> String {
        let n = self.next.get();
        self.next.set(n + 1);
        format!("{}{}", self.prefix, n)
    }
}

impl Default for IdSource {
    fn default() -> Self {
        IdSource::new("id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_are_independent() {
        let a = IdSource::new("form-a-");
        let b = IdSource::default();
        assert_eq!(a.next_id(), "form-a-1");
        assert_eq!(a.next_id(), "form-a-2");
        assert_eq!(b.next_id(), "id1");
    }
}
