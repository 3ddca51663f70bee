use std::collections::HashSet;

/// Insertion-ordered set of timeline entry ids already sent to the sink.
///
/// The order is kept for storage and debugging; membership checks go
/// through the hash index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenEventIds {
    order: Vec<String>,
    index: HashSet<String>,
}

impl SeenEventIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Record `id`. Returns `false` if it was already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.index.contains(id) {
            return false;
        }
        self.index.insert(id.to_owned());
        self.order.push(id.to_owned());
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

impl FromIterator<String> for SeenEventIds {
    /// Duplicates in the input are dropped, first occurrence wins.
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut seen = SeenEventIds::new();
        for id in iter {
            seen.insert(&id);
        }
        seen
    }
}

impl From<SeenEventIds> for Vec<String> {
    fn from(value: SeenEventIds) -> Self {
        value.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut seen = SeenEventIds::new();
        assert!(seen.insert("1"));
        assert!(seen.insert("2"));
        assert!(!seen.insert("1"));
        assert_eq!(seen.as_slice(), ["1", "2"]);
    }

    #[test]
    fn test_from_iter_drops_duplicates() {
        let seen: SeenEventIds = ["3", "1", "3"].into_iter().map(String::from).collect();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen.iter().collect::<Vec<_>>(), ["3", "1"]);
    }
}
