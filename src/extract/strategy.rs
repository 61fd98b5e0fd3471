use crate::dom::PageSnapshot;

/// One named way of reading a field from a page
///
/// Strategies are pure: they only read the snapshot.
pub struct Strategy<T> {
    pub name: &'static str,
    pub run: fn(&PageSnapshot) -> Option<T>,
}

impl<T> std::fmt::Debug for Strategy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name).finish()
    }
}

/// An ordered list of strategies for one field; the first hit wins
#[derive(Debug)]
pub struct Waterfall<T> {
    field: &'static str,
    strategies: Vec<Strategy<T>>,
}

impl<T> Waterfall<T> {
    /// Creates an empty waterfall for `field`
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            strategies: Vec::new(),
        }
    }

    /// Appends a strategy with lower priority than all existing ones
    pub fn with(mut self, name: &'static str, run: fn(&PageSnapshot) -> Option<T>) -> Self {
        self.strategies.push(Strategy { name, run });
        self
    }

    /// Field this waterfall resolves
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Strategy names in evaluation order
    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name).collect()
    }

    /// Evaluates strategies left to right and stops at the first result
    ///
    /// # Returns
    ///
    /// * `Some((value, name))` - The value and the name of the strategy that produced it
    /// * `None` - No strategy produced a value
    pub fn run(&self, snapshot: &PageSnapshot) -> Option<(T, &'static str)> {
        for strategy in &self.strategies {
            if let Some(value) = (strategy.run)(snapshot) {
                tracing::debug!("{}: resolved by '{}'", self.field, strategy.name);
                return Some((value, strategy.name));
            }
        }
        tracing::debug!("{}: no strategy matched", self.field);
        None
    }

    /// Like `run`, without the strategy name
    pub fn resolve(&self, snapshot: &PageSnapshot) -> Option<T> {
        self.run(snapshot).map(|(value, _)| value)
    }
}

/// Trimmed text of the first element matching `pattern`, if non-empty
pub fn first_text(snapshot: &PageSnapshot, pattern: &str) -> Option<String> {
    snapshot
        .query(pattern)
        .into_iter()
        .map(|e| e.text())
        .find(|t| !t.is_empty())
}

/// Trimmed attribute of the first element matching `pattern` that carries it
pub fn first_attr(snapshot: &PageSnapshot, pattern: &str, attr: &str) -> Option<String> {
    snapshot
        .query(pattern)
        .into_iter()
        .find_map(|e| e.attr_non_empty(attr))
}
