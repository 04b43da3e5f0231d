use std::fmt;

use super::node::Node;

/// The compiled pattern trie for one HTTP method.
///
/// `T` is whatever the router wants back from a lookup; the router stores
/// the composed handler list of each route.
pub struct Store<T> {
    root: Node<T>,
    count: usize,
}

impl<T> Store<T> {
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            count: 0,
        }
    }

    /// Compile `pattern` into the trie, attaching `data` to its terminal
    /// node, and return the number of parameters in the pattern (unnamed
    /// `<:...>` slots included).
    ///
    /// Re-registering a pattern keeps the data attached first. Malformed
    /// parameter constraints and constraint conflicts at a shared slot
    /// panic; registration is a startup-phase operation.
    pub fn add(&mut self, pattern: &str, data: T) -> usize {
        self.count += 1;
        let order = self.count;
        self.root.min_order = self.root.min_order.min(order);
        let mut slot = Some(data);
        self.root.insert(pattern, &mut slot, order)
    }

    /// Look up the best match for `path`, writing parameter captures into
    /// `pvalues` by position. Returns the attached data and the parameter
    /// names of the winning route, or `(None, &[])`.
    ///
    /// `pvalues` must be at least as long as the largest parameter count
    /// returned by [`add`](Store::add).
    pub fn get<'s>(&'s self, path: &str, pvalues: &mut [String]) -> (Option<&'s T>, &'s [String]) {
        let (data, pnames, _) = self.root.get(path, pvalues);
        (data, pnames)
    }

    /// Number of patterns added, counting duplicates.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> &Node<T> {
        &self.root
    }
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable human-readable dump of the trie, one node per line with four-space
/// indentation per depth. Used as a golden-test fixture; the format is part
/// of the crate's test contract.
impl<T: fmt::Debug> fmt::Display for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.write_dump(f, 0)
    }
}
