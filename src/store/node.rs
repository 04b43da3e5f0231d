use std::fmt;

use regex::Regex;
use smallvec::SmallVec;

/// Parameter captures rarely exceed a handful per route; scratch buffers up
/// to this size stay on the stack during backtracking.
pub(crate) const MAX_INLINE_PARAMS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    /// Matches its `key` byte-for-byte.
    Literal,
    /// Captures up to the next `/` (or the anchored regex match).
    Param,
    /// Captures the entire remaining path, empty included.
    Any,
}

/// One edge of the compiled trie.
///
/// `key` is the literal text this node consumes, or the raw marker text
/// (e.g. `<id:\d+>`) for parameter nodes. `pnames` is the full list of
/// parameter names on the root-to-here path; `pindex` is the position this
/// node's own capture writes to, if it is a parameter node.
pub(crate) struct Node<T> {
    pub(crate) kind: NodeKind,
    pub(crate) key: String,
    pub(crate) regex: Option<Regex>,
    pub(crate) data: Option<T>,
    /// Insertion sequence number; meaningful only while `data` is present.
    pub(crate) order: usize,
    /// Lower bound of the `order` of any data node in this subtree.
    pub(crate) min_order: usize,
    /// Literal children, kept sorted by first character. No two share one.
    pub(crate) children: Vec<Node<T>>,
    pub(crate) pchild: Option<Box<Node<T>>>,
    pub(crate) achild: Option<Box<Node<T>>>,
    pub(crate) pindex: Option<usize>,
    pub(crate) pnames: Vec<String>,
}

impl<T> Node<T> {
    pub(crate) fn root() -> Self {
        Self {
            kind: NodeKind::Literal,
            key: String::new(),
            regex: None,
            data: None,
            order: 0,
            min_order: usize::MAX,
            children: Vec::new(),
            pchild: None,
            achild: None,
            pindex: None,
            pnames: Vec::new(),
        }
    }

    fn literal(key: &str, order: usize, pindex: Option<usize>, pnames: Vec<String>) -> Self {
        Self {
            kind: NodeKind::Literal,
            key: key.to_string(),
            regex: None,
            data: None,
            order: 0,
            min_order: order,
            children: Vec::new(),
            pchild: None,
            achild: None,
            pindex,
            pnames,
        }
    }

    fn param_count(&self) -> usize {
        self.pindex.map_or(0, |i| i + 1)
    }

    /// The constraint text of a parameter node's marker, if any.
    fn pattern_text(&self) -> Option<&str> {
        let inner = &self.key[1..self.key.len() - 1];
        inner.find(':').map(|i| &inner[i + 1..])
    }

    /// Insert `key` below this node. The caller guarantees that `key` shares
    /// at least its first character with `self.key` (or that this is the
    /// root, whose key is empty).
    pub(crate) fn insert(&mut self, key: &str, data: &mut Option<T>, order: usize) -> usize {
        let matched = common_prefix(&self.key, key);
        if matched < self.key.len() {
            debug_assert!(self.kind == NodeKind::Literal);
            self.split(matched);
        }
        self.insert_rest(&key[matched..], data, order)
    }

    /// Split this literal edge at `at`, pushing everything past the cut
    /// (data, order bookkeeping, children) down into a new child.
    fn split(&mut self, at: usize) {
        let tail = self.key.split_off(at);
        let child = Node {
            kind: NodeKind::Literal,
            key: tail,
            regex: None,
            data: self.data.take(),
            order: self.order,
            min_order: self.min_order,
            children: std::mem::take(&mut self.children),
            pchild: self.pchild.take(),
            achild: self.achild.take(),
            pindex: self.pindex,
            pnames: self.pnames.clone(),
        };
        self.children.push(child);
    }

    fn insert_rest(&mut self, rest: &str, data: &mut Option<T>, order: usize) -> usize {
        if rest.is_empty() {
            // First registration wins; a duplicate pattern keeps the data
            // and the order it was originally attached with.
            if self.data.is_none() {
                self.data = data.take();
                self.order = order;
            }
            return self.param_count();
        }

        if let Some(idx) = self.literal_child_index(rest) {
            return self.children[idx].insert(rest, data, order);
        }

        match find_marker(rest) {
            Some((0, close)) => self.insert_param(rest, close, data, order),
            Some((start, _)) => {
                let child = Node::literal(&rest[..start], order, self.pindex, self.pnames.clone());
                let idx = self.push_literal_child(child);
                self.children[idx].insert_rest(&rest[start..], data, order)
            }
            None => {
                let mut child = Node::literal(rest, order, self.pindex, self.pnames.clone());
                child.data = data.take();
                child.order = order;
                let idx = self.push_literal_child(child);
                self.children[idx].param_count()
            }
        }
    }

    /// Attach the parameter marker at the head of `rest` to this node's
    /// parameter (or wildcard) slot, creating the child if needed, then
    /// continue with whatever follows the marker.
    fn insert_param(&mut self, rest: &str, close: usize, data: &mut Option<T>, order: usize) -> usize {
        let marker = &rest[..=close];
        let inner = &marker[1..marker.len() - 1];
        let (name, pattern) = match inner.find(':') {
            Some(i) => (&inner[..i], Some(&inner[i + 1..])),
            None => (inner, None),
        };
        let is_any = pattern == Some(".*");

        let slot = if is_any { &mut self.achild } else { &mut self.pchild };
        if let Some(existing) = slot.as_deref() {
            // One parameter slot per node: a different name with the same
            // constraint shares the slot (the first registration named it),
            // while a different constraint is a registration error.
            if existing.key != marker && existing.pattern_text() != pattern {
                panic!(
                    "conflicting parameter patterns {:?} and {:?} at the same position",
                    existing.key, marker
                );
            }
        } else {
            let regex = match pattern {
                Some(p) if !is_any => Some(Regex::new(&format!("^{p}")).unwrap_or_else(|err| {
                    panic!("invalid parameter pattern {marker:?}: {err}")
                })),
                _ => None,
            };
            let mut pnames = self.pnames.clone();
            pnames.push(name.to_string());
            let pindex = Some(pnames.len() - 1);
            *slot = Some(Box::new(Node {
                kind: if is_any { NodeKind::Any } else { NodeKind::Param },
                key: marker.to_string(),
                regex,
                data: None,
                order: 0,
                min_order: order,
                children: Vec::new(),
                pchild: None,
                achild: None,
                pindex,
                pnames,
            }));
        }

        let child = match slot.as_deref_mut() {
            Some(child) => child,
            None => unreachable!("parameter slot was just populated"),
        };
        let after = &rest[close + 1..];
        if after.is_empty() {
            if child.data.is_none() {
                child.data = data.take();
                child.order = order;
            }
            child.param_count()
        } else {
            child.insert_rest(after, data, order)
        }
    }

    fn literal_child_index(&self, rest: &str) -> Option<usize> {
        let first = rest.chars().next()?;
        self.children
            .iter()
            .position(|c| c.key.chars().next() == Some(first))
    }

    fn push_literal_child(&mut self, child: Node<T>) -> usize {
        let first = child.key.chars().next().unwrap_or('\0');
        let idx = self
            .children
            .iter()
            .position(|c| c.key.chars().next().map_or(false, |k| k > first))
            .unwrap_or(self.children.len());
        self.children.insert(idx, child);
        idx
    }

    /// Find the best (lowest-order) data node matching `path`, writing
    /// captures into `pvalues` by position. Literal chains descend
    /// iteratively; backtracking into parameter branches recurses.
    pub(crate) fn get<'n>(
        &'n self,
        mut path: &str,
        pvalues: &mut [String],
    ) -> (Option<&'n T>, &'n [String], usize) {
        let mut node = self;
        loop {
            match node.kind {
                NodeKind::Literal => {
                    if !path.starts_with(node.key.as_str()) {
                        return (None, &[], usize::MAX);
                    }
                    path = &path[node.key.len()..];
                }
                NodeKind::Param => {
                    if let Some(re) = &node.regex {
                        match re.find(path) {
                            Some(m) => {
                                if let Some(idx) = node.pindex {
                                    set_value(&mut pvalues[idx], m.as_str());
                                }
                                path = &path[m.end()..];
                            }
                            None => return (None, &[], usize::MAX),
                        }
                    } else {
                        let end = path.find('/').unwrap_or(path.len());
                        if end == 0 {
                            return (None, &[], usize::MAX);
                        }
                        if let Some(idx) = node.pindex {
                            set_value(&mut pvalues[idx], &path[..end]);
                        }
                        path = &path[end..];
                    }
                }
                NodeKind::Any => {
                    if let Some(idx) = node.pindex {
                        set_value(&mut pvalues[idx], path);
                    }
                    path = "";
                }
            }

            let mut best_data: Option<&'n T> = None;
            let mut best_names: &'n [String] = &[];
            let mut best_order = usize::MAX;

            if !path.is_empty() {
                if let Some(idx) = node.literal_child_index(path) {
                    let child = &node.children[idx];
                    if node.pchild.is_none() && node.achild.is_none() {
                        node = child;
                        continue;
                    }
                    let (d, p, o) = child.get(path, pvalues);
                    best_data = d;
                    best_names = p;
                    best_order = o;
                }
            } else if let Some(data) = &node.data {
                // Hold this candidate instead of returning: a parameter
                // branch may still match the empty remainder with a lower
                // order.
                best_data = Some(data);
                best_names = &node.pnames;
                best_order = node.order;
            }

            for child in [node.pchild.as_deref(), node.achild.as_deref()]
                .into_iter()
                .flatten()
            {
                if child.min_order >= best_order {
                    continue;
                }
                if best_data.is_some() {
                    // Race against the candidate on a scratch buffer so a
                    // losing branch cannot clobber the winning captures.
                    let mut scratch: SmallVec<[String; MAX_INLINE_PARAMS]> =
                        pvalues.iter().cloned().collect();
                    let (d, p, o) = child.get(path, &mut scratch);
                    if d.is_some() && o < best_order {
                        for (dst, src) in pvalues.iter_mut().zip(scratch.iter()) {
                            set_value(dst, src);
                        }
                        best_data = d;
                        best_names = p;
                        best_order = o;
                    }
                } else {
                    let (d, p, o) = child.get(path, pvalues);
                    if d.is_some() && o < best_order {
                        best_data = d;
                        best_names = p;
                        best_order = o;
                    }
                }
            }

            return (best_data, best_names, best_order);
        }
    }

    pub(crate) fn write_dump(&self, f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result
    where
        T: fmt::Debug,
    {
        for _ in 0..level {
            f.write_str("    ")?;
        }
        write!(f, "{{key: {}, regex: ", self.key)?;
        match &self.regex {
            Some(re) => f.write_str(re.as_str())?,
            None => f.write_str("None")?,
        }
        f.write_str(", data: ")?;
        match &self.data {
            Some(data) => write!(f, "{data:?}")?,
            None => f.write_str("None")?,
        }
        write!(
            f,
            ", order: {}, minOrder: {}, pindex: {}, pnames: [",
            self.order,
            self.min_order,
            self.pindex.map_or(-1, |i| i as i64)
        )?;
        for (i, name) in self.pnames.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
        }
        f.write_str("]}\n")?;
        for child in &self.children {
            child.write_dump(f, level + 1)?;
        }
        if let Some(child) = &self.pchild {
            child.write_dump(f, level + 1)?;
        }
        if let Some(child) = &self.achild {
            child.write_dump(f, level + 1)?;
        }
        Ok(())
    }
}

/// Length in bytes of the longest common prefix, cut at a char boundary.
fn common_prefix(a: &str, b: &str) -> usize {
    let mut len = 0;
    let mut ca = a.chars();
    let mut cb = b.chars();
    loop {
        match (ca.next(), cb.next()) {
            (Some(x), Some(y)) if x == y => len += x.len_utf8(),
            _ => return len,
        }
    }
}

/// Locate the first `<...>` marker: `(open, close)` byte offsets. A `<` with
/// no closing `>` is plain literal text.
fn find_marker(key: &str) -> Option<(usize, usize)> {
    let start = key.find('<')?;
    let close = key[start..].find('>')? + start;
    Some((start, close))
}

/// Overwrite a capture slot, reusing its allocation.
fn set_value(slot: &mut String, value: &str) {
    slot.clear();
    slot.push_str(value);
}
