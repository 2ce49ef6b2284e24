//! A segment trie with one wildcard child per node.
//!
//! Nodes live in a single arena and refer to their children by index. A lookup
//! takes the literal child when one exists and only otherwise the wildcard
//! child; it never backtracks.

use std::collections::HashMap;

const ROOT: usize = 0;

/// One segment of a registered pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    /// Matches any single input segment.
    Wildcard,
}

impl<'a> Segment<'a> {
    /// A segment starting with `:` is a wildcard, anything else is literal.
    pub fn parse(segment: &'a str) -> Self {
        if segment.starts_with(':') { Segment::Wildcard } else { Segment::Literal(segment) }
    }
}

#[derive(Debug)]
struct Node<T> {
    value: Option<T>,
    literals: HashMap<String, usize>,
    wildcard: Option<usize>,
}

impl<T> Node<T> {
    fn new() -> Self {
        Self { value: None, literals: HashMap::new(), wildcard: None }
    }
}

#[derive(Debug)]
pub struct RuleTrie<T> {
    nodes: Vec<Node<T>>,
    len: usize,
}

impl<T> Default for RuleTrie<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RuleTrie<T> {
    pub fn new() -> Self {
        Self { nodes: vec![Node::new()], len: 0 }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores `value` at the position named by `segments`, creating nodes on the way.
    ///
    /// Returns the value previously stored at that position, if any.
    pub fn insert<'s>(&mut self, segments: impl IntoIterator<Item = Segment<'s>>, value: T) -> Option<T> {
        let mut current = ROOT;

        for segment in segments {
            let existing = match segment {
                Segment::Literal(literal) => self.nodes[current].literals.get(literal).copied(),
                Segment::Wildcard => self.nodes[current].wildcard,
            };

            current = match existing {
                Some(child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(Node::new());
                    match segment {
                        Segment::Literal(literal) => {
                            self.nodes[current].literals.insert(literal.to_string(), child);
                        }
                        Segment::Wildcard => self.nodes[current].wildcard = Some(child),
                    }
                    child
                }
            };
        }

        let previous = self.nodes[current].value.replace(value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Walks `segments` from the root and returns the value at the final node.
    pub fn get<'s>(&self, segments: impl IntoIterator<Item = &'s str>) -> Option<&T> {
        let mut current = ROOT;

        for segment in segments {
            let node = &self.nodes[current];
            current = node.literals.get(segment).copied().or(node.wildcard)?;
        }

        self.nodes[current].value.as_ref()
    }
}
