use serde::{Deserialize, Serialize};
use std::fmt;

/// Address of a node in the document tree: child indices from the root.
///
/// `path[0]` is the top-level block index. Paths order lexicographically,
/// which matches document order for nodes that are not ancestors of each
/// other.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<usize>);

impl Path {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the top-level block this path lives in
    pub fn top_level(&self) -> Option<usize> {
        self.0.first().copied()
    }

    /// Index of this node among its siblings
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            None
        } else {
            Some(Path(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    pub fn child(&self, index: usize) -> Path {
        let mut indices = self.0.clone();
        indices.push(index);
        Path(indices)
    }

    /// Path of the next sibling. The root has no siblings and is returned unchanged.
    pub fn next_sibling(&self) -> Path {
        let mut indices = self.0.clone();
        if let Some(last) = indices.last_mut() {
            *last += 1;
        }
        Path(indices)
    }

    /// True if `self` is a strict ancestor of `other`
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    /// All strict ancestors from the top-level block down, excluding the root
    pub fn ancestors(&self) -> impl Iterator<Item = Path> + '_ {
        (1..self.0.len()).map(|depth| Path(self.0[..depth].to_vec()))
    }

    /// Rewrite this path as it reads after a node was inserted at `inserted`.
    pub(crate) fn shifted_by_insert(&self, inserted: &Path) -> Path {
        let depth = inserted.len() - 1;
        if self.0.len() > depth
            && self.0[..depth] == inserted.0[..depth]
            && self.0[depth] >= inserted.0[depth]
        {
            let mut indices = self.0.clone();
            indices[depth] += 1;
            Path(indices)
        } else {
            self.clone()
        }
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl<const N: usize> From<[usize; N]> for Path {
    fn from(indices: [usize; N]) -> Self {
        Self(indices.to_vec())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{index}")?;
        }
        write!(f, "]")
    }
}
