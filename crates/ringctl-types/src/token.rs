//! Ring tokens: positions on the 64-bit partitioning ring.

use std::collections::BTreeSet;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// A single position on the 64-bit partitioning ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Token(i64);

impl Token {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The set of tokens a node owns. `None` at the `ReplicaRecord` level
/// means the node has not (yet, or any longer) been assigned a ring
/// position — only nodes in `normal` state carry a populated slice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RingSlice(BTreeSet<Token>);

impl RingSlice {
    pub fn new(tokens: impl IntoIterator<Item = Token>) -> Self {
        Self(tokens.into_iter().collect())
    }

    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, token: Token) -> bool {
        self.0.contains(&token)
    }

    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.0.iter().copied()
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self(self.0.union(&other.0).copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_slice_tracks_membership() {
        let slice = RingSlice::new([Token::new(1), Token::new(5), Token::new(9)]);
        assert_eq!(slice.len(), 3);
        assert!(slice.contains(Token::new(5)));
        assert!(!slice.contains(Token::new(6)));
    }

    #[test]
    fn union_combines_disjoint_slices() {
        let a = RingSlice::new([Token::new(1)]);
        let b = RingSlice::new([Token::new(2)]);
        let u = a.union(&b);
        assert_eq!(u.len(), 2);
    }
}
