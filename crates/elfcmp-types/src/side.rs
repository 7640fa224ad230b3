use std::fmt;

use serde::{Deserialize, Serialize};

/// Which of the two compared inputs something belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// A pair of values, one per input.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sided<T> {
    pub left: T,
    pub right: T,
}

impl<T> Sided<T> {
    pub fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// The same pair with left and right exchanged.
    pub fn swapped(self) -> Self {
        Self {
            left: self.right,
            right: self.left,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Sided<U> {
        Sided {
            left: f(self.left),
            right: f(self.right),
        }
    }
}

impl<T: PartialEq> Sided<T> {
    /// Returns `true` if both sides hold equal values.
    pub fn agree(&self) -> bool {
        self.left == self.right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swapped_exchanges_values() {
        let pair = Sided::new(1, 2).swapped();
        assert_eq!(pair, Sided::new(2, 1));
        assert_eq!(*pair.get(Side::Left), 2);
    }

    #[test]
    fn agree_compares_sides() {
        assert!(Sided::new(3, 3).agree());
        assert!(!Sided::new(3, 4).agree());
    }

    #[test]
    fn other_side() {
        assert_eq!(Side::Left.other(), Side::Right);
        assert_eq!(Side::Right.to_string(), "right");
    }
}
