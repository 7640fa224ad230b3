/// Common behaviour of every diff result.
pub trait Delta {
    /// Returns `true` if the diff records no difference.
    fn is_empty(&self) -> bool;

    /// The same diff as seen with left and right inputs exchanged.
    fn reversed(self) -> Self;
}
