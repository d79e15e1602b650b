//! The identifier recorded for "which policy served the last request".
use std::fmt;

/// Which placement policy produced (or attempted to produce) the most
/// recent allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// First-fit: first address-ordered block large enough.
    First,
    /// Next-fit: first block large enough starting from the rover.
    Next,
    /// Best-fit: the smallest block large enough.
    Best,
    /// Worst-fit: the largest block, if large enough.
    Worst,
    /// The power-of-two buddy allocator.
    Buddy,
}

impl Strategy {
    /// A stable, human-readable name for this strategy.
    ///
    /// An unset recorded value is treated as `First` by convention, the
    /// default a fresh [`Strategy`] value takes.
    pub const fn name(self) -> &'static str {
        match self {
            Strategy::First => "first",
            Strategy::Next => "next",
            Strategy::Best => "best",
            Strategy::Worst => "worst",
            Strategy::Buddy => "buddy",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::First
    }
}
