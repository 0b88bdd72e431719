//! Compression strategy selection.

/// Payload compression strategy, chosen per submission.
///
/// Every strategy is deterministic and infallible; they trade payload size
/// against CPU cost. See `rush-compress` for the encoders themselves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Verbatim serialization; no transformation.
    None,
    /// Alias substitution for well-known keys.
    #[default]
    Basic,
    /// Alias substitution plus packed-small-int tagging.
    Advanced,
    /// Alias substitution plus base64-wrapped numerics.
    Maximum,
}

impl Strategy {
    /// Human-readable label, recorded in usage history.
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Basic => "basic",
            Self::Advanced => "advanced",
            Self::Maximum => "maximum",
        }
    }
}
