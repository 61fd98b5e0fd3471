/// Page kind definitions for the navigator's state machine
///
/// The navigator is always on exactly one kind of page. Transitions are
/// guarded so that "are we on a detail page" is answered by the state, not by
/// inspecting URLs.
use std::fmt;

/// Which kind of directory page the browser surface is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageKind {
    /// Nothing recognized yet, or the last navigation failed fatally
    #[default]
    Unknown,

    /// A paginated result list with several business entries
    Listing,

    /// The full profile of a single business
    Detail,
}

impl PageKind {
    /// Returns true if the state machine allows moving from `self` to `next`
    ///
    /// Allowed transitions:
    /// - any state to `Unknown` (fatal navigation error, or leaving the directory)
    /// - `Unknown` to `Listing` (entering the first listing page)
    /// - `Listing` to `Listing` (pagination)
    /// - `Listing` to `Detail` (opening an entry)
    /// - `Detail` to `Listing` (returning to the list)
    pub fn can_transition_to(&self, next: PageKind) -> bool {
        matches!(
            (self, next),
            (_, Self::Unknown)
                | (Self::Unknown, Self::Listing)
                | (Self::Listing, Self::Listing)
                | (Self::Listing, Self::Detail)
                | (Self::Detail, Self::Listing)
        )
    }

    /// Lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Listing => "listing",
            Self::Detail => "detail",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
