//! VLAN-style tag space shared by C-tags and S-tags.

use std::ops::RangeInclusive;

/// Lowest tag the allocator will draw.
pub const TAG_MIN: u16 = 16;

/// Highest tag the allocator will draw.
pub const TAG_MAX: u16 = 4096;

/// Inclusive range candidate tags are drawn from.
pub const TAG_RANGE: RangeInclusive<u16> = TAG_MIN..=TAG_MAX;

/// Which of the two tags of a subscriber is being handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// Per-access-line tag, unique per ONU device.
    CTag,
    /// Shared-trunk tag, unique only together with the C-tag.
    STag,
}

impl TagKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CTag => "c_tag",
            Self::STag => "s_tag",
        }
    }
}
