//! Tag allocator — draws C-tags and S-tags that satisfy both uniqueness scopes.
//!
//! A C-tag must be unused by every other subscriber on the same ONU device.
//! An S-tag only has to make the resulting `(c_tag, s_tag)` pair unique across
//! the whole system. Candidates are drawn uniformly from
//! [`TAG_RANGE`](accessline_domain::subscriber::TAG_RANGE) and retried on
//! collision, up to `max_attempts` draws per tag.
//!
//! The allocator only mutates the in-memory subscriber. Whoever persists the
//! record is responsible for serializing concurrent allocations.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use accessline_domain::error::{AccessLineError, AllocationError};
use accessline_domain::id::InstanceId;
use accessline_domain::subscriber::{Subscriber, TAG_RANGE, TagKind};

use crate::ports::SubscriberRepository;

/// Default retry budget, roughly the size of the tag space.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4096;

/// Randomized, bounded-retry allocator for subscriber tags.
pub struct TagAllocator {
    rng: Mutex<StdRng>,
    max_attempts: u32,
}

impl Default for TagAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl TagAllocator {
    /// Create an allocator seeded from OS entropy.
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            max_attempts,
        }
    }

    /// Create a deterministic allocator.
    #[must_use]
    pub fn with_seed(seed: u64, max_attempts: u32) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            max_attempts,
        }
    }

    fn draw(&self) -> u16 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(TAG_RANGE)
    }

    /// Assign a C-tag unique on the subscriber's ONU device.
    ///
    /// When `s_tag` is unset it is allocated too, and the pair is considered
    /// valid by construction. When `s_tag` is already set, a C-tag that would
    /// complete a pair held by another subscriber is rejected and redrawn.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::Exhausted`] when no acceptable value was
    /// drawn within the budget (the subscriber is left unchanged), or a storage
    /// error from the repository.
    #[tracing::instrument(skip(self, repo, subscriber), fields(onu_device = %subscriber.onu_device))]
    pub async fn allocate_c_tag<R: SubscriberRepository>(
        &self,
        repo: &R,
        subscriber: &mut Subscriber,
    ) -> Result<u16, AccessLineError> {
        let used = used_c_tags(repo, subscriber).await?;
        let previous = subscriber.c_tag;

        for _ in 0..self.max_attempts {
            let candidate = self.draw();
            if used.contains(&candidate) {
                continue;
            }
            subscriber.c_tag = Some(candidate);

            if subscriber.s_tag.is_none() {
                self.allocate_s_tag(repo, subscriber).await?;
                return Ok(candidate);
            }
            if pair_owner(repo, subscriber).await?.is_none() {
                return Ok(candidate);
            }
        }

        subscriber.c_tag = previous;
        Err(AllocationError::Exhausted {
            tag: TagKind::CTag.as_str(),
            attempts: self.max_attempts,
        }
        .into())
    }

    /// Assign an S-tag so that the subscriber's pair is unique system-wide.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::Exhausted`] when every draw completed a pair
    /// held by another subscriber (the subscriber is left unchanged), or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, repo, subscriber), fields(c_tag = ?subscriber.c_tag))]
    pub async fn allocate_s_tag<R: SubscriberRepository>(
        &self,
        repo: &R,
        subscriber: &mut Subscriber,
    ) -> Result<u16, AccessLineError> {
        let previous = subscriber.s_tag;

        for _ in 0..self.max_attempts {
            let candidate = self.draw();
            subscriber.s_tag = Some(candidate);
            if pair_owner(repo, subscriber).await?.is_none() {
                return Ok(candidate);
            }
        }

        subscriber.s_tag = previous;
        Err(AllocationError::Exhausted {
            tag: TagKind::STag.as_str(),
            attempts: self.max_attempts,
        }
        .into())
    }
}

/// C-tags used by other subscribers on the same ONU device.
///
/// # Errors
///
/// Propagates storage errors from the repository.
pub async fn used_c_tags<R: SubscriberRepository>(
    repo: &R,
    subscriber: &Subscriber,
) -> Result<HashSet<u16>, AccessLineError> {
    let same_onu = repo.find_by_onu_device(&subscriber.onu_device).await?;
    Ok(same_onu
        .into_iter()
        .filter(|other| other.id != subscriber.id)
        .filter_map(|other| other.c_tag)
        .collect())
}

/// Id of another subscriber already holding this subscriber's tag pair.
///
/// Returns `None` when the pair is free or not fully set.
///
/// # Errors
///
/// Propagates storage errors from the repository.
pub async fn pair_owner<R: SubscriberRepository>(
    repo: &R,
    subscriber: &Subscriber,
) -> Result<Option<InstanceId>, AccessLineError> {
    let Some((c_tag, s_tag)) = subscriber.tag_pair() else {
        return Ok(None);
    };
    let same_pair = repo.find_by_tags(c_tag, s_tag).await?;
    Ok(same_pair
        .into_iter()
        .map(|other| other.id)
        .find(|id| *id != subscriber.id))
}
