// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

/// Which podcast list a load refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    /// Active podcasts shown on the public site
    Public,
    /// Every podcast, as shown in the admin panel
    Admin,
}

/// Events emitted by the site and admin workflows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A podcast list is being fetched
    LoadingPodcasts { scope: ListScope },

    /// A podcast list arrived and was applied
    PodcastsLoaded { scope: ListScope, count: usize },

    /// A podcast list could not be fetched
    LoadFailed { scope: ListScope, error: String },

    /// A create request is in flight
    CreatingPodcast { name: String },

    /// An update (e.g. status toggle) is in flight
    UpdatingPodcast { id: u64 },

    /// A delete request is in flight
    DeletingPodcast { id: u64 },

    /// A newsletter subscription is in flight
    Subscribing { email: String },

    /// A message the user has to acknowledge
    Alert { message: String },
}

/// Trait for reporting workflow events.
///
/// Implementations can use this to drive spinners, print alerts,
/// or collect events in tests.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {}
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}
