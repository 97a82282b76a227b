// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::http::HttpClient;
use crate::models::{NewPodcast, PodcastFull, PodcastUpdate};
use crate::progress::{ListScope, ProgressEvent, SharedProgressReporter};

pub const ADDED_MESSAGE: &str = "Podcast added successfully!";
pub const ADD_FAILED_MESSAGE: &str = "Failed to add podcast. Please check the RSS URL.";

/// Whether the initial list fetch has finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Loaded,
}

/// The "Add New Podcast" form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Hidden,
    Visible(NewPodcast),
}

/// Snapshot of everything the admin screen shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminState {
    pub phase: Phase,
    pub podcasts: Vec<PodcastFull>,
    pub form: FormState,
    /// A create request is in flight
    pub submitting: bool,
    /// Podcasts with a status toggle in flight
    pub pending_toggles: HashSet<u64>,
}

impl Default for AdminState {
    fn default() -> Self {
        Self {
            phase: Phase::Loading,
            podcasts: Vec::new(),
            form: FormState::Hidden,
            submitting: false,
            pending_toggles: HashSet::new(),
        }
    }
}

/// Result of submitting the add form
#[derive(Debug)]
pub enum SubmitOutcome {
    Created(PodcastFull),
    /// The draft failed local validation; nothing was sent
    Invalid(String),
    Failed(ApiError),
    /// Another submission is still in flight
    AlreadySubmitting,
    /// There is no visible form to submit
    FormHidden,
}

/// Result of flipping a podcast's active flag
#[derive(Debug)]
pub enum ToggleOutcome {
    Toggled(PodcastFull),
    Failed(ApiError),
    /// A toggle for the same podcast is still in flight
    AlreadyPending,
    /// The id is not in the loaded list
    UnknownPodcast,
}

#[derive(Default)]
struct Inner {
    state: AdminState,
    /// Generation of the most recently started list fetch
    latest_load: u64,
}

/// The admin panel: lists every podcast, adds new ones and toggles
/// their visibility on the public site.
///
/// All methods take `&self`, so intents may overlap. Overlapping
/// submissions and toggles of the same podcast are ignored, and a list
/// response that was overtaken by a newer fetch is dropped.
pub struct AdminPanel<C> {
    api: ApiClient<C>,
    reporter: SharedProgressReporter,
    inner: Mutex<Inner>,
}

impl<C: HttpClient> AdminPanel<C> {
    pub fn new(api: ApiClient<C>, reporter: SharedProgressReporter) -> Self {
        Self {
            api,
            reporter,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn snapshot(&self) -> AdminState {
        self.lock().state.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn alert(&self, message: impl Into<String>) {
        self.reporter.report(ProgressEvent::Alert {
            message: message.into(),
        });
    }

    /// Fetch every podcast. The panel is `Loaded` afterwards whether or
    /// not the fetch worked; failures are only logged.
    ///
    /// Returns false if the response was discarded because a newer fetch
    /// had been started in the meantime.
    pub async fn load(&self) -> bool {
        let generation = {
            let mut inner = self.lock();
            inner.latest_load += 1;
            inner.latest_load
        };

        self.reporter.report(ProgressEvent::LoadingPodcasts {
            scope: ListScope::Admin,
        });

        let result = self.api.get_all_podcasts().await;

        let event = {
            let mut inner = self.lock();
            if inner.latest_load != generation {
                debug!(generation, latest = inner.latest_load, "discarding stale podcast list");
                return false;
            }

            inner.state.phase = Phase::Loaded;
            match result {
                Ok(podcasts) => {
                    let count = podcasts.len();
                    inner.state.podcasts = podcasts;
                    ProgressEvent::PodcastsLoaded {
                        scope: ListScope::Admin,
                        count,
                    }
                }
                Err(e) => {
                    error!(error = %e, "failed to load podcasts");
                    ProgressEvent::LoadFailed {
                        scope: ListScope::Admin,
                        error: e.to_string(),
                    }
                }
            }
        };

        self.reporter.report(event);
        true
    }

    /// Show the form with an empty draft, or hide it and drop the draft.
    /// Returns whether the form is visible now.
    pub fn toggle_form(&self) -> bool {
        let mut inner = self.lock();
        inner.state.form = match inner.state.form {
            FormState::Hidden => FormState::Visible(NewPodcast::default()),
            FormState::Visible(_) => FormState::Hidden,
        };
        matches!(inner.state.form, FormState::Visible(_))
    }

    /// Cancel button
    pub fn hide_form(&self) {
        self.lock().state.form = FormState::Hidden;
    }

    /// Change the visible draft. Returns false if the form is hidden.
    pub fn edit_draft(&self, edit: impl FnOnce(&mut NewPodcast)) -> bool {
        match &mut self.lock().state.form {
            FormState::Visible(draft) => {
                edit(draft);
                true
            }
            FormState::Hidden => false,
        }
    }

    /// Submit the add form.
    ///
    /// On success the form is cleared and hidden, a confirmation alert is
    /// raised and the list re-fetched. On failure an alert is raised and
    /// the draft is left as it was.
    pub async fn submit(&self) -> SubmitOutcome {
        let draft = {
            let mut inner = self.lock();
            if inner.state.submitting {
                return SubmitOutcome::AlreadySubmitting;
            }
            let FormState::Visible(draft) = &inner.state.form else {
                return SubmitOutcome::FormHidden;
            };

            let draft = draft.trimmed();
            if let Err(reason) = draft.validate() {
                drop(inner);
                self.alert(reason.clone());
                return SubmitOutcome::Invalid(reason);
            }

            inner.state.submitting = true;
            draft
        };

        self.reporter.report(ProgressEvent::CreatingPodcast {
            name: draft.name.clone(),
        });

        let result = self.api.create_podcast(&draft).await;

        {
            let mut inner = self.lock();
            inner.state.submitting = false;
            if result.is_ok() {
                inner.state.form = FormState::Hidden;
            }
        }

        match result {
            Ok(podcast) => {
                self.alert(ADDED_MESSAGE);
                self.load().await;
                SubmitOutcome::Created(podcast)
            }
            Err(e) => {
                error!(error = %e, name = %draft.name, "failed to add podcast");
                self.alert(ADD_FAILED_MESSAGE);
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// Flip the active flag of a loaded podcast, then re-fetch the list
    /// whatever the outcome
    pub async fn toggle_status(&self, id: u64) -> ToggleOutcome {
        let current = {
            let mut inner = self.lock();
            if inner.state.pending_toggles.contains(&id) {
                return ToggleOutcome::AlreadyPending;
            }
            let Some(current) = inner
                .state
                .podcasts
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.is_active)
            else {
                return ToggleOutcome::UnknownPodcast;
            };
            inner.state.pending_toggles.insert(id);
            current
        };

        self.reporter.report(ProgressEvent::UpdatingPodcast { id });

        let result = self
            .api
            .update_podcast(id, &PodcastUpdate::active(!current))
            .await;

        self.lock().state.pending_toggles.remove(&id);

        if let Err(e) = &result {
            error!(error = %e, id, "failed to update podcast");
        }

        self.load().await;

        match result {
            Ok(podcast) => ToggleOutcome::Toggled(podcast),
            Err(e) => ToggleOutcome::Failed(e),
        }
    }

    /// Delete a podcast, then re-fetch the list
    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        self.reporter.report(ProgressEvent::DeletingPodcast { id });

        let result = self.api.delete_podcast(id).await;
        if let Err(e) = &result {
            error!(error = %e, id, "failed to delete podcast");
        }

        self.load().await;
        result
    }
}
