//! View-state and the single place it changes.
//!
//! [`Store::dispatch`] takes an [`Action`], replaces the [`ViewState`] with a
//! new value and returns the [`Effect`]s the caller has to carry out (timers,
//! requests). Every request carries a [`Ticket`]; a response whose ticket is
//! no longer the current one for its flow is dropped, so a slow answer to an
//! older query or selection never overwrites newer state.

use std::{collections::HashSet, fmt};

use tracing::debug;

use crate::{FetchError, Location, MarineReading, SearchSettings};

/// Identity of one outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub candidates: Vec<Location>,
    pub loading: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DetailState {
    #[default]
    Idle,
    Loading {
        location: Location,
    },
    Loaded {
        location: Location,
        reading: MarineReading,
    },
    Failed {
        location: Location,
    },
}

impl DetailState {
    pub fn selected(&self) -> Option<&Location> {
        match self {
            DetailState::Idle => None,
            DetailState::Loading { location }
            | DetailState::Loaded { location, .. }
            | DetailState::Failed { location } => Some(location),
        }
    }

    pub fn reading(&self) -> Option<&MarineReading> {
        match self {
            DetailState::Loaded { reading, .. } => Some(reading),
            _ => None,
        }
    }

}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub search: SearchState,
    pub detail: DetailState,
}

#[derive(Debug)]
pub enum Action {
    /// The text input now holds this value.
    QueryChanged(String),
    /// The quiet period scheduled under `ticket` elapsed.
    DebounceElapsed {
        ticket: Ticket,
        query: String,
    },
    SearchResolved {
        ticket: Ticket,
        candidates: Vec<Location>,
    },
    CandidateSelected(Location),
    MarineResolved {
        ticket: Ticket,
        outcome: Result<MarineReading, FetchError>,
    },
    ClearSelection,
}

/// Work requested by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ScheduleDebounce { ticket: Ticket, query: String },
    CancelDebounce,
    FetchLocations { ticket: Ticket, query: String },
    FetchMarine { ticket: Ticket, location: Location },
}

#[derive(Debug)]
pub struct Store {
    settings: SearchSettings,
    state: ViewState,
    next_ticket: u64,
    scheduled: Option<Ticket>,
    search_ticket: Option<Ticket>,
    detail_ticket: Option<Ticket>,
}

impl Store {
    pub fn new(settings: SearchSettings) -> Self {
        Self {
            settings,
            state: ViewState::default(),
            next_ticket: 0,
            scheduled: None,
            search_ticket: None,
            detail_ticket: None,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// No timer is waiting and no request is current.
    pub fn is_idle(&self) -> bool {
        self.scheduled.is_none() && self.search_ticket.is_none() && self.detail_ticket.is_none()
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    fn meets_min_len(&self, query: &str) -> bool {
        query.chars().count() >= self.settings.min_query_len
    }

    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        let mut next = self.state.clone();
        let mut effects = Vec::new();

        match action {
            Action::QueryChanged(query) => {
                // Any in-flight search answers an older input now.
                self.search_ticket = None;
                next.search =
                    SearchState { query: query.clone(), candidates: Vec::new(), loading: false };

                if query.is_empty() {
                    self.scheduled = None;
                    effects.push(Effect::CancelDebounce);
                } else {
                    let ticket = self.issue_ticket();
                    self.scheduled = Some(ticket);
                    effects.push(Effect::ScheduleDebounce { ticket, query });
                }
            }

            Action::DebounceElapsed { ticket, query } => {
                // A timer may fire after a later keystroke rescheduled it,
                // even one that typed the same text again.
                if self.scheduled != Some(ticket) {
                    debug!(%ticket, %query, "ignoring superseded debounce timer");
                    return effects;
                }
                self.scheduled = None;

                if self.meets_min_len(&query) {
                    let ticket = self.issue_ticket();
                    self.search_ticket = Some(ticket);
                    next.search.loading = true;
                    effects.push(Effect::FetchLocations { ticket, query });
                } else {
                    next.search.candidates.clear();
                }
            }

            Action::SearchResolved { ticket, candidates } => {
                if self.search_ticket != Some(ticket) {
                    debug!(%ticket, "dropping stale search response");
                    return effects;
                }
                self.search_ticket = None;
                next.search.candidates = dedup_by_key(candidates);
                next.search.loading = false;
            }

            Action::CandidateSelected(location) => {
                let ticket = self.issue_ticket();
                self.detail_ticket = Some(ticket);
                next.detail = DetailState::Loading { location: location.clone() };
                effects.push(Effect::FetchMarine { ticket, location });
            }

            Action::MarineResolved { ticket, outcome } => {
                if self.detail_ticket != Some(ticket) {
                    debug!(%ticket, "dropping stale marine response");
                    return effects;
                }
                self.detail_ticket = None;

                let DetailState::Loading { location } = next.detail else {
                    return effects;
                };
                next.detail = match outcome {
                    Ok(reading) => DetailState::Loaded { location, reading },
                    Err(_) => DetailState::Failed { location },
                };
            }

            Action::ClearSelection => {
                if let Some(location) = self.state.detail.selected() {
                    debug!(location = %location.label(), "clearing selection");
                }
                self.detail_ticket = None;
                next.detail = DetailState::Idle;
            }
        }

        self.state = next;
        effects
    }
}

/// Candidates are identified by their coordinates; keep the first of each.
fn dedup_by_key(candidates: Vec<Location>) -> Vec<Location> {
    let mut seen = HashSet::new();
    candidates.into_iter().filter(|location| seen.insert(location.key())).collect()
}
