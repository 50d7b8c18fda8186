//! The weekly schedule view model.
//!
//! [`WeeklyScheduleView`] owns the session snapshot and the view state
//! (reference date, type filter, open detail). Rendering never touches the
//! snapshot in place: every grid is derived again from
//! `sessions + reference_date + type_filter`.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::calendar::{self, Locale};
use crate::source::{LoadError, SessionSource};
use crate::types::{Participants, Session, SessionId, SessionType, TypeFilter};

/// Progress of the one-time snapshot load
#[derive(Debug)]
pub enum LoadState {
    Loading,
    Loaded,
    Failed(LoadError),
}

impl LoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::Loading => "loading",
            LoadState::Loaded => "loaded",
            LoadState::Failed(_) => "failed",
        }
    }
}

/// One session line inside a day cell
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionEntry {
    pub id: SessionId,
    pub session_type: SessionType,
    pub time_range: String,
    pub trainer_name: String,
    pub program_name: Option<String>,
    pub participants: Option<Participants>,
}

impl SessionEntry {
    fn from_session(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            session_type: session.session_type,
            time_range: session.time_range(),
            trainer_name: session.trainer_name.clone(),
            program_name: session.program_name.clone(),
            participants: session.group_participants(),
        }
    }
}

/// One column of the weekly grid
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub day_number: u32,
    pub weekday: &'static str,
    pub is_today: bool,
    pub sessions: Vec<SessionEntry>,
}

/// The derived Monday–Sunday grid
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeekGrid {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
    pub filter: TypeFilter,
    pub days: Vec<DayCell>,
}

impl WeekGrid {
    pub fn session_count(&self) -> usize {
        self.days.iter().map(|day| day.sessions.len()).sum()
    }
}

/// Everything the detail overlay shows about one session
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionDetail {
    pub id: SessionId,
    pub session_type: SessionType,
    pub type_label: &'static str,
    pub date_label: String,
    pub weekday: &'static str,
    pub time_range: String,
    pub trainer_name: String,
    pub program_name: Option<String>,
    pub participants: Option<Participants>,
    pub description: Option<String>,
}

/// Weekly schedule of the public (guest) session list
#[derive(Debug)]
pub struct WeeklyScheduleView {
    reference_date: NaiveDate,
    type_filter: TypeFilter,
    sessions: Vec<Session>,
    state: LoadState,
    open_detail: Option<SessionId>,
    locale: Locale,
}

impl WeeklyScheduleView {
    pub fn new(reference_date: NaiveDate, locale: Locale) -> Self {
        Self {
            reference_date,
            type_filter: TypeFilter::All,
            sessions: Vec::new(),
            state: LoadState::Loading,
            open_detail: None,
            locale,
        }
    }

    /// Fetch the whole collection once and apply the outcome
    pub async fn load_sessions<S: SessionSource>(&mut self, source: &S) {
        let result = source.fetch_sessions().await;
        self.finish_load(result);
    }

    /// Store a fetched snapshot, or record why there is none.
    ///
    /// A failure leaves the view with no sessions at all.
    pub fn finish_load(&mut self, result: Result<Vec<Session>, LoadError>) {
        match result {
            Ok(sessions) => {
                let visible = sessions.iter().filter(|s| !s.is_cancelled).count();
                info!(total = sessions.len(), visible, "Schedule loaded");
                self.sessions = sessions;
                self.state = LoadState::Loaded;
            }
            Err(err) => {
                warn!(error = %err, "Failed to load schedule");
                self.sessions = Vec::new();
                self.open_detail = None;
                self.state = LoadState::Failed(err);
            }
        }
    }

    pub fn load_state(&self) -> &LoadState {
        &self.state
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn type_filter(&self) -> TypeFilter {
        self.type_filter
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Monday of the displayed week
    pub fn week_start(&self) -> NaiveDate {
        calendar::week_start(self.reference_date)
    }

    /// Visible sessions on `date`, earliest first
    pub fn sessions_for_date(&self, date: NaiveDate) -> Vec<&Session> {
        let mut matches: Vec<&Session> = self
            .sessions
            .iter()
            .filter(|s| !s.is_cancelled)
            .filter(|s| self.type_filter.matches(s.session_type))
            .filter(|s| s.date == date)
            .collect();
        matches.sort_by_key(|s| s.start_time);
        matches
    }

    /// Derive the grid of the week containing the reference date
    pub fn render_week(&self, today: NaiveDate) -> WeekGrid {
        let start = self.week_start();
        let days: Vec<DayCell> = calendar::week_days(start)
            .into_iter()
            .map(|date| DayCell {
                date,
                day_number: date.day(),
                weekday: self.locale.weekday_name(date.weekday()),
                is_today: date == today,
                sessions: self
                    .sessions_for_date(date)
                    .into_iter()
                    .map(SessionEntry::from_session)
                    .collect(),
            })
            .collect();

        WeekGrid {
            start,
            end: days.last().map(|d| d.date).unwrap_or(start),
            label: self.locale.week_label(start),
            filter: self.type_filter,
            days,
        }
    }

    pub fn set_type_filter(&mut self, filter: TypeFilter) {
        debug!(filter = filter.as_str(), "Type filter changed");
        self.type_filter = filter;
    }

    pub fn go_to_previous_week(&mut self) {
        self.shift_weeks(-1);
    }

    pub fn go_to_next_week(&mut self) {
        self.shift_weeks(1);
    }

    /// Stays on the current week when the shift leaves chrono's date range
    fn shift_weeks(&mut self, weeks: i64) {
        match calendar::shift_weeks(self.reference_date, weeks) {
            Some(date) => {
                self.reference_date = date;
                debug!(week_start = %self.week_start(), weeks, "Moved week");
            }
            None => debug!(reference = %self.reference_date, weeks, "Week out of range"),
        }
    }

    /// Jump to the week containing `date` (used for "this week")
    pub fn go_to_week_of(&mut self, date: NaiveDate) {
        self.reference_date = date;
        debug!(week_start = %self.week_start(), "Moved to week");
    }

    /// Open the detail overlay; ids missing from the snapshot are ignored
    pub fn open_session_detail(&mut self, id: &SessionId) {
        if self.sessions.iter().any(|s| &s.id == id) {
            self.open_detail = Some(id.clone());
        } else {
            debug!(id = %id, "Ignoring detail request for unknown session");
        }
    }

    pub fn close_session_detail(&mut self) {
        self.open_detail = None;
    }

    pub fn is_detail_open(&self) -> bool {
        self.session_detail().is_some()
    }

    /// Detail of the open session, if any
    pub fn session_detail(&self) -> Option<SessionDetail> {
        let id = self.open_detail.as_ref()?;
        let session = self.sessions.iter().find(|s| &s.id == id)?;
        Some(SessionDetail {
            id: session.id.clone(),
            session_type: session.session_type,
            type_label: self.locale.session_type_label(session.session_type),
            date_label: self.locale.format_date(session.date),
            weekday: self.locale.weekday_name(session.date.weekday()),
            time_range: session.time_range(),
            trainer_name: session.trainer_name.clone(),
            program_name: session.program_name.clone(),
            participants: session.group_participants(),
            description: session.description.clone(),
        })
    }
}
