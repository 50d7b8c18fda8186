use anyhow::Result;
use chrono::NaiveDate;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::fs;
use std::path::Path;

use crate::calendar::Locale;
use crate::schedule::{
    DayCell, LoadState, SessionDetail, SessionEntry, WeekGrid, WeeklyScheduleView,
};
use crate::types::{Participants, TypeFilter};

const UNAVAILABLE_MESSAGE: &str =
    "The schedule is unavailable right now. Reload the page to try again.";

/// Write a static page for the view's current week
pub fn generate_html(view: &WeeklyScheduleView, today: NaiveDate, path: &Path) -> Result<()> {
    let html = render_page(view, today);
    fs::write(path, html.into_string())?;
    Ok(())
}

pub fn render_page(view: &WeeklyScheduleView, today: NaiveDate) -> Markup {
    let grid = view.render_week(today);
    let detail = view.session_detail();
    let loading = matches!(view.load_state(), LoadState::Loading);

    html! {
        (DOCTYPE)
        html lang=(view.locale().lang()) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                @if loading {
                    // Poll until the initial fetch has finished
                    meta http-equiv="refresh" content="2";
                }
                title { "Orario" }
                style { (PreEscaped(CSS)) }
            }
            body class=[view.is_detail_open().then_some("modal-open")] {
                div.container {
                    h1 { "Orario" }
                    (render_toolbar(&grid, view.load_state()))
                    (render_grid_area(&grid, view.load_state()))
                }
                div #"session-detail" {
                    @if let Some(detail) = &detail {
                        (render_detail(detail, view.locale()))
                    }
                }
                script { (PreEscaped(JAVASCRIPT)) }
            }
        }
    }
}

/// Week navigation, week label and type filter buttons
fn render_toolbar(grid: &WeekGrid, state: &LoadState) -> Markup {
    html! {
        div.toolbar {
            div.week-nav {
                form method="post" action="/week/previous" {
                    button.nav-button type="submit" aria-label="Previous week" { "‹" }
                }
                div.week-label #"week-label" { (grid.label) }
                form method="post" action="/week/next" {
                    button.nav-button type="submit" aria-label="Next week" { "›" }
                }
                form method="post" action="/week/current" {
                    button.today-button type="submit" { "This week" }
                }
            }
            @if let LoadState::Loaded = state {
                div.filters role="tablist" {
                    @for filter in TypeFilter::ALL {
                        form method="post" action={"/filter/" (filter.as_str())} {
                            button.filter-button.active[filter == grid.filter]
                                type="submit"
                                role="tab"
                                aria-selected=(if filter == grid.filter { "true" } else { "false" }) {
                                (filter_label(filter))
                            }
                        }
                    }
                }
                div.stats {
                    span #"session-count" { (grid.session_count()) }
                    " sessions this week"
                }
            }
        }
    }
}

fn filter_label(filter: TypeFilter) -> &'static str {
    match filter {
        TypeFilter::All => "All",
        TypeFilter::Individual => "Individual",
        TypeFilter::Group => "Group",
    }
}

/// The `#schedule-grid` mount point: loading placeholder, fallback message,
/// or the seven day cells
pub fn render_grid_area(grid: &WeekGrid, state: &LoadState) -> Markup {
    html! {
        div.schedule-grid #"schedule-grid" {
            @match state {
                LoadState::Loading => {
                    p.schedule-loading { "Loading schedule…" }
                }
                LoadState::Failed(_) => {
                    p.schedule-unavailable { (UNAVAILABLE_MESSAGE) }
                }
                LoadState::Loaded => {
                    @for day in &grid.days {
                        (render_day(day))
                    }
                }
            }
        }
    }
}

fn render_day(day: &DayCell) -> Markup {
    html! {
        div.day-cell.today[day.is_today] data-date=(day.date.to_string()) {
            div.day-header {
                span.day-number { (day.day_number) }
                span.day-name { (day.weekday) }
            }
            @if day.sessions.is_empty() {
                div.day-empty { "—" }
            } @else {
                @for entry in &day.sessions {
                    (render_entry(entry))
                }
            }
        }
    }
}

fn render_entry(entry: &SessionEntry) -> Markup {
    html! {
        form.session-entry method="post" action="/sessions/open" {
            input type="hidden" name="id" value=(entry.id.as_str());
            button class={"session-button " (entry.session_type.as_str())} type="submit" {
                span.session-time { (entry.time_range) }
                span.session-trainer { (entry.trainer_name) }
                @if let Some(program) = &entry.program_name {
                    span.session-program { (program) }
                }
                @if let Some(participants) = entry.participants {
                    (render_participants(participants))
                }
            }
        }
    }
}

fn render_participants(participants: Participants) -> Markup {
    html! {
        span.session-participants.full[participants.is_full()] {
            (participants.current) "/" (participants.max)
            @if participants.is_full() {
                " full"
            }
        }
    }
}

/// The detail overlay for one session
pub fn render_detail(detail: &SessionDetail, locale: Locale) -> Markup {
    html! {
        div.modal-backdrop {
            div.modal role="dialog" aria-modal="true" aria-labelledby="detail-title" {
                form #"close-detail-form" method="post" action="/sessions/close" {
                    button.modal-close type="submit" aria-label="Close" { "×" }
                }
                h2 #"detail-title" {
                    span class={"detail-type " (detail.session_type.as_str())} { (detail.type_label) }
                }
                dl.detail-fields {
                    dt { "Date" }
                    dd { (detail.weekday) ", " (detail.date_label) }
                    dt { "Time" }
                    dd { (detail.time_range) }
                    dt { "Trainer" }
                    dd {
                        @if detail.trainer_name.is_empty() { "—" } @else { (detail.trainer_name) }
                    }
                    @if let Some(program) = &detail.program_name {
                        dt { "Program" }
                        dd { (program) }
                    }
                    @if let Some(participants) = detail.participants {
                        dt { "Participants" }
                        dd { (render_participants(participants)) }
                    }
                }
                @if let Some(description) = &detail.description {
                    p.detail-description lang=(locale.lang()) { (description) }
                }
            }
        }
    }
}

const CSS: &str = r#"
* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
    background: #111318;
    color: #f2f2f2;
    min-height: 100vh;
    line-height: 1.4;
}

body.modal-open {
    overflow: hidden;
}

.container {
    max-width: 1280px;
    margin: 0 auto;
    padding: 32px 20px 60px;
}

h1 {
    font-weight: 900;
    font-size: 2.4em;
    letter-spacing: -0.02em;
    text-transform: uppercase;
    margin-bottom: 20px;
}

.toolbar {
    display: flex;
    flex-wrap: wrap;
    align-items: center;
    justify-content: space-between;
    gap: 16px;
    margin-bottom: 24px;
}

.week-nav, .filters {
    display: flex;
    align-items: center;
    gap: 8px;
}

.week-label {
    min-width: 200px;
    text-align: center;
    font-weight: 700;
}

button {
    appearance: none;
    border: none;
    cursor: pointer;
    font: inherit;
    color: inherit;
}

.nav-button, .today-button, .filter-button {
    background: rgba(255,255,255,0.06);
    border: 1px solid rgba(255,255,255,0.12);
    border-radius: 999px;
    padding: 6px 14px;
}

.filter-button.active {
    background: #ff6b4a;
    border-color: #ff6b4a;
}

.stats {
    color: #8a8f98;
    font-size: 0.85em;
    text-transform: uppercase;
    letter-spacing: 0.08em;
}

.schedule-grid {
    display: grid;
    grid-template-columns: repeat(7, minmax(0, 1fr));
    gap: 12px;
}

.schedule-loading, .schedule-unavailable {
    grid-column: 1 / -1;
    padding: 60px 20px;
    text-align: center;
    color: #8a8f98;
}

.schedule-unavailable {
    color: #ff8a75;
}

.day-cell {
    background: rgba(255,255,255,0.03);
    border: 1px solid rgba(255,255,255,0.08);
    border-radius: 12px;
    padding: 12px;
    display: grid;
    align-content: start;
    gap: 8px;
    min-height: 180px;
}

.day-cell.today {
    border-color: #ff6b4a;
    box-shadow: 0 0 0 1px #ff6b4a inset;
}

.day-header {
    display: flex;
    align-items: baseline;
    gap: 8px;
}

.day-number {
    font-size: 1.6em;
    font-weight: 900;
}

.day-name {
    color: #8a8f98;
    font-size: 0.85em;
    text-transform: uppercase;
}

.day-empty {
    color: #555a63;
}

.session-button {
    width: 100%;
    text-align: left;
    display: grid;
    gap: 2px;
    padding: 8px 10px;
    border-radius: 8px;
    background: rgba(255,255,255,0.05);
    border-left: 3px solid #4ac3ff;
}

.session-button.group {
    border-left-color: #ff6b4a;
}

.session-time {
    font-weight: 700;
}

.session-trainer, .session-program {
    font-size: 0.85em;
    color: #c9ccd1;
}

.session-participants {
    font-size: 0.8em;
    color: #8a8f98;
}

.session-participants.full {
    color: #ff8a75;
}

.modal-backdrop {
    position: fixed;
    inset: 0;
    background: rgba(0,0,0,0.6);
    display: grid;
    place-items: center;
    padding: 20px;
}

.modal {
    position: relative;
    width: min(440px, 100%);
    background: #1b1e25;
    border-radius: 16px;
    padding: 28px;
}

.modal-close {
    position: absolute;
    top: 12px;
    right: 16px;
    font-size: 1.6em;
}

.detail-fields {
    display: grid;
    grid-template-columns: auto 1fr;
    gap: 6px 16px;
    margin-top: 16px;
}

.detail-fields dt {
    color: #8a8f98;
}

.detail-description {
    margin-top: 16px;
    color: #c9ccd1;
}

@media (max-width: 900px) {
    .schedule-grid {
        grid-template-columns: 1fr;
    }
}
"#;

const JAVASCRIPT: &str = r#"
// Every control is a form post that redirects back here, so carry the
// scroll position across the round trip
const SCROLL_KEY = 'orario-scroll';

document.querySelectorAll('form').forEach(form => {
    form.addEventListener('submit', () => {
        sessionStorage.setItem(SCROLL_KEY, String(window.scrollY));
    });
});

const savedScroll = sessionStorage.getItem(SCROLL_KEY);
if (savedScroll !== null) {
    window.scrollTo(0, Number(savedScroll));
    sessionStorage.removeItem(SCROLL_KEY);
}

document.addEventListener('keydown', event => {
    const closeForm = document.getElementById('close-detail-form');
    if (event.key === 'Escape' && closeForm) {
        closeForm.requestSubmit();
    }
});
"#;
