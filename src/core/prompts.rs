use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};

/// The one-time share prompt fires once the engagement counter reaches this.
pub const SHARE_PROMPT_THRESHOLD: u32 = 2;

/// Weekday on which the recurring share prompt may fire again.
pub const SHARE_PROMPT_WEEKDAY: Weekday = Weekday::Fri;

/// Weekday on which the fresh-start banner may fire.
pub const FRESH_START_WEEKDAY: Weekday = Weekday::Mon;

/// Session-scoped prompt state.
///
/// Initialized at session load and torn down at logout; the counter only ever
/// increases within a session. The two timers share a weekly cadence but have
/// different guards, so they are evaluated independently and never merged.
#[derive(Debug, Clone, Default)]
pub struct PromptState {
    pub engagement_count: u32,
    pub share_prompt_shown_once: bool,
    /// ISO (year, week) of the last recurring share prompt.
    pub last_share_week: Option<(i32, u32)>,
    pub last_fresh_start_date: Option<NaiveDate>,
}

/// Which prompts fire at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptDecision {
    pub show_share_prompt: bool,
    pub show_fresh_start_banner: bool,
}

/// Evaluate prompt gating for the given session state at `now`.
pub fn evaluate(state: &PromptState, now: DateTime<Utc>) -> PromptDecision {
    PromptDecision {
        show_share_prompt: share_prompt_due(state, now),
        show_fresh_start_banner: fresh_start_due(state, now),
    }
}

/// One-time at counter >= 2; thereafter at most once per ISO calendar week,
/// only on the configured weekday.
fn share_prompt_due(state: &PromptState, now: DateTime<Utc>) -> bool {
    if !state.share_prompt_shown_once {
        return state.engagement_count >= SHARE_PROMPT_THRESHOLD;
    }

    if now.weekday() != SHARE_PROMPT_WEEKDAY {
        return false;
    }

    let week = iso_week(now);
    state.last_share_week != Some(week)
}

/// At most once per calendar day, only on the configured weekday.
fn fresh_start_due(state: &PromptState, now: DateTime<Utc>) -> bool {
    if now.weekday() != FRESH_START_WEEKDAY {
        return false;
    }
    state.last_fresh_start_date != Some(now.date_naive())
}

/// Current ISO (year, week) pair, the guard unit for the recurring share prompt.
pub fn iso_week(now: DateTime<Utc>) -> (i32, u32) {
    let week = now.iso_week();
    (week.year(), week.week())
}

/// Record that the share prompt was shown at `now`.
pub fn mark_share_shown(state: &mut PromptState, now: DateTime<Utc>) {
    state.share_prompt_shown_once = true;
    state.last_share_week = Some(iso_week(now));
}

/// Record that the fresh-start banner was shown at `now`.
pub fn mark_fresh_start_shown(state: &mut PromptState, now: DateTime<Utc>) {
    state.last_fresh_start_date = Some(now.date_naive());
}
