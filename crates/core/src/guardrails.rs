//! Ticket-creation guardrails.
//!
//! A pure rule chain evaluated before a parent may open a new ticket. Rules
//! run in a fixed priority order and stop at the first failure, so the
//! parent always sees the single most relevant obstacle. The caller gathers
//! a [`CreationHistory`] snapshot from the store and passes the current time
//! explicitly; nothing here reads the clock or the database.

use crate::roles::Role;
use crate::ticket::TicketCategory;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Thresholds for the guardrail rule chain.
#[derive(Debug, Clone)]
pub struct GuardrailConfig {
    /// Maximum open (pending/in-progress) tickets per parent per school.
    pub max_open_tickets: i64,
    /// Minimum minutes between two ticket creations by the same parent.
    pub cooldown_minutes: i64,
    /// Maximum tickets created in the trailing 7 days, any status.
    pub max_tickets_per_week: i64,
    /// Maximum open tickets in the catch-all "Other" category.
    pub max_open_other: i64,
    /// Maximum urgent tickets in the trailing 7 days.
    pub max_urgent_per_week: i64,
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            max_open_tickets: 3,
            cooldown_minutes: 30,
            max_tickets_per_week: 5,
            max_open_other: 1,
            max_urgent_per_week: 1,
        }
    }
}

/// Categories for which the urgency flag is accepted at all.
pub const URGENT_ALLOWED_CATEGORIES: &[TicketCategory] =
    &[TicketCategory::Transport, TicketCategory::HealthSafety];

// ---------------------------------------------------------------------------
// History snapshot
// ---------------------------------------------------------------------------

/// Per-parent creation history, assembled by the caller from store queries.
///
/// Scoping matters and is uneven on purpose, matching the reference
/// behavior: `open_count` and `open_other_count` are scoped to the parent's
/// school, while `last_created_at`, `week_count`, and `urgent_week_count`
/// span all of the parent's tickets regardless of school.
#[derive(Debug, Clone, Default)]
pub struct CreationHistory {
    /// Administrative block window, if any.
    pub blocked_until: Option<Timestamp>,
    /// Open (pending/in-progress) tickets in this school, soft-deleted excluded.
    pub open_count: i64,
    /// Most recent ticket creation time across all schools and statuses.
    pub last_created_at: Option<Timestamp>,
    /// Tickets created in the trailing 7 days, any status.
    pub week_count: i64,
    /// Open "Other"-category tickets in this school.
    pub open_other_count: i64,
    /// Urgent tickets created in the trailing 7 days.
    pub urgent_week_count: i64,
}

// ---------------------------------------------------------------------------
// Denials
// ---------------------------------------------------------------------------

/// The single rule that blocked a creation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardrailDenial {
    Blocked,
    OpenCap,
    Cooldown,
    WeeklyCap,
    OpenOtherCap,
    UrgencyCategory,
    UrgentWeeklyCap,
}

impl GuardrailDenial {
    /// The exact user-facing message for this denial.
    pub fn message(&self) -> &'static str {
        match self {
            GuardrailDenial::Blocked => {
                "Ticket creation is temporarily unavailable. Please contact the school office."
            }
            GuardrailDenial::OpenCap => {
                "You already have the maximum number of open tickets. Please wait for existing \
                 tickets to be resolved before creating a new one."
            }
            GuardrailDenial::Cooldown => {
                "Please wait a few minutes between creating tickets. You can try again shortly."
            }
            GuardrailDenial::WeeklyCap => {
                "You have reached the limit of tickets per week. Please wait until next week or \
                 contact the school office."
            }
            GuardrailDenial::OpenOtherCap => {
                "You already have an open ticket in the \"Other\" category. Please wait for it \
                 to be resolved before creating another."
            }
            GuardrailDenial::UrgencyCategory => {
                "Urgent tickets are only allowed for Transport and Health & Safety."
            }
            GuardrailDenial::UrgentWeeklyCap => "You may only have one urgent ticket per week.",
        }
    }
}

impl std::fmt::Display for GuardrailDenial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Decide whether a new ticket may be created.
///
/// Non-parent roles pass trivially (no other role creates tickets in this
/// flow). Rules are checked in priority order; the administrative block
/// overrides everything else. Caps use a closed lower bound (`>=`), the
/// cooldown uses a strict window comparison (`<`).
pub fn evaluate(
    role: Role,
    category: TicketCategory,
    urgency: bool,
    history: &CreationHistory,
    config: &GuardrailConfig,
    now: Timestamp,
) -> Result<(), GuardrailDenial> {
    if role != Role::Parent {
        return Ok(());
    }

    // 1. Administrative block.
    if let Some(until) = history.blocked_until {
        if until > now {
            return Err(GuardrailDenial::Blocked);
        }
    }

    // 2. Open-ticket cap.
    if history.open_count >= config.max_open_tickets {
        return Err(GuardrailDenial::OpenCap);
    }

    // 3. Cooldown since the most recent creation.
    if let Some(last) = history.last_created_at {
        if (now - last) < chrono::Duration::minutes(config.cooldown_minutes) {
            return Err(GuardrailDenial::Cooldown);
        }
    }

    // 4. Weekly cap.
    if history.week_count >= config.max_tickets_per_week {
        return Err(GuardrailDenial::WeeklyCap);
    }

    // 5. One open "Other" ticket at a time.
    if category == TicketCategory::Other && history.open_other_count >= config.max_open_other {
        return Err(GuardrailDenial::OpenOtherCap);
    }

    // 6. Urgency eligibility.
    if urgency {
        if !URGENT_ALLOWED_CATEGORIES.contains(&category) {
            return Err(GuardrailDenial::UrgencyCategory);
        }
        if history.urgent_week_count >= config.max_urgent_per_week {
            return Err(GuardrailDenial::UrgentWeeklyCap);
        }
    }

    Ok(())
}
