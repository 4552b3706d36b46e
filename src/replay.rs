//! Scripted grid sessions.
//!
//! A scenario is the data a booking form would hand the grid (rooms, known
//! room-nights, range, the booking being edited) plus the operator's
//! interactions in order. Running it yields the committed payload and a
//! per-step log, which makes grid behavior reproducible outside a UI.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::*;
use crate::session::{GridSession, SessionError, StaticSource};

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub existing: Vec<ExistingRoomNight>,
    pub start: Night,
    pub end: Night,
    #[serde(default)]
    pub current_booking_id: Option<BookingId>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One operator interaction, flat.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    ToggleCell { room_id: RoomId, date: Night },
    ToggleRoomColumn { room_id: RoomId },
    SetMode { mode: SelectionMode },
    OpenPricePrompt,
    SubmitPrice { input: String },
    CancelPending,
    Deselect { cells: Vec<CellAddress> },
    ClearAll,
    UndoLast,
    Confirm,
    Dismiss,
    SetRange { start: Night, end: Night },
    Refresh,
    /// Another booking lands at the source; seen on the next fetch.
    ExternalBooking { nights: Vec<ExistingRoomNight> },
}

impl Step {
    pub fn label(&self) -> &'static str {
        match self {
            Step::ToggleCell { .. } => "toggle_cell",
            Step::ToggleRoomColumn { .. } => "toggle_room_column",
            Step::SetMode { .. } => "set_mode",
            Step::OpenPricePrompt => "open_price_prompt",
            Step::SubmitPrice { .. } => "submit_price",
            Step::CancelPending => "cancel_pending",
            Step::Deselect { .. } => "deselect",
            Step::ClearAll => "clear_all",
            Step::UndoLast => "undo_last",
            Step::Confirm => "confirm",
            Step::Dismiss => "dismiss",
            Step::SetRange { .. } => "set_range",
            Step::Refresh => "refresh",
            Step::ExternalBooking { .. } => "external_booking",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub op: &'static str,
    pub ok: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub committed: Vec<CommittedNight>,
    pub total_price: Price,
    pub uncovered_nights: Vec<Night>,
    pub steps: Vec<StepReport>,
}

pub async fn run(scenario: Scenario) -> Result<ReplayReport, SessionError> {
    let source = Arc::new(StaticSource::new(scenario.existing));
    let session = GridSession::open(
        scenario.rooms,
        source.clone(),
        scenario.start,
        scenario.end,
        scenario.current_booking_id,
    )
    .await?;

    let mut steps = Vec::with_capacity(scenario.steps.len());
    for (i, step) in scenario.steps.into_iter().enumerate() {
        let op = step.label();
        let report = match apply_step(&session, &source, step).await {
            Ok(detail) => {
                debug!(step = i, op, %detail, "step applied");
                StepReport { step: i, op, ok: true, detail }
            }
            Err(e) => {
                warn!(step = i, op, "step rejected: {e}");
                StepReport { step: i, op, ok: false, detail: e.to_string() }
            }
        };
        steps.push(report);
    }

    let (committed, total_price, uncovered_nights) = session
        .apply(|g| (g.committed_selection(), g.total_price(), g.uncovered_nights()))
        .await;
    Ok(ReplayReport {
        committed,
        total_price,
        uncovered_nights,
        steps,
    })
}

async fn apply_step(session: &GridSession, source: &StaticSource, step: Step) -> Result<String, SessionError> {
    let detail = match step {
        Step::ToggleCell { room_id, date } => {
            let outcome = session.apply(|g| g.toggle_cell(room_id, date)).await;
            format!("{outcome:?}")
        }
        Step::ToggleRoomColumn { room_id } => {
            let outcome = session.apply(|g| g.toggle_room_column(room_id)).await;
            format!("{outcome:?}")
        }
        Step::SetMode { mode } => {
            session.apply(|g| g.set_mode(mode)).await;
            format!("{mode:?}")
        }
        Step::OpenPricePrompt => {
            session.apply(|g| g.open_price_prompt()).await?;
            "prompt open".to_string()
        }
        Step::SubmitPrice { input } => {
            let n = session.apply(|g| g.submit_price(&input)).await?;
            format!("committed {n}")
        }
        Step::CancelPending => {
            let cancelled = session.apply(|g| g.cancel_pending()).await;
            format!("cancelled: {cancelled}")
        }
        Step::Deselect { cells } => {
            let staged = session.apply(|g| g.deselect(&cells)).await;
            format!("awaiting confirmation: {staged}")
        }
        Step::ClearAll => {
            let staged = session.apply(|g| g.clear_all()).await;
            format!("awaiting confirmation: {staged}")
        }
        Step::UndoLast => {
            let staged = session.apply(|g| g.undo_last()).await;
            format!("awaiting confirmation: {staged}")
        }
        Step::Confirm => {
            let n = session.apply(|g| g.confirm()).await?;
            format!("removed {n}")
        }
        Step::Dismiss => {
            let dismissed = session.apply(|g| g.dismiss()).await;
            format!("dismissed: {dismissed}")
        }
        Step::SetRange { start, end } => {
            let report = session.change_range(start, end).await?;
            format!("removed {}", report.removed.len())
        }
        Step::Refresh => {
            let report = session.refresh().await?;
            format!(
                "removed {}, stale pending {}",
                report.removed.len(),
                report.stale_pending.len()
            )
        }
        Step::ExternalBooking { nights } => {
            let n = nights.len();
            source.extend(nights).await;
            format!("{n} room-night(s) booked elsewhere")
        }
    };
    Ok(detail)
}
