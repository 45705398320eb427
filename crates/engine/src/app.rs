//! Application state and composition.

use std::sync::Arc;

use dashmap::DashSet;

use heroledger_domain::WorldId;

use crate::infrastructure::export::LogExporter;
use crate::infrastructure::ports::{ClockPort, EventLogRepo, SettingsRepo};
use crate::stores::{LedgerStore, ReservationStore};
use crate::use_cases::{
    GmAdjust, InitializeActor, LevelUp, LogOps, NpcOps, SessionAward, SettingsOps, SpendPoints,
};

/// Container for runtime stores.
pub struct Stores {
    pub ledger: Arc<LedgerStore>,
    pub reservations: Arc<ReservationStore>,
}

/// Container for all use cases.
pub struct UseCases {
    pub adjust: GmAdjust,
    pub spend: SpendPoints,
    pub initialize: InitializeActor,
    pub level_up: LevelUp,
    pub session: SessionAward,
    pub npc: NpcOps,
    pub log: Arc<LogOps>,
    pub settings: SettingsOps,
    pub export: LogExporter,
}

/// Main application state.
///
/// Holds stores and use cases; passed to HTTP/WebSocket handlers via Axum
/// state.
pub struct App {
    pub stores: Stores,
    pub use_cases: UseCases,
    /// Worlds whose auto session award already ran this process lifetime.
    session_awarded: DashSet<WorldId>,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        event_log: Arc<dyn EventLogRepo>,
        settings_repo: Arc<dyn SettingsRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let ledger = Arc::new(LedgerStore::new());
        let reservations = Arc::new(ReservationStore::new());
        let log_ops = Arc::new(LogOps::new(ledger.clone(), event_log.clone()));

        let use_cases = UseCases {
            adjust: GmAdjust::new(ledger.clone(), event_log.clone(), clock.clone()),
            spend: SpendPoints::new(
                ledger.clone(),
                reservations.clone(),
                event_log.clone(),
                clock.clone(),
            ),
            initialize: InitializeActor::new(ledger.clone(), event_log.clone(), clock.clone()),
            level_up: LevelUp::new(ledger.clone(), event_log.clone(), clock.clone()),
            session: SessionAward::new(ledger.clone(), event_log.clone(), clock.clone()),
            npc: NpcOps::new(ledger.clone(), event_log.clone(), clock.clone()),
            log: log_ops.clone(),
            settings: SettingsOps::new(settings_repo),
            export: LogExporter::new(log_ops, clock),
        };

        Self {
            stores: Stores {
                ledger,
                reservations,
            },
            use_cases,
            session_awarded: DashSet::new(),
        }
    }

    /// Mark a world's auto session award as done; true on the first call.
    pub fn mark_session_awarded(&self, world_id: WorldId) -> bool {
        self.session_awarded.insert(world_id)
    }
}
