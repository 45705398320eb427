//! Log export builder.
//!
//! Assembles the downloadable `{ exported, summary, entries }` document from
//! the current summary and the capped log view.

use std::sync::Arc;

use heroledger_domain::WorldId;
use heroledger_shared::ExportDocument;

use crate::infrastructure::ports::{ClockPort, RepoError};
use crate::use_cases::log::LogOps;

/// Builds export documents for the log viewer's download action.
pub struct LogExporter {
    log_ops: Arc<LogOps>,
    clock: Arc<dyn ClockPort>,
}

impl LogExporter {
    pub fn new(log_ops: Arc<LogOps>, clock: Arc<dyn ClockPort>) -> Self {
        Self { log_ops, clock }
    }

    pub async fn export(&self, world_id: WorldId) -> Result<ExportDocument, RepoError> {
        let summary = self.log_ops.get_summary(world_id).await?;
        let entries = self.log_ops.get_log(world_id).await?;
        Ok(ExportDocument::new(self.clock.now(), summary, entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::EventLogRepo;
    use crate::stores::LedgerStore;
    use crate::test_support::{FixedClock, InMemoryEventLog};
    use chrono::Utc;
    use heroledger_domain::{
        ActorId, ActorReserve, EntryId, PointEvent, SpendAction, UserId,
    };

    #[tokio::test]
    async fn test_export_contains_all_entries_and_summary() {
        let ledger = Arc::new(LedgerStore::new());
        let log = Arc::new(InMemoryEventLog::new());
        let world_id = WorldId::new();

        let mut actor_ids = Vec::new();
        for name in ["Ash", "Brin"] {
            let reserve =
                ActorReserve::player_character(ActorId::new(), world_id, name, 1, Utc::now());
            actor_ids.push(reserve.actor_id);
            ledger.register(reserve).expect("register");
        }
        for (seq, actor_id) in [(1, actor_ids[0]), (2, actor_ids[0]), (1, actor_ids[1])] {
            log.append(&PointEvent {
                id: EntryId::new(),
                seq,
                timestamp: Utc::now(),
                world_id,
                actor_id,
                actor_name: "x".into(),
                points_spent: -1,
                points_remaining: 4,
                action: SpendAction::AddD6,
                user_id: UserId::new(),
                user_name: "player".into(),
            })
            .await
            .expect("append");
        }

        let log_ops = Arc::new(LogOps::new(ledger, log));
        let exporter = LogExporter::new(log_ops, Arc::new(FixedClock::default_instant()));
        let doc = exporter.export(world_id).await.expect("export");

        assert_eq!(doc.entries.len(), 3);
        assert_eq!(doc.total_entries, 3);
        assert_eq!(doc.summary.len(), 2);

        let json = serde_json::to_value(&doc).expect("json");
        assert!(json["exported"]
            .as_str()
            .expect("exported string")
            .parse::<chrono::DateTime<chrono::Utc>>()
            .is_ok());
    }
}
