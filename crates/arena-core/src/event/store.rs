use chrono::Utc;
use dashmap::DashMap;
use std::collections::HashMap;
use uuid::Uuid;

use super::{SequenceEvent, SequenceEventKind};

/// Almacenamiento de eventos append-only.
pub trait EventStore {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&mut self, run_id: Uuid, kind: SequenceEventKind) -> SequenceEvent;
    /// Lista eventos de una corrida (orden ascendente por seq).
    fn list(&self, run_id: Uuid) -> Vec<SequenceEvent>;
}

#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    pub inner: HashMap<Uuid, Vec<SequenceEvent>>,
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, run_id: Uuid, kind: SequenceEventKind) -> SequenceEvent {
        let vec = self.inner.entry(run_id).or_default();
        let ev = SequenceEvent { seq: vec.len() as u64,
                                 run_id,
                                 kind,
                                 ts: Utc::now() };
        vec.push(ev.clone());
        ev
    }

    fn list(&self, run_id: Uuid) -> Vec<SequenceEvent> {
        self.inner.get(&run_id).cloned().unwrap_or_default()
    }
}

/// Variante concurrente: corridas paralelas escriben en shards distintos
/// sin lock global. Cada `run_id` es escrito por un único hilo.
#[derive(Debug, Default)]
pub struct SharedEventStore {
    inner: DashMap<Uuid, Vec<SequenceEvent>>,
}

impl SharedEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, run_id: Uuid, kind: SequenceEventKind) -> SequenceEvent {
        let mut vec = self.inner.entry(run_id).or_default();
        let ev = SequenceEvent { seq: vec.len() as u64,
                                 run_id,
                                 kind,
                                 ts: Utc::now() };
        vec.push(ev.clone());
        ev
    }

    pub fn events(&self, run_id: Uuid) -> Vec<SequenceEvent> {
        self.inner.get(&run_id).map(|v| v.clone()).unwrap_or_default()
    }

    pub fn run_ids(&self) -> Vec<Uuid> {
        self.inner.iter().map(|e| *e.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl EventStore for SharedEventStore {
    fn append_kind(&mut self, run_id: Uuid, kind: SequenceEventKind) -> SequenceEvent {
        self.append(run_id, kind)
    }

    fn list(&self, run_id: Uuid) -> Vec<SequenceEvent> {
        self.events(run_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_assigned_per_run() {
        let mut store = InMemoryEventStore::default();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        store.append_kind(a, SequenceEventKind::StatementStarted { index: 0, operation: "create".into() });
        store.append_kind(b, SequenceEventKind::StatementStarted { index: 0, operation: "create".into() });
        let ev = store.append_kind(a, SequenceEventKind::StatementFailed { index: 0, error: "boom".into() });
        assert_eq!(ev.seq, 1);
        assert_eq!(store.list(a).len(), 2);
        assert_eq!(store.list(b)[0].seq, 0);
        assert!(store.list(Uuid::new_v4()).is_empty());
    }

    #[test]
    fn shared_store_matches_trait_view() {
        let store = SharedEventStore::new();
        let run = Uuid::new_v4();
        store.append(run, SequenceEventKind::SequenceCompleted { executed: 0, total_elapsed_ns: 0 });
        assert_eq!(store.events(run).len(), 1);
        assert_eq!(store.run_ids(), vec![run]);
        assert_eq!(EventStore::list(&store, run)[0].kind.code(), "C");
    }
}
