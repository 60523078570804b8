use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::scaled_score::{
    defaults_for, recompute_question_counts, scaled_score_router, Configuration, MappingEntry,
    Profile, ScaledScoreService, SectionCatalog, SessionHandle, SessionId, SessionStore,
};

pub(super) fn catalog() -> Arc<SectionCatalog> {
    Arc::new(SectionCatalog::standard())
}

fn assign(config: &mut Configuration, unit: usize, section_ids: &[u32]) {
    let catalog = SectionCatalog::standard();
    config.units[unit].sections = section_ids
        .iter()
        .map(|id| catalog.get(*id).cloned().expect("catalog section"))
        .collect();
}

pub(super) fn ascending_mapping(rows: u32) -> Vec<MappingEntry> {
    (0..rows)
        .map(|raw| MappingEntry {
            score: f64::from(raw),
            value: 1.0 + f64::from(raw * 35 / rows.max(1)),
        })
        .collect()
}

/// Two units, 800/200, 54 and 44 questions from two sections each, no mapping.
pub(super) fn sat_configuration() -> Configuration {
    let mut config = defaults_for(Profile::Sat);
    config.assessment_name = "SAT practice".to_string();
    assign(&mut config, 0, &[1, 2]);
    assign(&mut config, 1, &[3, 4]);
    recompute_question_counts(&mut config.units);
    config
}

/// Four units with one section each and a mapping row per question.
pub(super) fn act_configuration() -> Configuration {
    let mut config = defaults_for(Profile::Act);
    config.assessment_name = "ACT practice".to_string();
    for (unit, section_id) in [5, 6, 7, 8].into_iter().enumerate() {
        assign(&mut config, unit, &[section_id]);
    }
    recompute_question_counts(&mut config.units);
    for unit in &mut config.units {
        unit.mapping = Some(ascending_mapping(unit.no_of_questions));
    }
    config
}

#[derive(Default, Clone)]
pub(super) struct MemorySessionStore {
    pub(super) sessions: Arc<Mutex<HashMap<SessionId, SessionHandle>>>,
}

impl MemorySessionStore {
    pub(super) fn len(&self) -> usize {
        self.sessions.lock().expect("session mutex poisoned").len()
    }
}

impl SessionStore for MemorySessionStore {
    fn insert(&self, id: SessionId, handle: SessionHandle) {
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .insert(id, handle);
    }

    fn fetch(&self, id: &SessionId) -> Option<SessionHandle> {
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .get(id)
            .cloned()
    }

    fn remove(&self, id: &SessionId) -> Option<SessionHandle> {
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .remove(id)
    }
}

pub(super) fn build_service() -> (
    ScaledScoreService<MemorySessionStore>,
    Arc<MemorySessionStore>,
) {
    let store = Arc::new(MemorySessionStore::default());
    let service = ScaledScoreService::new(catalog(), store.clone());
    (service, store)
}

pub(super) fn router() -> axum::Router {
    let (service, _) = build_service();
    scaled_score_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
