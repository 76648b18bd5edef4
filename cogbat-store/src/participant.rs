use cogbat_stimuli::{RandomSource, uuid_v4};

use crate::kv::KeyValueStore;

pub const PARTICIPANT_KEY: &str = "participant_id";

/// Used when nothing can be persisted.
pub const PLACEHOLDER_PARTICIPANT: &str = "00000000-0000-0000-0000-000000000000";

/// The per-device participant id, generated and cached on first use.
///
/// Without a store the placeholder id is returned. A store that cannot be
/// written still yields a fresh id for this run.
pub fn participant_id<S, R>(store: Option<&mut S>, rng: &mut R) -> String
where
    S: KeyValueStore + ?Sized,
    R: RandomSource + ?Sized,
{
    let Some(store) = store else {
        return PLACEHOLDER_PARTICIPANT.to_string();
    };
    match store.get(PARTICIPANT_KEY) {
        Ok(Some(id)) if !id.trim().is_empty() => return id.trim().to_string(),
        Ok(_) => {}
        Err(err) => tracing::warn!(%err, "participant id unreadable"),
    }
    let id = uuid_v4(rng);
    if let Err(err) = store.set(PARTICIPANT_KEY, &id) {
        tracing::warn!(%err, "participant id not persisted");
    }
    tracing::info!(%id, "new participant id");
    id
}
