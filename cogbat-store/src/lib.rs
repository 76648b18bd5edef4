//! Where finished sessions go: the local session log, the participant id
//! and the remote aggregate.

pub mod error;
pub mod kv;
pub mod log;
pub mod participant;
pub mod submit;

pub use error::{Result, StoreError};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use log::{HISTORY_KEY, SessionLog, SessionOverview, format_timestamp};
pub use participant::{PARTICIPANT_KEY, PLACEHOLDER_PARTICIPANT, participant_id};
pub use submit::{
    AggregateClient, AggregateStats, ClientMeta, NoopSubmitter, SubmissionPayload, Submitter,
    TaskScore,
};
