//! Affective multi-stream retrieval.
//!
//! Historical records are matched against the current turn along seven
//! independent streams (sequence, salience, sensory, pattern, state, recency,
//! reflection). The state stream is the distinguishing one: it compares each
//! record's captured internal-state trace with the *current simulated state*
//! by cosine similarity, so retrieval surfaces what a past moment felt like
//! rather than what it said.
//!
//! [`GapProcessor`] composes the whole turn: kinetics step, autonomic
//! integration, then retrieval, in that strict order (the state stream needs
//! the fresh snapshot).

pub mod engine;
pub mod gap;
pub mod pool;
pub mod record;
pub mod streams;

pub use engine::{RankedMatch, RecallQuery, RetrievalEngine};
pub use gap::{GapOutput, GapProcessor};
pub use pool::{InMemoryPool, RecordPool};
pub use record::{HistoricalRecord, SensoryTexture};
pub use streams::StreamKind;
