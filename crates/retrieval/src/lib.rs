//! Retrieval of similar historical vulnerabilities
//!
//! An exact angular index over embedded exemplar code, paired position by
//! position with an exemplar corpus. The [`RetrievalEngine`] embeds a query,
//! finds its nearest exemplars and renders the closest one into few-shot
//! example text.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod corpus;
mod engine;
pub mod error;
mod index;
mod indexing;

pub use corpus::{ExemplarCorpus, ExemplarRecord};
pub use engine::{AuditSettings, QueryRequest, RetrievalEngine, RetrievalHit};
pub use error::{Result, RetrievalError};
pub use index::{angular_distance, normalize, AngularIndex};
pub use indexing::build_index_from_corpus;
