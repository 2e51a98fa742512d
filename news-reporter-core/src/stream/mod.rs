//! Reduction of a streamed web-search response into a `SearchResult`.
//!
//! Contract:
//! - `frame` turns raw lines into `EventRecord`s. Only `data: ` lines count, and the
//!   sequence ends right after the `[DONE]` sentinel.
//! - `classifier` maps each payload to a closed `ClassifiedEvent`. Bad payloads are
//!   `Ignored`, never errors.
//! - `reducer` folds the classified events into one `SearchResult`. Only a read
//!   failure of the underlying stream aborts it.

pub mod classifier;
pub mod frame;
pub mod reducer;

pub use classifier::{classify, extract_citation, ClassifiedEvent, CITATION_SNIPPET_PLACEHOLDER};
pub use frame::{parse_frame_line, EventFrames, EventRecord, DONE_SENTINEL};
pub use reducer::{reduce, StreamReducer};
