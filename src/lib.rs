//! A lock-striped hash map with automatic growth.
//!
//! A hash table that supports full concurrency of retrievals on distinct
//! buckets and per-bucket exclusion for updates. Every bucket carries its
//! own reader-writer lock; a table-wide reader-writer lock coordinates
//! normal operations (shared) with capacity doubling (exclusive), so an
//! operation can never index into a bucket array that a resize has swapped
//! out from under it. This type is functionally very similar to
//! `std::collections::HashMap`, and for the most part has a similar API,
//! except that all operations take `&self` and are safe to call from any
//! number of threads.

mod bucket;
mod map;

pub type DefaultHashBuilder = ahash::RandomState;

pub use crate::map::HashMap;
