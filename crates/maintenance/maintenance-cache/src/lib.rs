//! In-memory maintenance scheduler: a synced cache of maintenance windows,
//! a calendar evaluator that turns their recurrence rules into concrete
//! time intervals, and the host/event matchers that decide what is
//! currently suppressed.

pub mod cache;
pub mod calendar;
pub mod matcher;
pub mod sync;
pub mod tags;
pub mod timer;

pub use cache::ConfigCache;
pub use sync::ChangeRow;
