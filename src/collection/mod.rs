//! Ordered collections mirrored in a table through a `display_order` column.
//!
//! The manager keeps an in-memory copy of the collection, applies reorders
//! optimistically and writes the changed positions back to the table. Any
//! write failure is answered by reloading from the table, which is always
//! the source of truth.

pub mod drag;
mod item;
mod manager;
pub mod permutation;

pub use self::drag::{DragSession, DragState, DragThresholds, DropIntent, Point, PointerKind};
pub use self::item::{ItemId, OrderedItem, Payload};
pub use self::manager::{Attachments, CollectionError, CollectionManager, SharedCollection};
pub use self::permutation::{Direction, Move};
