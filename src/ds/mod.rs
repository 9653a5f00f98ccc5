pub mod intrusive_list;
pub mod slot_arena;

pub use intrusive_list::{IntrusiveList, ListId, NodeHandle};
pub use slot_arena::{SlotArena, SlotId};
