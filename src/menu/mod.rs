pub mod id;
pub mod item;
pub mod registry;

pub use id::{IdAllocator, MenuItemId};
pub use item::{MenuItem, MenuItemState};
pub use registry::Registry;
