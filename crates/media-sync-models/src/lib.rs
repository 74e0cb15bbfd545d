pub mod item;
pub mod list;
pub mod media;
pub mod media_ids;

pub use item::{Item, ItemError};
pub use list::{mirror_list_slug, HistoryEntry, MirrorList, SourceList};
pub use media::MediaType;
pub use media_ids::MediaIds;
