//! Photo persistence
//!
//! - `gallery` - Date-partitioned local gallery with JSON sidecars, trash and quota
//! - `albums` - Album index stored next to the gallery

pub mod albums;
pub mod gallery;

pub use albums::Album;
pub use gallery::{AlbumContents, FileGallery, PhotoRecord, PhotoUpdate, StorageUsage};
