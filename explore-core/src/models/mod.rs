pub mod descriptor;
pub mod media;
pub mod pagination;

pub use descriptor::DiscoverMediaSource;
pub use media::{value_to_string, MediaInfo, MediaType};
pub use pagination::PageParams;
