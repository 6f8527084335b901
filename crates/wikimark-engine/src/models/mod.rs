pub mod backlinks;
pub mod page;

pub use backlinks::BacklinkIndex;
pub use page::{PAGE_EXTENSION, Page, PageError};
