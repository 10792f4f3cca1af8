//! Title system.
//!
//! Permanent titles mark lifetime engagement milestones. Conditional titles
//! follow an unbroken streak and are deleted as soon as it breaks.

pub mod data;
pub mod logic;
pub mod types;

pub use data::{title_def, ALL_TITLES};
pub use logic::{apply_engagement, earned_titles, TitleChanges};
pub use types::{OwnedTitle, TitleBook, TitleDef, TitleId, TitleRule};
