pub mod document;
pub mod fields;

pub use document::{Document, EntryId};
pub use fields::{EntryField, ListKind, PersonalField};
