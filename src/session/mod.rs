//! Chat sessions and their write-through store
//!
//! - `types`: `Session`, `Message`, title/preview derivation, id issuing
//! - `store`: `SessionStore`, the per-identity ordered session list

pub mod store;
pub mod types;

pub use store::SessionStore;
pub use types::{
    derive_title, time_of_day, IdClock, Message, Sender, Session, DEFAULT_TITLE, ELLIPSIS,
    EMPTY_PREVIEW, PREVIEW_MAX_CHARS, TITLE_MAX_CHARS,
};
