//! Conventional-comment prefix toolbar: label registry, prefix codec,
//! per-input state machine, preference storage, and the host-page glue that
//! discovers comment inputs and keeps toolbars attached to them.

pub mod codec;
pub mod host;
pub mod labels;
pub mod prefs;
pub mod rescan;
pub mod schema;
pub mod toolbar;
