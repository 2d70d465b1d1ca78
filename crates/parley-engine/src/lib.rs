//! # parley-engine
//!
//! Client-side state engine for a meeting chat session.
//!
//! The engine owns the participant directory, the message timeline and the
//! attachment upload tracker. It is driven from two directions: local
//! commands ([`ChatState::append_local`], [`ChatState::abort_upload`], ...)
//! and transport events ([`ChatState::apply`]). Both are synchronous and run
//! to completion one at a time; the async plumbing lives in `parley-client`.

pub mod attachments;
pub mod compose;
pub mod mention;
pub mod participants;
pub mod reducer;
pub mod snapshot;
pub mod state;
pub mod timeline;

mod error;

pub use attachments::{Attachment, AttachmentState, AttachmentTracker};
pub use compose::{typing_transition, Draft, DraftBuilder, DraftFile};
pub use error::{EngineError, Result};
pub use mention::MentionMarkers;
pub use participants::{Participant, ParticipantDirectory};
pub use reducer::{apply, Outcome};
pub use snapshot::{ChatSnapshot, MessageActions, MessageView, ReplyPreview};
pub use state::ChatState;
pub use timeline::{Message, MessageOrigin, MessageTimeline};
