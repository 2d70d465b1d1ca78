//! Command handlers invoked by the rendering surface.
//!
//! Each handler locks the shared state only for the synchronous engine call,
//! then talks to the transport over the command channel.

pub mod files;
pub mod messaging;
