//! Participant directory and typing aggregation.
//!
//! Participants are kept in join order. The local participant is an
//! ordinary member whose id is only known once the transport sends
//! `SelfIdentified`; that id is set once and never changes afterwards.

use serde::Serialize;
use tracing::{debug, info, warn};

use parley_shared::constants::{TYPING_PLURAL_SUFFIX, TYPING_SINGLE_SUFFIX};
use parley_shared::protocol::ParticipantInfo;
use parley_shared::types::ParticipantId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: String,
    pub color_tag: String,
    pub is_typing: bool,
}

impl Participant {
    pub fn new(id: ParticipantId, display_name: impl Into<String>) -> Self {
        let color_tag = color_tag_for(&id);
        Self {
            id,
            display_name: display_name.into(),
            color_tag,
            is_typing: false,
        }
    }
}

impl From<&ParticipantInfo> for Participant {
    fn from(info: &ParticipantInfo) -> Self {
        Self::new(info.id.clone(), info.display_name.clone())
    }
}

/// Stable `#rrggbb` color for a participant, derived from a BLAKE3 hash of
/// the id. Each channel stays in the upper half of its range.
pub fn color_tag_for(id: &ParticipantId) -> String {
    let hash = blake3::hash(id.as_str().as_bytes());
    let rgb: Vec<u8> = hash.as_bytes()[..3].iter().map(|b| 0x80 | (b >> 1)).collect();
    format!("#{}", hex::encode(rgb))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantDirectory {
    participants: Vec<Participant>,
    self_id: Option<ParticipantId>,
}

impl ParticipantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the local participant. Only the first call has an effect.
    pub fn identify_self(&mut self, info: &ParticipantInfo) -> bool {
        if let Some(current) = &self.self_id {
            if *current != info.id {
                warn!(
                    current = %current,
                    offered = %info.id,
                    "Local identity already assigned, ignoring new id"
                );
            }
            return false;
        }

        self.self_id = Some(info.id.clone());
        if !self.contains(&info.id) {
            self.participants.push(Participant::from(info));
        }
        info!(participant = %info.id, "Local participant identified");
        true
    }

    /// Insert a participant. Already-known ids are left untouched.
    pub fn join(&mut self, info: &ParticipantInfo) -> bool {
        if self.contains(&info.id) {
            debug!(participant = %info.id, "Participant already present");
            return false;
        }
        self.participants.push(Participant::from(info));
        debug!(participant = %info.id, name = %info.display_name, "Participant joined");
        true
    }

    pub fn leave(&mut self, id: &ParticipantId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.participants.remove(index);
                debug!(participant = %id, "Participant left");
                true
            }
            None => false,
        }
    }

    /// Set the typing flag. Returns `true` if the flag changed.
    pub fn set_typing(&mut self, id: &ParticipantId, typing: bool) -> bool {
        match self.participants.iter_mut().find(|p| p.id == *id) {
            Some(participant) if participant.is_typing != typing => {
                participant.is_typing = typing;
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == *id)
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.position(id).is_some()
    }

    pub fn self_id(&self) -> Option<&ParticipantId> {
        self.self_id.as_ref()
    }

    pub fn self_participant(&self) -> Option<&Participant> {
        self.self_id.as_ref().and_then(|id| self.get(id))
    }

    pub fn is_self(&self, id: &ParticipantId) -> bool {
        self.self_id.as_ref() == Some(id)
    }

    /// Participants in join order.
    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Human-readable summary of who else is typing, in join order. The
    /// local participant is never listed.
    pub fn typing_summary(&self) -> String {
        let names: Vec<&str> = self
            .participants
            .iter()
            .filter(|p| p.is_typing && !self.is_self(&p.id))
            .map(|p| p.display_name.as_str())
            .collect();

        match names.as_slice() {
            [] => String::new(),
            [a] => format!("{a} {TYPING_SINGLE_SUFFIX}"),
            [a, b] => format!("{a} and {b} {TYPING_PLURAL_SUFFIX}"),
            [a, b, c] => format!("{a}, {b} and {c} {TYPING_PLURAL_SUFFIX}"),
            [a, ..] => format!("{a} and others {TYPING_PLURAL_SUFFIX}"),
        }
    }

    /// Participants other than the local one whose name contains `term`,
    /// ignoring case. An empty term matches everyone.
    pub fn mention_candidates(&self, term: &str) -> Vec<&Participant> {
        let term = term.to_lowercase();
        self.participants
            .iter()
            .filter(|p| !self.is_self(&p.id))
            .filter(|p| term.is_empty() || p.display_name.to_lowercase().contains(&term))
            .collect()
    }

    fn position(&self, id: &ParticipantId) -> Option<usize> {
        self.participants.iter().position(|p| p.id == *id)
    }
}
