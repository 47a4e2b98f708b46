//! Contacts index: latest follow/block state per (author, contact) pair.
//!
//! Layout: `contact/<author: 32 bytes><contact: 32 bytes>` → bincode
//! [`ContactRecord`]. A record is only replaced by a declaration from a later
//! root log entry, so replaying the log in order leaves the newest state.

use kith_core::{ContactContent, FeedId, LogEntry, Seq};
use kith_index::{IndexError, IndexServer, IndexTransform, Repo, TransformError};
use kith_store::{KvPatch, KvRead};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::builder::IndexGraphBuilder;

/// Name of the contacts index inside a [`Repo`].
pub const CONTACTS_INDEX: &str = "contacts";

pub(crate) const CONTACT_PREFIX: &[u8] = b"contact/";

/// Relationship one feed declared about another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactState {
    /// Author follows the contact
    Follow,
    /// Author blocks the contact
    Block,
    /// Author withdrew a follow or block
    Neutral,
}

impl ContactState {
    /// State declared by a contact message; `None` if it declares nothing.
    pub fn from_content(content: &ContactContent) -> Option<Self> {
        match (content.following, content.blocking) {
            (_, Some(true)) => Some(Self::Block),
            (Some(true), _) => Some(Self::Follow),
            (None, None) => None,
            _ => Some(Self::Neutral),
        }
    }
}

/// Stored state of one (author, contact) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Latest declared state
    pub state: ContactState,
    /// Root log sequence of the declaration
    pub seq: Seq,
}

impl ContactRecord {
    pub(crate) fn encode(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub(crate) fn decode(raw: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(raw)
    }
}

pub(crate) fn contact_key(author: &FeedId, contact: &FeedId) -> Vec<u8> {
    let mut key = Vec::with_capacity(CONTACT_PREFIX.len() + 2 * FeedId::LEN);
    key.extend_from_slice(CONTACT_PREFIX);
    key.extend_from_slice(author.as_bytes());
    key.extend_from_slice(contact.as_bytes());
    key
}

pub(crate) fn decode_contact_key(raw: &[u8]) -> Option<(FeedId, FeedId)> {
    let rest = raw.strip_prefix(CONTACT_PREFIX)?;
    if rest.len() != 2 * FeedId::LEN {
        return None;
    }
    let (author, contact) = rest.split_at(FeedId::LEN);
    Some((
        FeedId::try_from_slice(author).ok()?,
        FeedId::try_from_slice(contact).ok()?,
    ))
}

/// Folds contact messages into the contacts index.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactsTransform;

impl IndexTransform for ContactsTransform {
    fn apply(&self, prior: &dyn KvRead, entry: &LogEntry) -> Result<KvPatch, TransformError> {
        let mut patch = KvPatch::new();
        let Some(contact) = entry.message.content.as_contact() else {
            return Ok(patch);
        };
        let Some(state) = ContactState::from_content(contact) else {
            return Ok(patch);
        };

        let key = contact_key(&entry.message.author, &contact.contact);
        if let Some(raw) = prior.get(&key)? {
            let existing =
                ContactRecord::decode(&raw).map_err(|e| TransformError::Decode(e.to_string()))?;
            if existing.seq >= entry.seq {
                return Ok(patch);
            }
        }

        let record = ContactRecord {
            state,
            seq: entry.seq,
        };
        let value = record
            .encode()
            .map_err(|e| TransformError::Encode(e.to_string()))?;
        patch.put(key, value);
        Ok(patch)
    }
}

/// Open the contacts index of `repo`.
///
/// Returns a graph builder reading the index and the serve task that keeps
/// it current.
pub fn open_contacts_index(
    repo: &Repo,
) -> Result<(IndexGraphBuilder<kith_index::IndexHandle>, IndexServer), IndexError> {
    let (handle, server) = repo.open_index(CONTACTS_INDEX, Arc::new(ContactsTransform))?;
    Ok((IndexGraphBuilder::new(handle), server))
}
