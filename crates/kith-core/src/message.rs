//! Feed messages
//!
//! Only the content types the node indexes are modelled; anything else decodes
//! as [`Content::Unknown`] and passes through the indexes untouched.

use crate::identifiers::FeedId;
use serde::{Deserialize, Serialize};

/// A message published by one feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Feed that signed the message
    pub author: FeedId,
    /// Position of the message in its author's feed (starts at 1)
    pub sequence: u64,
    /// Message payload
    pub content: Content,
}

impl Message {
    /// Create a message.
    pub fn new(author: FeedId, sequence: u64, content: Content) -> Self {
        Self {
            author,
            sequence,
            content,
        }
    }
}

/// Message payload, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    /// Follow/block declaration about another feed
    Contact(ContactContent),
    /// Free text post
    Post {
        /// Post body
        text: String,
    },
    /// Profile information about a feed
    About {
        /// Feed being described
        about: FeedId,
        /// Display name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// Any content type the node does not interpret
    #[serde(other)]
    Unknown,
}

impl Content {
    /// Declare a follow.
    pub fn follow(contact: FeedId) -> Self {
        Self::Contact(ContactContent {
            contact,
            following: Some(true),
            blocking: None,
        })
    }

    /// Withdraw a follow.
    pub fn unfollow(contact: FeedId) -> Self {
        Self::Contact(ContactContent {
            contact,
            following: Some(false),
            blocking: None,
        })
    }

    /// Declare a block.
    pub fn block(contact: FeedId) -> Self {
        Self::Contact(ContactContent {
            contact,
            following: None,
            blocking: Some(true),
        })
    }

    /// Withdraw a block.
    pub fn unblock(contact: FeedId) -> Self {
        Self::Contact(ContactContent {
            contact,
            following: None,
            blocking: Some(false),
        })
    }

    /// Contact payload, if this is a contact message.
    pub fn as_contact(&self) -> Option<&ContactContent> {
        match self {
            Self::Contact(contact) => Some(contact),
            _ => None,
        }
    }
}

/// Body of a `contact` message.
///
/// Either flag may be absent; a message carrying neither says nothing about
/// the relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactContent {
    /// Feed the declaration is about
    pub contact: FeedId,
    /// Follow state, if declared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following: Option<bool>,
    /// Block state, if declared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocking: Option<bool>,
}
