//! Message / form / interaction types exchanged with the chat transport.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ids::{ChannelId, MessageId, UserId};

/// Handle to a message that was posted somewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub channel: ChannelId,
    pub message: MessageId,
}

impl MessageRef {
    pub fn new(channel: ChannelId, message: MessageId) -> Self {
        Self { channel, message }
    }
}

/// Button colour. Ordering of the catalog menu depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
    Danger,
    Link,
}

/// A clickable button attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub label: String,
    pub style: ButtonStyle,
    pub custom_id: String,
}

impl Action {
    pub fn new(label: impl Into<String>, style: ButtonStyle, custom_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            style,
            custom_id: custom_id.into(),
        }
    }
}

/// Message to be posted, optionally with buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub actions: Vec<Action>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            actions: Vec::new(),
        }
    }

    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }
}

/// One input of a form (modal).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub id: &'static str,
    pub label: &'static str,
    pub paragraph: bool,
    pub required: bool,
    pub max_length: Option<u16>,
}

impl FormField {
    pub const fn short(id: &'static str, label: &'static str) -> Self {
        Self {
            id,
            label,
            paragraph: false,
            required: true,
            max_length: None,
        }
    }

    pub const fn paragraph(id: &'static str, label: &'static str) -> Self {
        Self {
            id,
            label,
            paragraph: true,
            required: true,
            max_length: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn max_length(mut self, len: u16) -> Self {
        self.max_length = Some(len);
        self
    }
}

/// A form the caller should show. `custom_id` carries the continuation token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRequest {
    pub custom_id: String,
    pub title: String,
    pub fields: Vec<FormField>,
}

/// Values coming back from a submitted form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSubmission {
    pub custom_id: String,
    pub values: HashMap<String, String>,
}

impl FormSubmission {
    pub fn new(custom_id: impl Into<String>) -> Self {
        Self {
            custom_id: custom_id.into(),
            values: HashMap::new(),
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    /// Trimmed value of a field; empty input counts as absent.
    pub fn value(&self, field: &str) -> Option<&str> {
        self.values
            .get(field)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// The user behind an interaction.
///
/// `display_name` is the guild nickname when set, otherwise the username;
/// resolving that is the transport's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub display_name: String,
    pub account_tag: String,
}

impl Actor {
    pub fn new(id: UserId, display_name: impl Into<String>, account_tag: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            account_tag: account_tag.into(),
        }
    }
}

/// Inbound interaction, already decoded from the gateway event.
#[derive(Debug, Clone)]
pub enum Interaction {
    /// Button click or select-menu choice.
    Component {
        custom_id: String,
        actor: Actor,
        /// Message the component was attached to.
        message: Option<MessageRef>,
        /// Selected values for select menus.
        selected: Vec<String>,
    },
    /// Submitted form.
    FormSubmit {
        submission: FormSubmission,
        actor: Actor,
        message: Option<MessageRef>,
    },
    /// Slash command such as `bb-list` or `bb-clear nickname:...`.
    Command {
        name: String,
        actor: Actor,
        options: HashMap<String, String>,
    },
}

/// What the interaction handler answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Only visible to the acting user.
    Ephemeral(String),
    /// Visible to the channel.
    Public(String),
    /// Show a form.
    Form(FormRequest),
    /// Ephemeral select menu.
    Menu {
        custom_id: String,
        placeholder: String,
        options: Vec<String>,
    },
}

impl Reply {
    pub fn text(&self) -> Option<&str> {
        match self {
            Reply::Ephemeral(text) | Reply::Public(text) => Some(text),
            Reply::Form(_) | Reply::Menu { .. } => None,
        }
    }
}
