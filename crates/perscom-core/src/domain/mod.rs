//! Domain model (IDs, requests, messages, errors).

pub mod errors;
pub mod ids;
pub mod message;
pub mod request;

pub use self::errors::CoreError;
pub use self::ids::{ChannelId, MessageId, RequestId, UserId};
pub use self::message::{
    Action, Actor, ButtonStyle, FormField, FormRequest, FormSubmission, Interaction, MessageRef,
    OutgoingMessage, Reply,
};
pub use self::request::{Payload, Request, RequestStatus, Requester, Reviewer};
