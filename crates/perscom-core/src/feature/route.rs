//! Custom-id and command grammar.
//!
//! Component custom ids carry the continuation of a two-phase interaction:
//!
//! - `<feature>:open[:<choice>]`
//! - `<feature>:submit[:<choice>]`
//! - `<feature>:approve:<request>`
//! - `<feature>:deny:<request>`
//! - `<feature>:deny-reason:<request>`
//!
//! Commands are `<feature>-list` and `<feature>-clear`.

use crate::domain::{CoreError, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Open { choice: Option<String> },
    Submit { choice: Option<String> },
    Approve(RequestId),
    Deny(RequestId),
    DenyReason(RequestId),
}

impl Route {
    /// Split a custom id into feature key and route.
    pub fn parse(custom_id: &str) -> Result<(&str, Route), CoreError> {
        let malformed = || CoreError::MalformedCustomId(custom_id.to_string());
        let mut parts = custom_id.splitn(3, ':');
        let key = parts.next().filter(|k| !k.is_empty()).ok_or_else(malformed)?;
        let verb = parts.next().ok_or_else(malformed)?;
        let arg = parts.next().filter(|a| !a.is_empty());

        let request = |arg: Option<&str>| -> Result<RequestId, CoreError> {
            arg.ok_or_else(|| malformed())?.parse()
        };

        let route = match verb {
            "open" => Route::Open {
                choice: arg.map(str::to_string),
            },
            "submit" => Route::Submit {
                choice: arg.map(str::to_string),
            },
            "approve" => Route::Approve(request(arg)?),
            "deny" => Route::Deny(request(arg)?),
            "deny-reason" => Route::DenyReason(request(arg)?),
            _ => return Err(malformed()),
        };
        Ok((key, route))
    }

    pub fn custom_id(&self, key: &str) -> String {
        match self {
            Route::Open { choice: None } => format!("{key}:open"),
            Route::Open { choice: Some(c) } => format!("{key}:open:{c}"),
            Route::Submit { choice: None } => format!("{key}:submit"),
            Route::Submit { choice: Some(c) } => format!("{key}:submit:{c}"),
            Route::Approve(id) => format!("{key}:approve:{id}"),
            Route::Deny(id) => format!("{key}:deny:{id}"),
            Route::DenyReason(id) => format!("{key}:deny-reason:{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    List,
    Clear,
}

/// A parsed `<feature>-list` / `<feature>-clear` command name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command<'a> {
    pub key: &'a str,
    pub kind: CommandKind,
}

impl<'a> Command<'a> {
    pub fn parse(name: &'a str) -> Result<Self, CoreError> {
        let (key, verb) = name
            .rsplit_once('-')
            .ok_or_else(|| CoreError::UnknownFeature(name.to_string()))?;
        let kind = match verb {
            "list" => CommandKind::List,
            "clear" => CommandKind::Clear,
            _ => return Err(CoreError::UnknownFeature(name.to_string())),
        };
        Ok(Self { key, kind })
    }

    pub fn name(&self) -> String {
        match self.kind {
            CommandKind::List => format!("{}-list", self.key),
            CommandKind::Clear => format!("{}-clear", self.key),
        }
    }
}
