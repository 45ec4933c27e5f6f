//! Text rendering for log entries, approval posts and listings.

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::domain::{Payload, Request, RequestStatus};

/// Source of the display offset: Central Standard Time, no DST.
pub const DEFAULT_OFFSET_MINUTES: i32 = -6 * 60;
pub const DEFAULT_ZONE_LABEL: &str = "CST";

/// How timestamps are shown to humans.
#[derive(Debug, Clone)]
pub struct RenderContext {
    offset: FixedOffset,
    zone_label: String,
}

impl RenderContext {
    /// `offset_minutes` east of UTC. Out-of-range values fall back to UTC.
    pub fn new(offset_minutes: i32, zone_label: impl Into<String>) -> Self {
        let offset = FixedOffset::east_opt(offset_minutes.saturating_mul(60)).unwrap_or(Utc.fix());
        Self {
            offset,
            zone_label: zone_label.into(),
        }
    }

    /// `Mon, 02 Jan 2006 15:04 CST`
    pub fn format_time(&self, at: DateTime<Utc>) -> String {
        format!(
            "{} {}",
            at.with_timezone(&self.offset).format("%a, %d %b %Y %H:%M"),
            self.zone_label
        )
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(DEFAULT_OFFSET_MINUTES, DEFAULT_ZONE_LABEL)
    }
}

/// Cut `text` to at most `limit` characters, never inside a code point.
pub fn truncate_to_limit(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// "(Status: ...)" part of a log / list line.
pub fn status_line<P: Payload>(record: &Request<P>) -> String {
    let reviewer = record
        .reviewer()
        .map(|r| r.name.as_str())
        .unwrap_or("unknown");
    match record.status() {
        RequestStatus::Pending => "🕐 pending".to_string(),
        RequestStatus::Approved => format!("✅ approved by {reviewer}"),
        RequestStatus::Denied => format!(
            "❌ denied by {reviewer}. Reason: **{}**",
            record.deny_reason().unwrap_or("")
        ),
    }
}

/// One bullet of the running log or of a listing.
pub fn entry_line<P: Payload>(record: &Request<P>, ctx: &RenderContext) -> String {
    format!(
        "\n• **{}** submitted by **{}** at {} (Status: {})\n",
        record.payload.summary(),
        record.requester.display_name,
        ctx.format_time(record.submitted_at),
        status_line(record)
    )
}

/// Full running-log content, rebuilt from every entry.
pub fn log_content<P: Payload>(title: &str, entries: &[Request<P>], ctx: &RenderContext) -> String {
    let mut content = format!("**{title} Log:**\n");
    for record in entries {
        content.push_str(&entry_line(record, ctx));
    }
    content
}

/// Post for the approval channel.
pub fn approval_post<P: Payload>(title: &str, record: &Request<P>) -> String {
    let mut content = format!(
        "{title} request submitted by **{}** (<@{}>)",
        record.requester.display_name, record.requester.id
    );
    for (label, value) in record.payload.details() {
        content.push_str(&format!("\n• {label}: **{value}**"));
    }
    content
}

/// Body of the `<feature>-list` command.
pub fn listing<P: Payload>(title: &str, records: &[Request<P>], ctx: &RenderContext) -> String {
    if records.is_empty() {
        return "No current requests.".to_string();
    }
    let mut content = format!("**Current {title} Requests:**\n");
    for record in records {
        content.push_str(&entry_line(record, ctx));
    }
    content
}
