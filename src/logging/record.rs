//! # Fixed-capacity log records.
//!
//! A [`LogRecord`] never allocates: tag and message live in `heapless::String`
//! fields sized from [`TAG_SIZE`] and [`LOG_SIZE`]. Both sizes count a trailing
//! terminator byte, so the usable capacities are one byte smaller.
//!
//! ## Truncation
//! ```text
//! tag      > 19 bytes  → cut at a char boundary
//! message  > 155 bytes → cut at a char boundary + " [LOG OVERFLOW]"
//! ```
//! The marker is placed inside the capacity, so a stored message is never
//! longer than [`MESSAGE_CAPACITY`].

use std::fmt;

use serde::Serialize;

use super::level::Level;

/// Slots in the ring store.
pub const MAX_LOGS: usize = 100;
/// Message buffer size including the terminator byte.
pub const LOG_SIZE: usize = 156;
/// Tag buffer size including the terminator byte.
pub const TAG_SIZE: usize = 20;
/// Usable message bytes.
pub const MESSAGE_CAPACITY: usize = LOG_SIZE - 1;
/// Usable tag bytes.
pub const TAG_CAPACITY: usize = TAG_SIZE - 1;
/// Tag stored when the caller passes an empty one.
pub const DEFAULT_TAG: &str = "DEFAULT";
/// Suffix appended to truncated messages.
pub const OVERFLOW_MARKER: &str = " [LOG OVERFLOW]";

pub(crate) type TagText = heapless::String<TAG_CAPACITY>;
pub(crate) type MessageText = heapless::String<MESSAGE_CAPACITY>;

/// Largest char boundary of `s` that is `<= max`.
fn floor_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    end
}

fn fill_tag(out: &mut TagText, tag: &str) {
    let src = if tag.is_empty() { DEFAULT_TAG } else { tag };
    out.clear();
    let _ = out.push_str(&src[..floor_boundary(src, TAG_CAPACITY)]);
}

fn fill_message(out: &mut MessageText, message: &str) {
    out.clear();
    if message.len() <= MESSAGE_CAPACITY {
        let _ = out.push_str(message);
        return;
    }
    let keep = floor_boundary(message, MESSAGE_CAPACITY - OVERFLOW_MARKER.len());
    let _ = out.push_str(&message[..keep]);
    let _ = out.push_str(OVERFLOW_MARKER);
}

fn mark_overflow(text: &mut MessageText) {
    let keep = floor_boundary(text.as_str(), MESSAGE_CAPACITY - OVERFLOW_MARKER.len());
    text.truncate(keep);
    let _ = text.push_str(OVERFLOW_MARKER);
}

/// One stored log entry.
///
/// Records are copied out of the store on read; the store keeps ownership of
/// its slots and rewrites them in place on wraparound.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    tag: TagText,
    level: Level,
    message: MessageText,
}

impl LogRecord {
    /// Builds a record, applying tag/message truncation rules.
    pub fn new(tag: &str, level: Level, message: &str) -> Self {
        let mut record = Self::default();
        record.overwrite(tag, level, message);
        record
    }

    /// Rewrites this record in place.
    pub(crate) fn overwrite(&mut self, tag: &str, level: Level, message: &str) {
        fill_tag(&mut self.tag, tag);
        self.level = level;
        fill_message(&mut self.message, message);
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Serializes as `{"tag":..,"level":"INFO","message":..}`.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Stack buffer for rendering `format_args!` with `snprintf`-like semantics.
///
/// Writes past the capacity are cut silently and never fail the formatter;
/// the overflow marker is applied when the text is taken out.
#[derive(Default)]
pub(crate) struct FormatBuffer {
    text: MessageText,
    overflowed: bool,
}

impl FormatBuffer {
    /// Renders `args` into a fresh buffer.
    pub(crate) fn render(args: fmt::Arguments<'_>) -> Self {
        let mut buf = Self::default();
        let _ = fmt::write(&mut buf, args);
        buf
    }

    #[cfg(test)]
    fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Returns the bounded text, marked if it was truncated.
    pub(crate) fn into_text(mut self) -> MessageText {
        if self.overflowed {
            mark_overflow(&mut self.text);
        }
        self.text
    }
}

impl fmt::Write for FormatBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.overflowed {
            return Ok(());
        }
        let room = MESSAGE_CAPACITY - self.text.len();
        if s.len() <= room {
            let _ = self.text.push_str(s);
        } else {
            let _ = self.text.push_str(&s[..floor_boundary(s, room)]);
            self.overflowed = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_is_stored_verbatim() {
        let rec = LogRecord::new("NET", Level::Info, "link up");
        assert_eq!(rec.tag(), "NET");
        assert_eq!(rec.level(), Level::Info);
        assert_eq!(rec.message(), "link up");
    }

    #[test]
    fn test_message_at_capacity_is_not_marked() {
        let text = "x".repeat(MESSAGE_CAPACITY);
        let rec = LogRecord::new("T", Level::Debug, &text);
        assert_eq!(rec.message(), text);
    }

    #[test]
    fn test_long_message_is_truncated_with_marker() {
        let text = "a".repeat(300);
        let rec = LogRecord::new("T", Level::Error, &text);

        assert!(rec.message().ends_with(OVERFLOW_MARKER));
        assert_eq!(rec.message().len(), MESSAGE_CAPACITY);
        assert!(rec.message().starts_with("aaaa"));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        // 'é' is two bytes; an odd cut point would land inside it.
        let text = "é".repeat(120);
        let rec = LogRecord::new("T", Level::Info, &text);

        assert!(rec.message().ends_with(OVERFLOW_MARKER));
        assert!(rec.message().len() <= MESSAGE_CAPACITY);
    }

    #[test]
    fn test_long_tag_is_cut_without_marker() {
        let rec = LogRecord::new("a-very-long-tag-name-over-limit", Level::Info, "m");
        assert_eq!(rec.tag().len(), TAG_CAPACITY);
        assert_eq!(rec.tag(), "a-very-long-tag-nam");
    }

    #[test]
    fn test_empty_tag_falls_back_to_default() {
        let rec = LogRecord::new("", Level::Info, "m");
        assert_eq!(rec.tag(), DEFAULT_TAG);
    }

    #[test]
    fn test_overwrite_replaces_all_fields() {
        let mut rec = LogRecord::new("OLD", Level::Error, "old message that is long");
        rec.overwrite("NEW", Level::Debug, "new");
        assert_eq!(rec, LogRecord::new("NEW", Level::Debug, "new"));
    }

    #[test]
    fn test_json_shape() {
        let rec = LogRecord::new("WIFI", Level::Warning, "weak \"signal\"");
        let value: serde_json::Value = serde_json::from_str(&rec.to_json()).unwrap();

        assert_eq!(value["tag"], "WIFI");
        assert_eq!(value["level"], "WARNING");
        assert_eq!(value["message"], "weak \"signal\"");
    }

    #[test]
    fn test_format_buffer_renders_arguments() {
        let buf = FormatBuffer::render(format_args!("rssi={} ch={}", -67, 6));
        assert!(!buf.overflowed());
        assert_eq!(buf.into_text().as_str(), "rssi=-67 ch=6");
    }

    #[test]
    fn test_format_buffer_truncates_and_marks() {
        let long = "z".repeat(400);
        let buf = FormatBuffer::render(format_args!("payload={long}"));
        assert!(buf.overflowed());

        let text = buf.into_text();
        assert_eq!(text.len(), MESSAGE_CAPACITY);
        assert!(text.starts_with("payload=zzz"));
        assert!(text.ends_with(OVERFLOW_MARKER));
    }
}
