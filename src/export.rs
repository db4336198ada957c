// 📥 Message Export Reader
// Decodes an SMS backup XML file (`<smses><sms body=".." date=".."/></smses>`)
// into raw messages for the parser.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::parser::RawMessage;

/// Read and decode an export file
pub fn read_export(path: &Path) -> Result<Vec<RawMessage>> {
    let xml = fs::read_to_string(path)
        .with_context(|| format!("Failed to read export file: {}", path.display()))?;

    let messages = parse_export(&xml)
        .with_context(|| format!("Failed to parse export file: {}", path.display()))?;

    info!(count = messages.len(), path = %path.display(), "loaded messages from export");
    Ok(messages)
}

/// Decode export XML already held in memory
pub fn parse_export(xml: &str) -> Result<Vec<RawMessage>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut messages = Vec::new();
    let mut index = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"sms" => {
                index += 1;
                if let Some(message) = decode_sms(&e, index)? {
                    messages.push(message);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(anyhow!(
                    "Malformed XML at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
        }
    }

    Ok(messages)
}

/// Convert an epoch-millisecond attribute into an instant
pub fn parse_epoch_millis(value: &str) -> Result<DateTime<Utc>> {
    let millis: i64 = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid epoch-millisecond date: {:?}", value))?;

    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| anyhow!("Date out of range: {}", millis))
}

fn decode_sms(element: &BytesStart, index: usize) -> Result<Option<RawMessage>> {
    let mut body = None;
    let mut date = None;

    for attr in element.attributes() {
        let attr = attr.with_context(|| format!("Bad attribute on sms #{}", index))?;
        match attr.key.as_ref() {
            b"body" => {
                let value = attr
                    .unescape_value()
                    .with_context(|| format!("Bad body attribute on sms #{}", index))?;
                body = Some(value.into_owned());
            }
            b"date" => {
                let value = attr
                    .unescape_value()
                    .with_context(|| format!("Bad date attribute on sms #{}", index))?;
                date = Some(value.into_owned());
            }
            _ => {}
        }
    }

    let date = date.ok_or_else(|| anyhow!("sms #{} has no date attribute", index))?;
    let timestamp =
        parse_epoch_millis(&date).with_context(|| format!("sms #{} has an invalid date", index))?;

    match body {
        Some(body) => Ok(Some(RawMessage::new(timestamp, body))),
        None => {
            warn!(index, "skipping sms without body attribute");
            Ok(None)
        }
    }
}
