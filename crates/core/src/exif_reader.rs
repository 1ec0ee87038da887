use crate::canonical::TIMESTAMP_FORMAT;
use crate::metadata::{MetadataField, MetadataProbe, ProbeError};
use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Reads EXIF dates in-process. Covers still images and the few video
/// containers kamadak-exif understands; container-level dates such as
/// `MediaCreateDate` are out of its reach.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedExifProbe;

impl MetadataProbe for EmbeddedExifProbe {
    fn name(&self) -> &str {
        "embedded"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn query(&self, path: &Path, field: MetadataField) -> Result<String, ProbeError> {
        let tag = exif_tag(field).ok_or(ProbeError::Unsupported(field))?;

        let file = File::open(path)?;
        let mut buf = BufReader::new(file);
        let exif = Reader::new()
            .read_from_container(&mut buf)
            .map_err(|err| ProbeError::Malformed(err.to_string()))?;

        let field_value = exif
            .get_field(tag, In::PRIMARY)
            .ok_or(ProbeError::Missing(field))?;
        let raw = match &field_value.value {
            Value::Ascii(values) => values
                .first()
                .map(|bytes| String::from_utf8_lossy(bytes).to_string()),
            _ => None,
        }
        .ok_or(ProbeError::Missing(field))?;

        parse_exif_date(&raw)
            .ok_or_else(|| ProbeError::Malformed(format!("unrecognised date {raw:?}")))
    }
}

fn exif_tag(field: MetadataField) -> Option<Tag> {
    match field {
        MetadataField::CreateDate => Some(Tag::DateTimeDigitized),
        MetadataField::DateTimeOriginal => Some(Tag::DateTimeOriginal),
        MetadataField::ModifyDate => Some(Tag::DateTime),
        MetadataField::MediaCreateDate => None,
    }
}

fn parse_exif_date(input: &str) -> Option<String> {
    let normalized = input.trim().trim_end_matches('\0');

    let candidates = [
        "%Y:%m:%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    candidates
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(normalized, fmt).ok())
        .map(|naive| naive.format(TIMESTAMP_FORMAT).to_string())
}
