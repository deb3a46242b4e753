use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use serde_json::Value;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use thiserror::Error;

/// Top-level field of a DownBoatRMS response holding the rating records.
pub const RMS_KEY: &str = "rms";
const ACTION: &str = "DownBoatRMS";

pub const DEFAULT_SAIL_NO: &str = "GRE-016";
pub const DEFAULT_FAMILY: CertFamily = CertFamily::Dh;

/// Certificate families accepted by the ORC data service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CertFamily {
    Orc,
    /// Double handed.
    Dh,
    /// Non spinnaker.
    Ns,
}

impl CertFamily {
    pub const ALL: [&'static str; 3] = ["ORC", "DH", "NS"];

    pub fn as_str(self) -> &'static str {
        match self {
            CertFamily::Orc => "ORC",
            CertFamily::Dh => "DH",
            CertFamily::Ns => "NS",
        }
    }
}

impl fmt::Display for CertFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown certificate family {0:?} (expected one of ORC, DH, NS)")]
pub struct UnknownFamily(pub String);

impl FromStr for CertFamily {
    type Err = UnknownFamily;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ORC" => Ok(CertFamily::Orc),
            "DH" => Ok(CertFamily::Dh),
            "NS" => Ok(CertFamily::Ns),
            other => Err(UnknownFamily(other.to_string())),
        }
    }
}

/// Which record set to ask the service for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RmsQuery {
    BySailNo { sail_no: String, family: CertFamily },
    ByRefNo { ref_no: String },
}

impl Default for RmsQuery {
    fn default() -> Self {
        RmsQuery::BySailNo {
            sail_no: DEFAULT_SAIL_NO.to_string(),
            family: DEFAULT_FAMILY,
        }
    }
}

impl fmt::Display for RmsQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RmsQuery::BySailNo { sail_no, family } => {
                write!(f, "sail number {} ({})", sail_no, family)
            }
            RmsQuery::ByRefNo { ref_no } => write!(f, "certificate ref {}", ref_no),
        }
    }
}

// Field order is the order the parameters appear in the request URL.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct QueryParams<'a> {
    action: &'static str,
    #[serde(rename = "SailNo", skip_serializing_if = "Option::is_none")]
    sail_no: Option<&'a str>,
    #[serde(rename = "Family", skip_serializing_if = "Option::is_none")]
    family: Option<CertFamily>,
    #[serde(rename = "RefNo", skip_serializing_if = "Option::is_none")]
    ref_no: Option<&'a str>,
    ext: &'static str,
}

impl RmsQuery {
    pub fn params(&self) -> QueryParams<'_> {
        let (sail_no, family, ref_no) = match self {
            RmsQuery::BySailNo { sail_no, family } => {
                (Some(sail_no.as_str()), Some(*family), None)
            }
            RmsQuery::ByRefNo { ref_no } => (None, None, Some(ref_no.as_str())),
        };
        QueryParams {
            action: ACTION,
            sail_no,
            family,
            ref_no,
            ext: "json",
        }
    }
}

#[derive(Debug, Error)]
pub enum RecordsError {
    #[error("response is a JSON {0}, expected an object with a {key:?} field", key = RMS_KEY)]
    NotAnObject(&'static str),
    #[error("response has no {key:?} field", key = RMS_KEY)]
    MissingKey,
    #[error("writing records failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("serializing records failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Look up the rating records in a decoded response.
///
/// A missing `rms` field is an error; an `rms` field that is present but not
/// an array yields `Ok(None)` and the caller prints nothing.
pub fn extract_records(doc: &Value) -> Result<Option<&[Value]>, RecordsError> {
    let obj = doc
        .as_object()
        .ok_or_else(|| RecordsError::NotAnObject(kind_of(doc)))?;
    let rms = obj.get(RMS_KEY).ok_or(RecordsError::MissingKey)?;
    Ok(rms.as_array().map(Vec::as_slice))
}

/// Pretty printer (2-space indent) that writes DEL and every non-ASCII
/// character as a `\uXXXX` escape, surrogate pairs above the BMP.
struct AsciiPrettyFormatter<'a>(PrettyFormatter<'a>);

impl Formatter for AsciiPrettyFormatter<'_> {
    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if ch.is_ascii() && ch != '\x7f' {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..i])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}

/// Write the record count on one line followed by the records as a
/// pretty-printed (2-space indented, ASCII-only) JSON array.
///
/// Numbers are written exactly as they were received.
pub fn write_records<W: Write>(out: &mut W, records: &[Value]) -> Result<(), RecordsError> {
    writeln!(out, "{}", records.len())?;
    let formatter = AsciiPrettyFormatter(PrettyFormatter::with_indent(b"  "));
    let mut ser = serde_json::Serializer::with_formatter(&mut *out, formatter);
    records.serialize(&mut ser)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
