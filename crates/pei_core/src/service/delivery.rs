//! Hand-off of rendered reports to external channels.
//!
//! The tracker never tracks delivery confirmation; a channel either accepts
//! the text block or returns an error.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;

/// Prefix of the messenger share link; the report is appended percent-encoded.
pub const MESSENGER_SHARE_URL: &str = "https://api.whatsapp.com/send?text=";

#[derive(Debug)]
pub enum DeliveryError {
    EmptyReport,
    Io(std::io::Error),
}

impl Display for DeliveryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyReport => write!(f, "refusing to deliver an empty report"),
            Self::Io(err) => write!(f, "report delivery failed: {err}"),
        }
    }
}

impl Error for DeliveryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::EmptyReport => None,
        }
    }
}

impl From<std::io::Error> for DeliveryError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Destination for a finished report text block.
pub trait ReportChannel {
    fn deliver(&mut self, report: &str) -> Result<(), DeliveryError>;
}

/// Writes the report verbatim.
pub struct WriterChannel<W: Write> {
    writer: W,
}

impl<W: Write> WriterChannel<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportChannel for WriterChannel<W> {
    fn deliver(&mut self, report: &str) -> Result<(), DeliveryError> {
        ensure_not_blank(report)?;
        self.writer.write_all(report.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes a messenger share link that opens a composer pre-filled with the
/// report.
pub struct ShareLinkChannel<W: Write> {
    writer: W,
}

impl<W: Write> ShareLinkChannel<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportChannel for ShareLinkChannel<W> {
    fn deliver(&mut self, report: &str) -> Result<(), DeliveryError> {
        ensure_not_blank(report)?;
        writeln!(self.writer, "{}", share_link(report))?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Messenger link carrying `report` as the pre-filled message.
pub fn share_link(report: &str) -> String {
    format!("{MESSENGER_SHARE_URL}{}", urlencoding::encode(report))
}

fn ensure_not_blank(report: &str) -> Result<(), DeliveryError> {
    if report.trim().is_empty() {
        return Err(DeliveryError::EmptyReport);
    }
    Ok(())
}
