use crate::domain::error::{AppError, Result};
use lettre::address::Envelope;
use lettre::message::header::{ContentType, Header, HeaderName, HeaderValue};
use lettre::message::Mailbox;
use lettre::Message;
use std::error::Error as StdError;
use std::fs;
use std::path::{Path, PathBuf};

/// Write the HTML fragment as a UTF-8 file.
pub fn write_report(path: &Path, html: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, html).map_err(|e| {
        AppError::IoError(format!("Failed to write report {}: {}", path.display(), e))
    })?;
    Ok(path.to_path_buf())
}

/// Unsent mail draft (`.eml`) carrying the report as its HTML body. Mail
/// clients open it as an editable draft thanks to `X-Unsent`.
pub fn write_mail_draft(
    path: &Path,
    from: &str,
    to: &str,
    subject: &str,
    html: &str,
) -> Result<PathBuf> {
    let draft = build_mail_draft(from, to, subject, html)?;
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, draft).map_err(|e| {
        AppError::IoError(format!("Failed to write mail draft {}: {}", path.display(), e))
    })?;
    Ok(path.to_path_buf())
}

#[derive(Debug, Clone, Copy)]
struct XUnsent;

impl Header for XUnsent {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Unsent")
    }

    fn parse(_s: &str) -> std::result::Result<Self, Box<dyn StdError + Send + Sync>> {
        Ok(XUnsent)
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), "1".to_string())
    }
}

/// Formatted RFC 5322 message. A blank recipient leaves `To` out so the
/// operator fills it in the mail client.
pub fn build_mail_draft(from: &str, to: &str, subject: &str, html: &str) -> Result<Vec<u8>> {
    let from_mailbox: Mailbox = from
        .trim()
        .parse()
        .map_err(|e| AppError::ValidationError(format!("Invalid sender address '{}': {}", from, e)))?;

    let mut builder = Message::builder()
        .from(from_mailbox.clone())
        .subject(subject.replace(['\r', '\n'], " ").trim())
        .header(XUnsent)
        .header(ContentType::TEXT_HTML);

    let to = to.trim();
    if to.is_empty() {
        // Never sent; the envelope only satisfies the builder.
        let envelope = Envelope::new(None, vec![from_mailbox.email])
            .map_err(|e| AppError::Internal(format!("Failed to build mail envelope: {}", e)))?;
        builder = builder.envelope(envelope);
    } else {
        let to_mailbox: Mailbox = to.parse().map_err(|e| {
            AppError::ValidationError(format!("Invalid recipient address '{}': {}", to, e))
        })?;
        builder = builder.to(to_mailbox);
    }

    let message = builder
        .body(html.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to build mail draft: {}", e)))?;

    Ok(message.formatted())
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
