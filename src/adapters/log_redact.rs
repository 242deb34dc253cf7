//! Redaction of formatted log output.
//!
//! Log lines may carry the API key (request debugging) or patient
//! identifiers (pipeline events). [`RedactingMakeWriter`] wraps the
//! `tracing_subscriber` sink and masks both before a line is written.
//!
//! Prefer keeping sensitive values out of log calls entirely; this is the
//! backstop for the ones that slip through.

use regex::Regex;
use std::io::Write;
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

/// Lines longer than this are flushed without waiting for a newline.
const MAX_BUFFERED_BYTES: usize = 32 * 1024;

struct Rule {
    regex: Regex,
    replacement: &'static str,
}

static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
static SGR: OnceLock<Regex> = OnceLock::new();

/// ANSI color/style sequences. `fmt::layer()` emits these between a field
/// name and its `=` when ANSI output is on.
fn sgr() -> &'static Regex {
    SGR.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").expect("Valid regex"))
}

fn rules() -> &'static [Rule] {
    RULES.get_or_init(|| {
        vec![
            Rule {
                regex: Regex::new(r#"(?i)(x-api-key|api[_-]?key)("?\s*[:=]\s*"?)[^\s",}]+"#)
                    .expect("Valid regex"),
                replacement: "${1}${2}[REDACTED-KEY]",
            },
            Rule {
                regex: Regex::new(r#"(?i)(patient_id|patient)("?\s*[:=]\s*"?)[^\s",}]+"#)
                    .expect("Valid regex"),
                replacement: "${1}${2}[REDACTED-ID]",
            },
            Rule {
                regex: Regex::new(r"(?i)\bbearer\s+[A-Za-z0-9._~+/-]+=*").expect("Valid regex"),
                replacement: "Bearer [REDACTED-TOKEN]",
            },
        ]
    })
}

/// Mask API keys and patient identifiers in a log line.
///
/// Styling escapes are stripped first, so a redacted line is always plain text.
#[must_use]
pub fn redact(line: &str) -> String {
    let mut out = if line.contains('\x1b') {
        sgr().replace_all(line, "").into_owned()
    } else {
        line.to_string()
    };
    for rule in rules() {
        if rule.regex.is_match(&out) {
            out = rule.regex.replace_all(&out, rule.replacement).into_owned();
        }
    }
    out
}

/// A `MakeWriter` that redacts every formatted line before it reaches the
/// wrapped writer.
#[derive(Debug, Clone)]
pub struct RedactingMakeWriter<M> {
    inner: M,
}

impl<M> RedactingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

pub struct RedactingWriter<W: Write> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: Write> RedactingWriter<W> {
    fn write_redacted(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let text = String::from_utf8_lossy(bytes);
        self.inner.write_all(redact(&text).as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_redacted(&line)?;
        }
        Ok(())
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        self.flush_lines()?;

        if self.buffer.len() > MAX_BUFFERED_BYTES {
            let pending = std::mem::take(&mut self.buffer);
            self.write_redacted(&pending)?;
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_redacted(&pending)?;
        }
        self.inner.flush()
    }
}

impl<W: Write> Drop for RedactingWriter<W> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<'a, M> MakeWriter<'a> for RedactingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = RedactingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter {
            inner: self.inner.make_writer(),
            buffer: Vec::new(),
        }
    }
}
