//! Log output setup.
//!
//! Every line written by the tracing subscriber passes through a
//! [`Redactor`] so the bot token never reaches stderr, whether it shows up
//! verbatim or inside a Bot API URL from a teloxide error.

use regex::Regex;
use std::borrow::Cow;
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::{fmt::MakeWriter, prelude::*, EnvFilter};

/// Replacement for a masked token
pub const TOKEN_MASK: &str = "[TELEGRAM_TOKEN]";

/// Secrets shorter than this are not masked literally
const MIN_SECRET_LEN: usize = 8;

/// Masks Telegram bot tokens in log text
#[derive(Debug)]
pub struct Redactor {
    rules: Vec<(Regex, &'static str)>,
    secrets: Vec<String>,
}

impl Redactor {
    /// Build a redactor for token-shaped strings.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in pattern fails to compile.
    pub fn new() -> Result<Self, regex::Error> {
        let rules = vec![
            // https://api.telegram.org/bot<token>/sendMessage
            (
                Regex::new(r"(https?://[^/\s]+/bot)[0-9]+:[A-Za-z0-9_-]+")?,
                "${1}[TELEGRAM_TOKEN]",
            ),
            (
                Regex::new(r"[0-9]{8,10}:[A-Za-z0-9_-]{35}")?,
                TOKEN_MASK,
            ),
            (
                Regex::new(r"(bot[0-9]{8,10}:)[A-Za-z0-9_-]+")?,
                "${1}[TELEGRAM_TOKEN]",
            ),
        ];
        Ok(Self {
            rules,
            secrets: Vec::new(),
        })
    }

    /// Also mask this exact value, e.g. the token from the environment.
    #[must_use]
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        let secret = secret.trim();
        if secret.len() >= MIN_SECRET_LEN && !self.secrets.iter().any(|s| s == secret) {
            self.secrets.push(secret.to_string());
        }
        self
    }

    /// Mask every token in `line`; borrows when nothing matched.
    #[must_use]
    pub fn redact<'a>(&self, line: &'a str) -> Cow<'a, str> {
        let mut out = Cow::Borrowed(line);
        for secret in &self.secrets {
            if out.contains(secret.as_str()) {
                out = Cow::Owned(out.replace(secret.as_str(), TOKEN_MASK));
            }
        }
        for (re, replacement) in &self.rules {
            if re.is_match(&out) {
                out = Cow::Owned(re.replace_all(&out, *replacement).into_owned());
            }
        }
        out
    }
}

/// Writer that redacts each chunk before passing it on
pub struct RedactingWriter<W: Write> {
    inner: W,
    redactor: Arc<Redactor>,
}

impl<W: Write> RedactingWriter<W> {
    /// Wrap `inner`.
    pub const fn new(inner: W, redactor: Arc<Redactor>) -> Self {
        Self { inner, redactor }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        self.inner
            .write_all(self.redactor.redact(&text).as_bytes())?;
        // The caller's bytes are consumed even when the masked text is shorter.
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Hands the subscriber a redacting stderr writer per event
struct RedactedStderr {
    redactor: Arc<Redactor>,
}

impl<'a> MakeWriter<'a> for RedactedStderr {
    type Writer = RedactingWriter<io::Stderr>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new(io::stderr(), Arc::clone(&self.redactor))
    }
}

/// Install the global subscriber: `RUST_LOG` filter (default `info`),
/// redacted output on stderr.
pub fn init(redactor: Redactor) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let writer = RedactedStderr {
        redactor: Arc::new(redactor),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .init();
}
