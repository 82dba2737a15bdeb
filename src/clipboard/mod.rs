use anyhow::{Context, Result};
use tracing::debug;

pub trait Clipboard {
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// The OS clipboard. The handle is opened on first copy and kept for the
/// rest of the session; on X11 and Wayland the contents only live as long as
/// the handle does.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for SystemClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        let clipboard = match &mut self.inner {
            Some(c) => c,
            None => self.inner.insert(arboard::Clipboard::new().context("clipboard unavailable")?),
        };
        clipboard
            .set_text(text.to_owned())
            .context("could not write to the clipboard")?;
        debug!(bytes = text.len(), "copied to clipboard");
        Ok(())
    }
}

/// Keeps every copied text in memory; `fail` makes each copy error instead.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryClipboard {
    pub copied: Vec<String>,
    pub fail: bool,
}

#[cfg(test)]
impl Clipboard for MemoryClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        if self.fail {
            anyhow::bail!("no display");
        }
        self.copied.push(text.to_string());
        Ok(())
    }
}
