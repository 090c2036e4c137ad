use std::io::Write;

use tracing::warn;

use crate::status::{StatusSurface, StatusTone, StatusView};

const ALERT_STYLE: &str = "\x1b[1;97;41m";
const NEUTRAL_STYLE: &str = "\x1b[97;42m";
const RESET: &str = "\x1b[0m";
const CLEAR_LINE: &str = "\r\x1b[2K";

/// A [`StatusSurface`] drawn as a single coloured line on a terminal.
///
/// The display re-renders every frame; this surface only repaints when the view changes so a
/// 30 Hz feed doesn't flood the terminal.
pub struct TerminalStatusLine<W: Write> {
    w: W,
    shown: Option<StatusView>,
}

impl<W: Write> TerminalStatusLine<W> {
    pub fn new(w: W) -> Self {
        Self { w, shown: None }
    }
}

impl<W: Write> StatusSurface for TerminalStatusLine<W> {
    fn render(&mut self, view: &StatusView) {
        if self.shown.as_ref() == Some(view) {
            return;
        }

        let style = match view.tone {
            StatusTone::Alert => ALERT_STYLE,
            StatusTone::Neutral => NEUTRAL_STYLE,
        };

        let res = write!(self.w, "{CLEAR_LINE}{style} {} {RESET}", view.label)
            .and_then(|()| self.w.flush());
        if let Err(err) = res {
            warn!(error = %err, "failed to draw status line");
            return;
        }
        self.shown = Some(view.clone());
    }
}

impl<W: Write> Drop for TerminalStatusLine<W> {
    fn drop(&mut self) {
        if self.shown.is_some() {
            let _ = writeln!(self.w);
        }
    }
}
