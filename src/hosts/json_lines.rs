use std::io::Write;
use std::sync::Mutex;

use serde::Serialize;
use tracing::warn;

use crate::announce::{LiveRegionHost, Politeness};

/// One live-region lifecycle step, as written to the output stream.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum RegionEvent<'a> {
    Create { id: &'a str, politeness: Politeness },
    Populate { id: &'a str, text: &'a str },
    Remove { id: &'a str },
}

/// A [`LiveRegionHost`] that writes each lifecycle step as one JSON object per line.
///
/// Screen-reader bridges and test harnesses can follow the stream line by line without
/// waiting for the session to end.
///
/// Example output:
/// ```json
/// {"event":"create","id":"speak-3f2c…","politeness":"polite"}
/// {"event":"populate","id":"speak-3f2c…","text":"Motion detected"}
/// {"event":"remove","id":"speak-3f2c…"}
/// ```
pub struct JsonLinesHost<W: Write + Send> {
    w: Mutex<W>,
}

impl<W: Write + Send> JsonLinesHost<W> {
    pub fn new(w: W) -> Self {
        Self { w: Mutex::new(w) }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        match self.w.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_event(&self, event: &RegionEvent<'_>) {
        let mut w = match self.w.lock() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        };

        let res = serde_json::to_writer(&mut *w, event)
            .map_err(std::io::Error::from)
            .and_then(|()| w.write_all(b"\n"))
            // Flush so streaming consumers (stdout, pipes, sockets) see events promptly.
            .and_then(|()| w.flush());

        if let Err(err) = res {
            warn!(error = %err, "failed to write live-region event");
        }
    }
}

impl<W: Write + Send> LiveRegionHost for JsonLinesHost<W> {
    fn create_region(&self, id: &str, politeness: Politeness) {
        self.write_event(&RegionEvent::Create { id, politeness });
    }

    fn populate_region(&self, id: &str, text: &str) {
        self.write_event(&RegionEvent::Populate { id, text });
    }

    fn remove_region(&self, id: &str) {
        self.write_event(&RegionEvent::Remove { id });
    }
}
