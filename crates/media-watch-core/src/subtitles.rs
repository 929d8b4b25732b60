use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use tracing::debug;

static TIMESTAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:(\d+):)?(\d+):(\d+(?:\.\d+)?)$").expect("valid timestamp pattern"));

static MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid markup pattern"));

/// A timed caption line, in seconds
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

struct PendingCue {
    start: f64,
    end: f64,
    lines: Vec<String>,
}

impl PendingCue {
    fn finish(self, cues: &mut Vec<Cue>) {
        let text = self.lines.join("\n");
        if !text.is_empty() {
            cues.push(Cue {
                start: self.start,
                end: self.end,
                text,
            });
        }
    }
}

/// Parse a WebVTT-like caption payload.
///
/// Only timing lines (`MM:SS.mmm --> MM:SS.mmm`, optionally with a leading
/// hours field and trailing cue settings) and the text lines after them are
/// recognized. Headers, cue identifiers and notes fall outside any cue and are
/// ignored. Cues come back in document order, overlaps and all.
///
/// A timing line that does not parse drops the cue it introduces; its text
/// lines are skipped up to the next timing line or blank line.
pub fn parse_captions(text: &str) -> Vec<Cue> {
    let mut cues = Vec::new();
    let mut pending: Option<PendingCue> = None;

    for (index, line) in text.lines().enumerate() {
        if line.contains("-->") {
            if let Some(cue) = pending.take() {
                cue.finish(&mut cues);
            }
            match parse_timing(line) {
                Some((start, end)) => {
                    pending = Some(PendingCue {
                        start,
                        end,
                        lines: Vec::new(),
                    })
                }
                None => debug!(line = index + 1, timing = line, "Dropping cue with malformed timing"),
            }
            continue;
        }

        if line.trim().is_empty() {
            if let Some(cue) = pending.take() {
                cue.finish(&mut cues);
            }
            continue;
        }

        if let Some(cue) = pending.as_mut() {
            cue.lines.push(line.trim_end().to_string());
        }
    }

    if let Some(cue) = pending {
        cue.finish(&mut cues);
    }
    cues
}

fn parse_timing(line: &str) -> Option<(f64, f64)> {
    let (start, rest) = line.split_once("-->")?;
    let end = rest.split_whitespace().next()?;
    Some((parse_timestamp(start.trim())?, parse_timestamp(end)?))
}

fn parse_timestamp(value: &str) -> Option<f64> {
    let caps = TIMESTAMP.captures(value)?;
    let hours: f64 = match caps.get(1) {
        Some(h) => h.as_str().parse().ok()?,
        None => 0.0,
    };
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Text of the first cue in document order whose `[start, end]` contains
/// `time`, or an empty string.
pub fn active_cue_at(cues: &[Cue], time: f64) -> &str {
    cues.iter()
        .find(|cue| cue.start <= time && time <= cue.end)
        .map(|cue| cue.text.as_str())
        .unwrap_or("")
}

/// Remove inline tags such as `<i>` or `<c.yellow>` before display
pub fn strip_markup(text: &str) -> Cow<'_, str> {
    MARKUP.replace_all(text, "")
}

/// Caption state for one playback session
#[derive(Debug, Default, Clone)]
pub struct CueTrack {
    cues: Vec<Cue>,
    displayed: String,
    strip: bool,
}

impl CueTrack {
    pub fn new(cues: Vec<Cue>, strip: bool) -> Self {
        Self {
            cues,
            displayed: String::new(),
            strip,
        }
    }

    pub fn from_text(text: &str, strip: bool) -> Self {
        Self::new(parse_captions(text), strip)
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Line currently on screen
    pub fn displayed(&self) -> &str {
        &self.displayed
    }

    pub fn clear(&mut self) {
        self.cues.clear();
        self.displayed.clear();
    }

    /// Re-evaluate the active cue. Returns true when the displayed line changed.
    pub fn on_time_update(&mut self, time: f64) -> bool {
        let active = active_cue_at(&self.cues, time);
        let next = if self.strip {
            strip_markup(active)
        } else {
            Cow::Borrowed(active)
        };
        if next == self.displayed {
            return false;
        }
        self.displayed = next.into_owned();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(start: f64, end: f64, text: &str) -> Cue {
        Cue {
            start,
            end,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_parse_two_cues() {
        let cues = parse_captions("00:01.000 --> 00:03.000\nHello\n\n00:04.000 --> 00:05.000\nWorld\n");
        assert_eq!(cues, vec![cue(1.0, 3.0, "Hello"), cue(4.0, 5.0, "World")]);
    }

    #[test]
    fn test_parse_joins_multiline_text_and_keeps_dangling_cue() {
        let cues = parse_captions("WEBVTT\n\n1\n00:10.5 --> 00:12.0\nfirst\nsecond");
        assert_eq!(cues, vec![cue(10.5, 12.0, "first\nsecond")]);
    }

    #[test]
    fn test_parse_hours_settings_and_crlf() {
        let cues = parse_captions("01:00:02.250 --> 01:00:04.000 align:start line:90%\r\nLate line\r\n\r\n");
        assert_eq!(cues, vec![cue(3602.25, 3604.0, "Late line")]);
    }

    #[test]
    fn test_parse_keeps_document_order_and_overlaps() {
        let cues = parse_captions("00:05.000 --> 00:06.000\nB\n\n00:01.000 --> 00:09.000\nA\n");
        assert_eq!(cues[0].text, "B");
        assert_eq!(cues[1].text, "A");
    }

    #[test]
    fn test_malformed_timing_drops_only_that_cue() {
        let cues = parse_captions("00:xx --> 00:03.000\nLost\n\n00:04.000 --> 00:05.000\nKept\n");
        assert_eq!(cues, vec![cue(4.0, 5.0, "Kept")]);
        assert!(cues.iter().all(|c| !c.start.is_nan() && !c.end.is_nan()));
    }

    #[test]
    fn test_empty_text_cue_is_not_pushed() {
        assert!(parse_captions("00:01.000 --> 00:02.000\n\n").is_empty());
        assert!(parse_captions("").is_empty());
    }

    #[test]
    fn test_active_cue_boundary_prefers_document_order() {
        let cues = vec![cue(0.0, 2.0, "A"), cue(2.0, 4.0, "B")];
        assert_eq!(active_cue_at(&cues, 2.0), "A");
        assert_eq!(active_cue_at(&cues, 3.0), "B");
        assert_eq!(active_cue_at(&cues, 4.5), "");
        assert_eq!(active_cue_at(&[], 1.0), "");
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(strip_markup("<i>Hi</i> <c.yellow>there</c>"), "Hi there");
        assert_eq!(strip_markup("plain"), "plain");
    }

    #[test]
    fn test_cue_track_reports_changes() {
        let mut track = CueTrack::new(vec![cue(1.0, 2.0, "<b>Hello</b>")], true);
        assert!(!track.on_time_update(0.5));
        assert!(track.on_time_update(1.0));
        assert_eq!(track.displayed(), "Hello");
        assert!(!track.on_time_update(1.5));
        assert!(track.on_time_update(2.5));
        assert_eq!(track.displayed(), "");

        track.clear();
        assert!(track.is_empty());
    }
}
