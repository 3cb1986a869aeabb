//! Recorded input scripts.
//!
//! One JSON object per line, ordered by `atMs` (offset from replay start):
//!
//! ```text
//! {"atMs": 0,   "kind": "transcript", "text": "create two objects"}
//! {"atMs": 40,  "kind": "hand", "hands": [[{"x":0.5,"y":0.7,"z":0.0}, ... 21 points]]}
//! {"atMs": 60,  "kind": "face", "landmarks": [... 468 points]}
//! {"atMs": 900, "kind": "unavailable", "capability": "hand_tracking", "detail": "camera lost"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use aura_core::{Capability, FaceFrame, HandFrame, HandLandmarks, InputSink, Landmark};
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptLine {
    pub at_ms: u64,
    #[serde(flatten)]
    pub input: ScriptInput,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptInput {
    Hand {
        #[serde(default)]
        hands: Vec<Vec<Landmark>>,
    },
    Face {
        landmarks: Vec<Landmark>,
    },
    Transcript {
        text: String,
    },
    Unavailable {
        capability: Capability,
        #[serde(default)]
        detail: Option<String>,
    },
}

/// Parse a whole script. Fails on the first malformed line, naming it.
pub fn parse_script(raw: &str) -> Result<Vec<ScriptLine>> {
    let mut lines = Vec::new();
    let mut last_at = 0;
    for (n, line) in raw.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let parsed: ScriptLine = serde_json::from_str(trimmed)
            .with_context(|| format!("script line {}", n + 1))?;
        if parsed.at_ms < last_at {
            bail!(
                "script line {}: atMs {} goes back in time (previous {})",
                n + 1,
                parsed.at_ms,
                last_at
            );
        }
        last_at = parsed.at_ms;
        lines.push(parsed);
    }
    Ok(lines)
}

/// Build the hand frame for one line. Hands with too few landmarks are
/// dropped, the same way a tracker glitch would read.
pub fn hand_frame(hands: &[Vec<Landmark>], timestamp_ms: u64) -> HandFrame {
    let hands = hands
        .iter()
        .filter_map(|points| match HandLandmarks::new(points.clone()) {
            Ok(hand) => Some(hand),
            Err(e) => {
                warn!("skipping scripted hand: {e}");
                None
            }
        })
        .collect();
    HandFrame::new(hands, timestamp_ms)
}

/// Push every line into the engine at its offset. Frames are stamped with
/// engine time at the moment they are pushed.
pub async fn replay(lines: &[ScriptLine], sink: &InputSink) -> Result<usize> {
    let start = tokio::time::Instant::now();
    let mut accepted = 0;
    for line in lines {
        tokio::time::sleep_until(start + Duration::from_millis(line.at_ms)).await;
        let now = sink.now_ms();
        let queued = match &line.input {
            ScriptInput::Hand { hands } => sink.push_hand_frame(hand_frame(hands, now))?,
            ScriptInput::Face { landmarks } => {
                sink.push_face_frame(FaceFrame::new(landmarks.clone(), now))?
            }
            ScriptInput::Transcript { text } => sink.push_transcript(text.as_str())?,
            ScriptInput::Unavailable { capability, detail } => {
                sink.report_unavailable(*capability, detail.clone())?
            }
        };
        if queued {
            accepted += 1;
        } else {
            debug!(at_ms = line.at_ms, "input queue full, scripted input dropped");
        }
    }
    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_kind_and_skips_comments() {
        let raw = r#"
# warm-up
{"atMs": 0, "kind": "transcript", "text": "aura"}
{"atMs": 10, "kind": "hand", "hands": []}
{"atMs": 20, "kind": "face", "landmarks": [{"x": 0.1, "y": 0.2, "z": 0.0}]}
{"atMs": 30, "kind": "unavailable", "capability": "speech_recognition"}
"#;
        let lines = parse_script(raw).unwrap();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0].input,
            ScriptInput::Transcript {
                text: "aura".into()
            }
        );
        assert_eq!(lines[1].input, ScriptInput::Hand { hands: vec![] });
        assert!(matches!(&lines[2].input, ScriptInput::Face { landmarks } if landmarks.len() == 1));
        assert_eq!(
            lines[3].input,
            ScriptInput::Unavailable {
                capability: Capability::SpeechRecognition,
                detail: None
            }
        );
    }

    #[test]
    fn unknown_kind_names_the_line() {
        let err = parse_script("{\"atMs\": 0, \"kind\": \"voice\"}").unwrap_err();
        assert!(format!("{err:#}").contains("script line 1"));
    }

    #[test]
    fn out_of_order_offsets_are_rejected() {
        let raw = "{\"atMs\": 50, \"kind\": \"transcript\", \"text\": \"red\"}\n\
                   {\"atMs\": 10, \"kind\": \"transcript\", \"text\": \"blue\"}";
        let err = parse_script(raw).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn short_hands_are_dropped_from_the_frame() {
        let full = vec![Landmark::new(0.5, 0.5, 0.0); 21];
        let short = vec![Landmark::new(0.5, 0.5, 0.0); 4];
        let frame = hand_frame(&[short, full], 7);
        assert_eq!(frame.hands.len(), 1);
        assert_eq!(frame.timestamp_ms, 7);
    }
}
