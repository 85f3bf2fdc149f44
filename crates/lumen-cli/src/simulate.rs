//! Offline scheduler: drives the engine the way an audio host would

use std::io::Write;

use anyhow::Result;
use lumen_core::{Engine, EngineSnapshot, midi_to_freq};
use serde::Serialize;

/// One line of output
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub(crate) enum Event<'a> {
    Phrase {
        time: f64,
        snapshot: &'a EngineSnapshot,
    },
    Hit {
        time: f64,
        lane: usize,
        note: u8,
        frequency: f64,
        level: f64,
    },
}

/// Run `phrases` phrase boundaries starting at `start`, ticking the
/// sequencer in between, and write one JSON line per event.
pub(crate) fn run(
    engine: &mut Engine,
    start: f64,
    phrases: u32,
    out: &mut impl Write,
) -> Result<()> {
    let snapshot = engine.snapshot();
    emit(out, &Event::Phrase { time: start, snapshot: &snapshot })?;

    let mut now = start;
    for _ in 0..phrases {
        let boundary = engine.harmony().next_phrase_time;
        let step = engine.step_seconds();

        let mut t = now;
        while t < boundary {
            for hit in engine.tick() {
                emit(
                    out,
                    &Event::Hit {
                        time: t,
                        lane: hit.lane,
                        note: hit.note,
                        frequency: midi_to_freq(hit.note as f64),
                        level: hit.level,
                    },
                )?;
            }
            t += step;
        }

        now = boundary;
        let snapshot = engine.on_phrase_boundary(now);
        emit(out, &Event::Phrase { time: now, snapshot: &snapshot })?;
    }

    out.flush()?;
    Ok(())
}

fn emit(out: &mut impl Write, event: &Event) -> Result<()> {
    serde_json::to_writer(&mut *out, event)?;
    out.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::EngineParams;

    #[test]
    fn test_run_emits_one_line_per_event() {
        let mut engine: Engine = Engine::new("cli", 0.0, EngineParams::default());
        let mut out = Vec::new();
        run(&mut engine, 0.0, 2, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        let phrases = lines.iter().filter(|v| v["event"] == "phrase").count();
        let hits = lines.iter().filter(|v| v["event"] == "hit").count();
        assert_eq!(phrases, 3);
        // Tresillo lead over two 64-step phrases
        assert_eq!(hits, 48);
        assert_eq!(lines.last().unwrap()["snapshot"]["phrase_index"], 2);
    }
}
