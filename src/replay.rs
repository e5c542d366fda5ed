//! JSON-lines adapters: one `Frame` per input line, one `TrackedFrame` per
//! output line.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use crate::frame::{Frame, TrackedFrame};
use crate::pipeline::{LandmarkSink, LandmarkSource};

pub struct JsonLinesSource<R> {
    reader: R,
    line: Vec<u8>,
    line_no: usize,
    skipped: usize,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            line_no: 0,
            skipped: 0,
        }
    }

    /// パースできずに読み飛ばした行数
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<R: BufRead> LandmarkSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            self.line.clear();
            let n = self
                .reader
                .read_until(b'\n', &mut self.line)
                .with_context(|| format!("failed to read line {}", self.line_no + 1))?;
            if n == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let text = match std::str::from_utf8(&self.line) {
                Ok(text) => text.trim(),
                Err(e) => {
                    self.skipped += 1;
                    log::warn!("line {}: skipping non-UTF-8 frame: {}", self.line_no, e);
                    continue;
                }
            };
            if text.is_empty() {
                continue;
            }
            match serde_json::from_str::<Frame>(text) {
                Ok(frame) => return Ok(Some(frame)),
                Err(e) => {
                    self.skipped += 1;
                    log::warn!("line {}: skipping unparsable frame: {}", self.line_no, e);
                }
            }
        }
    }
}

pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> LandmarkSink for JsonLinesSink<W> {
    fn present(&mut self, frame: &TrackedFrame) -> Result<()> {
        serde_json::to_writer(&mut self.writer, frame)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::pipeline::FramePipeline;
    use std::io::Cursor;

    fn hand_line(t: f64, side: &str, x: f32) -> String {
        let kp = format!(r#"{{"x": {}, "y": 100.0, "score": 0.9}}"#, x);
        format!(
            r#"{{"timestamp_ms": {}, "width": 640, "height": 360, "detections": [{{"side": "{}", "keypoints": [{}]}}]}}"#,
            t,
            side,
            vec![kp; 21].join(",")
        )
    }

    #[test]
    fn test_source_skips_blank_and_bad_lines() {
        let input = format!("\n{}\nnot json\n\n{}\n", hand_line(0.0, "Left", 10.0), hand_line(33.0, "Left", 12.0));
        let mut source = JsonLinesSource::new(Cursor::new(input));

        let f1 = source.next_frame().unwrap().unwrap();
        assert_eq!(f1.timestamp_ms, 0.0);
        let f2 = source.next_frame().unwrap().unwrap();
        assert_eq!(f2.timestamp_ms, 33.0);
        assert!(source.next_frame().unwrap().is_none());
        assert_eq!(source.skipped(), 1);
    }

    #[test]
    fn test_source_skips_invalid_utf8_line() {
        let mut input = hand_line(0.0, "Right", 100.0).into_bytes();
        input.extend_from_slice(b"\n\xff\xfe garbage\n");
        input.extend_from_slice(hand_line(33.0, "Right", 102.0).as_bytes());

        let mut source = JsonLinesSource::new(Cursor::new(input));
        let mut sink = JsonLinesSink::new(Vec::new());
        let mut pipeline = FramePipeline::from_config(&Config::default());
        let stats = pipeline.run(&mut source, &mut sink).unwrap();

        assert_eq!(stats.presented, 2);
        assert_eq!(source.skipped(), 1);
        let output = String::from_utf8(sink.into_inner()).unwrap();
        let frames: Vec<TrackedFrame> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(frames[1].timestamp_ms, 33.0);
        assert_eq!(frames[0].detections[0].track_id, frames[1].detections[0].track_id);
    }

    #[test]
    fn test_frame_without_detections_field() {
        let mut source =
            JsonLinesSource::new(Cursor::new(r#"{"timestamp_ms": 5.0, "width": 10, "height": 10}"#));
        let frame = source.next_frame().unwrap().unwrap();
        assert!(frame.detections.is_empty());
    }

    #[test]
    fn test_replay_end_to_end() {
        let input = [
            hand_line(0.0, "Right", 100.0),
            hand_line(33.0, "Right", 103.0),
            hand_line(66.0, "Left", 400.0),
        ]
        .join("\n");

        let mut source = JsonLinesSource::new(Cursor::new(input));
        let mut sink = JsonLinesSink::new(Vec::new());
        let mut pipeline = FramePipeline::from_config(&Config::default());
        let stats = pipeline.run(&mut source, &mut sink).unwrap();
        assert_eq!(stats.presented, 3);

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let frames: Vec<TrackedFrame> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].detections[0].track_id, frames[1].detections[0].track_id);
        assert_ne!(frames[1].detections[0].track_id, frames[2].detections[0].track_id);
        assert_eq!(frames[0].detections[0].keypoints[0].confidence, Some(0.9));
    }

    #[test]
    fn test_sink_writes_track_id_as_number() {
        let mut sink = JsonLinesSink::new(Vec::new());
        let frame = TrackedFrame {
            timestamp_ms: 1.0,
            width: 2,
            height: 3,
            detections: vec![crate::frame::TrackedDetection {
                track_id: crate::tracker::TrackId(7),
                side: crate::landmark::Side::Face,
                keypoints: vec![],
                score: None,
            }],
        };
        sink.present(&frame).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(text.contains(r#""track_id":7"#));
        assert!(text.ends_with('\n'));
    }
}
