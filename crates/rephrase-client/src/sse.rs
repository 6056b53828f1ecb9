/// One blank-line delimited unit of the event stream, delimiter excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    text: String,
}

impl Frame {
    /// Creates a frame from already-delimited text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Returns the frame text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Iterates the frame's lines with any trailing `\r` removed.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text
            .split('\n')
            .map(|line| line.trim_end_matches('\r'))
    }
}

/// Reassembles frames from arbitrarily fragmented stream bytes.
///
/// Bytes are buffered raw and decoded as UTF-8 only once a whole frame is
/// available, so a multi-byte character split between two fragments is never
/// decoded in halves. The buffer only ever loses bytes that were emitted as a
/// frame (plus their delimiter).
#[derive(Debug, Default)]
pub struct FrameAssembler {
    buf: Vec<u8>,
}

impl FrameAssembler {
    /// Creates an empty assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fragment and returns every frame it completed, in order.
    pub fn feed(&mut self, fragment: &[u8]) -> Vec<Frame> {
        self.buf.extend_from_slice(fragment);
        let mut frames = Vec::new();
        while let Some((idx, delim_len)) = find_frame_delimiter(&self.buf) {
            let frame_bytes: Vec<u8> = self.buf.drain(..idx).collect();
            self.buf.drain(..delim_len);
            if frame_bytes.is_empty() {
                continue;
            }
            frames.push(Frame {
                text: String::from_utf8_lossy(&frame_bytes).into_owned(),
            });
        }
        frames
    }

    /// Text flavour of [`feed`](Self::feed).
    pub fn feed_str(&mut self, fragment: &str) -> Vec<Frame> {
        self.feed(fragment.as_bytes())
    }

    /// Number of buffered bytes not yet terminated by a delimiter.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Consumes the assembler and returns the unterminated tail, if any.
    pub fn finish(self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        Some(String::from_utf8_lossy(&self.buf).into_owned())
    }
}

fn find_frame_delimiter(buf: &[u8]) -> Option<(usize, usize)> {
    let mut i = 0;
    while i + 1 < buf.len() {
        if buf[i] == b'\n' && buf[i + 1] == b'\n' {
            return Some((i, 2));
        }
        if i + 3 < buf.len()
            && buf[i] == b'\r'
            && buf[i + 1] == b'\n'
            && buf[i + 2] == b'\r'
            && buf[i + 3] == b'\n'
        {
            return Some((i, 4));
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIRE: &str = "data: {\"type\":\"content\",\"style\":\"polite\",\"content\":\"Hi\"}\n\ndata: {}\n\n";

    fn texts(frames: &[Frame]) -> Vec<&str> {
        frames.iter().map(Frame::as_str).collect()
    }

    #[test]
    fn emits_every_frame_of_a_batch_in_order() {
        let mut assembler = FrameAssembler::new();
        let frames = assembler.feed_str(WIRE);
        assert_eq!(
            texts(&frames),
            vec![
                "data: {\"type\":\"content\",\"style\":\"polite\",\"content\":\"Hi\"}",
                "data: {}",
            ]
        );
        assert_eq!(assembler.pending(), 0);
        assert_eq!(assembler.finish(), None);
    }

    #[test]
    fn handles_partial_chunk_boundaries() {
        let mut assembler = FrameAssembler::new();
        assert!(assembler.feed(b"data: {\"type\":\"content\",\"sty").is_empty());
        assert!(assembler.feed(b"le\":\"casual\",\"content\":\"yo\"}\n").is_empty());
        let frames = assembler.feed(b"\ndata: {}");
        assert_eq!(frames.len(), 1);
        assert!(frames[0].as_str().contains("\"casual\""));
        assert_eq!(assembler.finish().as_deref(), Some("data: {}"));
    }

    #[test]
    fn delimiter_split_across_fragments_is_found_once() {
        let mut assembler = FrameAssembler::new();
        assert!(assembler.feed(b"data: {}\r\n\r").is_empty());
        let frames = assembler.feed(b"\ndata: {}\n");
        assert_eq!(texts(&frames), vec!["data: {}"]);
        let frames = assembler.feed(b"\n");
        assert_eq!(texts(&frames), vec!["data: {}"]);
        assert!(assembler.feed(b"").is_empty());
        assert_eq!(assembler.pending(), 0);
    }

    #[test]
    fn multibyte_character_split_between_fragments_survives() {
        let wire = "data: {\"type\":\"content\",\"style\":\"casual\",\"content\":\"caf\u{e9} \u{1f600}\"}\n\n";
        let bytes = wire.as_bytes();
        let emoji_start = wire.find('\u{1f600}').expect("emoji");
        let mut assembler = FrameAssembler::new();
        assert!(assembler.feed(&bytes[..emoji_start + 2]).is_empty());
        let frames = assembler.feed(&bytes[emoji_start + 2..]);
        assert_eq!(frames.len(), 1);
        assert!(frames[0].as_str().contains("caf\u{e9} \u{1f600}"));
    }

    #[test]
    fn every_split_point_yields_the_same_frames() {
        let whole = FrameAssembler::new().feed_str(WIRE);
        for split in 0..=WIRE.len() {
            let mut assembler = FrameAssembler::new();
            let mut frames = assembler.feed(&WIRE.as_bytes()[..split]);
            frames.extend(assembler.feed(&WIRE.as_bytes()[split..]));
            assert_eq!(frames, whole, "split at byte {split}");
        }
    }

    #[test]
    fn empty_frames_are_skipped() {
        let mut assembler = FrameAssembler::new();
        let frames = assembler.feed_str("\n\n\n\ndata: {}\n\n");
        assert_eq!(texts(&frames), vec!["data: {}"]);
    }

    #[test]
    fn lines_trim_carriage_returns() {
        let frame = Frame::new("event: x\r\ndata: {}\r");
        assert_eq!(frame.lines().collect::<Vec<_>>(), vec!["event: x", "data: {}"]);
    }
}
