use serde::ser::SerializeMap as _;

/// Style keys the server is known to produce, with display titles, in
/// presentation order. Other keys are accepted and accumulated too.
pub const KNOWN_STYLES: [(&str, &str); 4] = [
    ("professional", "Professional"),
    ("casual", "Casual"),
    ("polite", "Polite"),
    ("social-media", "Social Media"),
];

/// Returns the display title for a style key, if it is a known one.
pub fn style_title(style: &str) -> Option<&'static str> {
    KNOWN_STYLES
        .iter()
        .find(|(key, _)| *key == style)
        .map(|(_, title)| *title)
}

/// Per-style running concatenation of content deltas.
///
/// Entries appear lazily on the first delta for a key and keep their
/// insertion order. Text only ever grows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Accumulator {
    entries: Vec<(String, String)>,
}

/// Owned, read-only copy of an [`Accumulator`] handed to observers.
pub type OutputSnapshot = Accumulator;

impl Accumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `delta` to the text for `style`, creating the entry if needed.
    pub fn apply(&mut self, style: &str, delta: &str) {
        match self.entries.iter_mut().find(|(key, _)| key == style) {
            Some((_, text)) => text.push_str(delta),
            None => self.entries.push((style.to_string(), delta.to_string())),
        }
    }

    /// Returns the accumulated text for `style`.
    pub fn get(&self, style: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == style)
            .map(|(_, text)| text.as_str())
    }

    /// Iterates `(style, text)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, text)| (key.as_str(), text.as_str()))
    }

    /// Number of styles with output.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no delta has been applied.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an owned copy of the current state.
    pub fn snapshot(&self) -> OutputSnapshot {
        self.clone()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl serde::Serialize for Accumulator {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (style, text) in &self.entries {
            map.serialize_entry(style, text)?;
        }
        map.end()
    }
}
