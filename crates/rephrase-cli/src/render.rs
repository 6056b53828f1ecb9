use std::fmt::Write as _;

use rephrase_client::{Accumulator, KNOWN_STYLES, OutputSnapshot, SessionState, style_title};
use tokio::sync::watch;
use tracing::debug;

/// Outputs in presentation order: known styles first, then any others in
/// arrival order.
pub fn ordered(outputs: &Accumulator) -> Vec<(&str, &str)> {
    let mut rows: Vec<(&str, &str)> = KNOWN_STYLES
        .iter()
        .filter_map(|(key, _)| outputs.get(key).map(|text| (*key, text)))
        .collect();
    rows.extend(outputs.iter().filter(|(key, _)| style_title(key).is_none()));
    rows
}

/// Plain-text rendering, one titled block per style.
pub fn text(outputs: &Accumulator) -> String {
    let mut out = String::new();
    for (style, body) in ordered(outputs) {
        let title = style_title(style).unwrap_or(style);
        let _ = writeln!(out, "== {title} ==");
        let _ = writeln!(out, "{}\n", body.trim_end());
    }
    out
}

/// JSON rendering with the terminal state alongside the outputs.
pub fn json(outputs: &Accumulator, state: &SessionState) -> serde_json::Value {
    let (label, failure) = match state {
        SessionState::Idle => ("idle", None),
        SessionState::Streaming => ("streaming", None),
        SessionState::Completed => ("completed", None),
        SessionState::Cancelled => ("cancelled", None),
        SessionState::Failed(failure) => ("failed", Some(failure)),
    };
    serde_json::json!({
        "state": label,
        "failure": failure,
        "outputs": outputs,
    })
}

/// Logs output growth until the session drops its sender or the task is aborted.
pub async fn log_progress(mut updates: watch::Receiver<OutputSnapshot>) {
    while updates.changed().await.is_ok() {
        let snapshot = updates.borrow_and_update();
        let chars: usize = snapshot.iter().map(|(_, text)| text.chars().count()).sum();
        debug!(styles = snapshot.len(), chars, "received output");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rephrase_client::SessionFailure;

    fn sample() -> Accumulator {
        let mut acc = Accumulator::new();
        acc.apply("pirate", "Arr.");
        acc.apply("casual", "Hey, ");
        acc.apply("professional", "Dear team.");
        acc.apply("casual", "what's up?");
        acc
    }

    #[test]
    fn known_styles_come_first_then_extras() {
        let outputs = sample();
        let keys: Vec<&str> = ordered(&outputs).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["professional", "casual", "pirate"]);
    }

    #[test]
    fn text_uses_display_titles() {
        let rendered = text(&sample());
        assert!(rendered.starts_with("== Professional ==\nDear team.\n"));
        assert!(rendered.contains("== Casual ==\nHey, what's up?\n"));
        assert!(rendered.contains("== pirate ==\nArr.\n"));
    }

    #[test]
    fn json_carries_state_and_failure() {
        let state = SessionState::Failed(SessionFailure::Application {
            message: "boom".into(),
        });
        let value = json(&sample(), &state);
        assert_eq!(value["state"], "failed");
        assert_eq!(value["failure"]["kind"], "application");
        assert_eq!(value["failure"]["message"], "boom");
        assert_eq!(value["outputs"]["casual"], "Hey, what's up?");

        let value = json(&Accumulator::new(), &SessionState::Cancelled);
        assert_eq!(value["state"], "cancelled");
        assert!(value["failure"].is_null());
    }
}
