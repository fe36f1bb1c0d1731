use docqa_core::{AppViewModel, RequestKind, Role, SessionState};
use docqa_logging::excerpt;

const READING_EXCERPT_CHARS: usize = 60;

/// Renders the view model as plain terminal lines.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    let session_label = match (view.session, view.file_name.as_deref()) {
        (SessionState::DocumentReady, Some(name)) => format!("Document: {name}"),
        (SessionState::DocumentReady, None) => "Document ready".to_string(),
        (SessionState::NoDocument, Some(name)) if view.can_upload => {
            format!("Selected: {name} (type `upload`)")
        }
        (SessionState::NoDocument, Some(name)) => format!("Selected: {name}"),
        (SessionState::NoDocument, None) => "No document (type `open <path>`)".to_string(),
    };
    lines.push(format!("== DocQA == {session_label}"));

    if view.messages.is_empty() {
        lines.push("  Upload a document to start your research.".to_string());
    }
    for (index, message) in view.messages.iter().enumerate() {
        let speaker = match message.role {
            Role::User => "You".to_string(),
            Role::Assistant => format!("Assistant {}", listen_label(message.is_reading)),
        };
        lines.push(format!("  {}. {}: {}", index + 1, speaker, message.content));
        for citation in &message.citations {
            lines.push(format!("       Pg {}: {}", citation.page, citation.content));
        }
    }

    if let Some(summary) = &view.summary {
        lines.push(format!(
            "  Summary {}: {}",
            listen_label(summary.is_reading),
            summary.text
        ));
    }
    if let Some(text) = &view.reading {
        lines.push(format!(
            "  Reading aloud: {} (type `stop`)",
            excerpt(text, READING_EXCERPT_CHARS)
        ));
    }
    if let Some(kind) = view.busy {
        lines.push(format!("  ... {}", busy_label(kind)));
    }
    if let Some(notice) = &view.notice {
        lines.push(format!("  ! {notice} (type `dismiss`)"));
    }
    lines
}

fn listen_label(is_reading: bool) -> &'static str {
    if is_reading {
        "[reading, `stop`]"
    } else {
        "[listen]"
    }
}

fn busy_label(kind: RequestKind) -> &'static str {
    match kind {
        RequestKind::Upload => "Uploading and analyzing document",
        RequestKind::Ask => "Analyzing context",
        RequestKind::Summary => "Generating summary",
        RequestKind::Delete => "Deleting document",
    }
}
