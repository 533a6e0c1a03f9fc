use scribe_core::{AppViewModel, NoticeKind, SessionPhase};

const BAR_SLOTS: usize = 20;

/// Prints the current session status line, and the progress bar while the
/// body poll is active.
pub fn render(view: &AppViewModel) {
    let session_label = match view.session {
        SessionPhase::Idle => "Idle",
        SessionPhase::Requesting(_) => "Requesting",
        SessionPhase::Polling => "Polling",
    };
    match view.operation_label {
        Some(operation) => println!("Session: {session_label} | {operation}"),
        None => println!("Session: {session_label}"),
    }
    if view.progress_visible {
        let section = if view.current_section.is_empty() {
            String::new()
        } else {
            format!(" — {}", view.current_section)
        };
        println!(
            "  {} {:>3}%{}",
            progress_bar(view.progress_percent),
            view.progress_percent,
            section
        );
    }
}

/// Prints one notification line; this is the `notify(kind, message)`
/// surface of the page.
pub fn notice(kind: NoticeKind, message: &str) {
    let tag = match kind {
        NoticeKind::Success => "ok",
        NoticeKind::Info => "info",
        NoticeKind::Warning => "warn",
        NoticeKind::Danger => "error",
    };
    println!("[{tag}] {message}");
}

/// Prints a closing summary of what the manuscript now contains.
pub fn summary(view: &AppViewModel) {
    if let Some(count) = view.outline_sections {
        println!("Outline: {count} leaf sections");
    }
    for slot in &view.outputs {
        println!(
            "{}: {} chars",
            slot.action.display_name(),
            slot.content.chars().count()
        );
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = (usize::from(percent.min(100)) * BAR_SLOTS) / 100;
    let mut bar = String::with_capacity(BAR_SLOTS + 2);
    bar.push('[');
    for i in 0..BAR_SLOTS {
        bar.push(if i < filled { '#' } else { '.' });
    }
    bar.push(']');
    bar
}
