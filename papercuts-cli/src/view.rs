// Plain-text rendering of controller snapshots. Nothing here talks to the backend.

use std::fmt::Write as _;

use papercuts_core::dashboard::{OrgMetrics, SessionsResponse, UsersResponse};
use papercuts_core::metrics::{self, ink_coverage_percent};
use papercuts_core::pdf::PdfSession;
use papercuts_core::settings::OptimizeSettings;
use papercuts_engine::session::{WorkflowStatus, WorkflowStep};
use papercuts_engine::traits::PdfApi;

/// Download locations for a session, derived from the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Links {
    pub original: String,
    pub optimized: String,
    pub report: String,
}

impl Links {
    pub fn for_session(api: &dyn PdfApi, session: &PdfSession) -> Self {
        Self {
            original: api.original_url(&session.id),
            optimized: api.optimized_url(&session.id),
            report: api.report_download_url(&session.id),
        }
    }
}

pub fn step_indicator(current: WorkflowStep) -> String {
    WorkflowStep::ALL
        .iter()
        .map(|step| {
            let label = format!("{} {}", step.index() + 1, step.label());
            if *step == current {
                format!("[{label}]")
            } else {
                label
            }
        })
        .collect::<Vec<_>>()
        .join(" > ")
}

pub fn connection_line(connected: Option<bool>) -> Option<&'static str> {
    match connected {
        Some(true) => Some("backend: connected"),
        Some(false) => Some("backend: OFFLINE (requests will fail until it is reachable)"),
        None => None,
    }
}

fn settings_line(s: &OptimizeSettings) -> String {
    format!(
        "ink saver {}% | page saver {}% | preserve quality: {} | exclude images: {}",
        s.ink_saver_level,
        s.page_saver_level,
        if s.preserve_quality { "yes" } else { "no" },
        if s.exclude_images { "yes" } else { "no" },
    )
}

pub fn render_status(status: &WorkflowStatus, links: Option<&Links>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", step_indicator(status.step));
    if let Some(line) = connection_line(status.connected) {
        let _ = writeln!(out, "{line}");
    }
    if status.is_loading {
        let _ = writeln!(out, "working...");
    }
    if let Some(err) = &status.error {
        let _ = writeln!(out, "error: {err}");
        let _ = writeln!(out, "(type 'retry' to dismiss)");
    }
    out.push('\n');

    if !status.has_session() {
        let _ = writeln!(out, "Choose a PDF to analyze (max 50MB): upload <path>");
        return out;
    }
    match (status.step, &status.session) {
        (WorkflowStep::Upload, _) | (_, None) => {
            let _ = writeln!(out, "Choose a PDF to analyze (max 50MB): upload <path>");
        }
        (WorkflowStep::Results, Some(session)) => render_results(&mut out, status, session),
        (WorkflowStep::Preview, Some(session)) => {
            render_preview(&mut out, status, session, links)
        }
    }
    out
}

fn render_results(out: &mut String, status: &WorkflowStatus, session: &PdfSession) {
    let _ = writeln!(out, "Analysis of {}", session.original_file_name);
    let _ = writeln!(out, "  pages:      {}", session.pages_before);
    let _ = writeln!(
        out,
        "  ink:        {}% coverage",
        ink_coverage_percent(session.ink_before)
    );
    if let Some(score) = session.optimizing_score {
        let _ = writeln!(out, "  score:      {score}/100");
    }
    let suggestions = status.preview_suggestions();
    if !suggestions.is_empty() {
        let _ = writeln!(out, "Suggestions:");
        for s in suggestions {
            let _ = writeln!(out, "  - {s}");
        }
    }
    let _ = writeln!(out, "Settings: {}", settings_line(&status.settings));
    let _ = writeln!(out, "Next: adjust with ink/pages/quality/images, then 'optimize'");
}

fn render_preview(
    out: &mut String,
    status: &WorkflowStatus,
    session: &PdfSession,
    links: Option<&Links>,
) {
    let _ = writeln!(out, "Optimized {}", session.original_file_name);
    let _ = writeln!(
        out,
        "  pages:      {} -> {} (saved {})",
        session.pages_before,
        session.pages_after.unwrap_or(session.pages_before),
        status.pages_saved().unwrap_or(0)
    );
    let _ = writeln!(
        out,
        "  ink:        reduced {}%",
        status.ink_reduced_percent().unwrap_or(0)
    );
    if !session.changes_applied.is_empty() {
        let _ = writeln!(out, "Changes applied:");
        for c in &session.changes_applied {
            let _ = writeln!(out, "  - {c}");
        }
    }
    let _ = writeln!(out, "Settings: {}", settings_line(&status.settings));
    if let Some(applied) = session.applied_settings().filter(|a| *a != status.settings) {
        let _ = writeln!(out, "Applied:  {} (regenerate to update)", settings_line(&applied));
    }
    if let Some(links) = links {
        let _ = writeln!(out, "Original:  {}", links.original);
        let _ = writeln!(out, "Optimized: {}", links.optimized);
        let _ = writeln!(out, "Report:    {}", links.report);
    }
    let _ = writeln!(out, "Next: 'regenerate' with new settings, or 'reset' for another file");
}

pub fn render_session(session: &PdfSession) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "session {} ({})", session.id, session.status.label());
    let _ = writeln!(out, "  file:   {}", session.original_file_name);
    let _ = writeln!(
        out,
        "  pages:  {} -> {}",
        session.pages_before,
        session
            .pages_after
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".into())
    );
    let _ = writeln!(
        out,
        "  ink:    {} -> {}",
        session.ink_before,
        session
            .ink_after
            .map(|i| format!("{i:.4}"))
            .unwrap_or_else(|| "-".into())
    );
    if let Some(score) = session.optimizing_score {
        let _ = writeln!(out, "  score:  {score}");
    }
    if session.status.is_past_analyzed() {
        let _ = writeln!(
            out,
            "  saved:  {} page(s), {}% ink",
            metrics::pages_saved(session),
            metrics::ink_reduced_percent(session)
        );
    }
    out
}

pub fn render_sessions(resp: &SessionsResponse) -> String {
    let mut out = format!("{} session(s)\n", resp.total);
    for s in &resp.sessions {
        let _ = writeln!(
            out,
            "  {:<6} {:<12} pages {:>4}  ink {:>6.2}  score {:>3}",
            s.id, s.user_id, s.pages, s.ink_use, s.optimizing_score
        );
    }
    out
}

pub fn render_users(resp: &UsersResponse) -> String {
    let mut out = format!("{} user(s)\n", resp.total);
    for u in &resp.users {
        let _ = writeln!(
            out,
            "  {:<12} {:<20}{} sessions: {}",
            u.user_id,
            u.name,
            if u.is_admin { " (admin)" } else { "" },
            u.session_ids.len()
        );
    }
    out
}

pub fn render_org_metrics(m: &OrgMetrics) -> String {
    format!(
        "pages saved:     {}\nink saved:       {:.2}\navg score:       {:.1}\ntotal sessions:  {}\n",
        m.total_pages_saved, m.total_ink_saved, m.avg_optimizing_score, m.total_sessions
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use papercuts_core::types::{SessionId, SessionStatus};

    fn analyzed() -> PdfSession {
        PdfSession {
            id: SessionId::new("s1"),
            user_id: None,
            original_file_name: "report.pdf".into(),
            pages_before: 42,
            ink_before: 0.18,
            pages_after: None,
            ink_after: None,
            optimizing_score: Some(82),
            suggestions: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            changes_applied: vec![],
            ink_saver_level: None,
            page_saver_level: None,
            preserve_quality: None,
            exclude_images: None,
            status: SessionStatus::Analyzed,
            created_at: None,
            expires_at: None,
        }
    }

    fn status(step: WorkflowStep, session: Option<PdfSession>) -> WorkflowStatus {
        WorkflowStatus {
            step,
            session,
            settings: OptimizeSettings::default(),
            is_loading: false,
            error: None,
            connected: None,
        }
    }

    #[test]
    fn indicator_brackets_current_step() {
        assert_eq!(
            step_indicator(WorkflowStep::Results),
            "1 Upload > [2 Results] > 3 Preview"
        );
    }

    #[test]
    fn results_card_shows_first_three_suggestions() {
        let text = render_status(&status(WorkflowStep::Results, Some(analyzed())), None);
        assert!(text.contains("pages:      42"));
        assert!(text.contains("18% coverage"));
        assert!(text.contains("score:      82/100"));
        assert!(text.contains("  - c\n"));
        assert!(!text.contains("  - d\n"));
    }

    #[test]
    fn preview_card_shows_savings_and_links() {
        let mut s = analyzed();
        s.pages_after = Some(39);
        s.ink_after = Some(0.12);
        s.status = SessionStatus::Complete;
        let links = Links {
            original: "http://x/api/pdf/s1/original".into(),
            optimized: "http://x/api/pdf/s1/optimized".into(),
            report: "http://x/api/pdf/s1/report/download".into(),
        };
        let text = render_status(&status(WorkflowStep::Preview, Some(s)), Some(&links));
        assert!(text.contains("42 -> 39 (saved 3)"));
        assert!(text.contains("reduced 33%"));
        assert!(text.contains("Optimized: http://x/api/pdf/s1/optimized"));
    }

    #[test]
    fn preview_shows_pending_settings_next_to_applied_ones() {
        let mut s = analyzed();
        s.pages_after = Some(39);
        s.ink_after = Some(0.12);
        s.ink_saver_level = Some(50);
        s.page_saver_level = Some(50);
        s.preserve_quality = Some(true);
        s.exclude_images = Some(false);
        s.status = SessionStatus::Complete;
        let mut st = status(WorkflowStep::Preview, Some(s));
        st.settings = OptimizeSettings::default().with_ink_saver_level(80);

        let text = render_status(&st, None);
        assert!(text.contains("Settings: ink saver 80% | page saver 50%"));
        assert!(text.contains("Applied:  ink saver 50%"));

        st.settings = OptimizeSettings::default();
        let text = render_status(&st, None);
        assert!(text.contains("Settings: ink saver 50%"));
        assert!(!text.contains("Applied:"));
    }

    #[test]
    fn session_summary_shows_savings_once_optimized() {
        let mut s = analyzed();
        assert!(!render_session(&s).contains("saved:"));
        s.pages_after = Some(39);
        s.ink_after = Some(0.12);
        s.status = SessionStatus::Complete;
        assert!(render_session(&s).contains("saved:  3 page(s), 33% ink"));
    }

    #[test]
    fn error_and_offline_are_visible() {
        let mut st = status(WorkflowStep::Upload, None);
        st.error = Some("disk full".into());
        st.connected = Some(false);
        let text = render_status(&st, None);
        assert!(text.contains("error: disk full"));
        assert!(text.contains("OFFLINE"));
        assert!(text.contains("upload <path>"));
    }
}
