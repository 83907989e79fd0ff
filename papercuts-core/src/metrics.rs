// Display values derived from a session. Always recomputed from the current record;
// an optimize/regenerate call may change the inputs at any time.

use crate::pdf::PdfSession;

pub const MAX_PREVIEW_SUGGESTIONS: usize = 3;

pub fn pages_saved(session: &PdfSession) -> i64 {
    let after = session.pages_after.unwrap_or(session.pages_before);
    i64::from(session.pages_before) - i64::from(after)
}

/// Whole-percent ink reduction, or 0 when there is nothing to compare yet.
pub fn ink_reduced_percent(session: &PdfSession) -> i64 {
    match session.ink_after {
        Some(after) if session.ink_before > 0.0 => {
            ((1.0 - after / session.ink_before) * 100.0).round() as i64
        }
        _ => 0,
    }
}

pub fn preview_suggestions(session: &PdfSession) -> &[String] {
    let n = session.suggestions.len().min(MAX_PREVIEW_SUGGESTIONS);
    &session.suggestions[..n]
}

/// Ink coverage (0..1) as a whole percent for display.
pub fn ink_coverage_percent(ink: f64) -> i64 {
    (ink * 100.0).round() as i64
}
