use chrono::{DateTime, TimeZone, Utc};
use papercuts_core::dashboard::{DashboardSession, User};

// Baseline the mock analyzer reports for every uploaded document.
pub const MOCK_PAGES_BEFORE: u32 = 12;
pub const MOCK_INK_BEFORE: f64 = 0.42;
pub const MOCK_OPTIMIZING_SCORE: u32 = 64;

pub fn mock_diagnosis() -> Vec<String> {
    vec![
        "Large solid-fill headers on every page".into(),
        "Wide margins leave roughly a third of each page empty".into(),
        "Full-bleed background image on the cover".into(),
    ]
}

pub fn mock_recommendations() -> Vec<String> {
    vec![
        "Switch header fills to outlines to cut toner use".into(),
        "Reduce margins and line spacing to reclaim page area".into(),
        "Drop the cover background or print it in draft mode".into(),
        "Merge short trailing sections onto preceding pages".into(),
    ]
}

pub fn mock_changes_applied(ink_saver_level: u8, page_saver_level: u8) -> Vec<String> {
    let mut out = vec!["Generated optimization report with 3 recommendations".to_string()];
    if ink_saver_level > 0 {
        out.push(format!("Lightened dense fills (ink saver {ink_saver_level}%)"));
    }
    if page_saver_level > 0 {
        out.push(format!("Tightened layout (page saver {page_saver_level}%)"));
    }
    out
}

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).single()
}

pub fn seed_users() -> Vec<User> {
    vec![
        User {
            id: "u-1".into(),
            user_id: "user-001".into(),
            name: "Avery Chen".into(),
            is_admin: true,
            num_user: 1,
            session_ids: vec!["1".into(), "2".into(), "4".into()],
            created_at: at(2026, 2, 1, 9, 0),
        },
        User {
            id: "u-2".into(),
            user_id: "user-002".into(),
            name: "Jordan Patel".into(),
            is_admin: false,
            num_user: 2,
            session_ids: vec!["3".into()],
            created_at: at(2026, 2, 3, 14, 30),
        },
    ]
}

pub fn seed_sessions() -> Vec<DashboardSession> {
    let entry = |id: &str, user: &str, pages: u32, ink: f64, score: u32, when| DashboardSession {
        id: id.into(),
        session_id: None,
        user_id: user.into(),
        pages,
        ink_use: ink,
        optimizing_score: score,
        created_at: when,
    };
    vec![
        entry("1", "user-001", 4, 0.12, 71, at(2026, 2, 7, 10, 30)),
        entry("2", "user-001", 2, 0.08, 88, at(2026, 2, 6, 14, 0)),
        entry("3", "user-002", 6, 0.21, 55, at(2026, 2, 7, 9, 0)),
        entry("4", "user-001", 1, 0.05, 93, at(2026, 2, 7, 11, 0)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_users_reference_seeded_sessions() {
        let sessions = seed_sessions();
        for user in seed_users() {
            for id in &user.session_ids {
                let s = sessions.iter().find(|s| &s.id == id).unwrap();
                assert_eq!(s.user_id, user.user_id);
            }
        }
    }

    #[test]
    fn changes_reflect_levels() {
        assert_eq!(mock_changes_applied(0, 0).len(), 1);
        assert_eq!(mock_changes_applied(40, 10).len(), 3);
    }
}
