//! CSV export of a session's attendance.
//!
//! Layout: session header fields, summary counts, then one row per
//! participant (name, email, status, join time).

use chrono::{DateTime, SecondsFormat, Utc};
use db::models::attendance_record::AttendanceCounts;
use db::models::training_session::Model as Session;

#[derive(Debug, Clone)]
pub struct ExportRow {
    pub name: String,
    pub email: String,
    pub status: String,
    pub joined_at: Option<DateTime<Utc>>,
}

/// `attendance-<sessionTitle>-<sessionDate>.csv`, with the title reduced to
/// filesystem-safe characters.
pub fn export_filename(session: &Session) -> String {
    let title: String = session
        .title
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    let title = title.trim_matches('-').to_lowercase();
    format!("attendance-{}-{}.csv", title, session.scheduled_date)
}

pub fn render_csv(session: &Session, counts: &AttendanceCounts, rows: &[ExportRow]) -> String {
    let mut csv = String::new();

    csv.push_str(&format!("Session,{}\n", esc(&session.title)));
    csv.push_str(&format!("Date,{}\n", session.scheduled_date));
    csv.push_str(&format!(
        "Time,{} - {}\n",
        session.start_time.format("%H:%M"),
        session.end_time.format("%H:%M")
    ));
    csv.push_str(&format!("Status,{}\n", session.status));
    csv.push_str(&format!(
        "Present,{}\nLate,{}\nTotal,{}\n\n",
        counts.present, counts.late, counts.total
    ));

    csv.push_str("name,email,status,join_time\n");
    for row in rows {
        let joined = row
            .joined_at
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default();
        csv.push_str(&format!(
            "{},{},{},{}\n",
            esc(&row.name),
            esc(&row.email),
            esc(&row.status),
            esc(&joined)
        ));
    }
    csv
}

fn esc(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, TimeZone};
    use db::models::training_session::SessionStatus;
    use uuid::Uuid;

    fn session(title: &str) -> Session {
        let now = Utc::now();
        Session {
            id: Uuid::new_v4(),
            category_id: 1,
            trainer_id: 1,
            title: title.to_string(),
            description: None,
            scheduled_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            status: SessionStatus::Completed,
            actual_start_time: None,
            actual_end_time: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn filename_follows_pattern_and_is_sanitized() {
        let s = session("Fire Drill: Block B!");
        assert_eq!(export_filename(&s), "attendance-fire-drill--block-b-2026-09-01.csv");
    }

    #[test]
    fn csv_contains_header_summary_and_rows() {
        let s = session("Drill");
        let counts = AttendanceCounts {
            present: 1,
            late: 1,
            total: 2,
        };
        let joined = Utc.with_ymd_and_hms(2026, 9, 1, 9, 3, 0).unwrap();
        let rows = vec![
            ExportRow {
                name: "Ada".into(),
                email: "ada@test.com".into(),
                status: "present".into(),
                joined_at: Some(joined),
            },
            ExportRow {
                name: "Bob, Jr.".into(),
                email: "bob@test.com".into(),
                status: "late".into(),
                joined_at: None,
            },
        ];

        let csv = render_csv(&s, &counts, &rows);
        assert!(csv.starts_with("Session,Drill\n"));
        assert!(csv.contains("Present,1\nLate,1\nTotal,2\n"));
        assert!(csv.contains("name,email,status,join_time\n"));
        assert!(csv.contains("Ada,ada@test.com,present,2026-09-01T09:03:00Z\n"));
        // comma in the name forces quoting
        assert!(csv.contains("\"Bob, Jr.\",bob@test.com,late,\n"));
    }
}
