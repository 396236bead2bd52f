//! Client-side fold of real-time attendance deliveries.
//!
//! Fan-out is at-least-once and unordered, so a live view must merge each
//! delivered record by its (session, participant) key instead of appending.
//! Counts are derived from the folded set, never recomputed from storage.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use db::models::attendance_record::{AttendanceStatus, Classification, Model as Record};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    pub user_id: i64,
    pub status: AttendanceStatus,
    pub classification: Option<Classification>,
    pub joined_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RosterCounts {
    pub present: u64,
    pub late: u64,
    pub pending: u64,
    pub absent: u64,
}

/// In-memory view of one session's roster.
#[derive(Debug, Default)]
pub struct RosterView {
    session_id: Option<Uuid>,
    entries: HashMap<i64, RosterEntry>,
}

impl RosterView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a delivered record. Duplicates and reordered deliveries are
    /// absorbed: an entry only moves forward in `updated_at`.
    pub fn apply(&mut self, record: &Record) {
        if let Some(sid) = self.session_id {
            if sid != record.session_id {
                return; // not our session's topic
            }
        } else {
            self.session_id = Some(record.session_id);
        }

        let incoming = RosterEntry {
            user_id: record.user_id,
            status: record.status,
            classification: record.classification,
            joined_at: record.joined_at,
            updated_at: record.updated_at,
        };
        match self.entries.get(&record.user_id) {
            Some(existing) if existing.updated_at > incoming.updated_at => {}
            _ => {
                self.entries.insert(record.user_id, incoming);
            }
        }
    }

    pub fn counts(&self) -> RosterCounts {
        let mut counts = RosterCounts::default();
        for entry in self.entries.values() {
            match entry.status {
                AttendanceStatus::Present => counts.present += 1,
                AttendanceStatus::Late => counts.late += 1,
                AttendanceStatus::Pending => counts.pending += 1,
                AttendanceStatus::Absent => counts.absent += 1,
            }
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &RosterEntry> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(
        session_id: Uuid,
        user_id: i64,
        status: AttendanceStatus,
        minute: u32,
    ) -> Record {
        let ts = Utc.with_ymd_and_hms(2026, 9, 1, 9, minute, 0).unwrap();
        Record {
            session_id,
            user_id,
            status,
            classification: None,
            joined_at: Some(ts),
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn duplicate_delivery_leaves_counts_unchanged() {
        let sid = Uuid::new_v4();
        let mut view = RosterView::new();
        let r = record(sid, 1, AttendanceStatus::Present, 3);

        view.apply(&r);
        let once = view.counts();
        view.apply(&r);
        assert_eq!(view.counts(), once);
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn merge_is_order_independent() {
        let sid = Uuid::new_v4();
        let early = record(sid, 1, AttendanceStatus::Present, 3);
        let late_update = record(sid, 1, AttendanceStatus::Late, 20);
        let other = record(sid, 2, AttendanceStatus::Present, 5);

        let mut forward = RosterView::new();
        for r in [&early, &late_update, &other] {
            forward.apply(r);
        }
        let mut reversed = RosterView::new();
        for r in [&other, &late_update, &early] {
            reversed.apply(r);
        }

        assert_eq!(forward.counts(), reversed.counts());
        assert_eq!(
            forward.counts(),
            RosterCounts {
                present: 1,
                late: 1,
                ..Default::default()
            }
        );
    }

    #[test]
    fn foreign_session_records_are_ignored() {
        let sid = Uuid::new_v4();
        let mut view = RosterView::new();
        view.apply(&record(sid, 1, AttendanceStatus::Present, 3));
        view.apply(&record(Uuid::new_v4(), 2, AttendanceStatus::Present, 4));
        assert_eq!(view.len(), 1);
    }
}
