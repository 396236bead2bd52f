//! Session lifecycle sweeper.
//!
//! Completes any still-active session whose scheduled end has passed. The
//! status predicate makes re-sweeping a no-op, so concurrent invocations
//! (the background task plus the manual `/system/sweep` trigger) are safe
//! without a lock.

use chrono::{DateTime, Utc};
use db::DomainError;
use db::models::training_session::{Column, Entity, SessionStatus};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepOutcome {
    pub completed: u64,
    pub session_ids: Vec<Uuid>,
}

/// Transitions every overdue active session to completed, stamping
/// `actual_end_time = now`. Returns what was completed this pass.
pub async fn sweep(db: &DatabaseConnection, now: DateTime<Utc>) -> Result<SweepOutcome, DomainError> {
    let candidates = Entity::find()
        .filter(Column::Status.eq(SessionStatus::Active))
        .all(db)
        .await?;

    let mut outcome = SweepOutcome::default();
    for session in candidates {
        if session.ends_at() > now {
            continue;
        }
        let id = session.id;
        match session.transition(db, SessionStatus::Completed, now).await {
            Ok(_) => {
                outcome.completed += 1;
                outcome.session_ids.push(id);
            }
            // Lost a race with another sweeper; the predicate already
            // excluded it there, so skip rather than fail the pass.
            Err(DomainError::InvalidState(_)) => {
                tracing::debug!(session_id = %id, "session completed by a concurrent sweep");
            }
            Err(e) => return Err(e),
        }
    }

    if outcome.completed > 0 {
        tracing::info!(completed = outcome.completed, "sweep completed stale sessions");
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, TimeZone};
    use db::models::{category, training_session, user};
    use db::test_utils::setup_test_db;

    async fn session_ending_at_ten(db: &DatabaseConnection) -> training_session::Model {
        let trainer = user::Model::create(db, "tr", "tr@test.com", "pw", user::Role::Trainer)
            .await
            .unwrap();
        let cat = category::Model::create(db, "Ops", None).await.unwrap();
        training_session::Model::create(
            db,
            cat.id,
            trainer.id,
            "Morning",
            None,
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn completes_overdue_sessions_and_stamps_end_time() {
        let db = setup_test_db().await;
        let nine = Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0).unwrap();
        let sess = session_ending_at_ten(&db)
            .await
            .transition(&db, SessionStatus::Active, nine)
            .await
            .unwrap();

        let five_past_ten = Utc.with_ymd_and_hms(2026, 9, 1, 10, 5, 0).unwrap();
        let outcome = sweep(&db, five_past_ten).await.unwrap();
        assert_eq!(outcome.completed, 1);
        assert_eq!(outcome.session_ids, vec![sess.id]);

        let reloaded = training_session::Model::find_by_id(&db, sess.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.status, SessionStatus::Completed);
        assert_eq!(reloaded.actual_end_time, Some(five_past_ten));
    }

    #[tokio::test]
    async fn sweep_is_idempotent() {
        let db = setup_test_db().await;
        let nine = Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0).unwrap();
        session_ending_at_ten(&db)
            .await
            .transition(&db, SessionStatus::Active, nine)
            .await
            .unwrap();

        let now = Utc.with_ymd_and_hms(2026, 9, 1, 10, 5, 0).unwrap();
        let first = sweep(&db, now).await.unwrap();
        let second = sweep(&db, now).await.unwrap();
        assert_eq!(first.completed, 1);
        assert_eq!(second.completed, 0);
        assert!(second.session_ids.is_empty());
    }

    #[tokio::test]
    async fn leaves_running_and_scheduled_sessions_alone() {
        let db = setup_test_db().await;
        let nine = Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0).unwrap();
        let active = session_ending_at_ten(&db)
            .await
            .transition(&db, SessionStatus::Active, nine)
            .await
            .unwrap();

        // at 09:30 the session is still inside its scheduled window
        let half_past = Utc.with_ymd_and_hms(2026, 9, 1, 9, 30, 0).unwrap();
        let outcome = sweep(&db, half_past).await.unwrap();
        assert_eq!(outcome.completed, 0);

        let reloaded = training_session::Model::find_by_id(&db, active.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.status, SessionStatus::Active);
    }
}
