use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{DatabaseConnection, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::error::DomainError;
use crate::models::attendance_record::Classification;

/// A scheduled training session. Sessions are identified by UUID because the
/// id travels inside printed/displayed QR payloads.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "training_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub category_id: i64,
    pub trainer_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_date: Date,
    pub start_time: Time,
    pub end_time: Time,
    pub status: SessionStatus,
    pub actual_start_time: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString,
    Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "session_status_type")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SessionStatus {
    #[sea_orm(string_value = "scheduled")]
    Scheduled,

    #[sea_orm(string_value = "active")]
    Active,

    #[sea_orm(string_value = "completed")]
    Completed,

    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::TrainerId",
        to = "super::user::Column::Id"
    )]
    Trainer,
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    Records,
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollments,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trainer.def()
    }
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        db: &DatabaseConnection,
        category_id: i64,
        trainer_id: i64,
        title: &str,
        description: Option<&str>,
        scheduled_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<Self, DomainError> {
        if end_time <= start_time {
            return Err(DomainError::invalid_state(
                "Session end time must be after start time",
            ));
        }

        let now = Utc::now();
        let row = ActiveModel {
            id: Set(Uuid::new_v4()),
            category_id: Set(category_id),
            trainer_id: Set(trainer_id),
            title: Set(title.to_owned()),
            description: Set(description.map(|s| s.to_owned())),
            scheduled_date: Set(scheduled_date),
            start_time: Set(start_time),
            end_time: Set(end_time),
            status: Set(SessionStatus::Scheduled),
            actual_start_time: Set(None),
            actual_end_time: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(row.insert(db).await?)
    }

    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Scheduled start as a UTC instant.
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.scheduled_date.and_time(self.start_time).and_utc()
    }

    /// Scheduled end as a UTC instant. The sweeper completes any still-active
    /// session once this has passed.
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.scheduled_date.and_time(self.end_time).and_utc()
    }

    /// Whether `to` is a legal next status.
    ///
    /// Transitions are monotonic: scheduled → active → completed, with
    /// cancellation allowed from the two non-terminal states. Nothing leaves
    /// completed or cancelled.
    pub fn can_transition_to(&self, to: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self.status, to),
            (Scheduled, Active) | (Scheduled, Cancelled) | (Active, Completed) | (Active, Cancelled)
        )
    }

    /// Applies a status transition, stamping `actual_start_time` /
    /// `actual_end_time` as appropriate. A same-status transition is a no-op.
    ///
    /// The write is guarded on the status this copy was loaded with, so a
    /// session updated concurrently (e.g. by two sweeper ticks) transitions
    /// exactly once; the loser gets `InvalidState` and stamps nothing.
    pub async fn transition(
        self,
        db: &DatabaseConnection,
        to: SessionStatus,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if self.status == to {
            return Ok(self);
        }
        if !self.can_transition_to(to) {
            return Err(DomainError::invalid_state(format!(
                "Cannot transition session from {} to {}",
                self.status, to
            )));
        }

        let mut update = Entity::update_many()
            .col_expr(Column::Status, Expr::value(to))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(self.id))
            .filter(Column::Status.eq(self.status));
        match to {
            SessionStatus::Active => {
                update = update.col_expr(Column::ActualStartTime, Expr::value(Some(now)));
            }
            SessionStatus::Completed => {
                update = update.col_expr(Column::ActualEndTime, Expr::value(Some(now)));
            }
            _ => {}
        }

        if update.exec(db).await?.rows_affected == 0 {
            return Err(DomainError::invalid_state(format!(
                "Cannot transition session from {} to {}",
                self.status, to
            )));
        }
        Entity::find_by_id(self.id)
            .one(db)
            .await?
            .ok_or_else(|| DomainError::not_found("Session"))
    }

    /// Classifies an arrival instant against the session start and the
    /// configured grace window.
    pub fn classify_arrival(&self, now: DateTime<Utc>, grace_minutes: i64) -> Classification {
        let cutoff = self.starts_at() + Duration::minutes(grace_minutes);
        if now <= cutoff {
            Classification::OnTime
        } else {
            Classification::Late
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{category, user};
    use crate::test_utils::setup_test_db;
    use chrono::TimeZone;

    async fn seed_session(db: &DatabaseConnection) -> Model {
        let trainer = user::Model::create(db, "tr", "tr@test.com", "pw", user::Role::Trainer)
            .await
            .unwrap();
        let cat = category::Model::create(db, "Safety", None).await.unwrap();
        Model::create(
            db,
            cat.id,
            trainer.id,
            "Fire drill",
            None,
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn transitions_are_monotonic() {
        let db = setup_test_db().await;
        let s = seed_session(&db).await;
        let now = Utc::now();

        let s = s.transition(&db, SessionStatus::Active, now).await.unwrap();
        assert!(s.actual_start_time.is_some());
        assert!(s.actual_end_time.is_none());

        let s = s
            .transition(&db, SessionStatus::Completed, now)
            .await
            .unwrap();
        assert!(s.actual_end_time.is_some());

        // completed is terminal
        let err = s
            .transition(&db, SessionStatus::Active, now)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[tokio::test]
    async fn session_links_to_its_trainer() {
        let db = setup_test_db().await;
        let s = seed_session(&db).await;

        let trainer = s
            .find_related(user::Entity)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(trainer.id, s.trainer_id);
        assert_eq!(trainer.role, user::Role::Trainer);
    }

    #[tokio::test]
    async fn stale_copy_cannot_complete_twice() {
        let db = setup_test_db().await;
        let s = seed_session(&db).await;
        let started = Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0).unwrap();
        let s = s
            .transition(&db, SessionStatus::Active, started)
            .await
            .unwrap();

        // Two copies of the active row, as two sweeper ticks would hold.
        let stale = s.clone();
        let first_end = Utc.with_ymd_and_hms(2026, 9, 1, 10, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 9, 1, 10, 5, 0).unwrap();

        let done = s
            .transition(&db, SessionStatus::Completed, first_end)
            .await
            .unwrap();
        assert_eq!(done.actual_end_time, Some(first_end));

        let err = stale
            .transition(&db, SessionStatus::Completed, later)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));

        // The losing write must not re-stamp the end time.
        let reloaded = Model::find_by_id(&db, done.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, SessionStatus::Completed);
        assert_eq!(reloaded.actual_end_time, Some(first_end));
    }

    #[tokio::test]
    async fn scheduled_cannot_jump_to_completed() {
        let db = setup_test_db().await;
        let s = seed_session(&db).await;
        let err = s
            .transition(&db, SessionStatus::Completed, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[tokio::test]
    async fn arrival_classification_uses_grace_window() {
        let db = setup_test_db().await;
        let s = seed_session(&db).await;

        let at_0903 = Utc.with_ymd_and_hms(2026, 9, 1, 9, 3, 0).unwrap();
        let at_0910 = Utc.with_ymd_and_hms(2026, 9, 1, 9, 10, 0).unwrap();
        assert_eq!(s.classify_arrival(at_0903, 5), Classification::OnTime);
        assert_eq!(s.classify_arrival(at_0910, 5), Classification::Late);
    }
}
