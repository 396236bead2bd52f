use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseConnection, IntoActiveModel, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::error::DomainError;
use crate::models::training_session::Model as Session;

/// One attendance record per (session, participant). First successful scan
/// inserts it; later scans update it in place.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub session_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,

    pub status: AttendanceStatus,
    pub classification: Option<Classification>,
    pub joined_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString,
    Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "attendance_status_type")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AttendanceStatus {
    #[sea_orm(string_value = "present")]
    Present,

    #[sea_orm(string_value = "late")]
    Late,

    #[sea_orm(string_value = "absent")]
    Absent,

    #[sea_orm(string_value = "pending")]
    Pending,
}

/// How the arrival instant relates to the session start. `Partial` is only
/// reachable through an administrative override.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString,
    Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "classification_type")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Classification {
    #[sea_orm(string_value = "on_time")]
    OnTime,

    #[sea_orm(string_value = "late")]
    Late,

    #[sea_orm(string_value = "partial")]
    Partial,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::training_session::Entity",
        from = "Column::SessionId",
        to = "super::training_session::Column::Id"
    )]
    Session,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::training_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Outcome of a successful scan.
#[derive(Debug, Clone)]
pub struct RecordedAttendance {
    pub record: Model,
    pub classification: Classification,
    /// True when the participant had already scanned and the existing record
    /// was updated instead of a new one inserted.
    pub repeat: bool,
}

/// Present/late tallies for a session roster.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AttendanceCounts {
    pub present: u64,
    pub late: u64,
    pub total: u64,
}

impl Model {
    /// Validates a scan and upserts the attendance record.
    ///
    /// Order matters and matches the protocol: session must be active, the
    /// token must be the session's current unexpired one, then the arrival is
    /// classified against the grace window and merged into the roster keyed
    /// by (session, participant). The composite primary key is the safety
    /// net should two scans race past the read check.
    pub async fn record(
        db: &DatabaseConnection,
        session: &Session,
        presented_token: &str,
        user_id: i64,
        now: DateTime<Utc>,
        grace_minutes: i64,
    ) -> Result<RecordedAttendance, DomainError> {
        if !session.is_active() {
            return Err(DomainError::invalid_state(
                "Attendance session is not active",
            ));
        }

        super::attendance_token::Model::validate(db, session.id, presented_token, now).await?;

        let classification = session.classify_arrival(now, grace_minutes);
        let status = match classification {
            Classification::Late => AttendanceStatus::Late,
            _ => AttendanceStatus::Present,
        };

        let existing = Entity::find_by_id((session.id, user_id)).one(db).await?;
        match existing {
            Some(prev) => {
                // Re-scan: keep the original joined_at, refresh the status in
                // case an admin had overridden it.
                let mut active = prev.into_active_model();
                active.status = Set(status);
                active.classification = Set(Some(classification));
                active.updated_at = Set(now);
                let record = active.update(db).await?;
                Ok(RecordedAttendance {
                    record,
                    classification,
                    repeat: true,
                })
            }
            None => {
                let row = ActiveModel {
                    session_id: Set(session.id),
                    user_id: Set(user_id),
                    status: Set(status),
                    classification: Set(Some(classification)),
                    joined_at: Set(Some(now)),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                let record = row.insert(db).await?;
                Ok(RecordedAttendance {
                    record,
                    classification,
                    repeat: false,
                })
            }
        }
    }

    /// Administrative override of a record's status/classification.
    pub async fn override_status(
        db: &DatabaseConnection,
        session_id: Uuid,
        user_id: i64,
        status: AttendanceStatus,
        classification: Option<Classification>,
    ) -> Result<Self, DomainError> {
        let Some(prev) = Entity::find_by_id((session_id, user_id)).one(db).await? else {
            return Err(DomainError::not_found("Attendance record"));
        };
        let mut active = prev.into_active_model();
        active.status = Set(status);
        active.classification = Set(classification);
        active.updated_at = Set(Utc::now());
        Ok(active.update(db).await?)
    }

    pub async fn for_session(
        db: &DatabaseConnection,
        session_id: Uuid,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::SessionId.eq(session_id))
            .all(db)
            .await
    }

    pub async fn counts_for_session(
        db: &DatabaseConnection,
        session_id: Uuid,
    ) -> Result<AttendanceCounts, DbErr> {
        use sea_orm::PaginatorTrait;

        let present = Entity::find()
            .filter(Column::SessionId.eq(session_id))
            .filter(Column::Status.eq(AttendanceStatus::Present))
            .count(db)
            .await?;
        let late = Entity::find()
            .filter(Column::SessionId.eq(session_id))
            .filter(Column::Status.eq(AttendanceStatus::Late))
            .count(db)
            .await?;
        let total = Entity::find()
            .filter(Column::SessionId.eq(session_id))
            .count(db)
            .await?;

        Ok(AttendanceCounts {
            present,
            late,
            total,
        })
    }
}
