use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseConnection, Set};
use serde::Serialize;
use uuid::Uuid;

use crate::error::DomainError;

/// Links a trainee to a session. `assigned_by` equals `user_id` for
/// self-enrollment; otherwise it is the admin who made the assignment.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub session_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,

    pub assigned_by: i64,
    pub created_at: DateTime<Utc>,
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

impl Model {
    /// Enrolls a participant. A second enrollment for the same pair fails
    /// with `Conflict` rather than inserting a duplicate.
    pub async fn enroll(
        db: &DatabaseConnection,
        session_id: Uuid,
        user_id: i64,
        assigned_by: i64,
    ) -> Result<Self, DomainError> {
        let existing = Entity::find_by_id((session_id, user_id)).one(db).await?;
        if existing.is_some() {
            return Err(DomainError::conflict(
                "Participant is already enrolled in this session",
            ));
        }

        let row = ActiveModel {
            session_id: Set(session_id),
            user_id: Set(user_id),
            assigned_by: Set(assigned_by),
            created_at: Set(Utc::now()),
        };
        Ok(row.insert(db).await?)
    }

    pub fn is_self_enrolled(&self) -> bool {
        self.assigned_by == self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{category, training_session, user};
    use crate::test_utils::setup_test_db;
    use chrono::{NaiveDate, NaiveTime};
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn duplicate_enrollment_is_conflict() {
        let db = setup_test_db().await;
        let trainer = user::Model::create(&db, "tr", "tr@test.com", "pw", user::Role::Trainer)
            .await
            .unwrap();
        let trainee = user::Model::create(&db, "st", "st@test.com", "pw", user::Role::Trainee)
            .await
            .unwrap();
        let cat = category::Model::create(&db, "Gen", None).await.unwrap();
        let sess = training_session::Model::create(
            &db,
            cat.id,
            trainer.id,
            "S",
            None,
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        )
        .await
        .unwrap();

        let first = Model::enroll(&db, sess.id, trainee.id, trainee.id).await.unwrap();
        assert!(first.is_self_enrolled());

        let err = Model::enroll(&db, sess.id, trainee.id, trainer.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let count = Entity::find().count(&db).await.unwrap();
        assert_eq!(count, 1);
    }
}
