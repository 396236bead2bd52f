use chrono::{DateTime, Duration, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseConnection, Set, TransactionError, TransactionTrait};
use serde::Serialize;
use uuid::Uuid;

use crate::error::DomainError;
use crate::models::training_session::Model as Session;

/// The current attendance token for a session. One row per session: issuing
/// a new token replaces the row, so the previous token is permanently
/// invalidated even if its expiry had not elapsed.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub session_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub issued_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::training_session::Entity",
        from = "Column::SessionId",
        to = "super::training_session::Column::Id"
    )]
    Session,
}

impl Related<super::training_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Issues a fresh token for an active session, superseding any previous
    /// one. Fails with `InvalidState` when the session is not active.
    pub async fn issue(
        db: &DatabaseConnection,
        session: &Session,
        ttl_seconds: u64,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if !session.is_active() {
            return Err(DomainError::invalid_state(
                "Attendance tokens can only be issued for active sessions",
            ));
        }

        // Supersede, don't mutate: the old row is dropped and the new one
        // inserted in a single transaction, so the session never ends up
        // with no current token.
        let session_id = session.id;
        db.transaction::<_, Self, DomainError>(|txn| {
            Box::pin(async move {
                Entity::delete_by_id(session_id).exec(txn).await?;
                let row = ActiveModel {
                    session_id: Set(session_id),
                    token: Set(generate_token()),
                    expires_at: Set(now + Duration::seconds(ttl_seconds as i64)),
                    issued_at: Set(now),
                };
                Ok(row.insert(txn).await?)
            })
        })
        .await
        .map_err(|err| match err {
            TransactionError::Connection(e) => DomainError::from(e),
            TransactionError::Transaction(e) => e,
        })
    }

    pub async fn current_for(
        db: &DatabaseConnection,
        session_id: Uuid,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(session_id).one(db).await
    }

    /// Checks a presented token string against the session's current token.
    ///
    /// A missing row, a mismatch (including a token issued for a different
    /// session), and an elapsed expiry all collapse into `TokenExpired` so
    /// the caller cannot probe which of the three it was.
    pub async fn validate(
        db: &DatabaseConnection,
        session_id: Uuid,
        presented: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let Some(current) = Self::current_for(db, session_id).await? else {
            return Err(DomainError::TokenExpired);
        };
        if current.token != presented.trim() || now >= current.expires_at {
            return Err(DomainError::TokenExpired);
        }
        Ok(current)
    }
}

fn generate_token() -> String {
    use rand::RngCore;
    let mut buf = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}
