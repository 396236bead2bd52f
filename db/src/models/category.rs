use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseConnection, Set};
use serde::Serialize;

use crate::error::DomainError;

/// Training category, e.g. "Safety" or "Onboarding". Admin-managed.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::training_session::Entity")]
    Sessions,
}

impl Related<super::training_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DatabaseConnection,
        name: &str,
        description: Option<&str>,
    ) -> Result<Self, DomainError> {
        let exists = Entity::find()
            .filter(Column::Name.eq(name))
            .one(db)
            .await?;
        if exists.is_some() {
            return Err(DomainError::conflict(format!(
                "Category '{name}' already exists"
            )));
        }

        let row = ActiveModel {
            name: Set(name.to_owned()),
            description: Set(description.map(|s| s.to_owned())),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        Ok(row.insert(db).await?)
    }
}
