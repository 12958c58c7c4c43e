use dtl_primitives::MetadataKey;
use sea_orm::{entity::prelude::*, ActiveValue};

/// A database model that represents a metadata value.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "metadata")]
pub struct Model {
    /// The metadata key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// The metadata value.
    pub value: String,
}

/// The relation for the metadata model.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// The active model behavior for the metadata model.
impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    /// Returns the [`ActiveModel`] setting the value of the provided key.
    pub fn new(key: MetadataKey, value: impl ToString) -> Self {
        Self {
            key: ActiveValue::Set(key.as_str().to_owned()),
            value: ActiveValue::Set(value.to_string()),
        }
    }
}
