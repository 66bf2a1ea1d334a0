//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::photos;

/// Row struct for reading from the photos table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = photos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PhotoRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub public_id: Option<String>,
    pub description: String,
    pub date_added: DateTime<Utc>,
    pub is_main: bool,
}

/// Insertable struct for new photo records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = photos)]
pub(crate) struct NewPhotoRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: &'a str,
    pub public_id: Option<&'a str>,
    pub description: &'a str,
    pub date_added: DateTime<Utc>,
    pub is_main: bool,
}
