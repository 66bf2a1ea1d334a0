//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` when a migration changes a table.

diesel::table! {
    /// Users known to the photo service. Only the id is owned here.
    users (id) {
        id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Photo records. A partial unique index on `user_id WHERE is_main`
    /// allows at most one main photo per user.
    photos (id) {
        id -> Uuid,
        user_id -> Uuid,
        url -> Text,
        /// Media store identifier; NULL for photos not hosted remotely.
        public_id -> Nullable<Varchar>,
        description -> Text,
        date_added -> Timestamptz,
        is_main -> Bool,
    }
}

diesel::joinable!(photos -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(users, photos);
