//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes the schema, regenerate with `diesel print-schema` or
//! update by hand.

diesel::table! {
    /// Registered accounts, players and viewers alike.
    users (id) {
        id -> Int8,
        /// Normalised lowercase handle, unique.
        handle -> Varchar,
        display_name -> Varchar,
        /// `player` or `viewer`.
        role -> Varchar,
        /// `<salt>$<hex digest>` PBKDF2-HMAC-SHA256 hash.
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Bearer sessions; removed with their account.
    sessions (token) {
        token -> Varchar,
        user_id -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Scheduled pairings. Confirmed columns are written once.
    matches (id) {
        id -> Int8,
        round_number -> Int4,
        table_number -> Int4,
        player1_id -> Int8,
        player2_id -> Int8,
        confirmed_score1 -> Nullable<Int4>,
        confirmed_score2 -> Nullable<Int4>,
        confirmed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// One score report per (match, player).
    score_confirmations (id) {
        id -> Int8,
        match_id -> Int8,
        player_id -> Int8,
        score1 -> Int4,
        score2 -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(sessions -> users (user_id));
diesel::joinable!(score_confirmations -> matches (match_id));

diesel::allow_tables_to_appear_in_same_query!(matches, score_confirmations, sessions, users,);
