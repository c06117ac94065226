//! Diesel table definitions matching `backend/migrations`.
//!
//! Keep in step with the migrations; `diesel print-schema` regenerates this
//! file from a live database.

diesel::table! {
    /// Registered staff accounts.
    users (id) {
        id -> Uuid,
        #[max_length = 50]
        first_name -> Varchar,
        #[max_length = 50]
        last_name -> Varchar,
        /// Stored lowercase; unique.
        #[max_length = 255]
        email -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        #[max_length = 16]
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Parking facilities and their space counter.
    parking_lots (id) {
        id -> Uuid,
        #[max_length = 50]
        code -> Varchar,
        #[max_length = 100]
        name -> Varchar,
        capacity -> Int4,
        /// Constrained to `0..=capacity`.
        occupied -> Int4,
        #[max_length = 200]
        location -> Nullable<Varchar>,
        hourly_rate -> Numeric,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Vehicle stays; a null `exit_time` marks an open session.
    parking_sessions (id) {
        id -> Uuid,
        #[max_length = 20]
        plate_number -> Varchar,
        lot_id -> Uuid,
        entry_time -> Timestamptz,
        exit_time -> Nullable<Timestamptz>,
        charged_amount -> Nullable<Numeric>,
    }
}

diesel::joinable!(parking_sessions -> parking_lots (lot_id));

diesel::allow_tables_to_appear_in_same_query!(parking_lots, parking_sessions, users);
