use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// User record in the store.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: String, // argon2 PHC string
    pub date_of_birth: Date,
    pub created_at: OffsetDateTime,
}

/// Validated input for an insert; id and timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: String,
    pub date_of_birth: Date,
}

/// Inclusive date-of-birth bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<Date>,
    pub to: Option<Date>,
}

impl DateRange {
    pub fn contains(&self, dob: Date) -> bool {
        match (self.from, self.to) {
            (None, None) => true,
            (Some(from), Some(to)) => dob >= from && dob <= to,
            (Some(from), None) => dob >= from,
            (None, Some(to)) => dob <= to,
        }
    }
}
