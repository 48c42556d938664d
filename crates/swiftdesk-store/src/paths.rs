//! Logical locations used by the SwiftDesk app.

use crate::{StoreError, StorePath};
use chrono::NaiveDate;

/// Per-user context slices stored under `users/{uid}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSlice {
    Memory,
    Calendar,
    Reminders,
    Calculator,
}

impl UserSlice {
    /// Key of the slice below the user node.
    pub fn key(self) -> &'static str {
        match self {
            UserSlice::Memory => "memory",
            UserSlice::Calendar => "calendar",
            UserSlice::Reminders => "reminders",
            UserSlice::Calculator => "calculator",
        }
    }
}

/// Day bucket key, `YYYY-MM-DD`.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `notes/{uid}`
pub fn notes(uid: &str) -> Result<StorePath, StoreError> {
    StorePath::root().child("notes")?.child(uid)
}

/// `notes/{uid}/{YYYY-MM-DD}`
pub fn notes_day(uid: &str, date: NaiveDate) -> Result<StorePath, StoreError> {
    notes(uid)?.child(&day_key(date))
}

/// `guestinfo/{guestId}`
pub fn guest(guest_id: &str) -> Result<StorePath, StoreError> {
    StorePath::root().child("guestinfo")?.child(guest_id)
}

/// `users/{uid}/profile`
pub fn user_profile(uid: &str) -> Result<StorePath, StoreError> {
    user(uid)?.child("profile")
}

/// `users/{uid}/{slice}`
pub fn user_slice(uid: &str, slice: UserSlice) -> Result<StorePath, StoreError> {
    user(uid)?.child(slice.key())
}

/// `stores/{storeId}`
pub fn store_record(store_id: &str) -> Result<StorePath, StoreError> {
    StorePath::root().child("stores")?.child(store_id)
}

fn user(uid: &str) -> Result<StorePath, StoreError> {
    StorePath::root().child("users")?.child(uid)
}
