// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Recipient resolution against the external guest list.
//!
//! A moment's recipient (who a reading, speech or vow is directed at) is
//! either a known guest, one of the fixed wedding roles, or free text; the
//! three resolutions fill different recipient fields.

use serde::{Deserialize, Serialize};

/// The fixed role vocabulary a recipient can resolve to.
pub const RECIPIENT_ROLES: [&str; 7] = [
    "novia", "novio", "padrino", "madrina", "testigo", "familiar", "amigo",
];

/// A read-only guest record from the external guest list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Guest {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub table: String,
    pub dietary_restrictions: String,
}

/// Read-only provider of the active wedding's guest list.
pub trait GuestDirectory: Send + Sync {
    /// The current guest list; order is not significant here.
    fn guests(&self) -> Vec<Guest>;
}

/// Directory over a fixed guest list; tests and embedders without a live
/// guest module use this.
pub struct StaticGuestDirectory {
    guests: Vec<Guest>,
}

impl StaticGuestDirectory {
    /// Wraps a fixed guest list.
    #[must_use]
    pub const fn new(guests: Vec<Guest>) -> Self {
        Self { guests }
    }
}

impl GuestDirectory for StaticGuestDirectory {
    fn guests(&self) -> Vec<Guest> {
        self.guests.clone()
    }
}

/// The recipient trio a resolution fills on a moment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecipientFields {
    /// Guest id when resolved against the directory, else empty.
    pub id: String,
    /// Display name: the guest's, or the free text itself.
    pub name: String,
    /// One of [`RECIPIENT_ROLES`] when the input named a role, else empty.
    pub role: String,
}

/// Resolves a recipient input.
///
/// An input matching a guest's id, or case-insensitively a guest's name,
/// resolves to that guest. An input matching the role vocabulary resolves
/// to a role-only recipient. Anything else stays as a free-text name; blank
/// input clears all three fields.
#[must_use]
pub fn resolve_recipient(directory: &dyn GuestDirectory, input: &str) -> RecipientFields {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return RecipientFields::default();
    }

    let folded = trimmed.to_lowercase();
    for guest in directory.guests() {
        if guest.id == trimmed || guest.name.to_lowercase() == folded {
            return RecipientFields {
                id: guest.id,
                name: guest.name,
                role: String::new(),
            };
        }
    }

    if RECIPIENT_ROLES.contains(&folded.as_str()) {
        return RecipientFields {
            id: String::new(),
            name: String::new(),
            role: folded,
        };
    }

    RecipientFields {
        id: String::new(),
        name: trimmed.to_owned(),
        role: String::new(),
    }
}
