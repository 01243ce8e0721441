// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Advisory moment validation.
//!
//! Findings are user-facing strings, never hard failures: a moment with
//! issues still persists, the UI just surfaces the messages.

use crate::moment::{Limits, Moment, MomentKind, Responsible};
use crate::timing::parse_hh_mm;

/// Finding for a blank title.
pub const MSG_TITLE_REQUIRED: &str = "El título es obligatorio";
/// Finding for a missing song on moments that need one.
pub const MSG_SONG_REQUIRED: &str = "Falta la canción para este momento";
/// Finding for a missing responsible on readings and vows.
pub const MSG_RESPONSIBLE_REQUIRED: &str = "Hace falta al menos un responsable";
/// Finding for a malformed time when a duration is also set.
pub const MSG_INVALID_TIME: &str = "La hora debe tener formato hh:mm";

/// Validates a single moment, returning zero or more findings.
///
/// Rules:
/// - the title must not be blank;
/// - `entrada`/`salida` moments need a song, as does a `baile` tagged
///   `primer_baile`;
/// - `lectura`/`votos` moments need at least one filled responsable;
/// - when both `time` and `duration` are set, `time` must parse as "hh:mm";
/// - the relation arrays must not exceed their caps.
#[must_use]
pub fn validate_moment(moment: &Moment, limits: &Limits) -> Vec<String> {
    let mut errors: Vec<String> = Vec::new();

    if moment.title.trim().is_empty() {
        errors.push(String::from(MSG_TITLE_REQUIRED));
    }

    let needs_song = matches!(moment.kind, MomentKind::Entrada | MomentKind::Salida)
        || (moment.kind == MomentKind::Baile && moment.key == "primer_baile");
    if needs_song && moment.song.trim().is_empty() {
        errors.push(String::from(MSG_SONG_REQUIRED));
    }

    if matches!(moment.kind, MomentKind::Lectura | MomentKind::Votos)
        && !moment.responsables.iter().any(Responsible::is_filled)
    {
        errors.push(String::from(MSG_RESPONSIBLE_REQUIRED));
    }

    if !moment.time.trim().is_empty()
        && !moment.duration.trim().is_empty()
        && parse_hh_mm(moment.time.trim()).is_none()
    {
        errors.push(String::from(MSG_INVALID_TIME));
    }

    if moment.responsables.len() > limits.responsables {
        errors.push(format!(
            "Demasiados responsables (máximo {})",
            limits.responsables
        ));
    }
    if moment.suppliers.len() > limits.suppliers {
        errors.push(format!(
            "Demasiados proveedores (máximo {})",
            limits.suppliers
        ));
    }

    errors
}
