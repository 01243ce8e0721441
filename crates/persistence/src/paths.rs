// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Document paths, scoped by the active wedding.

/// The current-shape moments document.
#[must_use]
pub fn special_moments_path(wedding_id: &str) -> String {
    format!("weddings/{wedding_id}/specialMoments/main")
}

/// The legacy moments document; read-only migration source.
#[must_use]
pub fn legacy_moments_path(wedding_id: &str) -> String {
    format!("weddings/{wedding_id}/momentosEspeciales/main")
}

/// The timeline document.
#[must_use]
pub fn timeline_path(wedding_id: &str) -> String {
    format!("weddings/{wedding_id}/timeline/main")
}
