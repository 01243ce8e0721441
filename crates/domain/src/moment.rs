// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Upper bounds on a block's moment list and on a moment's relation arrays.
///
/// Defaults match the product rules (200 moments per block, 12 responsables,
/// 12 suppliers); they are carried explicitly so embedders and tests can
/// tighten them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum number of moments a single block may hold.
    pub moments_per_block: usize,
    /// Maximum number of responsables on a single moment.
    pub responsables: usize,
    /// Maximum number of suppliers on a single moment.
    pub suppliers: usize,
}

impl Limits {
    /// Creates a new set of limits.
    ///
    /// # Arguments
    ///
    /// * `moments_per_block` - Maximum moments per block
    /// * `responsables` - Maximum responsables per moment
    /// * `suppliers` - Maximum suppliers per moment
    #[must_use]
    pub const fn new(moments_per_block: usize, responsables: usize, suppliers: usize) -> Self {
        Self {
            moments_per_block,
            responsables,
            suppliers,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new(200, 12, 12)
    }
}

/// Represents the kind of a moment.
///
/// Kinds are fixed domain constants; their wire names are the Spanish
/// snake-case tokens stored in documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MomentKind {
    /// An entrance (bride, groom, newlyweds).
    Entrada,
    /// A reading.
    Lectura,
    /// The vows.
    Votos,
    /// The ring exchange.
    Anillos,
    /// A dance.
    Baile,
    /// A speech.
    Discurso,
    /// The cake cutting.
    CortePastel,
    /// An exit.
    Salida,
    /// Anything else.
    #[default]
    Otro,
}

impl MomentKind {
    /// Returns the wire representation of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Entrada => "entrada",
            Self::Lectura => "lectura",
            Self::Votos => "votos",
            Self::Anillos => "anillos",
            Self::Baile => "baile",
            Self::Discurso => "discurso",
            Self::CortePastel => "corte_pastel",
            Self::Salida => "salida",
            Self::Otro => "otro",
        }
    }
}

impl FromStr for MomentKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entrada" => Ok(Self::Entrada),
            "lectura" => Ok(Self::Lectura),
            "votos" => Ok(Self::Votos),
            "anillos" => Ok(Self::Anillos),
            "baile" => Ok(Self::Baile),
            "discurso" => Ok(Self::Discurso),
            "corte_pastel" => Ok(Self::CortePastel),
            "salida" => Ok(Self::Salida),
            "otro" => Ok(Self::Otro),
            _ => Err(DomainError::InvalidMomentKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for MomentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents the confirmation state of a moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MomentState {
    /// Not yet confirmed.
    #[default]
    Pendiente,
    /// Confirmed by the couple.
    Confirmado,
    /// Scheduled for rehearsal.
    Ensayo,
}

impl MomentState {
    /// Returns the wire representation of this state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pendiente => "pendiente",
            Self::Confirmado => "confirmado",
            Self::Ensayo => "ensayo",
        }
    }
}

impl FromStr for MomentState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendiente" => Ok(Self::Pendiente),
            "confirmado" => Ok(Self::Confirmado),
            "ensayo" => Ok(Self::Ensayo),
            _ => Err(DomainError::InvalidMomentState(s.to_string())),
        }
    }
}

impl std::fmt::Display for MomentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A person in charge of a moment (officiant, reader, DJ, ...).
///
/// Older documents stored responsables as bare name strings; those decode
/// into the full shape with everything but `name` defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ResponsibleRepr")]
pub struct Responsible {
    /// Unique within the owning moment (millisecond timestamp in practice).
    pub id: i64,
    /// Role label ("oficiante", "dj", ...); free text.
    pub role: String,
    /// Display name; free text.
    pub name: String,
    /// Contact reference (phone, email); free text.
    pub contact: String,
}

impl Responsible {
    /// Creates a new `Responsible`.
    ///
    /// # Arguments
    ///
    /// * `id` - Unique id within the owning moment
    /// * `role` - Role label
    /// * `name` - Display name
    /// * `contact` - Contact reference
    #[must_use]
    pub const fn new(id: i64, role: String, name: String, contact: String) -> Self {
        Self {
            id,
            role,
            name,
            contact,
        }
    }

    /// Whether this entry actually identifies somebody.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        !self.name.trim().is_empty() || !self.role.trim().is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ResponsibleRepr {
    Full {
        #[serde(default)]
        id: i64,
        #[serde(default)]
        role: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        contact: String,
    },
    Name(String),
}

impl From<ResponsibleRepr> for Responsible {
    fn from(repr: ResponsibleRepr) -> Self {
        match repr {
            ResponsibleRepr::Full {
                id,
                role,
                name,
                contact,
            } => Self::new(id, role, name, contact),
            ResponsibleRepr::Name(name) => Self::new(0, String::new(), name, String::new()),
        }
    }
}

/// The atomic planning unit inside a block: one entrance, one reading, one
/// dance, one speech.
///
/// Every field is present and defaulted at construction/decode time, so
/// documents written before newer fields existed (the recipient trio, `key`)
/// round-trip without read-site fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Moment {
    /// Unique within the whole moments collection (millisecond timestamp in
    /// practice; any unique integer works).
    pub id: i64,
    /// 1-based rank within the owning block; contiguous after every mutation.
    pub order: usize,
    /// Display title.
    pub title: String,
    /// Song reference; required for entrances, exits and the first dance.
    pub song: String,
    /// Free-text "hh:mm"; only strictly validated when `duration` is also set.
    pub time: String,
    /// Duration in minutes, or a short free-text note.
    pub duration: String,
    /// The kind of moment.
    #[serde(rename = "type")]
    pub kind: MomentKind,
    /// Where it happens; free text.
    pub location: String,
    /// People in charge, capped by [`Limits::responsables`].
    pub responsables: Vec<Responsible>,
    /// Special requirements (sound, projection, ...); free text.
    pub requirements: String,
    /// Supplier references, case-insensitive unique, capped by
    /// [`Limits::suppliers`].
    pub suppliers: Vec<String>,
    /// Whether the moment can be dropped on the day.
    pub optional: bool,
    /// Confirmation state.
    pub state: MomentState,
    /// Secondary tag ("primer_baile", "corte_tarta", ...); free text.
    pub key: String,
    /// Guest id this moment is directed at, when resolved from the guest list.
    pub recipient_id: String,
    /// Recipient display name; free text.
    pub recipient_name: String,
    /// Recipient role ("novia", "padrino", ...); free text.
    pub recipient_role: String,
}

impl Moment {
    /// Creates a moment with the product's "new moment" defaults.
    ///
    /// # Arguments
    ///
    /// * `id` - Unique moment id
    /// * `order` - 1-based rank within the owning block
    #[must_use]
    pub fn new(id: i64, order: usize) -> Self {
        Self {
            id,
            order,
            title: String::from("Nuevo momento"),
            ..Self::default()
        }
    }
}

/// A shallow set of changes applied onto an existing moment.
///
/// `None` leaves the corresponding field untouched; `Some` replaces it. The
/// same type seeds new moments in `add_moment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MomentPatch {
    pub title: Option<String>,
    pub song: Option<String>,
    pub time: Option<String>,
    pub duration: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<MomentKind>,
    pub location: Option<String>,
    pub responsables: Option<Vec<Responsible>>,
    pub requirements: Option<String>,
    pub suppliers: Option<Vec<String>>,
    pub optional: Option<bool>,
    pub state: Option<MomentState>,
    pub key: Option<String>,
    pub recipient_id: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_role: Option<String>,
}

impl MomentPatch {
    /// Applies every set field onto `moment`, consuming the patch.
    pub fn apply_to(self, moment: &mut Moment) {
        if let Some(title) = self.title {
            moment.title = title;
        }
        if let Some(song) = self.song {
            moment.song = song;
        }
        if let Some(time) = self.time {
            moment.time = time;
        }
        if let Some(duration) = self.duration {
            moment.duration = duration;
        }
        if let Some(kind) = self.kind {
            moment.kind = kind;
        }
        if let Some(location) = self.location {
            moment.location = location;
        }
        if let Some(responsables) = self.responsables {
            moment.responsables = responsables;
        }
        if let Some(requirements) = self.requirements {
            moment.requirements = requirements;
        }
        if let Some(suppliers) = self.suppliers {
            moment.suppliers = suppliers;
        }
        if let Some(optional) = self.optional {
            moment.optional = optional;
        }
        if let Some(state) = self.state {
            moment.state = state;
        }
        if let Some(key) = self.key {
            moment.key = key;
        }
        if let Some(recipient_id) = self.recipient_id {
            moment.recipient_id = recipient_id;
        }
        if let Some(recipient_name) = self.recipient_name {
            moment.recipient_name = recipient_name;
        }
        if let Some(recipient_role) = self.recipient_role {
            moment.recipient_role = recipient_role;
        }
    }

    /// Whether the patch carries relation arrays exceeding the given limits.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ResponsablesAtCapacity` or
    /// `DomainError::SuppliersAtCapacity` when the corresponding array is
    /// longer than its cap.
    pub fn check_relation_caps(&self, limits: &Limits) -> Result<(), DomainError> {
        if let Some(responsables) = &self.responsables {
            if responsables.len() > limits.responsables {
                return Err(DomainError::ResponsablesAtCapacity {
                    cap: limits.responsables,
                });
            }
        }
        if let Some(suppliers) = &self.suppliers {
            if suppliers.len() > limits.suppliers {
                return Err(DomainError::SuppliersAtCapacity {
                    cap: limits.suppliers,
                });
            }
        }
        Ok(())
    }
}
