// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Seeded starter data for new weddings.
//!
//! The moment ids 1–13 and the Spanish titles are the product's historical
//! seeds; existing documents reference them, so they are stable.

use runsheet_domain::{Block, Moment, MomentKind, TimelineBlock};
use std::collections::BTreeMap;

use crate::moments::MomentsBoard;
use crate::timeline::Timeline;

fn seed(id: i64, order: usize, title: &str, song: &str, kind: MomentKind, key: &str) -> Moment {
    Moment {
        id,
        order,
        title: title.to_owned(),
        song: song.to_owned(),
        kind,
        key: key.to_owned(),
        ..Moment::default()
    }
}

/// The default moments board a wedding starts from.
#[must_use]
pub fn default_board() -> MomentsBoard {
    let blocks = vec![
        Block::new(String::from("ceremonia"), String::from("Ceremonia")),
        // "coctail" is the historical storage key; the timing board shows it
        // as "coctel" through the projection remap.
        Block::new(String::from("coctail"), String::from("Cóctel")),
        Block::new(String::from("banquete"), String::from("Banquete")),
        Block::new(String::from("disco"), String::from("Disco")),
    ];

    let mut moments: BTreeMap<String, Vec<Moment>> = BTreeMap::new();
    moments.insert(
        String::from("ceremonia"),
        vec![
            seed(1, 1, "Entrada Novio", "Canon in D – Pachelbel", MomentKind::Entrada, ""),
            seed(2, 2, "Entrada Novia", "Bridal Chorus – Wagner", MomentKind::Entrada, ""),
            seed(3, 3, "Lectura 1", "A Thousand Years", MomentKind::Lectura, ""),
            seed(4, 4, "Lectura 2", "", MomentKind::Lectura, ""),
            seed(5, 5, "Intercambio de Anillos", "", MomentKind::Anillos, ""),
            seed(6, 6, "Salida", "", MomentKind::Salida, ""),
        ],
    );
    moments.insert(
        String::from("coctail"),
        vec![seed(7, 1, "Entrada", "", MomentKind::Entrada, "")],
    );
    moments.insert(
        String::from("banquete"),
        vec![
            seed(8, 1, "Entrada Novios", "", MomentKind::Entrada, ""),
            seed(9, 2, "Corte Pastel", "", MomentKind::CortePastel, "corte_tarta"),
            seed(10, 3, "Discursos", "", MomentKind::Discurso, ""),
        ],
    );
    moments.insert(
        String::from("disco"),
        vec![
            seed(11, 1, "Primer Baile", "", MomentKind::Baile, "primer_baile"),
            seed(12, 2, "Animar pista", "", MomentKind::Otro, ""),
            seed(13, 3, "Último tema", "", MomentKind::Otro, ""),
        ],
    );

    MomentsBoard::new(blocks, moments)
}

/// The default day-of timeline: the five baseline blocks, all on time,
/// automatic alerts enabled. The party block crosses midnight.
#[must_use]
pub fn default_timeline() -> Timeline {
    let blocks = vec![
        TimelineBlock::new(
            String::from("preparativos"),
            String::from("Preparativos"),
            String::from("10:00"),
            String::from("16:30"),
        ),
        TimelineBlock::new(
            String::from("ceremonia"),
            String::from("Ceremonia"),
            String::from("17:00"),
            String::from("18:00"),
        ),
        TimelineBlock::new(
            String::from("coctel"),
            String::from("Cóctel"),
            String::from("18:00"),
            String::from("19:30"),
        ),
        TimelineBlock::new(
            String::from("banquete"),
            String::from("Banquete"),
            String::from("19:30"),
            String::from("22:30"),
        ),
        TimelineBlock::new(
            String::from("fiesta"),
            String::from("Fiesta"),
            String::from("22:30"),
            String::from("03:00"),
        ),
    ];
    Timeline::new(blocks, Vec::new(), true)
}
