//! Fixed MBTI Step II tables.
//!
//! Nothing here is derived at runtime: the facet order drives the column
//! order of `MBTI Results`, the pair order drives the `Data` blocks and the
//! dashboard grid, and the color tables feed the style applier.

use crate::record::{Dominant, MbtiType};

/// En dash joining the two sides of a midzone label.
pub const MIDZONE_SEPARATOR: char = '\u{2013}';

/// The 40 facets in column order. Consecutive entries form an opposed pair.
pub const FACET_NAMES: [&str; 40] = [
    "Initiating",
    "Receiving",
    "Expressive",
    "Contained",
    "Gregarious",
    "Intimate",
    "Active",
    "Reflective",
    "Enthusiastic",
    "Quiet",
    "Concrete",
    "Abstract",
    "Realistic",
    "Imaginative",
    "Practical",
    "Conceptual",
    "Experiential",
    "Theoretical",
    "Traditional",
    "Original",
    "Logical",
    "Empathetic",
    "Reasonable",
    "Compassionate",
    "Questioning",
    "Accommodating",
    "Critical",
    "Accepting",
    "Tough",
    "Tender",
    "Systematic",
    "Casual",
    "Planful",
    "Open-Ended",
    "Early Starting",
    "Pressure-Prompted",
    "Scheduled",
    "Spontaneous",
    "Methodical",
    "Emergent",
];

/// Canonical midzone label per pair, same order as the pairs in [`FACET_NAMES`].
pub const MIDZONE_LABELS: [&str; 20] = [
    "Initiating–Receiving",
    "Expressive–Contained",
    "Gregarious–Intimate",
    "Active–Reflective",
    "Enthusiastic–Quiet",
    "Concrete–Abstract",
    "Realistic–Imaginative",
    "Practical–Conceptual",
    "Experiential–Theoretical",
    "Traditional–Original",
    "Logical–Empathetic",
    "Reasonable–Compassionate",
    "Questioning–Accommodating",
    "Critical–Accepting",
    "Tough–Tender",
    "Systematic–Casual",
    "Planful–Open-Ended",
    "Early Starting–Pressure-Prompted",
    "Scheduled–Spontaneous",
    "Methodical–Emergent",
];

/// Number of facet pairs per dichotomy row.
pub const PAIRS_PER_DICHOTOMY: usize = 5;

/// Dominant function per type. The order is significant: the `Data` sheet
/// sums the two types of each function in exactly this sequence.
pub const DOMINANT_FUNCTIONS: [(MbtiType, Dominant); 16] = [
    (MbtiType::Entj, Dominant::Te),
    (MbtiType::Estj, Dominant::Te),
    (MbtiType::Intp, Dominant::Ti),
    (MbtiType::Istp, Dominant::Ti),
    (MbtiType::Enfp, Dominant::Ne),
    (MbtiType::Entp, Dominant::Ne),
    (MbtiType::Infj, Dominant::Ni),
    (MbtiType::Intj, Dominant::Ni),
    (MbtiType::Enfj, Dominant::Fe),
    (MbtiType::Esfj, Dominant::Fe),
    (MbtiType::Infp, Dominant::Fi),
    (MbtiType::Isfp, Dominant::Fi),
    (MbtiType::Esfp, Dominant::Se),
    (MbtiType::Estp, Dominant::Se),
    (MbtiType::Isfj, Dominant::Si),
    (MbtiType::Istj, Dominant::Si),
];

/// Fill color per type, indexed like [`MbtiType::ALL`].
pub const MBTI_COLORS: [u32; 16] = [
    0xFFB3BA, 0xBAFFC9, 0xBAE1FF, 0xFFDFBA, //
    0xFFFFBA, 0xFFB3FF, 0xB3FFF9, 0xFFB3B3, //
    0xC1B3FF, 0xB3FFB3, 0xFFC9B3, 0xB3BAFF, //
    0xFFB3E6, 0xB3FFE6, 0xFFE1B3, 0xB3E1FF,
];

/// Chart color per facet, indexed like [`FACET_NAMES`].
pub const FACET_COLORS: [u32; 40] = [
    0x00FF00, 0xFFA500, 0x00BFFF, 0x000080, 0x2E8B57, 0x8A2BE2, 0xDA70D6, 0xDC143C, 0x9ACD32,
    0x008080, 0xFF4500, 0x800000, 0xFFD700, 0x20B2AA, 0x9932CC, 0x556B2F, 0xFF6347, 0x8B4513,
    0x4682B4, 0xB22222, 0xADFF2F, 0x00CED1, 0x7B68EE, 0xFF69B4, 0x1E90FF, 0xA52A2A, 0x6A5ACD,
    0x32CD32, 0x00FA9A, 0xBA55D3, 0x7FFF00, 0xCD5C5C, 0x0000CD, 0xF08080, 0x3CB371, 0xFF8C00,
    0x00BFFF, 0x9370DB, 0xDAA520, 0x40E0D0,
];

/// Chart color per midzone label, indexed like [`MIDZONE_LABELS`].
pub const MIDZONE_COLORS: [u32; 20] = [
    0x80D280, 0x0040BF, 0x5D5F8C, 0xEE41A1, 0x4D9979, 0xBF2200, 0x8DBD65, 0x748A77, 0xD28A30,
    0x80538B, 0x56E7AA, 0xC6B589, 0x93A0BF, 0x4C948E, 0x5ECDC3, 0x97BF66, 0x7E4684, 0xAFA556,
    0x4961B6, 0xA4C390,
];

/// Fill per preference letter on the `Data` sheet, indexed like `Preference::ALL`.
pub const DICHOTOMY_COLORS: [u32; 8] = [
    0x4472C4, 0xED7D31, 0x70AD47, 0xFFC000, 0x5B9BD5, 0xA5A5A5, 0x9966FF, 0x4BACC6,
];

/// Conditional fills for the four facet classes.
pub const IN_PREF_FILL: u32 = 0xC0CEE6;
pub const MIDZONE_FILL: u32 = 0xD6E1C5;
pub const OUT_OF_PREF_FILL: u32 = 0xFFCC66;
pub const UNCLASSIFIED_FILL: u32 = 0xD3D3D3;

/// Score color scale stops.
pub const SCORE_LOW: u32 = 0xB7E5B7;
pub const SCORE_MID: u32 = 0xE5E589;
pub const SCORE_HIGH: u32 = 0xE5B7B7;
pub const SCORE_MIN: u32 = 1;
pub const SCORE_MID_VALUE: u32 = 15;
pub const SCORE_MAX: u32 = 30;

/// Facet frequency bucket fills (3, 2 and 1 occurrences).
pub const BUCKET_THREE_FILL: u32 = 0xB7E5B7;
pub const BUCKET_TWO_FILL: u32 = 0xE5E589;
pub const BUCKET_ONE_FILL: u32 = 0xE5B7B7;

pub const BLACK: u32 = 0x000000;
pub const WHITE: u32 = 0xFFFFFF;

/// Dichotomy bar fills on the dashboard: left side, right side.
pub const DICHOTOMY_BAR_FILLS: [u32; 2] = [0x4472C4, 0xC00000];

/// Header band fills on `MBTI Results`: `C1`, `D1:K1`, the three context
/// groups, and the S/N and J/P facet bands.
pub const IDENTITY_BAND: u32 = 0x99CCFF;
pub const SCORE_BAND: u32 = 0x999999;
pub const CONTEXT_BANDS: [u32; 3] = [0x66CC33, 0xFFCC66, 0x999999];
pub const FACET_GREY_BAND: u32 = 0x999999;

/// Lowercased facet names followed by lowercased midzone labels.
pub fn known_facet_names() -> impl Iterator<Item = String> {
    FACET_NAMES
        .iter()
        .chain(MIDZONE_LABELS.iter())
        .map(|n| n.to_lowercase())
}

/// Color of the facet or midzone label `name` (case-insensitive).
pub fn facet_color(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    FACET_NAMES
        .iter()
        .position(|f| f.to_lowercase() == lower)
        .map(|i| FACET_COLORS[i])
        .or_else(|| {
            MIDZONE_LABELS
                .iter()
                .position(|m| m.to_lowercase() == lower)
                .map(|i| MIDZONE_COLORS[i])
        })
}
