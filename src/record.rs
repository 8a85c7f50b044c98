//! Typed Subject Record and its vocabulary.

use crate::taxonomy::{
    DOMINANT_FUNCTIONS, FACET_NAMES, MBTI_COLORS, MIDZONE_LABELS, MIDZONE_SEPARATOR,
};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MbtiType {
    Istj,
    Isfj,
    Infj,
    Intj,
    Istp,
    Isfp,
    Infp,
    Intp,
    Estp,
    Esfp,
    Enfp,
    Entp,
    Estj,
    Esfj,
    Enfj,
    Entj,
}

impl MbtiType {
    /// Taxonomy order; also the row order of the type counts on `Data`.
    pub const ALL: [MbtiType; 16] = [
        MbtiType::Istj,
        MbtiType::Isfj,
        MbtiType::Infj,
        MbtiType::Intj,
        MbtiType::Istp,
        MbtiType::Isfp,
        MbtiType::Infp,
        MbtiType::Intp,
        MbtiType::Estp,
        MbtiType::Esfp,
        MbtiType::Enfp,
        MbtiType::Entp,
        MbtiType::Estj,
        MbtiType::Esfj,
        MbtiType::Enfj,
        MbtiType::Entj,
    ];

    pub fn code(self) -> &'static str {
        match self {
            MbtiType::Istj => "ISTJ",
            MbtiType::Isfj => "ISFJ",
            MbtiType::Infj => "INFJ",
            MbtiType::Intj => "INTJ",
            MbtiType::Istp => "ISTP",
            MbtiType::Isfp => "ISFP",
            MbtiType::Infp => "INFP",
            MbtiType::Intp => "INTP",
            MbtiType::Estp => "ESTP",
            MbtiType::Esfp => "ESFP",
            MbtiType::Enfp => "ENFP",
            MbtiType::Entp => "ENTP",
            MbtiType::Estj => "ESTJ",
            MbtiType::Esfj => "ESFJ",
            MbtiType::Enfj => "ENFJ",
            MbtiType::Entj => "ENTJ",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn dominant(self) -> Dominant {
        DOMINANT_FUNCTIONS
            .iter()
            .find(|(t, _)| *t == self)
            .map(|(_, d)| *d)
            .unwrap_or(Dominant::Te)
    }

    pub fn color(self) -> u32 {
        MBTI_COLORS[self.index()]
    }

    /// True if the type carries preference letter `p`.
    pub fn has(self, p: Preference) -> bool {
        self.code().contains(p.letter())
    }
}

impl fmt::Display for MbtiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for MbtiType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        MbtiType::ALL
            .into_iter()
            .find(|t| t.code() == upper)
            .ok_or_else(|| format!("not an MBTI type: {s:?}"))
    }
}

/// Dominant cognitive function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dominant {
    Te,
    Ti,
    Ne,
    Ni,
    Fe,
    Fi,
    Se,
    Si,
}

impl Dominant {
    /// Row order of the dominant-function block on `Data`.
    pub const ALL: [Dominant; 8] = [
        Dominant::Te,
        Dominant::Ti,
        Dominant::Ne,
        Dominant::Ni,
        Dominant::Fe,
        Dominant::Fi,
        Dominant::Se,
        Dominant::Si,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Dominant::Te => "Te",
            Dominant::Ti => "Ti",
            Dominant::Ne => "Ne",
            Dominant::Ni => "Ni",
            Dominant::Fe => "Fe",
            Dominant::Fi => "Fi",
            Dominant::Se => "Se",
            Dominant::Si => "Si",
        }
    }

    /// The two types sharing this function, in table order.
    pub fn types(self) -> impl Iterator<Item = MbtiType> {
        DOMINANT_FUNCTIONS
            .into_iter()
            .filter(move |(_, d)| *d == self)
            .map(|(t, _)| t)
    }
}

impl fmt::Display for Dominant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One of the eight preference letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preference {
    E,
    I,
    S,
    N,
    T,
    F,
    J,
    P,
}

impl Preference {
    pub const ALL: [Preference; 8] = [
        Preference::E,
        Preference::I,
        Preference::S,
        Preference::N,
        Preference::T,
        Preference::F,
        Preference::J,
        Preference::P,
    ];

    pub fn letter(self) -> &'static str {
        match self {
            Preference::E => "E",
            Preference::I => "I",
            Preference::S => "S",
            Preference::N => "N",
            Preference::T => "T",
            Preference::F => "F",
            Preference::J => "J",
            Preference::P => "P",
        }
    }

    /// Column header on `MBTI Results`.
    pub fn label(self) -> &'static str {
        match self {
            Preference::E => "Extroversion",
            Preference::I => "Introversion",
            Preference::S => "Sensing",
            Preference::N => "Intuition",
            Preference::T => "Thinking",
            Preference::F => "Feeling",
            Preference::J => "Judging",
            Preference::P => "Perceiving",
        }
    }

    /// Maps a dimension word from the score line (any case) to its letter.
    pub fn from_dimension(word: &str) -> Option<Preference> {
        match word.to_ascii_lowercase().as_str() {
            "extraversion" | "extroversion" => Some(Preference::E),
            "introversion" => Some(Preference::I),
            "sensing" => Some(Preference::S),
            "intuition" => Some(Preference::N),
            "thinking" => Some(Preference::T),
            "feeling" => Some(Preference::F),
            "judging" => Some(Preference::J),
            "perceiving" => Some(Preference::P),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Eight preference scores keyed by letter. Absent scores are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreferenceScores {
    values: [u32; 8],
}

impl PreferenceScores {
    pub fn get(&self, p: Preference) -> u32 {
        self.values[p.index()]
    }

    pub fn set(&mut self, p: Preference, value: u32) {
        self.values[p.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Preference, u32)> + '_ {
        Preference::ALL.into_iter().map(|p| (p, self.get(p)))
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0)
    }
}

impl Serialize for PreferenceScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(8))?;
        for (p, v) in self.iter() {
            map.serialize_entry(p.letter(), &v)?;
        }
        map.end()
    }
}

/// Index into [`FACET_NAMES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Facet(u8);

impl Facet {
    pub const COUNT: usize = FACET_NAMES.len();

    pub fn all() -> impl Iterator<Item = Facet> {
        (0..Self::COUNT as u8).map(Facet)
    }

    pub fn from_index(i: usize) -> Option<Facet> {
        (i < Self::COUNT).then_some(Facet(i as u8))
    }

    pub fn from_name(name: &str) -> Option<Facet> {
        let lower = name.trim().to_lowercase();
        FACET_NAMES
            .iter()
            .position(|n| n.to_lowercase() == lower)
            .map(|i| Facet(i as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn name(self) -> &'static str {
        FACET_NAMES[self.index()]
    }

    pub fn pair_index(self) -> usize {
        self.index() / 2
    }

    pub fn opposite(self) -> Facet {
        Facet(self.0 ^ 1)
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opposed facet pair, indexed like [`MIDZONE_LABELS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FacetPair(u8);

impl FacetPair {
    pub const COUNT: usize = MIDZONE_LABELS.len();

    pub fn all() -> impl Iterator<Item = FacetPair> {
        (0..Self::COUNT as u8).map(FacetPair)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn left(self) -> Facet {
        Facet(self.0 * 2)
    }

    pub fn right(self) -> Facet {
        Facet(self.0 * 2 + 1)
    }

    pub fn midzone_label(self) -> &'static str {
        MIDZONE_LABELS[self.index()]
    }

    /// `A-B` with a plain hyphen, as used for titles on `Data`.
    pub fn title(self) -> String {
        format!("{}-{}", self.left().name(), self.right().name())
    }

    pub fn from_midzone_label(label: &str) -> Option<FacetPair> {
        let lower = label.trim().to_lowercase();
        MIDZONE_LABELS
            .iter()
            .position(|m| m.to_lowercase() == lower)
            .map(|i| FacetPair(i as u8))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FacetClass {
    InPref,
    Midzone,
    OutOfPref,
    #[default]
    Unclassified,
}

impl FacetClass {
    pub const ALL: [FacetClass; 4] = [
        FacetClass::InPref,
        FacetClass::Midzone,
        FacetClass::OutOfPref,
        FacetClass::Unclassified,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FacetClass::InPref => "IN-PREF",
            FacetClass::Midzone => "MIDZONE",
            FacetClass::OutOfPref => "OUT-OF-PREF",
            FacetClass::Unclassified => "—",
        }
    }

    /// Accepts the four cell values plus a plain `-` for unclassified.
    pub fn parse(s: &str) -> Option<FacetClass> {
        match s.trim() {
            "IN-PREF" => Some(FacetClass::InPref),
            "MIDZONE" => Some(FacetClass::Midzone),
            "OUT-OF-PREF" => Some(FacetClass::OutOfPref),
            "—" | "-" | "" => Some(FacetClass::Unclassified),
            _ => None,
        }
    }
}

impl fmt::Display for FacetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FacetClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Classification of all 40 facets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacetClasses([FacetClass; Facet::COUNT]);

impl Default for FacetClasses {
    fn default() -> Self {
        Self([FacetClass::Unclassified; Facet::COUNT])
    }
}

impl FacetClasses {
    pub fn get(&self, facet: Facet) -> FacetClass {
        self.0[facet.index()]
    }

    pub fn set(&mut self, facet: Facet, class: FacetClass) {
        self.0[facet.index()] = class;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Facet, FacetClass)> + '_ {
        Facet::all().map(|f| (f, self.get(f)))
    }

    /// First pair where both sides carry the same exclusive class.
    pub fn conflicting_pair(&self) -> Option<(FacetPair, FacetClass)> {
        FacetPair::all().find_map(|pair| {
            let (l, r) = (self.get(pair.left()), self.get(pair.right()));
            (l == r && matches!(l, FacetClass::InPref | FacetClass::OutOfPref)).then_some((pair, l))
        })
    }
}

impl Serialize for FacetClasses {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Facet::COUNT))?;
        for (facet, class) in self.iter() {
            map.serialize_entry(facet.name(), &class)?;
        }
        map.end()
    }
}

/// Entry of a contextual facet list: a single facet or a midzone pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextFacet {
    Single(Facet),
    Midzone(FacetPair),
}

impl ContextFacet {
    /// Lowercased canonical form, the value written into context cells.
    pub fn canonical(self) -> String {
        match self {
            ContextFacet::Single(f) => f.name().to_lowercase(),
            ContextFacet::Midzone(p) => p.midzone_label().to_lowercase(),
        }
    }

    pub fn from_canonical(s: &str) -> Option<ContextFacet> {
        Facet::from_name(s)
            .map(ContextFacet::Single)
            .or_else(|| FacetPair::from_midzone_label(s).map(ContextFacet::Midzone))
    }

    /// Facets covered by this entry: one, or both sides of a pair.
    pub fn facets(self) -> Vec<Facet> {
        match self {
            ContextFacet::Single(f) => vec![f],
            ContextFacet::Midzone(p) => vec![p.left(), p.right()],
        }
    }
}

impl Serialize for ContextFacet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical())
    }
}

/// The three contextual sections of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Context {
    Communication,
    Change,
    Conflict,
}

impl Context {
    pub const ALL: [Context; 3] = [Context::Communication, Context::Change, Context::Conflict];

    /// Maximum entries kept per context.
    pub const MAX_FACETS: usize = 9;

    pub fn header(self) -> &'static str {
        match self {
            Context::Communication => {
                "YOUR FACET RESULT COMMUNICATION STYLE ENHANCING YOUR STYLE"
            }
            Context::Change => "YOUR FACET RESULT CHANGE MANAGEMENT STYLE ENHANCING YOUR STYLE",
            Context::Conflict => {
                "YOUR FACET RESULT CONFLICT MANAGEMENT STYLE ENHANCING YOUR STYLE"
            }
        }
    }

    /// Page footer that closes the section.
    pub fn end_marker(self) -> &'static str {
        match self {
            Context::Communication => "|10",
            Context::Change => "|12",
            Context::Conflict => "|13",
        }
    }

    /// Group header on `MBTI Results` and name of the per-context sheet.
    pub fn sheet_name(self) -> &'static str {
        match self {
            Context::Communication => "Communicating",
            Context::Change => "Managing Change",
            Context::Conflict => "Managing Conflict",
        }
    }

    pub fn table_name(self) -> String {
        format!("{}Table", self.sheet_name().replace(' ', ""))
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Context::Communication => "communication",
            Context::Change => "change",
            Context::Conflict => "conflict",
        };
        f.write_str(s)
    }
}

impl FromStr for Context {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "communication" => Ok(Context::Communication),
            "change" => Ok(Context::Change),
            "conflict" => Ok(Context::Conflict),
            other => Err(format!("unknown context: {other}")),
        }
    }
}

/// Normalized product of parsing one report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectRecord {
    pub name: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub mbti_type: MbtiType,
    pub dominant: Dominant,
    pub preference_scores: PreferenceScores,
    pub facet_classes: FacetClasses,
    pub communication_facets: Vec<ContextFacet>,
    pub change_facets: Vec<ContextFacet>,
    pub conflict_facets: Vec<ContextFacet>,
}

impl SubjectRecord {
    /// Builds a record with no facets or scores; `dominant` follows `mbti_type`.
    pub fn new(name: Option<String>, date: Option<String>, mbti_type: MbtiType) -> Self {
        Self {
            name,
            date,
            mbti_type,
            dominant: mbti_type.dominant(),
            preference_scores: PreferenceScores::default(),
            facet_classes: FacetClasses::default(),
            communication_facets: Vec::new(),
            change_facets: Vec::new(),
            conflict_facets: Vec::new(),
        }
    }

    pub fn context(&self, ctx: Context) -> &[ContextFacet] {
        match ctx {
            Context::Communication => &self.communication_facets,
            Context::Change => &self.change_facets,
            Context::Conflict => &self.conflict_facets,
        }
    }

    pub fn context_mut(&mut self, ctx: Context) -> &mut Vec<ContextFacet> {
        match ctx {
            Context::Communication => &mut self.communication_facets,
            Context::Change => &mut self.change_facets,
            Context::Conflict => &mut self.conflict_facets,
        }
    }

    /// Class to paint a context entry with. A midzone pair takes the class
    /// of its left side, which is symmetric for midzone results.
    pub fn class_of(&self, entry: ContextFacet) -> FacetClass {
        match entry {
            ContextFacet::Single(f) => self.facet_classes.get(f),
            ContextFacet::Midzone(p) => self.facet_classes.get(p.left()),
        }
    }
}

/// Splits a midzone label into its two sides.
pub fn split_midzone(label: &str) -> Vec<&str> {
    label
        .split(MIDZONE_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
