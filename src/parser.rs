//! Record Parser.
//!
//! The report's text layer carries no semantic labels, so every operation
//! anchors on line adjacency or fixed sentences. Each operation is total and
//! returns `ParseError::AnchorNotFound` when its anchor is absent and
//! `ParseError::Malformed` when the anchor is there but its content is not
//! usable. [`parse_record`] decides which of those reject the record.

use crate::postprocess::fold;
use crate::record::{
    Context, ContextFacet, Dominant, Facet, FacetClass, FacetClasses, MbtiType, Preference,
    PreferenceScores, SubjectRecord, split_midzone,
};
use crate::taxonomy::known_facet_names;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

pub const PAGE_MARKER_PREFIX: &str = "--- Page ";

const NAME_LINE: usize = 9;
const DATE_LINE: usize = 10;

const IN_PREF_ANCHOR: &str = "in-preference";
const MIDZONE_ANCHOR: &str = "midzone";
const OUT_OF_PREF_ANCHOR: &str = "out-of-preference";

const IN_PREF_STOPLIST: &[&str] = &[
    "and", "i", "|5", "|6", "harmony", "spontaneity", "pole.", "to", "your",
];
const MIDZONE_STOPLIST: &[&str] = &[
    "and",
    "would",
    "|5",
    "|6",
    "cause-and-eﬀect",
    "cause-and-eﬀect,",
    "the",
    "with",
    "facets.",
    "distractions.",
    "preference",
    "many",
];
const OUT_OF_PREF_STOPLIST: &[&str] = &[
    "and",
    "|5",
    "|6",
    "use.",
    "spontaneity",
    "preference",
];

static TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = MbtiType::ALL
        .iter()
        .map(|t| t.code())
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b({alternation})")).expect("type regex")
});

static SCORE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(EXTRAVERSION|INTUITION|THINKING|PERCEIVING)\s+\|\s+\d+").expect("score regex")
});

static SCORE_PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\s+\|\s+(\d+)").expect("pair regex"));

/// Lowercased facet names and midzone labels, longest first so that
/// `tough–tender` wins over `tough` and `early starting` over a bare token.
static KNOWN_NAMES: LazyLock<Vec<String>> = LazyLock::new(|| {
    let mut names: Vec<String> = known_facet_names().collect();
    names.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    names
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("anchor not found: {anchor}")]
    AnchorNotFound { anchor: String },
    #[error("malformed content at {anchor}: {detail}")]
    Malformed { anchor: String, detail: String },
}

impl ParseError {
    fn missing(anchor: &str) -> Self {
        ParseError::AnchorNotFound {
            anchor: anchor.to_string(),
        }
    }

    fn malformed(anchor: &str, detail: impl Into<String>) -> Self {
        ParseError::Malformed {
            anchor: anchor.to_string(),
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: Option<String>,
    pub date: Option<String>,
    pub mbti_type: MbtiType,
    pub dominant: Dominant,
}

pub fn page_marker(n: usize) -> String {
    format!("{PAGE_MARKER_PREFIX}{n} ---")
}

/// Text of page `n` (1-based), between its marker and the next one. A text
/// without any marker is treated as a single page 1.
pub fn page_text(text: &str, n: usize) -> Option<&str> {
    let marker = page_marker(n);
    let Some(start) = text.find(&marker) else {
        return (n == 1 && !text.contains(PAGE_MARKER_PREFIX)).then_some(text);
    };
    let body = &text[start + marker.len()..];
    let end = body.find(PAGE_MARKER_PREFIX).unwrap_or(body.len());
    Some(&body[..end])
}

/// Name, date and type. Only a missing type is an error.
pub fn identity(text: &str) -> Result<Identity, ParseError> {
    let mbti_type = find_type(text).ok_or_else(|| ParseError::missing("MBTI type"))?;

    let lines: Vec<&str> = page_text(text, 1)
        .map(|p| p.lines().map(str::trim).filter(|l| !l.is_empty()).collect())
        .unwrap_or_default();
    let name = lines.get(NAME_LINE).map(|s| s.to_string());
    let date = lines.get(DATE_LINE).map(|s| s.to_string());

    Ok(Identity {
        name,
        date,
        mbti_type,
        dominant: mbti_type.dominant(),
    })
}

/// First MBTI code by position in the text.
pub fn find_type(text: &str) -> Option<MbtiType> {
    TYPE_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn preference_scores(text: &str) -> Result<PreferenceScores, ParseError> {
    const ANCHOR: &str = "preference score line";

    let line = text
        .lines()
        .find(|l| SCORE_LINE_RE.is_match(l))
        .ok_or_else(|| ParseError::missing(ANCHOR))?;

    let mut scores = PreferenceScores::default();
    let mut seen = 0;
    for cap in SCORE_PAIR_RE.captures_iter(line) {
        let label = &cap[1];
        let Some(pref) = Preference::from_dimension(label) else {
            debug!("ignoring score label {label:?}");
            continue;
        };
        let value: u32 = cap[2]
            .parse()
            .map_err(|e| ParseError::malformed(ANCHOR, format!("{label}: {e}")))?;
        scores.set(pref, value);
        seen += 1;
    }

    if seen == 0 {
        return Err(ParseError::malformed(ANCHOR, "no dimension scores"));
    }
    Ok(scores)
}

/// Classifies all 40 facets from the keyword lines following them.
pub fn facet_classes(text: &str) -> Result<FacetClasses, ParseError> {
    let lines: Vec<&str> = text.lines().collect();

    let raw_in = collect_anchored(&lines, IN_PREF_ANCHOR);
    let raw_mid = collect_anchored(&lines, MIDZONE_ANCHOR);
    let raw_out = collect_anchored(&lines, OUT_OF_PREF_ANCHOR);

    if raw_in.is_empty() && raw_mid.is_empty() && raw_out.is_empty() {
        return Err(ParseError::missing("facet classification lines"));
    }

    let preferred = filter_list(raw_in, IN_PREF_STOPLIST);
    let midzone: Vec<String> = filter_list(raw_mid, MIDZONE_STOPLIST)
        .iter()
        .flat_map(|entry| split_midzone(entry).into_iter().map(str::to_string))
        .collect();
    let midzone = dedup_ci(midzone);
    let out = filter_list(raw_out, OUT_OF_PREF_STOPLIST);

    debug!(
        "facet lists in_pref={} midzone={} out_of_pref={}",
        preferred.len(),
        midzone.len(),
        out.len()
    );

    let contains = |list: &[String], name: &str| list.iter().any(|q| q.to_lowercase() == name);

    let mut classes = FacetClasses::default();
    for facet in Facet::all() {
        let name = facet.name().to_lowercase();
        let class = if contains(&preferred, &name) {
            FacetClass::InPref
        } else if contains(&midzone, &name) {
            FacetClass::Midzone
        } else if contains(&out, &name) {
            FacetClass::OutOfPref
        } else {
            FacetClass::Unclassified
        };
        classes.set(facet, class);
    }

    if let Some((pair, class)) = classes.conflicting_pair() {
        return Err(ParseError::malformed(
            "facet classes",
            format!("both sides of {} are {class}", pair.midzone_label()),
        ));
    }

    Ok(classes)
}

/// The facet token ending each line that is directly followed by a line
/// starting with `keyword`.
fn collect_anchored(lines: &[&str], keyword: &str) -> Vec<String> {
    let mut out = Vec::new();
    for i in 1..lines.len() {
        if !lines[i].trim().to_lowercase().starts_with(keyword) {
            continue;
        }
        let prev = lines[i - 1].trim();
        if let Some(token) = trailing_token(prev) {
            out.push(token);
        }
    }
    out
}

/// Longest known facet name or midzone label closing `line`, else its last word.
fn trailing_token(line: &str) -> Option<String> {
    let lower = line.to_lowercase();
    for name in KNOWN_NAMES.iter() {
        if let Some(head) = lower.strip_suffix(name.as_str()) {
            if head.is_empty() || head.ends_with(char::is_whitespace) {
                return Some(name.clone());
            }
        }
    }
    line.split_whitespace().last().map(str::to_string)
}

/// Stoplist, then drop the leading header word, then de-duplicate.
fn filter_list(raw: Vec<String>, stoplist: &[&str]) -> Vec<String> {
    let stop: Vec<String> = stoplist.iter().map(|s| fold(s)).collect();
    let mut kept: Vec<String> = raw
        .into_iter()
        .filter(|q| !stop.contains(&fold(q)))
        .collect();
    if !kept.is_empty() {
        kept.remove(0);
    }
    dedup_ci(kept)
}

fn dedup_ci(items: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for item in items {
        let key = item.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(item);
        }
    }
    out
}

/// Facets listed in one contextual section, lowercased and collapsed.
pub fn contextual_facets(text: &str, ctx: Context) -> Result<Vec<ContextFacet>, ParseError> {
    let header = ctx.header();
    let start = text
        .find(header)
        .ok_or_else(|| ParseError::missing(header))?;
    let body = &text[start + header.len()..];
    let end = body
        .find(ctx.end_marker())
        .ok_or_else(|| ParseError::missing(ctx.end_marker()))?;

    let mut entries: Vec<String> = Vec::new();
    for line in body[..end].lines() {
        if let Some(name) = leading_name(line.trim()) {
            if !entries.contains(&name) {
                entries.push(name);
            }
        }
    }

    let collapsed: Vec<String> = entries
        .iter()
        .filter(|e| !entries.iter().any(|o| o != *e && o.contains(e.as_str())))
        .cloned()
        .collect();

    let mut facets: Vec<ContextFacet> = collapsed
        .iter()
        .filter_map(|s| ContextFacet::from_canonical(s))
        .collect();

    if facets.len() > Context::MAX_FACETS {
        warn!(
            "{ctx} section lists {} facets; keeping the first {}",
            facets.len(),
            Context::MAX_FACETS
        );
        facets.truncate(Context::MAX_FACETS);
    }
    Ok(facets)
}

/// Longest known facet name or midzone label opening `line`.
fn leading_name(line: &str) -> Option<String> {
    let lower = line.to_lowercase();
    KNOWN_NAMES.iter().find_map(|name| {
        let rest = lower.strip_prefix(name.as_str())?;
        (rest.is_empty() || rest.starts_with(char::is_whitespace)).then(|| name.clone())
    })
}

/// Full record from one `_text.txt` body.
///
/// A missing type rejects the record. A missing score line leaves all scores
/// at zero; missing facet or context sections leave those parts empty.
/// Malformed content anywhere rejects the record.
pub fn parse_record(text: &str) -> Result<SubjectRecord, ParseError> {
    let id = identity(text)?;
    let mut record = SubjectRecord::new(id.name, id.date, id.mbti_type);

    match preference_scores(text) {
        Ok(scores) => record.preference_scores = scores,
        Err(ParseError::AnchorNotFound { anchor }) => {
            warn!("{anchor} not found; scores default to zero");
        }
        Err(e) => return Err(e),
    }

    match facet_classes(text) {
        Ok(classes) => record.facet_classes = classes,
        Err(ParseError::AnchorNotFound { anchor }) => {
            warn!("{anchor} not found; all facets unclassified");
        }
        Err(e) => return Err(e),
    }

    for ctx in Context::ALL {
        match contextual_facets(text, ctx) {
            Ok(list) => *record.context_mut(ctx) = list,
            Err(ParseError::AnchorNotFound { anchor }) => {
                debug!("{ctx} section anchor {anchor:?} not found");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_one(extra: &str) -> String {
        let mut s = String::from("--- Page 1 ---\n");
        for i in 1..=9 {
            s.push_str(&format!("header line {i}\n\n"));
        }
        s.push_str("Dana Cohen\n2024-03-01\n");
        s.push_str(extra);
        s
    }

    #[test]
    fn identity_reads_fixed_lines_and_first_type() {
        let text = page_one("Your reported type: ESFP\nnot INTJ\n");
        let id = identity(&text).unwrap();
        assert_eq!(id.name.as_deref(), Some("Dana Cohen"));
        assert_eq!(id.date.as_deref(), Some("2024-03-01"));
        assert_eq!(id.mbti_type, MbtiType::Esfp);
        assert_eq!(id.dominant, Dominant::Se);
    }

    #[test]
    fn identity_without_type_is_rejected() {
        let text = page_one("no code here\n");
        assert!(matches!(
            identity(&text),
            Err(ParseError::AnchorNotFound { .. })
        ));
    }

    #[test]
    fn short_first_page_leaves_name_and_date_empty() {
        let text = "--- Page 1 ---\nISTJ\n--- Page 2 ---\n";
        let id = identity(text).unwrap();
        assert_eq!(id.name, None);
        assert_eq!(id.date, None);
    }

    #[test]
    fn page_text_stops_at_next_marker() {
        let text = "--- Page 1 ---\none\n--- Page 2 ---\ntwo\n";
        assert_eq!(page_text(text, 1).unwrap().trim(), "one");
        assert_eq!(page_text(text, 2).unwrap().trim(), "two");
        assert!(page_text(text, 3).is_none());
    }

    #[test]
    fn scores_parse_from_pipe_line() {
        let text = "x\nEXTRAVERSION | 22 INTROVERSION | 8 SENSING | 14 INTUITION | 16 \
                    THINKING | 9 FEELING | 21 JUDGING | 11 PERCEIVING | 19\n";
        let s = preference_scores(text).unwrap();
        assert_eq!(s.get(Preference::E), 22);
        assert_eq!(s.get(Preference::I), 8);
        assert_eq!(s.get(Preference::F), 21);
        assert_eq!(s.get(Preference::P), 19);
    }

    #[test]
    fn missing_score_line_is_anchor_not_found() {
        assert!(matches!(
            preference_scores("nothing"),
            Err(ParseError::AnchorNotFound { .. })
        ));
    }

    #[test]
    fn oversized_score_is_malformed() {
        let text = "EXTRAVERSION | 99999999999999 INTROVERSION | 1";
        assert!(matches!(
            preference_scores(text),
            Err(ParseError::Malformed { .. })
        ));
    }

    #[test]
    fn trailing_token_prefers_known_names() {
        assert_eq!(
            trailing_token("you favour Early Starting").as_deref(),
            Some("early starting")
        );
        assert_eq!(
            trailing_token("result Tough–Tender").as_deref(),
            Some("tough–tender")
        );
        assert_eq!(trailing_token("plain words here").as_deref(), Some("here"));
    }

    #[test]
    fn stoplist_matches_ligature_variants() {
        let raw = vec![
            "facets".to_string(),
            "cause-and-effect,".to_string(),
            "Tough".to_string(),
            "tough".to_string(),
        ];
        assert_eq!(filter_list(raw, MIDZONE_STOPLIST), vec!["Tough".to_string()]);
    }

    #[test]
    fn facet_classes_follow_keyword_lines() {
        let text = "\
Extraversion facets
in-preference
Initiating
in-preference
Active
in-preference
header words
midzone
Tough–Tender
midzone
header words
out-of-preference
Receiving
out-of-preference
";
        let classes = facet_classes(text).unwrap();
        let get = |n: &str| classes.get(Facet::from_name(n).unwrap());
        assert_eq!(get("Initiating"), FacetClass::InPref);
        assert_eq!(get("Active"), FacetClass::InPref);
        assert_eq!(get("Receiving"), FacetClass::OutOfPref);
        assert_eq!(get("Tough"), FacetClass::Midzone);
        assert_eq!(get("Tender"), FacetClass::Midzone);
        assert_eq!(get("Quiet"), FacetClass::Unclassified);
    }

    #[test]
    fn both_sides_in_pref_is_malformed() {
        let text = "\
header
in-preference
Tough
in-preference
Tender
in-preference
";
        assert!(matches!(
            facet_classes(text),
            Err(ParseError::Malformed { .. })
        ));
    }

    #[test]
    fn context_section_collapses_substrings() {
        let text = format!(
            "{}\nTough people say\nTough–Tender balance\nnoise line\n|13\nTender after marker\n",
            Context::Conflict.header()
        );
        let list = contextual_facets(&text, Context::Conflict).unwrap();
        let names: Vec<String> = list.iter().map(|f| f.canonical()).collect();
        assert_eq!(names, vec!["tough–tender".to_string()]);
    }

    #[test]
    fn context_section_without_header_is_anchor_not_found() {
        assert!(matches!(
            contextual_facets("text", Context::Change),
            Err(ParseError::AnchorNotFound { .. })
        ));
    }
}
