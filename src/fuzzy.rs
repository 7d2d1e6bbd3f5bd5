//! Fuzzy matching over the hotel listing
//!
//! Provides typo-tolerant, multi-field search for free-text queries.
//! Each query term is scored against every indexed field using:
//! - Exact, prefix and substring matching (highest priority)
//! - Approximate substring matching with edit distance (typo tolerance)
//! - Fuzzy subsequence scoring (skim algorithm)
//!
//! Scores run from 0.0 (perfect) to 1.0 (no resemblance); a field only
//! matches when its score stays within the configured threshold.
//!
//! Queries support an extended syntax:
//! - `term`    fuzzy match
//! - `=term`   a field equals the term
//! - `'term`   a field contains the term
//! - `!term`   no field contains the term
//! - `^term`   a field starts with the term
//! - `!^term`  no field starts with the term
//! - `term$`   a field ends with the term
//! - `!term$`  no field ends with the term
//!
//! Whitespace-separated terms must all match (AND); `|` separates
//! alternative groups (OR).

use std::cmp::Ordering;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher as FuzzyMatcherTrait;
use serde::Serialize;

use crate::config::SearchConfig;
use crate::hotel::Hotel;
use crate::text::normalize;

/// Maximum Levenshtein distance for slug/name corrections
const MAX_EDIT_DISTANCE: usize = 2;

/// Best confidence a subsequence match can reach
const MAX_FUZZY_CONFIDENCE: f64 = 0.85;

/// Hotel fields covered by the search index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKey {
    Name,
    Location,
    Stars,
    Rating,
    AverageRating,
    Amenities,
    Description,
    Type,
    Price,
}

/// Indexed fields with their weights; a higher weight ranks hits on that
/// field above equally good hits elsewhere
pub const SEARCH_KEYS: &[(SearchKey, f64)] = &[
    (SearchKey::Name, 1.5),
    (SearchKey::Location, 1.2),
    (SearchKey::Stars, 1.0),
    (SearchKey::Rating, 1.0),
    (SearchKey::AverageRating, 1.0),
    (SearchKey::Amenities, 1.0),
    (SearchKey::Description, 0.8),
    (SearchKey::Type, 1.0),
    (SearchKey::Price, 1.0),
];

impl SearchKey {
    fn extract(&self, hotel: &Hotel) -> String {
        match self {
            SearchKey::Name => hotel.name.clone(),
            SearchKey::Location => hotel.location.clone(),
            SearchKey::Stars => hotel.stars.clone(),
            SearchKey::Rating => {
                if hotel.rating.is_empty() {
                    hotel.rating_score.map(|s| s.to_string()).unwrap_or_default()
                } else {
                    hotel.rating.clone()
                }
            }
            SearchKey::AverageRating => hotel
                .valoracion_promedio
                .map(|v| v.to_string())
                .unwrap_or_default(),
            SearchKey::Amenities => hotel.amenities.clone(),
            SearchKey::Description => hotel.description.clone(),
            SearchKey::Type => hotel.kind.clone(),
            SearchKey::Price => hotel.price.clone(),
        }
    }
}

/// A match result with confidence information
#[derive(Debug, Clone)]
pub struct Match<T> {
    /// The matched item
    pub item: T,
    /// Match confidence (0.0 to 1.0)
    pub confidence: f64,
    /// How the match was found
    pub match_type: MatchType,
    /// The input that was matched against
    pub matched_input: String,
    /// What part of the item matched
    pub matched_on: String,
}

impl<T> Match<T> {
    pub fn exact(item: T, input: &str, matched_on: &str) -> Self {
        Self {
            item,
            confidence: 1.0,
            match_type: MatchType::Exact,
            matched_input: input.to_string(),
            matched_on: matched_on.to_string(),
        }
    }

    pub fn prefix(item: T, input: &str, matched_on: &str) -> Self {
        Self {
            item,
            confidence: 0.9,
            match_type: MatchType::Prefix,
            matched_input: input.to_string(),
            matched_on: matched_on.to_string(),
        }
    }

    pub fn typo(item: T, input: &str, matched_on: &str, distance: usize) -> Self {
        let confidence = match distance {
            1 => 0.8,
            2 => 0.6,
            _ => 0.4,
        };
        Self {
            item,
            confidence,
            match_type: MatchType::Typo { distance },
            matched_input: input.to_string(),
            matched_on: matched_on.to_string(),
        }
    }

    pub fn scored(item: T, input: &str, matched_on: &str, score: f64, match_type: MatchType) -> Self {
        Self {
            item,
            confidence: (1.0 - score).clamp(0.0, 1.0),
            match_type,
            matched_input: input.to_string(),
            matched_on: matched_on.to_string(),
        }
    }
}

/// How the match was found
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchType {
    /// Exact string match
    Exact,
    /// Input is a prefix of the target
    Prefix,
    /// Input occurs inside the target
    Substring,
    /// Approximate match within an edit distance
    Typo { distance: usize },
    /// Subsequence match using the skim algorithm
    Fuzzy,
}

impl MatchType {
    /// Get a priority for sorting (lower is better)
    pub fn priority(&self) -> u8 {
        match self {
            MatchType::Exact => 0,
            MatchType::Prefix => 1,
            MatchType::Substring => 2,
            MatchType::Typo { distance: 1 } => 3,
            MatchType::Typo { distance: 2 } => 4,
            MatchType::Typo { .. } => 5,
            MatchType::Fuzzy => 6,
        }
    }

    /// Base score for containment matches
    fn containment_score(&self) -> f64 {
        match self {
            MatchType::Exact => 0.0,
            MatchType::Prefix => 0.01,
            _ => 0.02,
        }
    }
}

/// Result of attempting to match input
#[derive(Debug)]
pub enum MatchResult<T> {
    /// Single unambiguous match
    Single(Match<T>),
    /// Multiple possible matches (ambiguous)
    Multiple(Vec<Match<T>>),
    /// No match found
    None,
}

impl<T> MatchResult<T> {
    /// Get the best match if unambiguous
    pub fn best(self) -> Option<Match<T>> {
        match self {
            MatchResult::Single(m) => Some(m),
            MatchResult::Multiple(mut matches) if !matches.is_empty() => {
                matches.sort_by(|a, b| {
                    b.confidence
                        .partial_cmp(&a.confidence)
                        .unwrap_or(Ordering::Equal)
                });
                Some(matches.remove(0))
            }
            _ => None,
        }
    }

    fn from_matches(mut matches: Vec<Match<T>>) -> Self {
        match matches.len() {
            0 => MatchResult::None,
            1 => MatchResult::Single(matches.remove(0)),
            _ => MatchResult::Multiple(matches),
        }
    }
}

/// One ranked search result
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchHit {
    /// Position of the hotel in the indexed listing
    pub position: usize,
    /// 0.0 is a perfect match, 1.0 no match at all
    pub score: f64,
    /// Field that produced the best term score
    pub matched_on: SearchKey,
    pub match_type: MatchType,
}

/// Approximate text search over a hotel listing
pub trait HotelIndex {
    /// Ranked hits for a free-text query, best first
    fn search(&self, query: &str) -> Vec<SearchHit>;
}

/// Extended-syntax operator attached to a query term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TermOp {
    Fuzzy,
    Exact,
    Include,
    Exclude,
    Prefix,
    NotPrefix,
    Suffix,
    NotSuffix,
}

impl TermOp {
    fn is_negation(&self) -> bool {
        matches!(self, TermOp::Exclude | TermOp::NotPrefix | TermOp::NotSuffix)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Term {
    op: TermOp,
    text: String,
}

impl Term {
    fn parse(token: &str) -> Option<Self> {
        let (op, body) = if let Some(rest) = token.strip_prefix("!^") {
            (TermOp::NotPrefix, rest)
        } else if let Some(rest) = token.strip_prefix('!') {
            match rest.strip_suffix('$') {
                Some(inner) => (TermOp::NotSuffix, inner),
                None => (TermOp::Exclude, rest),
            }
        } else if let Some(rest) = token.strip_prefix('^') {
            (TermOp::Prefix, rest)
        } else if let Some(rest) = token.strip_prefix('=') {
            (TermOp::Exact, rest)
        } else if let Some(rest) = token.strip_prefix('\'') {
            (TermOp::Include, rest)
        } else if let Some(rest) = token.strip_suffix('$') {
            (TermOp::Suffix, rest)
        } else {
            (TermOp::Fuzzy, token)
        };

        let text = normalize(body);
        if text.is_empty() {
            None
        } else {
            Some(Self { op, text })
        }
    }
}

/// Parse a query into OR groups of AND terms
fn parse_query(query: &str) -> Vec<Vec<Term>> {
    query
        .split('|')
        .map(|group| group.split_whitespace().filter_map(Term::parse).collect::<Vec<_>>())
        .filter(|group| !group.is_empty())
        .collect()
}

#[derive(Debug, Clone)]
struct IndexedField {
    key: SearchKey,
    weight: f64,
    text: String,
}

#[derive(Debug, Clone)]
struct TermScore {
    score: f64,
    key: SearchKey,
    match_type: MatchType,
}

/// Multi-field fuzzy index over a hotel listing.
///
/// Built once per listing load; searches never mutate it.
pub struct FuzzyIndex {
    records: Vec<Vec<IndexedField>>,
    threshold: f64,
    min_match_char_length: usize,
    matcher: SkimMatcherV2,
}

impl FuzzyIndex {
    pub fn new(hotels: &[Hotel], options: &SearchConfig) -> Self {
        let records = hotels
            .iter()
            .map(|hotel| {
                SEARCH_KEYS
                    .iter()
                    .map(|(key, weight)| IndexedField {
                        key: *key,
                        weight: *weight,
                        text: normalize(&key.extract(hotel)),
                    })
                    .filter(|field| !field.text.is_empty())
                    .collect()
            })
            .collect();

        Self {
            records,
            threshold: options.threshold,
            min_match_char_length: options.min_match_char_length.max(1),
            matcher: SkimMatcherV2::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Score a fuzzy term against one field's text
    fn score_field(&self, term: &str, text: &str) -> Option<(f64, MatchType)> {
        let term_len = term.chars().count();
        if term_len < self.min_match_char_length {
            return None;
        }

        // First pass: containment
        if text == term {
            return Some((MatchType::Exact.containment_score(), MatchType::Exact));
        }
        if text.starts_with(term) {
            return Some((MatchType::Prefix.containment_score(), MatchType::Prefix));
        }
        if text.contains(term) {
            return Some((MatchType::Substring.containment_score(), MatchType::Substring));
        }

        // Second pass: approximate substring with edit distance
        let max_errors = (self.threshold * term_len as f64).floor() as usize;
        if max_errors > 0 {
            let distance = substring_distance(term, text);
            if distance <= max_errors {
                let score = distance as f64 / term_len as f64;
                return Some((score, MatchType::Typo { distance }));
            }
        }

        // Third pass: skim subsequence scoring, relative to a perfect hit
        let max_possible_score = self.matcher.fuzzy_match(term, term)?.max(1);
        let score = self.matcher.fuzzy_match(text, term)?;
        let confidence = (score as f64 / max_possible_score as f64).min(MAX_FUZZY_CONFIDENCE);
        let fuzzy_score = 1.0 - confidence;
        (fuzzy_score <= self.threshold).then_some((fuzzy_score, MatchType::Fuzzy))
    }

    fn score_term(&self, term: &Term, fields: &[IndexedField]) -> Option<TermScore> {
        let t = term.text.as_str();
        let find = |pred: fn(&str, &str) -> bool| fields.iter().find(|f| pred(f.text.as_str(), t));
        let hit = |key: SearchKey, match_type: MatchType| TermScore {
            score: match_type.containment_score(),
            key,
            match_type,
        };

        match term.op {
            TermOp::Exact => find(|text, t| text == t).map(|f| hit(f.key, MatchType::Exact)),
            TermOp::Include => {
                find(|text, t| text.contains(t)).map(|f| hit(f.key, MatchType::Substring))
            }
            TermOp::Prefix => {
                find(|text, t| text.starts_with(t)).map(|f| hit(f.key, MatchType::Prefix))
            }
            TermOp::Suffix => {
                find(|text, t| text.ends_with(t)).map(|f| hit(f.key, MatchType::Substring))
            }
            TermOp::Exclude => find(|text, t| text.contains(t))
                .is_none()
                .then(|| hit(SearchKey::Name, MatchType::Exact)),
            TermOp::NotPrefix => find(|text, t| text.starts_with(t))
                .is_none()
                .then(|| hit(SearchKey::Name, MatchType::Exact)),
            TermOp::NotSuffix => find(|text, t| text.ends_with(t))
                .is_none()
                .then(|| hit(SearchKey::Name, MatchType::Exact)),
            TermOp::Fuzzy => fields
                .iter()
                .filter_map(|field| {
                    self.score_field(t, &field.text).map(|(score, match_type)| TermScore {
                        score: (score / field.weight).min(1.0),
                        key: field.key,
                        match_type,
                    })
                })
                .min_by(|a, b| {
                    a.score
                        .partial_cmp(&b.score)
                        .unwrap_or(Ordering::Equal)
                        .then(a.match_type.priority().cmp(&b.match_type.priority()))
                }),
        }
    }

    /// Score a record against one AND group: mean of the term scores
    fn score_group(&self, group: &[Term], fields: &[IndexedField]) -> Option<TermScore> {
        let mut total = 0.0;
        let mut best: Option<TermScore> = None;

        for term in group {
            let scored = self.score_term(term, fields)?;
            total += scored.score;
            if !term.op.is_negation() && best.as_ref().map_or(true, |b| scored.score < b.score) {
                best = Some(scored);
            }
        }

        // Groups made only of negations report a name hit
        let mut best = best.unwrap_or(TermScore {
            score: 0.0,
            key: SearchKey::Name,
            match_type: MatchType::Exact,
        });
        best.score = total / group.len() as f64;
        Some(best)
    }

    /// Best ranked hits, truncated to `limit`
    pub fn search_limit(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let mut hits = self.search(query);
        hits.truncate(limit);
        hits
    }
}

impl HotelIndex for FuzzyIndex {
    fn search(&self, query: &str) -> Vec<SearchHit> {
        let groups = parse_query(query);
        if groups.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<SearchHit> = self
            .records
            .iter()
            .enumerate()
            .filter_map(|(position, fields)| {
                groups
                    .iter()
                    .filter_map(|group| self.score_group(group, fields))
                    .min_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal))
                    .map(|best| SearchHit {
                        position,
                        score: best.score,
                        matched_on: best.key,
                        match_type: best.match_type,
                    })
            })
            .collect();

        // Stable sort keeps listing order among equal scores
        hits.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal));

        log::debug!("Fuzzy search {:?}: {} hits", query, hits.len());
        hits
    }
}

/// Find a hotel by slug or name.
///
/// Passes, first success wins: exact slug/name, prefix, typo correction
/// (Levenshtein), then the fuzzy index.
pub fn find_hotel<'a>(
    input: &str,
    hotels: &'a [Hotel],
    index: &dyn HotelIndex,
) -> MatchResult<&'a Hotel> {
    let input_lower = input.trim().to_lowercase();
    let input_name = normalize(input);
    if input_lower.is_empty() {
        return MatchResult::None;
    }

    // First pass: exact matches
    for hotel in hotels {
        let slug = hotel.slug();
        if slug == input_lower {
            return MatchResult::Single(Match::exact(hotel, input, &slug));
        }
        if normalize(&hotel.name) == input_name {
            return MatchResult::Single(Match::exact(hotel, input, &hotel.name));
        }
    }

    // Second pass: prefix matches
    let prefix_matches: Vec<_> = hotels
        .iter()
        .filter(|hotel| {
            hotel.slug().starts_with(&input_lower)
                || (!input_name.is_empty() && normalize(&hotel.name).starts_with(&input_name))
        })
        .map(|hotel| Match::prefix(hotel, input, &hotel.name))
        .collect();
    if !prefix_matches.is_empty() {
        return MatchResult::from_matches(prefix_matches);
    }

    // Third pass: typo correction with Levenshtein distance
    let mut typo_matches: Vec<_> = hotels
        .iter()
        .filter_map(|hotel| {
            let slug = hotel.slug();
            let distance = levenshtein(&input_lower, &slug)
                .min(levenshtein(&input_name, &normalize(&hotel.name)));
            (distance > 0 && distance <= MAX_EDIT_DISTANCE)
                .then(|| Match::typo(hotel, input, &slug, distance))
        })
        .collect();
    if !typo_matches.is_empty() {
        typo_matches.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });
        return MatchResult::from_matches(typo_matches);
    }

    // Fourth pass: fuzzy index
    let fuzzy_matches = index
        .search(input)
        .into_iter()
        .filter_map(|hit| {
            hotels.get(hit.position).map(|hotel| {
                Match::scored(hotel, input, &hotel.name, hit.score, hit.match_type)
            })
        })
        .collect();
    MatchResult::from_matches(fuzzy_matches)
}

/// Smallest edit distance between `pattern` and any substring of `text`
fn substring_distance(pattern: &str, text: &str) -> usize {
    let pattern: Vec<char> = pattern.chars().collect();
    let m = pattern.len();
    if m == 0 {
        return 0;
    }

    // Row 0 is free: a match may start anywhere in the text
    let mut prev_col: Vec<usize> = (0..=m).collect();
    let mut curr_col = vec![0; m + 1];
    let mut best = m;

    for t_char in text.chars() {
        curr_col[0] = 0;
        for (j, p_char) in pattern.iter().enumerate() {
            let cost = if *p_char == t_char { 0 } else { 1 };
            curr_col[j + 1] = (prev_col[j + 1] + 1)
                .min(curr_col[j] + 1)
                .min(prev_col[j] + cost);
        }
        best = best.min(curr_col[m]);
        std::mem::swap(&mut prev_col, &mut curr_col);
    }

    best
}

/// Calculate Levenshtein distance between two strings
fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // Early termination: if length difference > MAX_EDIT_DISTANCE, no point calculating
    if a_len.abs_diff(b_len) > MAX_EDIT_DISTANCE {
        return MAX_EDIT_DISTANCE + 1;
    }

    let mut prev_row: Vec<usize> = (0..=b_len).collect();
    let mut curr_row = vec![0; b_len + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        curr_row[0] = i + 1;

        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = if a_char == b_char { 0 } else { 1 };
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_len]
}
