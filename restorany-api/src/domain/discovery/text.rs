//! Fuzzy text matching over venue name/address/category fields.
//!
//! Matching is case- and diacritic-insensitive: the catalog's text is
//! Croatian, so "cevapi" must find "Ćevapi". Scoring mirrors what the
//! Postgres backend gets from pg_trgm + unaccent: a folded-substring hit
//! ranks highest, otherwise the best per-word trigram similarity. The
//! threshold applies to the final weighted score, the same stage at which
//! the SQL side filters.

use std::collections::HashSet;

use crate::domain::models::Venue;

/// Minimum weighted relevance for a match, matching the pg_trgm default.
const SIMILARITY_THRESHOLD: f64 = 0.3;

/// Field weights: a name hit outranks an address hit outranks a category hit.
const NAME_WEIGHT: f64 = 1.0;
const ADDRESS_WEIGHT: f64 = 0.6;
const CATEGORY_WEIGHT: f64 = 0.4;

/// Lowercase and strip diacritics. Covers the Croatian alphabet plus the
/// handful of other Latin diacritics that show up in venue names.
pub fn fold(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'č' | 'ć' => 'c',
            'đ' => 'd',
            'š' => 's',
            'ž' => 'z',
            'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ñ' => 'n',
            'ß' => 's',
            other => other,
        })
        .collect()
}

/// Trigram set of a folded string, padded like pg_trgm ("  ab" prefix,
/// "ab " suffix) so short words still produce useful trigrams.
fn trigrams(folded: &str) -> HashSet<[char; 3]> {
    let mut set = HashSet::new();
    for word in folded.split(|c: char| !c.is_alphanumeric()) {
        if word.is_empty() {
            continue;
        }
        let padded: Vec<char> = std::iter::repeat(' ')
            .take(2)
            .chain(word.chars())
            .chain(std::iter::once(' '))
            .collect();
        for window in padded.windows(3) {
            set.insert([window[0], window[1], window[2]]);
        }
    }
    set
}

/// Jaccard similarity of the trigram sets of two already-folded strings.
fn trigram_similarity(a: &str, b: &str) -> f64 {
    let ta = trigrams(a);
    let tb = trigrams(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let shared = ta.intersection(&tb).count() as f64;
    let union = (ta.len() + tb.len()) as f64 - shared;
    shared / union
}

/// Score one text field against a folded query. Substring containment wins
/// outright; otherwise the best trigram similarity of the query against any
/// single word of the field.
fn score_field(folded_query: &str, field: &str) -> f64 {
    let folded_field = fold(field);
    if folded_field.contains(folded_query) {
        return 1.0;
    }
    folded_field
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|word| trigram_similarity(folded_query, word))
        .fold(0.0, f64::max)
}

/// Relevance of a venue for a query, or `None` when the best weighted score
/// stays under the threshold.
///
/// The threshold cuts after field weighting, so a fuzzy address or category
/// hit must be proportionally stronger than a name hit to survive; the
/// Postgres backend filters its weighted relevance the same way. The query
/// must be pre-trimmed and non-empty; callers handle the empty-query
/// fallback before reaching here.
pub fn relevance(query: &str, venue: &Venue) -> Option<f64> {
    let folded_query = fold(query);

    let name = NAME_WEIGHT * score_field(&folded_query, &venue.name);
    let address = ADDRESS_WEIGHT
        * venue
            .address
            .as_deref()
            .map_or(0.0, |a| score_field(&folded_query, a));
    let category = CATEGORY_WEIGHT
        * venue
            .details
            .categories
            .iter()
            .map(|c| score_field(&folded_query, c))
            .fold(0.0, f64::max);

    let best = name.max(address).max(category);
    (best >= SIMILARITY_THRESHOLD).then_some(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::discovery::geo::GeoPoint;
    use crate::domain::models::{Venue, VenueDetails, VenueId};
    use std::collections::HashMap;
    use time::OffsetDateTime;

    fn venue(name: &str, address: Option<&str>, categories: &[&str]) -> Venue {
        Venue {
            id: VenueId::new(1),
            name: name.to_string(),
            address: address.map(str::to_string),
            phone: None,
            website: None,
            location: GeoPoint::new(46.3, 16.3),
            details: VenueDetails {
                categories: categories.iter().map(|c| c.to_string()).collect(),
                ..Default::default()
            },
            opening_hours: HashMap::new(),
            image_url: None,
            average_rating: 0.0,
            review_count: 0,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn fold_strips_croatian_diacritics() {
        assert_eq!(fold("Čevabdžinica Šiš-Ćevap"), "cevabdzinica sis-cevap");
        assert_eq!(fold("ĐAKOVO"), "dakovo");
    }

    #[test]
    fn substring_match_ignores_case_and_diacritics() {
        let v = venue("Ćevabdžinica Behar", None, &[]);
        let score = relevance("cevab", &v).unwrap();
        assert_eq!(score, NAME_WEIGHT);
    }

    #[test]
    fn fuzzy_match_tolerates_small_typos() {
        let v = venue("Restoran Zlatna Školjka", None, &[]);
        assert!(relevance("skoljka", &v).is_some());
        assert!(relevance("skolka", &v).is_some());
    }

    #[test]
    fn unrelated_query_does_not_match() {
        let v = venue("Pizzeria Roma", None, &[]);
        assert!(relevance("sushi", &v).is_none());
    }

    #[test]
    fn name_hit_outranks_category_hit() {
        let by_name = venue("Pizza Mama", None, &[]);
        let by_category = venue("Kod Marka", None, &["pizza"]);
        let name_score = relevance("pizza", &by_name).unwrap();
        let category_score = relevance("pizza", &by_category).unwrap();
        assert!(name_score > category_score);
    }

    #[test]
    fn address_matches_count() {
        let v = venue("Konoba", Some("Ulica kralja Tomislava 5"), &[]);
        assert!(relevance("tomislava", &v).is_some());
    }

    #[test]
    fn trigram_similarity_is_one_for_identical_words() {
        assert_eq!(trigram_similarity("pizza", "pizza"), 1.0);
    }

    #[test]
    fn threshold_cuts_after_field_weighting() {
        // "skolke" against the word "skoljka" scores ~0.36: enough as a
        // name hit, but not once the 0.6 address weight is applied.
        let by_name = venue("Skoljka", None, &[]);
        assert!(relevance("skolke", &by_name).is_some());

        let by_address = venue("Konoba", Some("Obala Skoljka 3"), &[]);
        assert!(relevance("skolke", &by_address).is_none());
    }
}
