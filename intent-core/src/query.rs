//! Search query extraction
//!
//! Queries are cut by explicit scanning: the span runs from the end of a site mention (or the
//! start of the utterance) up to the first search keyword after it. No regex laziness involved.

use crate::error::Result;
use crate::lexicon::{Keywords, SearchLexicon};

/// Lower-case and trim an utterance before rule evaluation
pub fn normalize(text: &str) -> String {
    text.to_lowercase().trim().to_string()
}

/// Percent-encode a query for use as a URL query-parameter value
///
/// Unreserved characters pass through, everything else is `%XX` escaped (space becomes `%20`).
pub fn percent_encode(query: &str) -> String {
    urlencoding::encode(query).into_owned()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Compiled search vocabulary plus the extraction steps built on it
#[derive(Debug, Clone)]
pub struct QueryExtractor {
    keywords: Keywords,
    site_fillers: Keywords,
    particles: Keywords,
    default_site: Keywords,
}

impl QueryExtractor {
    pub fn new(lexicon: &SearchLexicon) -> Result<Self> {
        Ok(Self {
            keywords: Keywords::new(&lexicon.keywords)?,
            site_fillers: Keywords::new(&lexicon.site_fillers)?,
            particles: Keywords::new(&lexicon.particles)?,
            default_site: Keywords::new(&lexicon.google)?,
        })
    }

    /// Extract the query between a site mention and the following search keyword.
    ///
    /// Only the leftmost mention is tried: any keyword that follows a later mention also
    /// follows the first one. A keyword glued to the name ("유튜브검색") yields an empty query.
    pub fn site_query(&self, text: &str, sites: &Keywords) -> Option<String> {
        let site = sites.find_from(text, 0)?;
        let keyword = self.keywords.find_from(text, site.end)?;

        let mut span = &text[site.end..keyword.start];
        // a filler only counts when attached to the site name, e.g. "유튜브에서"
        if let Some(filler) = self.site_fillers.prefix_of(span) {
            span = &span[filler.len()..];
        }
        let span = span.trim_start_matches(|c: char| !is_word_char(c)).trim_end();

        Some(percent_encode(self.strip_particle(span)))
    }

    /// Extract the query preceding the first search keyword.
    ///
    /// A default-site mention such as "구글에서" is a qualifier, not part of the query: the
    /// span starts after it, or ends before it when nothing follows it ("날씨 구글에서 검색").
    pub fn generic_query(&self, text: &str) -> Option<String> {
        let keyword = self.keywords.find_from(text, 0)?;

        let mut span = &text[..keyword.start];
        if let Some(site) = self.default_site.find_from(span, 0) {
            let mut after = &span[site.end..];
            if let Some(filler) = self.site_fillers.prefix_of(after) {
                after = &after[filler.len()..];
            }
            span = if after.trim().is_empty() {
                &span[..site.start]
            } else {
                after
            };
        }
        let span = span.trim_start_matches(|c: char| !is_word_char(c)).trim_end();

        Some(percent_encode(self.strip_particle(span)))
    }

    /// Remove exactly one trailing particle, longest first.
    ///
    /// Stacked markers keep everything but the last one.
    pub fn strip_particle<'a>(&self, query: &'a str) -> &'a str {
        match self.particles.suffix_of(query) {
            Some(particle) => query[..query.len() - particle.len()].trim_end(),
            None => query,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;

    fn extractor() -> (QueryExtractor, Keywords) {
        let lexicon = Lexicon::default();
        (
            QueryExtractor::new(&lexicon.search).unwrap(),
            Keywords::new(&lexicon.search.youtube).unwrap(),
        )
    }

    fn decode(param: &str) -> String {
        urlencoding::decode(param).unwrap().into_owned()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Hello WORLD \n"), "hello world");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_percent_encode() {
        assert_eq!(percent_encode("cats and dogs"), "cats%20and%20dogs");
        assert_eq!(percent_encode("a&b=c?"), "a%26b%3Dc%3F");
        assert_eq!(percent_encode("고양이"), "%EA%B3%A0%EC%96%91%EC%9D%B4");
        assert_eq!(percent_encode("safe-_.~"), "safe-_.~");
    }

    #[test]
    fn test_site_query_with_attached_filler() {
        let (ex, youtube) = extractor();
        let q = ex.site_query("유튜브에서 고양이 검색해줘", &youtube).unwrap();
        assert_eq!(decode(&q), "고양이");
    }

    #[test]
    fn test_site_query_without_filler() {
        let (ex, youtube) = extractor();
        let q = ex.site_query("유튜브 강아지 영상 검색", &youtube).unwrap();
        assert_eq!(decode(&q), "강아지 영상");
    }

    #[test]
    fn test_separated_filler_lookalike_is_kept() {
        let (ex, youtube) = extractor();
        let q = ex.site_query("유튜브 에어컨 청소 검색", &youtube).unwrap();
        assert_eq!(decode(&q), "에어컨 청소");
    }

    #[test]
    fn test_site_query_stops_at_first_keyword() {
        let (ex, youtube) = extractor();
        let q = ex
            .site_query("유튜브에서 고양이 검색하고 강아지도 검색해", &youtube)
            .unwrap();
        assert_eq!(decode(&q), "고양이");
    }

    #[test]
    fn test_site_query_empty_span() {
        let (ex, youtube) = extractor();
        assert_eq!(ex.site_query("유튜브 검색", &youtube), Some(String::new()));
        assert_eq!(ex.site_query("유튜브에서 검색", &youtube), Some(String::new()));
        assert_eq!(ex.site_query("유튜브검색", &youtube), Some(String::new()));
        assert_eq!(ex.site_query("고양이 유튜브검색해줘", &youtube), Some(String::new()));
        assert_eq!(ex.site_query("유튜브", &youtube), None);
    }

    #[test]
    fn test_keyword_before_site_does_not_count() {
        let (ex, youtube) = extractor();
        assert_eq!(ex.site_query("검색 유튜브 고양이", &youtube), None);
    }

    #[test]
    fn test_generic_query() {
        let (ex, _) = extractor();
        assert_eq!(decode(&ex.generic_query("고양이 검색해줘").unwrap()), "고양이");
        assert_eq!(decode(&ex.generic_query("구글에 사과 검색해줘").unwrap()), "사과");
        assert_eq!(
            decode(&ex.generic_query("구글에서 강아지를 찾아줘").unwrap()),
            "강아지"
        );
        assert_eq!(ex.generic_query("검색"), Some(String::new()));
        assert_eq!(ex.generic_query("구글에서 검색"), Some(String::new()));
        assert_eq!(ex.generic_query("고양이"), None);
    }

    #[test]
    fn test_generic_query_qualifier_mid_utterance() {
        let (ex, _) = extractor();
        assert_eq!(
            decode(&ex.generic_query("지금 구글에서 날씨 검색해줘").unwrap()),
            "날씨"
        );
        assert_eq!(
            decode(&ex.generic_query("오늘 날씨 구글에서 검색").unwrap()),
            "오늘 날씨"
        );
        assert_eq!(decode(&ex.generic_query("오늘 날씨 구글 검색").unwrap()), "오늘 날씨");
    }

    #[test]
    fn test_strip_particle_single_trailing() {
        let (ex, _) = extractor();
        assert_eq!(ex.strip_particle("고양이를"), "고양이");
        assert_eq!(ex.strip_particle("사과도"), "사과");
        assert_eq!(ex.strip_particle("서울에서"), "서울");
        assert_eq!(ex.strip_particle("도서관"), "도서관");
        assert_eq!(ex.strip_particle("고양이"), "고양이");
    }

    #[test]
    fn test_strip_particle_leaves_stacked_markers() {
        let (ex, _) = extractor();
        // only the outermost marker goes
        assert_eq!(ex.strip_particle("고양이를은"), "고양이를");
        assert_eq!(ex.strip_particle("학교에서는"), "학교에서");
    }
}
