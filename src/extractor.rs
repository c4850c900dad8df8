//! Page signal extraction — snapshot to [`PageAnalysis`].
//!
//! Pure reads over the snapshot, no side effects. Extraction never fails:
//! a malformed URL yields an empty domain, missing text yields negative
//! signals, and the result is always a complete, well-typed analysis with
//! the risk score and level already derived.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::catalog::{self, Catalog, TacticKind};
use crate::page::{ElementInfo, PageSnapshot};
use crate::scorer::{self, RiskLevel};

/// One matched dark-pattern entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacticMatch {
    /// The catalog phrase pattern that matched.
    pub phrase: String,
    /// The tactic kind it signals.
    pub kind: TacticKind,
}

/// The classified signals of one page, plus the derived risk verdict.
///
/// `risk_score` and `risk_level` are always computed from the other
/// fields by the extractor; callers never set them independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageAnalysis {
    /// Full page URL.
    pub url: String,
    /// Host portion of the URL, empty when the URL does not parse.
    pub domain: String,
    /// Document title.
    pub title: String,
    /// Analysis instant, milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    /// Whether the page belongs to a shopping site.
    pub is_shopping_site: bool,
    /// Whether the page is a checkout page.
    pub is_checkout_page: bool,
    /// Whether the page is a single-product page.
    pub is_product_page: bool,
    /// Extracted prices in document order, capped at 20 entries.
    pub prices: Vec<f64>,
    /// Count of cart line-item elements (selector overlap may double-count).
    pub cart_items: u32,
    /// Matched dark patterns in catalog order, one per catalog entry.
    pub tactics: Vec<TacticMatch>,
    /// Additive risk score (derived).
    pub risk_score: u32,
    /// Categorical risk level (derived).
    pub risk_level: RiskLevel,
}

/// Analyze a snapshot at the given local instant.
///
/// The instant feeds both the analysis timestamp and the temporal scoring
/// signals, so repeated calls with identical inputs yield identical
/// results.
pub fn analyze(catalog: &Catalog, snapshot: &PageSnapshot, now: DateTime<Local>) -> PageAnalysis {
    let domain = extract_domain(&snapshot.url);
    let lower_text = snapshot.text.to_lowercase();
    let lower_url = snapshot.url.to_lowercase();

    let mut analysis = PageAnalysis {
        url: snapshot.url.clone(),
        domain: domain.clone(),
        title: snapshot.title.clone(),
        timestamp_ms: now.timestamp_millis(),
        is_shopping_site: detect_shopping_site(&domain, &lower_text),
        is_checkout_page: detect_checkout_page(&lower_url, &lower_text),
        is_product_page: detect_product_page(&lower_text),
        prices: extract_prices(catalog, &snapshot.text),
        cart_items: count_cart_items(&snapshot.elements),
        tactics: match_tactics(catalog, &snapshot.text),
        risk_score: 0,
        risk_level: RiskLevel::Low,
    };

    analysis.risk_score = scorer::score_page(&analysis, now);
    analysis.risk_level = scorer::risk_level(analysis.risk_score);
    analysis
}

/// Host portion of a URL, lowercased. Empty when the URL does not parse.
pub fn extract_domain(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_default()
}

/// Shopping-site detection.
///
/// A known-domain match is authoritative. Unknown domains need at least
/// two of the five textual indicators as corroborating evidence, so a
/// page that merely mentions "price" is not misclassified.
fn detect_shopping_site(domain: &str, lower_text: &str) -> bool {
    if catalog::SHOPPING_DOMAINS
        .iter()
        .any(|known| domain.ends_with(known) || domain.contains(known))
    {
        return true;
    }

    let hits = catalog::SHOPPING_INDICATORS
        .iter()
        .filter(|phrase| lower_text.contains(*phrase))
        .count();

    hits >= catalog::SHOPPING_INDICATOR_MIN
}

/// Checkout-page detection: a checkout keyword in the URL or a checkout
/// phrase in the text. Either alone is sufficient.
fn detect_checkout_page(lower_url: &str, lower_text: &str) -> bool {
    catalog::CHECKOUT_URL_KEYWORDS
        .iter()
        .any(|kw| lower_url.contains(kw))
        || catalog::CHECKOUT_PHRASES
            .iter()
            .any(|phrase| lower_text.contains(phrase))
}

/// Product-page detection: at least two of the six textual indicators.
fn detect_product_page(lower_text: &str) -> bool {
    let hits = catalog::PRODUCT_INDICATORS
        .iter()
        .filter(|phrase| lower_text.contains(*phrase))
        .count();

    hits >= catalog::PRODUCT_INDICATOR_MIN
}

/// Extract `$`-prefixed prices from page text in document order.
///
/// Strips the `$` and thousands separators, parses as decimal, keeps only
/// values in `(0, 100000)` exclusive, and truncates to the first 20
/// matches.
pub fn extract_prices(catalog: &Catalog, text: &str) -> Vec<f64> {
    catalog
        .price_regex()
        .find_iter(text)
        .filter_map(|m| {
            let cleaned = m.as_str().trim_start_matches('$').replace(',', "");
            cleaned.parse::<f64>().ok()
        })
        .filter(|&p| p > 0.0 && p < catalog::MAX_PRICE)
        .take(catalog::MAX_PRICES)
        .collect()
}

/// Count elements matching the cart line-item selectors.
///
/// Sums across selectors; an element matched by several selectors counts
/// several times. Accepted approximation.
pub fn count_cart_items(elements: &[ElementInfo]) -> u32 {
    let mut count: u32 = 0;

    for substring in catalog::CART_CLASS_SUBSTRINGS {
        for element in elements {
            if element.classes.contains(substring) {
                count = count.saturating_add(1);
            }
            if element.data_attrs.iter().any(|attr| attr.contains(substring)) {
                count = count.saturating_add(1);
            }
        }
    }

    for element in elements {
        if element.id.contains(catalog::CART_ID_SUBSTRING) {
            count = count.saturating_add(1);
        }
    }

    count
}

/// Match dark-pattern phrases against page text.
///
/// Each catalog entry is tested at most once; matches are appended in
/// catalog order regardless of how often the phrase occurs.
pub fn match_tactics(catalog: &Catalog, text: &str) -> Vec<TacticMatch> {
    catalog
        .tactics()
        .iter()
        .filter(|pattern| pattern.is_match(text))
        .map(|pattern| TacticMatch {
            phrase: pattern.phrase.to_owned(),
            kind: pattern.kind,
        })
        .collect()
}
