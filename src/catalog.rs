//! Static pattern tables for page classification.
//!
//! Pure data plus one construction step: the dark-pattern and price regexes
//! are compiled once when the [`Catalog`] is built. The tables themselves
//! are fixed at compile time; a pattern that fails to compile is a
//! configuration defect and is skipped, never a runtime error.

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use tracing::warn;

// ---------------------------------------------------------------------------
// Domain and keyword tables
// ---------------------------------------------------------------------------

/// Known shopping domains. A suffix/substring match on any entry is
/// authoritative for shopping-site detection.
pub const SHOPPING_DOMAINS: &[&str] = &[
    "amazon.com",
    "ebay.com",
    "etsy.com",
    "walmart.com",
    "target.com",
    "bestbuy.com",
    "aliexpress.com",
    "alibaba.com",
    "temu.com",
    "shein.com",
    "wish.com",
    "nike.com",
    "adidas.com",
    "asos.com",
    "zalando.com",
    "wayfair.com",
    "costco.com",
    "homedepot.com",
    "sephora.com",
    "shopify.com",
];

/// Textual indicators of a shopping site for unknown domains.
pub const SHOPPING_INDICATORS: &[&str] =
    &["add to cart", "buy now", "shopping cart", "checkout", "price"];

/// Minimum number of [`SHOPPING_INDICATORS`] hits required to classify an
/// unknown domain as a shopping site.
pub const SHOPPING_INDICATOR_MIN: usize = 2;

/// URL substrings that indicate a checkout page.
pub const CHECKOUT_URL_KEYWORDS: &[&str] = &["checkout", "payment", "billing", "order", "purchase"];

/// Page-text phrases that indicate a checkout page. Any single hit is
/// sufficient; no corroboration with the URL is required.
pub const CHECKOUT_PHRASES: &[&str] =
    &["complete your order", "payment method", "billing address"];

/// Textual indicators of a product page.
pub const PRODUCT_INDICATORS: &[&str] = &[
    "add to cart",
    "add to bag",
    "buy now",
    "in stock",
    "out of stock",
    "quantity",
];

/// Minimum number of [`PRODUCT_INDICATORS`] hits required to classify a
/// page as a product page.
pub const PRODUCT_INDICATOR_MIN: usize = 2;

// ---------------------------------------------------------------------------
// Price extraction
// ---------------------------------------------------------------------------

/// Regex for `$`-prefixed price tokens in page text.
pub const PRICE_PATTERN: &str = r"\$[\d,]+\.?\d*";

/// Maximum number of prices kept per analysis (document order).
pub const MAX_PRICES: usize = 20;

/// Exclusive upper bound for a plausible price. Filters phone numbers and
/// IDs mis-parsed as currency.
pub const MAX_PRICE: f64 = 100_000.0;

// ---------------------------------------------------------------------------
// Cart item selectors
// ---------------------------------------------------------------------------

/// Class or data-attribute substrings associated with cart line items.
pub const CART_CLASS_SUBSTRINGS: &[&str] = &["cart-item", "cart_item", "basket-item"];

/// Element-id substring associated with cart line items.
pub const CART_ID_SUBSTRING: &str = "cart-item";

// ---------------------------------------------------------------------------
// Risk weights and level thresholds
// ---------------------------------------------------------------------------

/// Points for a shopping-site match.
pub const WEIGHT_SHOPPING_SITE: u32 = 20;
/// Points for a checkout page. Dominates because it is closest to harm.
pub const WEIGHT_CHECKOUT_PAGE: u32 = 40;
/// Points for a product page.
pub const WEIGHT_PRODUCT_PAGE: u32 = 15;
/// Points when any extracted price exceeds [`HIGH_PRICE_THRESHOLD`].
pub const WEIGHT_HIGH_PRICE: u32 = 15;
/// Price above which the high-price signal fires.
pub const HIGH_PRICE_THRESHOLD: f64 = 100.0;
/// Points per matched dark pattern. Uncapped: repeated tactics compound.
pub const WEIGHT_PER_TACTIC: u32 = 10;
/// Points when the cart holds at least one item.
pub const WEIGHT_CART_ACTIVITY: u32 = 20;
/// Points for late-night browsing (22:00-05:59 local).
pub const WEIGHT_LATE_NIGHT: u32 = 15;
/// Points for weekend browsing.
pub const WEIGHT_WEEKEND: u32 = 5;

/// Score at or above which the risk level is critical.
pub const THRESHOLD_CRITICAL: u32 = 70;
/// Score at or above which the risk level is high.
pub const THRESHOLD_HIGH: u32 = 50;
/// Score at or above which the risk level is medium.
pub const THRESHOLD_MEDIUM: u32 = 30;

// ---------------------------------------------------------------------------
// Dark patterns
// ---------------------------------------------------------------------------

/// Kind of manipulative purchase-pressure tactic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TacticKind {
    /// Implied limited supply ("only 3 left").
    Scarcity,
    /// Implied limited time ("sale ends soon").
    Urgency,
    /// Implied crowd behavior ("12 people are viewing this").
    SocialProof,
    /// Implied privileged access ("members only").
    Exclusivity,
}

/// Dark-pattern phrase patterns paired with their tactic kind.
///
/// Order matters: matches are reported in catalog order, one entry per
/// pattern at most regardless of how often it occurs in the text.
pub const DARK_PATTERNS: &[(&str, TacticKind)] = &[
    (r"only \d+ left", TacticKind::Scarcity),
    (r"almost (sold out|gone)", TacticKind::Scarcity),
    (r"low stock", TacticKind::Scarcity),
    (r"while (supplies|stocks) last", TacticKind::Scarcity),
    (r"selling fast", TacticKind::Scarcity),
    (r"limited time", TacticKind::Urgency),
    (r"hurry", TacticKind::Urgency),
    (r"sale ends", TacticKind::Urgency),
    (r"offer (ends|expires)", TacticKind::Urgency),
    (r"ending soon", TacticKind::Urgency),
    (r"last chance", TacticKind::Urgency),
    (r"flash sale", TacticKind::Urgency),
    (r"today only", TacticKind::Urgency),
    (r"don'?t miss out", TacticKind::Urgency),
    (r"\d+ people (are )?(viewing|looking at)", TacticKind::SocialProof),
    (r"\d+ (sold|bought) in the last", TacticKind::SocialProof),
    (r"in \d+ carts", TacticKind::SocialProof),
    (r"best ?seller", TacticKind::SocialProof),
    (r"trending now", TacticKind::SocialProof),
    (r"exclusive (deal|offer|access)", TacticKind::Exclusivity),
    (r"members only", TacticKind::Exclusivity),
    (r"vip (price|access|deal)", TacticKind::Exclusivity),
    (r"invite only", TacticKind::Exclusivity),
    (r"early access", TacticKind::Exclusivity),
];

/// A compiled dark-pattern entry.
#[derive(Debug, Clone)]
pub struct TacticPattern {
    /// The catalog phrase pattern (as written in [`DARK_PATTERNS`]).
    pub phrase: &'static str,
    /// The tactic kind this phrase signals.
    pub kind: TacticKind,
    regex: regex::Regex,
}

impl TacticPattern {
    /// Test whether this pattern occurs in the given text.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Compiled pattern catalog.
///
/// Holds the case-insensitive dark-pattern regexes and the price regex.
/// Construction is infallible: entries that fail to compile are skipped
/// with a warning.
#[derive(Debug, Clone)]
pub struct Catalog {
    price_regex: regex::Regex,
    tactics: Vec<TacticPattern>,
}

impl Catalog {
    /// Compile the static tables into a usable catalog.
    pub fn new() -> Self {
        let tactics = DARK_PATTERNS
            .iter()
            .filter_map(|&(phrase, kind)| {
                let compiled = RegexBuilder::new(phrase).case_insensitive(true).build();
                match compiled {
                    Ok(regex) => Some(TacticPattern {
                        phrase,
                        kind,
                        regex,
                    }),
                    Err(e) => {
                        warn!(pattern = phrase, error = %e, "skipping malformed dark-pattern entry");
                        None
                    }
                }
            })
            .collect();

        let price_regex =
            regex::Regex::new(PRICE_PATTERN).expect("price pattern is a compile-time constant");

        Self {
            price_regex,
            tactics,
        }
    }

    /// The compiled price regex.
    pub fn price_regex(&self) -> &regex::Regex {
        &self.price_regex
    }

    /// The compiled dark-pattern entries, in catalog order.
    pub fn tactics(&self) -> &[TacticPattern] {
        &self.tactics
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
