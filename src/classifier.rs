//! Shipping-method classification.
//!
//! An order enters the PUDO flow when one of its shipping-line titles
//! contains a known carrier-service label. The same titles imply the
//! destination country. Rules are a declarative table; the first matching
//! rule wins, so precedence is the table order.

/// One classification rule: a title substring and the country it implies.
#[derive(Debug, Clone, Copy)]
pub struct ShippingRule {
    pub pattern: &'static str,
    pub country: &'static str,
}

/// Known PUDO shipping-method labels, in precedence order.
pub const SHIPPING_RULES: &[ShippingRule] = &[
    ShippingRule {
        pattern: "InPost z Hiszpanii",
        country: "PL",
    },
    ShippingRule {
        pattern: "Punkty odbioru InPost",
        country: "PL",
    },
    ShippingRule {
        pattern: "France-Continent (Point Pack et Locker)",
        country: "FR",
    },
];

/// Whether any shipping-line title matches a PUDO rule.
pub fn requires_pudo(titles: &[&str]) -> bool {
    titles
        .iter()
        .any(|title| SHIPPING_RULES.iter().any(|rule| title.contains(rule.pattern)))
}

/// Country implied by the shipping-line titles. First match wins: titles are
/// scanned in order, and within each title the rules apply in table order.
pub fn infer_country(titles: &[&str]) -> Option<&'static str> {
    titles.iter().find_map(|title| {
        SHIPPING_RULES
            .iter()
            .find(|rule| title.contains(rule.pattern))
            .map(|rule| rule.country)
    })
}
