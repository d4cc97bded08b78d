// src/extract.rs
//
// Pull a (current, was) price pair out of a product page.
// Three sources in order: JSON-LD offers, inline JSON objects, visible price spans.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::core::sanitize::price_text;

static PRICE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{2,5}(?:\.\d{2})?)\b").unwrap());
static EMBEDDED_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\{[^\{\}]*"price"[^\{\}]*\}"#).unwrap());

static LD_JSON: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());
static ANY_SPAN: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());
static PRICE_SPANS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ["span.price", "span.current-price", "span.product-price", "span.sales", "span.sale-price"]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});

/// Spans scanned when none of the price classes match.
const FALLBACK_SPANS: usize = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PriceInfo {
    pub current_price: Option<f64>,
    pub was_price: Option<f64>,
}

impl PriceInfo {
    fn new(current: f64, was: Option<f64>) -> Self {
        Self { current_price: Some(current), was_price: was }
    }

    /// A usable current price was found (present and non-zero).
    pub fn found(&self) -> bool {
        matches!(self.current_price, Some(p) if p != 0.0)
    }
}

/// Best-effort price pair. Never fails; an unreadable page yields no prices.
/// `_url` is kept for parity with fetch logs; nothing is resolved against it.
pub fn extract_prices(html: &str, _url: &str) -> PriceInfo {
    let doc = Html::parse_document(html);

    if let Some(info) = from_json_ld(&doc) {
        return info;
    }
    if let Some(info) = from_embedded_json(html) {
        return info;
    }
    from_dom(&doc)
}

/// Numeric JSON value or numeric string.
fn as_price(v: Option<&Value>) -> Option<f64> {
    match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn offer_prices(offer: &Value) -> Option<PriceInfo> {
    let price = as_price(offer.get("price")).filter(|p| *p != 0.0)?;
    let was = offer
        .get("priceSpecification")
        .and_then(|spec| as_price(spec.get("price")));
    Some(PriceInfo::new(price, was))
}

fn from_json_ld(doc: &Html) -> Option<PriceInfo> {
    let mut entries: Vec<Value> = Vec::new();
    for script in doc.select(&LD_JSON) {
        let raw: String = script.text().collect();
        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(Value::Array(items)) => entries.extend(items),
            Ok(v) => entries.push(v),
            Err(_) => continue,
        }
    }

    for entry in entries.iter().filter(|e| e.is_object()) {
        let kind = entry.get("@type").and_then(Value::as_str);

        if kind == Some("Product") {
            let offers = match entry.get("offers") {
                Some(Value::Array(list)) => list.iter().collect::<Vec<_>>(),
                Some(obj @ Value::Object(_)) => vec![obj],
                _ => Vec::new(),
            };
            if let Some(info) = offers.into_iter().find_map(offer_prices) {
                return Some(info);
            }
        }
        if kind == Some("Offer") {
            if let Some(info) = offer_prices(entry) {
                return Some(info);
            }
        }
    }
    None
}

fn from_embedded_json(html: &str) -> Option<PriceInfo> {
    for m in EMBEDDED_OBJECT.find_iter(html) {
        let Ok(payload) = serde_json::from_str::<Value>(m.as_str()) else { continue };

        let Some(price) = as_price(payload.get("price")).filter(|p| *p != 0.0) else { continue };

        // compare_at_price wins unless it is missing or zero-ish
        let was = as_price(payload.get("compare_at_price"))
            .filter(|p| *p != 0.0)
            .or_else(|| as_price(payload.get("was_price")));
        return Some(PriceInfo::new(price, was));
    }
    None
}

fn from_dom(doc: &Html) -> PriceInfo {
    let mut texts: Vec<String> = Vec::new();

    for sel in PRICE_SPANS.iter() {
        if let Some(node) = doc.select(sel).next() {
            let text = price_text(&node.text().collect::<String>());
            if !text.is_empty() {
                texts.push(text);
                break;
            }
        }
    }
    if texts.is_empty() {
        texts = doc
            .select(&ANY_SPAN)
            .take(FALLBACK_SPANS)
            .map(|n| price_text(&n.text().collect::<String>()))
            .collect();
    }

    let numbers = extract_numbers(&texts.join(" "));
    match numbers.as_slice() {
        [] => PriceInfo::default(),
        [cur] => PriceInfo::new(*cur, None),
        [cur, was, ..] => PriceInfo::new(*cur, Some(*was)),
    }
}

fn extract_numbers(text: &str) -> Vec<f64> {
    PRICE_NUMBER
        .captures_iter(text)
        .filter_map(|c| c.get(1)?.as_str().parse::<f64>().ok())
        .collect()
}
