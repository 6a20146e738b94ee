//! Projection of the app-builder admin document into API shapes.
//!
//! The admin document is edited by a separate app builder and has no fixed
//! schema. It is decoded into [`AdminDocument`], where every field is
//! optional and a field of the wrong type reads as absent, and then projected
//! with the default rules below:
//!
//! | Output | Source | Default |
//! |---|---|---|
//! | `shopName` / `appName` | `shopName` / `appName` | `"Bunny Shop"` |
//! | `lastUpdated` | `updatedAt`, then the row timestamp | now |
//! | `theme` | `designSettings.theme` | [`Theme::default`] |
//! | `storeInfo` | `dynamicFields.storeInfo` | `{}` |
//! | `gstNumber` | `dynamicFields.gstNumber` | `"18"` |
//!
//! Product cards come from `dynamicFields.productCards`; see
//! [`AdminDocument::product_feed`].

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Shop and app name used when the admin document has none.
pub const DEFAULT_SHOP_NAME: &str = "Bunny Shop";
/// GST rate used when the admin document has none.
pub const DEFAULT_GST_NUMBER: &str = "18";
/// Product name used when a card has neither `productName` nor `name`.
pub const UNKNOWN_PRODUCT_NAME: &str = "Unknown Product";
/// Category used when a card has none.
pub const DEFAULT_CATEGORY: &str = "General";

// =============================================================================
// Admin Document
// =============================================================================

/// The admin document, as far as this service reads it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDocument {
    #[serde(default, deserialize_with = "truthy_string")]
    pub shop_name: Option<String>,
    #[serde(default, deserialize_with = "truthy_string")]
    pub app_name: Option<String>,
    #[serde(default, deserialize_with = "truthy_string")]
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub design_settings: Option<DesignSettings>,
    #[serde(default, deserialize_with = "lenient")]
    pub dynamic_fields: Option<DynamicFields>,
}

/// `designSettings` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DesignSettings {
    #[serde(default, deserialize_with = "lenient")]
    pub theme: Option<Map<String, Value>>,
}

/// `dynamicFields` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFields {
    #[serde(default)]
    pub store_info: Option<Value>,
    #[serde(default, deserialize_with = "truthy_string")]
    pub gst_number: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub product_cards: Option<Vec<Value>>,
}

// =============================================================================
// App Config
// =============================================================================

/// Response body of `GET /api/app-config`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub admin_id: String,
    pub shop_name: String,
    pub app_name: String,
    pub last_updated: String,
    pub features: Features,
    pub theme: ThemeSettings,
    pub store_info: Value,
    pub gst_number: String,
}

/// Feature switches for the mobile app. Not configurable; all enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct Features {
    pub search_enabled: bool,
    pub cart_enabled: bool,
    pub user_registration_enabled: bool,
    pub order_tracking_enabled: bool,
    pub wishlist_enabled: bool,
}

impl Features {
    #[must_use]
    pub const fn all_enabled() -> Self {
        Self {
            search_enabled: true,
            cart_enabled: true,
            user_registration_enabled: true,
            order_tracking_enabled: true,
            wishlist_enabled: true,
        }
    }
}

/// Fallback colour palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub primary_color: String,
    pub secondary_color: String,
    pub background_color: String,
    pub text_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_color: "#2196F3".to_string(),
            secondary_color: "#FF9800".to_string(),
            background_color: "#FFFFFF".to_string(),
            text_color: "#000000".to_string(),
        }
    }
}

/// Theme as configured by the admin, passed through untouched, or the
/// fallback palette.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ThemeSettings {
    Custom(Map<String, Value>),
    Default(Theme),
}

impl AdminDocument {
    /// Project the document into the app configuration.
    ///
    /// `stored_at` is the row's own timestamp, used when the document has no
    /// `updatedAt`.
    #[must_use]
    pub fn app_config(
        &self,
        admin_id: &str,
        stored_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> AppConfig {
        let dynamic_fields = self.dynamic_fields.as_ref();

        let theme = self
            .design_settings
            .as_ref()
            .and_then(|settings| settings.theme.clone())
            .map_or_else(|| ThemeSettings::Default(Theme::default()), ThemeSettings::Custom);

        let store_info = dynamic_fields
            .and_then(|fields| fields.store_info.clone())
            .filter(is_truthy)
            .unwrap_or_else(|| Value::Object(Map::new()));

        let last_updated = self.updated_at.clone().unwrap_or_else(|| {
            stored_at
                .unwrap_or(now)
                .to_rfc3339_opts(SecondsFormat::Millis, true)
        });

        AppConfig {
            admin_id: admin_id.to_string(),
            shop_name: self
                .shop_name
                .clone()
                .unwrap_or_else(|| DEFAULT_SHOP_NAME.to_string()),
            app_name: self
                .app_name
                .clone()
                .unwrap_or_else(|| DEFAULT_SHOP_NAME.to_string()),
            last_updated,
            features: Features::all_enabled(),
            theme,
            store_info,
            gst_number: dynamic_fields
                .and_then(|fields| fields.gst_number.clone())
                .unwrap_or_else(|| DEFAULT_GST_NUMBER.to_string()),
        }
    }

    /// Normalize the admin's product cards into product-shaped records.
    ///
    /// For the card at position `index`:
    /// - `_id`: `id`, else `product_<index>`
    /// - `name` and `productName`: `productName`, else `name`, else `"Unknown Product"`
    /// - `price`: parsed from `price`, else from `discountPrice`, else `0`
    /// - `discountPrice`: parsed from `discountPrice`, else from `price`, else `0`
    /// - `description`, `image`: as given, else `""`
    /// - `category`: as given, else `"General"`
    /// - `inStock`: always `true`
    ///
    /// Any other field on the card is copied through unchanged.
    #[must_use]
    pub fn product_feed(&self) -> Vec<DynamicProduct> {
        self.dynamic_fields
            .as_ref()
            .and_then(|fields| fields.product_cards.as_deref())
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(index, card)| DynamicProduct::from_card(index, card))
            .collect()
    }
}

// =============================================================================
// Dynamic Products
// =============================================================================

/// A product card from the admin document, normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DynamicProduct(Map<String, Value>);

impl DynamicProduct {
    fn from_card(index: usize, card: &Value) -> Self {
        let mut fields = card.as_object().cloned().unwrap_or_default();

        let id = truthy_str(card.get("id")).unwrap_or_else(|| format!("product_{index}"));
        let name = truthy_str(card.get("productName"))
            .or_else(|| truthy_str(card.get("name")))
            .unwrap_or_else(|| UNKNOWN_PRODUCT_NAME.to_string());
        let price = first_float(&[card.get("price"), card.get("discountPrice")]);
        let discount_price = first_float(&[card.get("discountPrice"), card.get("price")]);

        fields.insert("_id".to_string(), Value::String(id));
        fields.insert("name".to_string(), Value::String(name.clone()));
        fields.insert("productName".to_string(), Value::String(name));
        fields.insert("price".to_string(), Value::from(price));
        fields.insert("discountPrice".to_string(), Value::from(discount_price));
        fields.insert(
            "description".to_string(),
            truthy_or(card.get("description"), ""),
        );
        fields.insert("image".to_string(), truthy_or(card.get("image"), ""));
        fields.insert(
            "category".to_string(),
            truthy_or(card.get("category"), DEFAULT_CATEGORY),
        );
        fields.insert("inStock".to_string(), Value::Bool(true));

        Self(fields)
    }

    /// Look up a field of the normalized record.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// JavaScript-style truthiness, which the app builder relies on for "unset".
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A truthy string or number, rendered as a string.
fn truthy_str(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn truthy_or(value: Option<&Value>, default: &str) -> Value {
    value
        .filter(|v| is_truthy(v))
        .cloned()
        .unwrap_or_else(|| Value::String(default.to_string()))
}

/// First candidate that parses as a finite float, else `0`.
fn first_float(candidates: &[Option<&Value>]) -> f64 {
    candidates
        .iter()
        .flatten()
        .find_map(|value| parse_float(value))
        .unwrap_or(0.0)
}

/// Parse a JSON number or numeric string.
///
/// Strings are read like `parseFloat`: leading whitespace is skipped and the
/// longest numeric prefix wins, so `"12.5 USD"` is `12.5`.
fn parse_float(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float_prefix(s),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let numeric_len = s
        .find(|c: char| !matches!(c, '0'..='9' | '.' | '+' | '-' | 'e' | 'E'))
        .unwrap_or(s.len());
    let candidate = s.get(..numeric_len)?;

    (1..=candidate.len())
        .rev()
        .filter_map(|end| candidate.get(..end))
        .find_map(|prefix| prefix.parse::<f64>().ok())
}

/// Deserialize a truthy string or number; anything else reads as absent.
fn truthy_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(truthy_str(value.as_ref()))
}

/// Deserialize `T`, reading a value of the wrong shape as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    const ADMIN_ID: &str = "69021d2a2b0d7cd49d0bf5b4";

    fn document(value: Value) -> AdminDocument {
        serde_json::from_value(value).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_feed_from_discount_price_only() {
        let doc = document(json!({
            "dynamicFields": {
                "productCards": [{ "productName": "X", "discountPrice": "5.5" }]
            }
        }));

        let feed = doc.product_feed();
        assert_eq!(feed.len(), 1);

        let product = &feed[0];
        assert_eq!(product.get("name"), Some(&json!("X")));
        assert_eq!(product.get("price").and_then(Value::as_f64), Some(5.5));
        assert_eq!(product.get("category"), Some(&json!("General")));
        assert_eq!(product.get("inStock"), Some(&json!(true)));
        assert_eq!(product.get("_id"), Some(&json!("product_0")));
    }

    #[test]
    fn test_feed_name_fallbacks() {
        let doc = document(json!({
            "dynamicFields": {
                "productCards": [
                    { "name": "Plain name" },
                    { "productName": "", "name": "" },
                    {}
                ]
            }
        }));

        let names: Vec<_> = doc
            .product_feed()
            .iter()
            .map(|p| p.get("name").cloned().unwrap())
            .collect();
        assert_eq!(
            names,
            [
                json!("Plain name"),
                json!("Unknown Product"),
                json!("Unknown Product")
            ]
        );
    }

    #[test]
    fn test_feed_ids_fall_back_to_position() {
        let doc = document(json!({
            "dynamicFields": {
                "productCards": [{ "id": "abc" }, {}, { "id": 17 }]
            }
        }));

        let ids: Vec<_> = doc
            .product_feed()
            .iter()
            .map(|p| p.get("_id").cloned().unwrap())
            .collect();
        assert_eq!(ids, [json!("abc"), json!("product_1"), json!("17")]);
    }

    #[test]
    fn test_feed_price_parsing() {
        let doc = document(json!({
            "dynamicFields": {
                "productCards": [
                    { "price": 12, "discountPrice": "9.99" },
                    { "price": "not a number" },
                    { "price": "  7.25 USD" },
                    { "price": "abc", "discountPrice": 3 }
                ]
            }
        }));

        let feed = doc.product_feed();
        let prices: Vec<_> = feed
            .iter()
            .map(|p| p.get("price").and_then(Value::as_f64).unwrap())
            .collect();
        assert_eq!(prices, [12.0, 0.0, 7.25, 3.0]);

        assert_eq!(
            feed[0].get("discountPrice").and_then(Value::as_f64),
            Some(9.99)
        );
    }

    #[test]
    fn test_feed_passes_through_extra_fields() {
        let doc = document(json!({
            "dynamicFields": {
                "productCards": [{
                    "productName": "Carrot Cake",
                    "price": "4",
                    "badge": "new",
                    "inStock": false,
                    "category": "Bakery"
                }]
            }
        }));

        let product = &doc.product_feed()[0];
        assert_eq!(product.get("badge"), Some(&json!("new")));
        assert_eq!(product.get("category"), Some(&json!("Bakery")));
        // normalized fields win over raw ones
        assert_eq!(product.get("inStock"), Some(&json!(true)));
        assert_eq!(product.get("price").and_then(Value::as_f64), Some(4.0));
    }

    #[test]
    fn test_feed_empty_when_no_cards() {
        assert!(document(json!({})).product_feed().is_empty());
        assert!(
            document(json!({ "dynamicFields": { "productCards": "oops" } }))
                .product_feed()
                .is_empty()
        );
    }

    #[test]
    fn test_app_config_defaults() {
        let config = document(json!({})).app_config(ADMIN_ID, None, now());

        assert_eq!(config.admin_id, ADMIN_ID);
        assert_eq!(config.shop_name, "Bunny Shop");
        assert_eq!(config.app_name, "Bunny Shop");
        assert_eq!(config.gst_number, "18");
        assert_eq!(config.store_info, json!({}));
        assert_eq!(config.theme, ThemeSettings::Default(Theme::default()));
        assert_eq!(config.features, Features::all_enabled());
        assert_eq!(config.last_updated, "2026-01-02T03:04:05.000Z");
    }

    #[test]
    fn test_app_config_from_document() {
        let doc = document(json!({
            "shopName": "Carrot Corner",
            "appName": "Carrot App",
            "updatedAt": "2025-12-24T10:00:00.000Z",
            "designSettings": { "theme": { "primaryColor": "#123456" } },
            "dynamicFields": {
                "storeInfo": { "phone": "555-0100" },
                "gstNumber": "5"
            }
        }));

        let config = doc.app_config(ADMIN_ID, None, now());

        assert_eq!(config.shop_name, "Carrot Corner");
        assert_eq!(config.app_name, "Carrot App");
        assert_eq!(config.last_updated, "2025-12-24T10:00:00.000Z");
        assert_eq!(config.store_info, json!({ "phone": "555-0100" }));
        assert_eq!(config.gst_number, "5");

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["theme"], json!({ "primaryColor": "#123456" }));
        assert_eq!(value["features"]["wishlistEnabled"], json!(true));
    }

    #[test]
    fn test_app_config_uses_row_timestamp() {
        let stored_at = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let config = document(json!({})).app_config(ADMIN_ID, Some(stored_at), now());
        assert_eq!(config.last_updated, "2025-06-01T00:00:00.000Z");
    }

    #[test]
    fn test_wrongly_typed_fields_read_as_absent() {
        let doc = document(json!({
            "shopName": null,
            "appName": false,
            "designSettings": "dark",
            "dynamicFields": { "gstNumber": 12, "storeInfo": "" }
        }));

        let config = doc.app_config(ADMIN_ID, None, now());
        assert_eq!(config.shop_name, "Bunny Shop");
        assert_eq!(config.app_name, "Bunny Shop");
        assert_eq!(config.theme, ThemeSettings::Default(Theme::default()));
        assert_eq!(config.gst_number, "12");
        assert_eq!(config.store_info, json!({}));
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float_prefix("5.5"), Some(5.5));
        assert_eq!(parse_float_prefix(" 1e2x"), Some(100.0));
        assert_eq!(parse_float_prefix("1e"), Some(1.0));
        assert_eq!(parse_float_prefix("-3"), Some(-3.0));
        assert_eq!(parse_float_prefix("abc"), None);
        assert_eq!(parse_float_prefix(""), None);
    }
}
