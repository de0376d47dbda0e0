//! Catalog types: products, image references, and home-grid sections.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::id::ProductId;

/// Canonical product image reference.
///
/// Product payloads carry images in three historical shapes: a bare URL
/// string, `{ "url": ... }`, or `{ "src": ... }`. All three are normalized
/// here at the deserialization boundary so nothing downstream branches on
/// shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub url: String,
}

impl ImageRef {
    /// Create an image reference from a URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl<'de> Deserialize<'de> for ImageRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Plain(String),
            Keyed { url: String },
            Legacy { src: String },
        }

        let url = match Wire::deserialize(deserializer)? {
            Wire::Plain(url) | Wire::Keyed { url } | Wire::Legacy { src: url } => url,
        };
        Ok(Self { url })
    }
}

/// A catalog product as the storefront displays it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    /// Manufacturer's listed price, when discounted.
    #[serde(default)]
    pub mrp: Option<Decimal>,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default)]
    pub store_id: Option<String>,
}

const fn default_in_stock() -> bool {
    true
}

/// One curated section of the home-page product grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSection {
    pub title: String,
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
}
