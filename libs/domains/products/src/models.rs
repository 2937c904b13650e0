use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use strum::{Display, EnumString};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{ProductError, ProductResult};

/// Product identifier.
///
/// The relational store hands out integers and the document store hands out
/// ObjectIds, so the identifier is a tagged union rather than one primitive.
/// A configured backend only ever produces one of the two kinds.
///
/// JSON form: `Integer` is a number, `Opaque` a string, `Unset` is `null`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ProductId {
    Integer(i64),
    Opaque(String),
    /// Not yet saved
    #[default]
    Unset,
}

impl ProductId {
    /// Parse identifier text as received on a URL path.
    ///
    /// A 24-character hex string is taken as an ObjectId first (normalised to
    /// lowercase); anything else must be a base-10 `i64`.
    pub fn parse(text: &str) -> ProductResult<Self> {
        if let Ok(oid) = ObjectId::parse_str(text) {
            return Ok(ProductId::Opaque(oid.to_hex()));
        }

        text.parse::<i64>()
            .map(ProductId::Integer)
            .map_err(|_| ProductError::InvalidIdentifier(text.to_string()))
    }

    /// Keep `self` only if [`ProductId::parse`] gives it back from its own
    /// text, so that whatever gets stored can be addressed again by path.
    ///
    /// `Unset` passes through untouched.
    pub fn canonical(self) -> ProductResult<Self> {
        if self.is_unset() {
            return Ok(self);
        }
        let text = self.to_string();
        match ProductId::parse(&text) {
            Ok(parsed) if parsed == self => Ok(self),
            _ => Err(ProductError::InvalidIdentifier(text)),
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, ProductId::Unset)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ProductId::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&str> {
        match self {
            ProductId::Opaque(value) => Some(value),
            _ => None,
        }
    }

    /// Variant name, for logs and error messages
    pub fn kind(&self) -> &'static str {
        match self {
            ProductId::Integer(_) => "integer",
            ProductId::Opaque(_) => "opaque",
            ProductId::Unset => "unset",
        }
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Integer(value) => write!(f, "{}", value),
            ProductId::Opaque(value) => f.write_str(value),
            ProductId::Unset => Ok(()),
        }
    }
}

impl From<i64> for ProductId {
    fn from(value: i64) -> Self {
        ProductId::Integer(value)
    }
}

impl From<ObjectId> for ProductId {
    fn from(oid: ObjectId) -> Self {
        ProductId::Opaque(oid.to_hex())
    }
}

impl Serialize for ProductId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ProductId::Integer(value) => serializer.serialize_i64(*value),
            ProductId::Opaque(value) => serializer.serialize_str(value),
            ProductId::Unset => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Integer(i64),
            Opaque(String),
        }

        Ok(match Option::<Wire>::deserialize(deserializer)? {
            Some(Wire::Integer(value)) => ProductId::Integer(value),
            Some(Wire::Opaque(value)) => ProductId::Opaque(value),
            None => ProductId::Unset,
        })
    }
}

/// Who assigns identifiers for a configured repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum IdentityStrategy {
    /// The store generates the id on insert; a supplied id is still honoured
    #[default]
    #[strum(to_string = "generated", serialize = "store")]
    StoreGenerated,
    /// Every save must carry an id chosen by the caller
    #[strum(to_string = "caller", serialize = "supplied")]
    CallerSupplied,
}

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Integer (relational store) or 24-char hex string (document store)
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "1")]
    pub id: ProductId,
    #[serde(rename = "product_name")]
    pub name: String,
    pub price: f64,
    pub stock: i32,
}

impl Product {
    pub fn new(name: impl Into<String>, price: f64, stock: i32) -> Self {
        Self {
            id: ProductId::Unset,
            name: name.into(),
            price,
            stock,
        }
    }

    pub fn with_id(mut self, id: ProductId) -> Self {
        self.id = id;
        self
    }

    /// Replace every data field, keeping the identifier
    pub fn apply_update(&mut self, update: UpdateProduct) {
        self.name = update.name;
        self.price = update.price;
        self.stock = update.stock;
    }
}

impl From<CreateProduct> for Product {
    fn from(input: CreateProduct) -> Self {
        Product::new(input.name, input.price, input.stock).with_id(input.id)
    }
}

/// DTO for creating a new product
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    /// Optional caller-chosen id; required when the service runs with
    /// caller-supplied identifiers
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub id: ProductId,
    #[serde(rename = "product_name")]
    #[validate(length(min = 1, message = "product_name is required"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    #[validate(range(min = 0, message = "stock must not be negative"))]
    pub stock: i32,
}

impl CreateProduct {
    pub fn new(name: impl Into<String>, price: f64, stock: i32) -> Self {
        Self {
            id: ProductId::Unset,
            name: name.into(),
            price,
            stock,
        }
    }
}

/// DTO for replacing a product's data fields
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[serde(rename = "product_name")]
    #[validate(length(min = 1, message = "product_name is required"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    #[validate(range(min = 0, message = "stock must not be negative"))]
    pub stock: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_parse_prefers_object_id() {
        let id = ProductId::parse("65a1f0c2e4b0a1b2c3d4e5f6").unwrap();
        assert_eq!(id, ProductId::Opaque("65a1f0c2e4b0a1b2c3d4e5f6".to_string()));

        // 24 decimal digits are valid hex too, and too large for i64 anyway
        let digits = ProductId::parse("123456789012345678901234").unwrap();
        assert_eq!(digits.kind(), "opaque");
    }

    #[test]
    fn test_parse_normalises_hex_case() {
        let id = ProductId::parse("65A1F0C2E4B0A1B2C3D4E5F6").unwrap();
        assert_eq!(id.as_opaque(), Some("65a1f0c2e4b0a1b2c3d4e5f6"));
    }

    #[test]
    fn test_parse_falls_back_to_integer() {
        assert_eq!(ProductId::parse("42").unwrap(), ProductId::Integer(42));
        assert_eq!(ProductId::parse("-7").unwrap(), ProductId::Integer(-7));
    }

    #[test]
    fn test_parse_rejects_everything_else() {
        for text in ["", "abc", "12.5", "65a1f0c2e4b0a1b2c3d4e5f", "9223372036854775808"] {
            let err = ProductId::parse(text).unwrap_err();
            assert!(
                matches!(err, ProductError::InvalidIdentifier(ref raw) if raw == text),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_text_round_trip() {
        for id in [
            ProductId::Integer(1),
            ProductId::Integer(i64::MIN),
            ProductId::Opaque(ObjectId::new().to_hex()),
        ] {
            assert_eq!(ProductId::parse(&id.to_string()).unwrap(), id);
        }
    }

    #[test]
    fn test_canonical_accepts_only_parseable_text() {
        let hex = ObjectId::new().to_hex();
        assert_eq!(
            ProductId::Opaque(hex.clone()).canonical().unwrap(),
            ProductId::Opaque(hex)
        );
        assert_eq!(
            ProductId::Integer(-3).canonical().unwrap(),
            ProductId::Integer(-3)
        );
        assert!(ProductId::Unset.canonical().unwrap().is_unset());

        // digits read back as an integer, upper case reads back lowered
        for raw in ["5", "65A1F0C2E4B0A1B2C3D4E5F6", "sku-1", ""] {
            let err = ProductId::Opaque(raw.into()).canonical().unwrap_err();
            assert!(
                matches!(err, ProductError::InvalidIdentifier(ref text) if text == raw),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_json_wire_form() {
        assert_eq!(serde_json::to_value(ProductId::Integer(5)).unwrap(), json!(5));
        assert_eq!(
            serde_json::to_value(ProductId::Opaque("abc".into())).unwrap(),
            json!("abc")
        );
        assert_eq!(serde_json::to_value(ProductId::Unset).unwrap(), json!(null));

        let from_number: ProductId = serde_json::from_value(json!(5)).unwrap();
        assert_eq!(from_number, ProductId::Integer(5));
        let from_string: ProductId = serde_json::from_value(json!("5")).unwrap();
        assert_eq!(from_string, ProductId::Opaque("5".into()));
        let from_null: ProductId = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(from_null, ProductId::Unset);

        assert!(serde_json::from_value::<ProductId>(json!(true)).is_err());
        assert!(serde_json::from_value::<ProductId>(json!(1.5)).is_err());
    }

    #[test]
    fn test_product_json_field_names() {
        let product = Product::new("Widget", 9.99, 5).with_id(ProductId::Integer(1));
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(
            value,
            json!({ "id": 1, "product_name": "Widget", "price": 9.99, "stock": 5 })
        );

        let parsed: Product =
            serde_json::from_value(json!({ "product_name": "Widget", "price": 9.99, "stock": 5 }))
                .unwrap();
        assert!(parsed.id.is_unset());
    }

    #[test]
    fn test_create_product_validation() {
        assert!(CreateProduct::new("Widget", 9.99, 5).validate().is_ok());
        assert!(CreateProduct::new("", 9.99, 5).validate().is_err());
        assert!(CreateProduct::new("Widget", -0.01, 5).validate().is_err());
        assert!(CreateProduct::new("Widget", 9.99, -1).validate().is_err());
    }

    #[test]
    fn test_create_product_carries_supplied_id() {
        let input: CreateProduct = serde_json::from_value(
            json!({ "id": 77, "product_name": "Gadget", "price": 1.0, "stock": 0 }),
        )
        .unwrap();
        let product: Product = input.into();
        assert_eq!(product.id, ProductId::Integer(77));
    }

    #[test]
    fn test_apply_update_keeps_id() {
        let mut product = Product::new("Widget", 9.99, 5).with_id(ProductId::Integer(3));
        product.apply_update(UpdateProduct {
            name: "Widget v2".into(),
            price: 12.5,
            stock: 0,
        });
        assert_eq!(product.id, ProductId::Integer(3));
        assert_eq!(product.name, "Widget v2");
        assert_eq!(product.stock, 0);
    }

    #[test]
    fn test_identity_strategy_from_str() {
        assert_eq!(
            IdentityStrategy::from_str("generated").unwrap(),
            IdentityStrategy::StoreGenerated
        );
        assert_eq!(
            IdentityStrategy::from_str("CALLER").unwrap(),
            IdentityStrategy::CallerSupplied
        );
        assert!(IdentityStrategy::from_str("random").is_err());
        assert_eq!(IdentityStrategy::default().to_string(), "generated");
    }
}
