//! Wire formats and their conversion into domain types.
//!
//! The API is loose about field names and value types: ids come as `_id`
//! or `id`, prices as numbers or numeric strings, categories as ids or
//! embedded objects, and payloads bare or wrapped in `{ "data": ... }`.
//! Everything is normalized here so the rest of the crate sees one shape.

use chrono::{DateTime, Utc};
use green_auth::User;
use green_commerce::cart::{Voucher, VoucherStatus, VoucherValue};
use green_commerce::catalog::{slugify, Category, Product, ProductDraft, ProductStatus, Review};
use green_commerce::checkout::{Address, CheckoutSummary, Order, OrderLine, OrderStatus};
use green_commerce::ids::{CategoryId, OrderId, ProductId, ReviewId, UserId, VoucherId};
use green_commerce::money::{Currency, Money};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::StorefrontError;

/// Take the payload out of a `{ "data": ... }` envelope.
pub fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Parse a single resource, bare, enveloped, or nested under `key`.
pub fn parse_one<T: DeserializeOwned>(value: Value, key: &str) -> Result<T, StorefrontError> {
    let value = match unwrap_data(value) {
        Value::Object(mut map) if map.get(key).is_some_and(Value::is_object) => {
            map.remove(key).unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(value)
        .map_err(|e| StorefrontError::InvalidResponse(format!("{}: {}", key, e)))
}

/// Parse a list, bare, enveloped, or nested under `key` or `items`.
pub fn parse_list<T: DeserializeOwned>(value: Value, key: &str) -> Result<Vec<T>, StorefrontError> {
    let value = match unwrap_data(value) {
        Value::Object(mut map) => map
            .remove(key)
            .or_else(|| map.remove("items"))
            .ok_or_else(|| {
                StorefrontError::InvalidResponse(format!("expected a list of {}", key))
            })?,
        other => other,
    };
    serde_json::from_value(value)
        .map_err(|e| StorefrontError::InvalidResponse(format!("{}: {}", key, e)))
}

/// A number that may arrive as a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    /// Interpret as major units of `currency`.
    pub fn to_money(&self, currency: Currency) -> Result<Money, StorefrontError> {
        match self {
            Amount::Number(n) => Money::from_decimal(*n, currency),
            Amount::Text(s) => Money::parse_decimal(s, currency),
        }
        .map_err(|e| StorefrontError::InvalidResponse(format!("bad amount: {}", e)))
    }

    /// Interpret as a plain number.
    pub fn as_f64(&self) -> Result<f64, StorefrontError> {
        match self {
            Amount::Number(n) => Ok(*n),
            Amount::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| StorefrontError::InvalidResponse(format!("not a number: {:?}", s))),
        }
    }
}

/// A reference that may be an id string or an embedded object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IdRef {
    Id(String),
    Object {
        #[serde(alias = "_id")]
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
}

impl IdRef {
    pub fn id(&self) -> &str {
        match self {
            IdRef::Id(id) => id,
            IdRef::Object { id, .. } => id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            IdRef::Id(_) => None,
            IdRef::Object { name, .. } => name.as_deref(),
        }
    }
}

/// Unix seconds, epoch millis, or an RFC 3339 string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Number(f64),
    Text(String),
}

impl Timestamp {
    /// Seconds since the epoch, if the value is readable.
    pub fn unix_seconds(&self) -> Option<i64> {
        match self {
            // Anything past the year 5138 in seconds is really milliseconds.
            Timestamp::Number(n) if *n > 1e11 => Some((n / 1000.0).floor() as i64),
            Timestamp::Number(n) => Some(n.floor() as i64),
            Timestamp::Text(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.timestamp()),
        }
    }
}

fn rfc3339(secs: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(secs, 0).map(|dt| dt.to_rfc3339())
}

/// A status that may be a name or an `isActive`-style flag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StatusField {
    Flag(bool),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ImageField {
    One(String),
    Many(Vec<String>),
}

impl ImageField {
    fn into_vec(self) -> Vec<String> {
        match self {
            ImageField::One(url) if url.trim().is_empty() => Vec::new(),
            ImageField::One(url) => vec![url],
            ImageField::Many(urls) => urls,
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Product as sent by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Amount,
    #[serde(default, alias = "originalPrice")]
    pub compare_at_price: Option<Amount>,
    #[serde(default, alias = "categoryId")]
    pub category: Option<IdRef>,
    #[serde(default, alias = "sellerId")]
    pub seller: Option<IdRef>,
    #[serde(default, alias = "quantity", alias = "countInStock")]
    pub stock: Option<i64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default, alias = "image")]
    pub images: Option<ImageField>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "averageRating")]
    pub rating: Option<f64>,
    #[serde(default, alias = "numReviews", alias = "reviewsCount")]
    pub review_count: Option<i64>,
    #[serde(default, alias = "isActive")]
    pub status: Option<StatusField>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl ProductDto {
    /// Normalize into a catalog product priced in `currency`.
    pub fn into_product(self, currency: Currency) -> Result<Product, StorefrontError> {
        let status = match self.status {
            None | Some(StatusField::Flag(true)) => ProductStatus::Active,
            Some(StatusField::Flag(false)) => ProductStatus::Archived,
            Some(StatusField::Name(name)) => name.parse().unwrap_or_else(|_| {
                tracing::warn!(product = %self.id, status = %name, "unknown product status, treating as active");
                ProductStatus::Active
            }),
        };

        Ok(Product {
            slug: self.slug.unwrap_or_else(|| slugify(&self.name)),
            price: self.price.to_money(currency)?,
            compare_at_price: self
                .compare_at_price
                .map(|p| p.to_money(currency))
                .transpose()?,
            category_id: self.category.map(|c| CategoryId::new(c.id())),
            seller_id: self.seller.map(|s| UserId::new(s.id())),
            stock: self.stock.unwrap_or(0).max(0),
            unit: self.unit,
            images: self.images.map(ImageField::into_vec).unwrap_or_default(),
            tags: self.tags,
            rating: self.rating.unwrap_or(0.0),
            review_count: self.review_count.unwrap_or(0),
            status,
            created_at: self.created_at.and_then(|t| t.unix_seconds()),
            description: self.description,
            id: ProductId::new(self.id),
            name: self.name,
        })
    }
}

/// Product body for create and update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub stock: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub status: &'static str,
}

impl From<&ProductDraft> for ProductPayload {
    fn from(draft: &ProductDraft) -> Self {
        Self {
            name: draft.name.trim().to_string(),
            slug: draft.slug(),
            description: draft.description.clone(),
            price: draft.price.to_decimal(),
            compare_at_price: draft.compare_at_price.map(|m| m.to_decimal()),
            category: draft.category_id.as_ref().map(|c| c.to_string()),
            stock: draft.stock,
            unit: draft.unit.clone(),
            images: draft.images.clone(),
            tags: draft.tags.clone(),
            status: draft.status.as_str(),
        }
    }
}

/// Category as sent by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, alias = "parentId")]
    pub parent: Option<IdRef>,
    #[serde(default)]
    pub product_count: Option<i64>,
}

impl From<CategoryDto> for Category {
    fn from(dto: CategoryDto) -> Self {
        let mut category = Category::new(dto.id, dto.name);
        if let Some(slug) = dto.slug.filter(|s| !s.trim().is_empty()) {
            category.slug = slug;
        }
        category.parent_id = dto.parent.map(|p| CategoryId::new(p.id()));
        category.product_count = dto.product_count;
        category
    }
}

/// Review as sent by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "productId")]
    pub product: IdRef,
    #[serde(default)]
    pub user: Option<IdRef>,
    #[serde(default, alias = "userName", alias = "authorName")]
    pub name: Option<String>,
    pub rating: f64,
    #[serde(default, alias = "text")]
    pub comment: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl TryFrom<ReviewDto> for Review {
    type Error = StorefrontError;

    fn try_from(dto: ReviewDto) -> Result<Self, Self::Error> {
        let rating = dto.rating.round();
        if !(1.0..=5.0).contains(&rating) {
            return Err(StorefrontError::InvalidResponse(format!(
                "review {} has rating {}",
                dto.id, dto.rating
            )));
        }
        let author_name = dto
            .name
            .or_else(|| dto.user.as_ref().and_then(|u| u.name().map(str::to_string)))
            .unwrap_or_else(|| "Anonymous".to_string());

        Ok(Review {
            id: ReviewId::new(dto.id),
            product_id: ProductId::new(dto.product.id()),
            author_name,
            rating: rating as u8,
            comment: dto.comment.filter(|c| !c.trim().is_empty()),
            created_at: dto.created_at.and_then(|t| t.unix_seconds()),
        })
    }
}

/// Review body for submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewPayload {
    pub product: String,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

// ---------------------------------------------------------------------------
// Vouchers
// ---------------------------------------------------------------------------

/// Discount voucher as sent by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherDto {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "type")]
    pub discount_type: String,
    #[serde(alias = "value")]
    pub discount_value: Amount,
    #[serde(default, alias = "minPurchase", alias = "minimumPurchase")]
    pub min_purchase_amount: Option<Amount>,
    #[serde(default, alias = "validFrom", alias = "startsAt")]
    pub start_date: Option<Timestamp>,
    #[serde(default, alias = "validUntil", alias = "expiresAt", alias = "expiryDate")]
    pub end_date: Option<Timestamp>,
    #[serde(default, alias = "isActive")]
    pub status: Option<StatusField>,
    #[serde(default)]
    pub usage_limit: Option<i64>,
    #[serde(default, alias = "usageCount")]
    pub used_count: Option<i64>,
}

impl VoucherDto {
    /// Normalize into a voucher with amounts in `currency`.
    pub fn into_voucher(self, currency: Currency) -> Result<Voucher, StorefrontError> {
        let value = match self.discount_type.trim().to_lowercase().as_str() {
            "percentage" | "percent" => VoucherValue::Percentage(self.discount_value.as_f64()?),
            "fixed" | "amount" => VoucherValue::Fixed(self.discount_value.to_money(currency)?),
            other => {
                return Err(StorefrontError::InvalidResponse(format!(
                    "voucher {} has unknown discount type {:?}",
                    self.code, other
                )))
            }
        };

        let status = match self.status {
            None | Some(StatusField::Flag(true)) => VoucherStatus::Active,
            Some(StatusField::Flag(false)) => VoucherStatus::Inactive,
            Some(StatusField::Name(name)) => name
                .parse()
                .map_err(|e| StorefrontError::InvalidResponse(format!("voucher {}: {}", self.code, e)))?,
        };

        Ok(Voucher {
            id: self.id.map(VoucherId::new),
            code: Voucher::normalize_code(&self.code),
            description: self.description,
            value,
            min_purchase: self
                .min_purchase_amount
                .map(|m| m.to_money(currency))
                .transpose()?
                .filter(|m| m.is_positive()),
            starts_at: self.start_date.and_then(|t| t.unix_seconds()),
            ends_at: self.end_date.and_then(|t| t.unix_seconds()),
            status,
            usage_limit: self.usage_limit,
            usage_count: self.used_count.unwrap_or(0),
        })
    }
}

/// Voucher body for creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherPayload {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub discount_type: &'static str,
    pub discount_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_purchase_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<i64>,
    pub status: &'static str,
}

impl From<&Voucher> for VoucherPayload {
    fn from(voucher: &Voucher) -> Self {
        let discount_value = match voucher.value {
            VoucherValue::Percentage(percent) => percent,
            VoucherValue::Fixed(amount) => amount.to_decimal(),
        };
        Self {
            code: Voucher::normalize_code(&voucher.code),
            description: voucher.description.clone(),
            discount_type: voucher.value.discount_type(),
            discount_value,
            min_purchase_amount: voucher.min_purchase.map(|m| m.to_decimal()),
            start_date: voucher.starts_at.and_then(rfc3339),
            end_date: voucher.ends_at.and_then(rfc3339),
            usage_limit: voucher.usage_limit,
            status: voucher.status.as_str(),
        }
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Shipping address on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDto {
    #[serde(alias = "fullName", alias = "name")]
    pub recipient: String,
    #[serde(default)]
    pub phone: String,
    #[serde(alias = "street", alias = "address")]
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "address2")]
    pub line2: Option<String>,
    pub city: String,
    #[serde(default, alias = "state")]
    pub province: String,
    #[serde(alias = "zip", alias = "postal_code")]
    pub postal_code: String,
    #[serde(default = "default_country", alias = "country")]
    pub country_code: String,
}

fn default_country() -> String {
    "ID".to_string()
}

impl From<&Address> for AddressDto {
    fn from(a: &Address) -> Self {
        Self {
            recipient: a.recipient.clone(),
            phone: a.phone.clone(),
            line1: a.line1.clone(),
            line2: a.line2.clone(),
            city: a.city.clone(),
            province: a.province.clone(),
            postal_code: a.postal_code.clone(),
            country_code: a.country_code.clone(),
        }
    }
}

impl From<AddressDto> for Address {
    fn from(a: AddressDto) -> Self {
        Address {
            recipient: a.recipient,
            phone: a.phone,
            line1: a.line1,
            line2: a.line2,
            city: a.city,
            province: a.province,
            postal_code: a.postal_code,
            country_code: a.country_code,
        }
    }
}

/// Order line as sent by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    #[serde(alias = "productId")]
    pub product: IdRef,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(alias = "unitPrice")]
    pub price: Amount,
    #[serde(alias = "qty")]
    pub quantity: i64,
    #[serde(default)]
    pub total: Option<Amount>,
}

/// Order as sent by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default, alias = "customer", alias = "userId")]
    pub user: Option<IdRef>,
    #[serde(default, alias = "orderItems")]
    pub items: Vec<OrderItemDto>,
    #[serde(default, alias = "itemsPrice")]
    pub subtotal: Option<Amount>,
    #[serde(default, alias = "discountAmount")]
    pub discount: Option<Amount>,
    #[serde(default, alias = "taxPrice", alias = "taxAmount")]
    pub tax: Option<Amount>,
    #[serde(default, alias = "shippingPrice", alias = "shippingCost")]
    pub shipping: Option<Amount>,
    #[serde(alias = "totalPrice", alias = "totalAmount")]
    pub total: Amount,
    #[serde(default, alias = "discountCode", alias = "couponCode")]
    pub voucher_code: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<AddressDto>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl OrderDto {
    /// Normalize into an order with amounts in `currency`.
    pub fn into_order(self, currency: Currency) -> Result<Order, StorefrontError> {
        let optional = |amount: Option<Amount>| -> Result<Money, StorefrontError> {
            amount
                .map(|a| a.to_money(currency))
                .transpose()
                .map(|m| m.unwrap_or_else(|| Money::zero(currency)))
        };

        let lines = self
            .items
            .into_iter()
            .map(|item| -> Result<OrderLine, StorefrontError> {
                let unit_price = item.price.to_money(currency)?;
                let total = match item.total {
                    Some(total) => total.to_money(currency)?,
                    None => unit_price.checked_mul(item.quantity)?,
                };
                Ok(OrderLine {
                    name: item
                        .name
                        .or_else(|| item.product.name().map(str::to_string))
                        .unwrap_or_default(),
                    product_id: ProductId::new(item.product.id()),
                    unit_price,
                    quantity: item.quantity,
                    total,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let subtotal = match self.subtotal {
            Some(subtotal) => subtotal.to_money(currency)?,
            None => Money::try_sum(lines.iter().map(|l| &l.total), currency)?,
        };

        let status = match self.status {
            Some(status) => status.parse::<OrderStatus>()?,
            None => OrderStatus::Pending,
        };

        Ok(Order {
            order_number: self.order_number.unwrap_or_else(|| self.id.clone()),
            id: OrderId::new(self.id),
            customer_id: self.user.map(|u| UserId::new(u.id())),
            lines,
            subtotal,
            discount: optional(self.discount)?,
            tax: optional(self.tax)?,
            shipping: optional(self.shipping)?,
            total: self.total.to_money(currency)?,
            voucher_code: self.voucher_code.filter(|c| !c.trim().is_empty()),
            shipping_address: self.shipping_address.map(Address::from),
            status,
            created_at: self.created_at.and_then(|t| t.unix_seconds()),
        })
    }
}

/// Order line body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItemPayload {
    pub product: String,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

/// Order body posted at checkout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub items: Vec<OrderItemPayload>,
    pub subtotal: f64,
    pub discount: f64,
    pub tax: f64,
    pub shipping: f64,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher_code: Option<String>,
    pub shipping_address: AddressDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl From<&CheckoutSummary> for OrderPayload {
    fn from(summary: &CheckoutSummary) -> Self {
        let totals = &summary.totals;
        Self {
            items: summary
                .lines
                .iter()
                .map(|line| OrderItemPayload {
                    product: line.product_id.to_string(),
                    name: line.name.clone(),
                    price: line.unit_price.to_decimal(),
                    quantity: line.quantity,
                })
                .collect(),
            subtotal: totals.subtotal.to_decimal(),
            discount: totals.discount.to_decimal(),
            tax: totals.tax.to_decimal(),
            shipping: totals.shipping.to_decimal(),
            total: totals.total.to_decimal(),
            voucher_code: summary.voucher_code.clone(),
            shipping_address: AddressDto::from(&summary.shipping_address),
            note: summary.note.clone(),
        }
    }
}

/// Order status change body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusPayload {
    pub status: &'static str,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Login and registration response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(alias = "accessToken", alias = "access_token")]
    pub token: String,
    pub user: User,
}
