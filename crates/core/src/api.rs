//! Wire types for the commerce backend's REST API.
//!
//! One struct per payload, deserialized at the boundary so handlers never
//! touch raw JSON. The backend speaks camelCase with Mongo-style `_id`
//! fields; gateway identifiers keep their snake_case names end to end.
//!
//! These types are shared by the storefront and admin clients, the CLI,
//! and the integration tests.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::checkout::GatewayConfirmation;
use crate::location::AddressDraft;
use crate::types::{
    AddressId, BrandId, CartItemId, CategoryId, OrderId, OrderStatus, PaymentMode, PaymentStatus,
    ProductId, ReviewId, Rupees, UserId, WishlistItemId,
};

// =============================================================================
// Catalog
// =============================================================================

/// A product brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    #[serde(rename = "_id")]
    pub id: BrandId,
    pub name: String,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    pub name: String,
}

/// A catalog product, with brand and category populated by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub title: String,
    pub description: String,
    /// List price in rupees. May carry a fraction once discounted.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Percentage off the list price, if the product is on offer.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub discount_percentage: Option<Decimal>,
    pub stock_quantity: u32,
    pub thumbnail: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub brand: Brand,
    pub category: Category,
}

impl Product {
    /// The price the customer actually pays, after any percentage
    /// discount, kept to two decimal places.
    #[must_use]
    pub fn sale_price(&self) -> Decimal {
        match self.discount_percentage {
            Some(discount) => {
                let factor = (Decimal::from(100) - discount) / Decimal::from(100);
                (self.price * factor).round_dp(2)
            }
            None => self.price,
        }
    }

    /// Whether any units are left to sell.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Most units of one product a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 20;

/// A cart line as stored by the backend, with the product populated.
/// The embedded product is the unit price snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(rename = "_id")]
    pub id: CartItemId,
    pub user: UserId,
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Unit price in rupees, from the product snapshot.
    #[must_use]
    pub const fn unit_price(&self) -> Decimal {
        self.product.price
    }
}

/// Payload for `POST /cart`. The product travels as an id; the backend
/// returns the populated line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub user: UserId,
    pub product: ProductId,
    pub quantity: u32,
}

/// Payload for `PATCH /cart/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateCartItemRequest {
    pub quantity: u32,
}

// =============================================================================
// Addresses
// =============================================================================

/// A saved delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(rename = "_id")]
    pub id: AddressId,
    pub user: UserId,
    /// Address label ("Home", "Work", ...). Stored as `type` on the wire.
    #[serde(rename = "type")]
    pub label: String,
    pub street: String,
    pub country: String,
    pub phone_number: String,
    pub state: String,
    pub city: String,
    pub postal_code: String,
}

/// Payload for `POST /address`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAddressRequest {
    pub user: UserId,
    #[serde(flatten)]
    pub address: AddressDraft,
}

// =============================================================================
// Orders
// =============================================================================

/// An item snapshot embedded in an order. The product is copied in whole
/// at creation, so later catalog edits never touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product: Product,
    pub quantity: u32,
}

impl OrderItem {
    /// Unit price the customer was charged.
    #[must_use]
    pub const fn unit_price(&self) -> Decimal {
        self.product.price
    }
}

impl From<&CartItem> for OrderItem {
    fn from(line: &CartItem) -> Self {
        Self {
            product: line.product.clone(),
            quantity: line.quantity,
        }
    }
}

/// An order as stored by the backend. The item array travels under the
/// singular `item` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    pub user: UserId,
    #[serde(rename = "item")]
    pub items: Vec<OrderItem>,
    /// Address snapshot, embedded rather than referenced.
    pub address: Address,
    pub payment_mode: PaymentMode,
    /// Payable total in whole rupees, fixed at creation.
    pub total: Rupees,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payment_details: Vec<GatewayConfirmation>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Payload for `POST /orders`. The backend sets the initial `Pending`
/// status and the timestamp.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user: UserId,
    #[serde(rename = "item")]
    pub items: Vec<OrderItem>,
    pub address: Address,
    pub payment_mode: PaymentMode,
    pub total: Rupees,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub payment_details: Vec<GatewayConfirmation>,
}

/// Payload for `PATCH /orders/{id}` (admin status updates).
#[derive(Debug, Clone, Serialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// Payload for `POST /orders/create-razorpay-order`: registers an
/// amount-bound payment session with the gateway. Carries the same
/// checkout context as the eventual order so the backend can reconcile
/// abandoned attempts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGatewayOrderRequest {
    pub user: UserId,
    #[serde(rename = "item")]
    pub items: Vec<OrderItem>,
    pub address: Address,
    pub payment_mode: PaymentMode,
    /// Amount in paise. The gateway rejects rupee-denominated values.
    pub total: i64,
    /// ISO currency code, always "INR" for this store.
    pub currency: String,
}

/// Response from `POST /orders/create-razorpay-order`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayOrderResponse {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
}

// =============================================================================
// Locations (admin)
// =============================================================================

/// Payload for `POST /api/locations` and `PUT /api/locations/{id}`.
///
/// The same shape covers create and update; the backend replaces the
/// postal-code list wholesale on update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveLocationRequest {
    pub state: String,
    pub city: String,
    pub postal_codes: Vec<String>,
}

// =============================================================================
// Users & auth
// =============================================================================

/// A customer account, sanitized (no credentials).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_admin: bool,
}

/// Payload for `PATCH /users/{id}`. Only the display name is editable;
/// email changes go through support.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateUserRequest {
    pub name: String,
}

/// Payload for `POST /auth/signup`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Payload for `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload for `POST /auth/verify-otp`.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

/// Payload for `POST /auth/resend-otp`.
#[derive(Debug, Clone, Serialize)]
pub struct ResendOtpRequest {
    pub email: String,
}

/// Payload for `POST /auth/forgot-password`.
#[derive(Debug, Clone, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Payload for `POST /auth/reset-password`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub token: String,
    pub new_password: String,
}

/// Response from login and OTP verification: the sanitized user plus the
/// bearer token the storefront presents on authenticated calls.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

// =============================================================================
// Reviews
// =============================================================================

/// The reviewer, populated with just enough to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewAuthor {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
}

/// A product review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: ReviewId,
    pub user: ReviewAuthor,
    pub product: ProductId,
    /// Star rating, 1 to 5.
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for `POST /reviews`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateReviewRequest {
    pub user: UserId,
    pub product: ProductId,
    pub rating: u8,
    pub comment: String,
}

/// Payload for `PATCH /reviews/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateReviewRequest {
    pub rating: u8,
    pub comment: String,
}

// =============================================================================
// Wishlist
// =============================================================================

/// A wishlist entry with the product populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    #[serde(rename = "_id")]
    pub id: WishlistItemId,
    pub user: UserId,
    pub product: Product,
    #[serde(default)]
    pub note: Option<String>,
}

/// Payload for `POST /wishlist`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateWishlistItemRequest {
    pub user: UserId,
    pub product: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Payload for `PATCH /wishlist/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateWishlistItemRequest {
    pub note: String,
}

// =============================================================================
// Shared envelope types
// =============================================================================

/// Error body the backend returns on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

/// A page of results plus the collection size from `X-Total-Count`.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    /// Number of pages at the given page size (at least 1).
    #[must_use]
    pub const fn page_count(&self, per_page: u64) -> u64 {
        if per_page == 0 || self.total == 0 {
            return 1;
        }
        self.total.div_ceil(per_page)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn product_json() -> serde_json::Value {
        serde_json::json!({
            "_id": "664f1a",
            "title": "Steel Water Bottle",
            "description": "1L insulated bottle",
            "price": 1099,
            "discountPercentage": 15,
            "stockQuantity": 42,
            "thumbnail": "https://cdn.example.com/bottle.jpg",
            "images": ["https://cdn.example.com/bottle-1.jpg"],
            "brand": {"_id": "b1", "name": "Milton"},
            "category": {"_id": "c1", "name": "Kitchen"}
        })
    }

    #[test]
    fn test_product_deserializes_from_backend_shape() {
        let product: Product = serde_json::from_value(product_json()).unwrap();
        assert_eq!(product.id.as_str(), "664f1a");
        assert_eq!(product.stock_quantity, 42);
        assert_eq!(product.brand.name, "Milton");
        assert!(product.in_stock());
    }

    #[test]
    fn test_sale_price_applies_discount() {
        let product: Product = serde_json::from_value(product_json()).unwrap();
        // 1099 less 15% = 934.15
        assert_eq!(product.sale_price(), Decimal::from_str("934.15").unwrap());

        let mut full_price = product;
        full_price.discount_percentage = None;
        assert_eq!(full_price.sale_price(), Decimal::from(1099));
    }

    #[test]
    fn test_cart_item_unit_price_comes_from_snapshot() {
        let item: CartItem = serde_json::from_value(serde_json::json!({
            "_id": "line1",
            "user": "u1",
            "product": product_json(),
            "quantity": 3
        }))
        .unwrap();
        assert_eq!(item.unit_price(), Decimal::from(1099));
    }

    #[test]
    fn test_order_round_trip_keeps_gateway_fields_snake_case() {
        let json = serde_json::json!({
            "_id": "ord1",
            "user": "u1",
            "item": [{
                "product": product_json(),
                "quantity": 2
            }],
            "address": {
                "_id": "a1",
                "user": "u1",
                "type": "Home",
                "street": "14 Palm Avenue",
                "country": "India",
                "phoneNumber": "9876543210",
                "state": "Maharashtra",
                "city": "Ulwe",
                "postalCode": "410206"
            },
            "paymentMode": "Online",
            "total": 1899,
            "paymentStatus": "Success",
            "paymentDetails": [{
                "razorpay_payment_id": "pay_1",
                "razorpay_order_id": "order_1",
                "razorpay_signature": "sig_1"
            }],
            "status": "Out for delivery",
            "createdAt": "2026-08-01T10:15:00Z"
        });

        let order: Order = serde_json::from_value(json).unwrap();
        assert_eq!(order.status, OrderStatus::OutForDelivery);
        assert_eq!(order.total, Rupees::new(1899));
        assert_eq!(order.payment_details[0].razorpay_order_id, "order_1");

        let back = serde_json::to_value(&order).unwrap();
        assert_eq!(back["paymentMode"], "Online");
        assert_eq!(back["paymentDetails"][0]["razorpay_payment_id"], "pay_1");
        assert_eq!(back["address"]["type"], "Home");
        assert!(back["item"].is_array());
    }

    #[test]
    fn test_create_order_request_omits_cod_payment_fields() {
        let address: Address = serde_json::from_value(serde_json::json!({
            "_id": "a1",
            "user": "u1",
            "type": "Home",
            "street": "14 Palm Avenue",
            "country": "India",
            "phoneNumber": "9876543210",
            "state": "Maharashtra",
            "city": "Ulwe",
            "postalCode": "410206"
        }))
        .unwrap();

        let request = CreateOrderRequest {
            user: UserId::new("u1"),
            items: Vec::new(),
            address,
            payment_mode: PaymentMode::Cod,
            total: Rupees::new(530),
            payment_status: None,
            payment_details: Vec::new(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("paymentStatus").is_none());
        assert!(json.get("paymentDetails").is_none());
        assert!(json.get("status").is_none());
        assert_eq!(json["paymentMode"], "COD");
        assert!(json["item"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_page_count() {
        let page = Page::<u8> {
            items: vec![],
            total: 11,
        };
        assert_eq!(page.page_count(5), 3);
        assert_eq!(page.page_count(11), 1);

        let empty = Page::<u8> {
            items: vec![],
            total: 0,
        };
        assert_eq!(empty.page_count(5), 1);
    }
}
