//! Checkout route handlers.
//!
//! Checkout runs in three steps: pick (or add) a delivery address, pick a
//! payment mode, then either place the order directly (cash on delivery)
//! or settle it through the hosted payment widget first. While the widget
//! is open the attempt is parked in the session as a [`PendingPayment`];
//! the confirmation handler picks it back up and creates the order with
//! an idempotency key, so a retried POST can never double-order.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use fortynine_core::api::{
    Address, CartItem, CreateAddressRequest, CreateGatewayOrderRequest, CreateOrderRequest,
    OrderItem,
};
use fortynine_core::checkout::{CheckoutError, GatewayConfirmation, PaymentFlow, ResolvedPayment};
use fortynine_core::location::{AddressDraft, AddressError};
use fortynine_core::pricing::{CartTotals, PricingPolicy};
use fortynine_core::types::{AddressId, OrderId, PaymentMode, Rupees};

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::cart::cart_totals;
use crate::models::{CartView, CurrentUser, PendingPayment, session_keys};
use crate::state::AppState;

// =============================================================================
// Query and Form Parameters
// =============================================================================

/// Flash message codes carried on the checkout page URL.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// City dropdown fragment query.
#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub state: String,
    /// City to pre-select, for edit forms.
    pub selected: Option<String>,
}

/// Postal code dropdown fragment query.
#[derive(Debug, Deserialize)]
pub struct PostalCodeQuery {
    pub state: String,
    pub city: String,
    /// Code to pre-select, for edit forms.
    pub selected: Option<String>,
}

/// Place order form data.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderForm {
    pub address_id: AddressId,
    /// "cash" or "online".
    pub payment_mode: String,
}

/// Map a checkout error code from the URL to customer-facing text. The
/// below-minimum message carries the store's configured threshold.
fn checkout_error_message(code: &str, policy: &PricingPolicy) -> String {
    if code == "below-minimum" {
        return format!(
            "Orders need to reach {} before checkout. Add a few more items.",
            policy.minimum_order
        );
    }

    let message = match code {
        "address-missing" => "Please fill in every address field.",
        "phone" => "Enter a valid 10-digit mobile number.",
        "location" => "We don't deliver to that state, city and PIN code combination yet.",
        "address-save" => "Could not save the address. Please try again.",
        "address" => "Pick a delivery address.",
        "payment-mode" => "Pick a payment method.",
        "payment" => "Payment could not be started. Please try again.",
        "payment-state" => "That payment attempt is no longer valid. Please start again.",
        "payment-session-expired" => "Your payment session expired. Please try again.",
        "payment-cancelled" => "Payment was cancelled. You can try again whenever you're ready.",
        "payment-mismatch" => {
            "The payment confirmation did not match your order. If you were charged, contact support."
        }
        "order" => {
            "We could not place your order. If you completed a payment it is safe; please contact support."
        }
        _ => "Something went wrong. Please try again.",
    };
    message.to_string()
}

/// Map a checkout success code from the URL to customer-facing text.
fn checkout_success_message(code: &str) -> &'static str {
    match code {
        "address-saved" => "Address saved.",
        _ => "Done.",
    }
}

/// Redirect code for an address validation failure.
pub(super) fn address_error_code(error: &AddressError) -> &'static str {
    match error {
        AddressError::MissingField(_) => "address-missing",
        AddressError::InvalidPhone => "phone",
        AddressError::InvalidLocation { .. } => "location",
    }
}

/// Redirect for a refused payment transition.
fn checkout_error_redirect(error: &CheckoutError) -> Redirect {
    match error {
        CheckoutError::EmptyCart => Redirect::to("/cart"),
        CheckoutError::BelowMinimumOrder { .. } => Redirect::to("/checkout?error=below-minimum"),
        CheckoutError::ConfirmationMismatch => Redirect::to("/checkout?error=payment-mismatch"),
        CheckoutError::InvalidTransition { .. } => Redirect::to("/checkout?error=payment-state"),
    }
}

// =============================================================================
// Address Views
// =============================================================================

/// Saved address display data for templates.
#[derive(Clone)]
pub struct AddressView {
    pub id: String,
    pub label: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub phone_number: String,
    pub country: String,
}

impl From<&Address> for AddressView {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id.to_string(),
            label: address.label.clone(),
            street: address.street.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            postal_code: address.postal_code.clone(),
            phone_number: address.phone_number.clone(),
            country: address.country.clone(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub user: Option<CurrentUser>,
    pub cart: CartView,
    pub addresses: Vec<AddressView>,
    pub states: Vec<String>,
    pub error: Option<String>,
    pub success: Option<&'static str>,
}

/// Payment page template: opens the hosted widget for a registered
/// gateway order.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/pay.html")]
pub struct CheckoutPayTemplate {
    pub user: Option<CurrentUser>,
    /// Publishable gateway key.
    pub key_id: String,
    pub gateway_order_id: String,
    /// Amount in paise, as registered with the gateway.
    pub amount: i64,
    pub currency: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    /// Payable total, formatted for display.
    pub total: String,
}

/// City `<option>` list fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/city_options.html")]
pub struct CityOptionsTemplate {
    pub cities: Vec<String>,
    pub selected: Option<String>,
}

/// Postal code `<option>` list fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/postal_code_options.html")]
pub struct PostalCodeOptionsTemplate {
    pub postal_codes: Vec<String>,
    pub selected: Option<String>,
}

// =============================================================================
// Page Handlers
// =============================================================================

/// Display the checkout page.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<Response> {
    let items = state.api().get_cart(&user.token, &user.id).await?;
    if items.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let addresses = state.api().get_addresses(&user.token, &user.id).await?;
    let directory = state.api().get_locations().await?;

    Ok(CheckoutTemplate {
        cart: CartView::from_items(&items, state.pricing()),
        addresses: addresses.iter().map(AddressView::from).collect(),
        states: directory.states().map(String::from).collect(),
        user: Some(user),
        error: query
            .error
            .as_deref()
            .map(|code| checkout_error_message(code, state.pricing())),
        success: query.success.as_deref().map(checkout_success_message),
    }
    .into_response())
}

/// Save a new delivery address from the checkout form.
#[instrument(skip(state, user, form))]
pub async fn create_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddressDraft>,
) -> Result<Redirect> {
    let directory = state.api().get_locations().await?;
    if let Err(e) = form.validate(&directory) {
        return Ok(Redirect::to(&format!(
            "/checkout?error={}",
            address_error_code(&e)
        )));
    }

    let request = CreateAddressRequest {
        user: user.id.clone(),
        address: form,
    };
    match state.api().create_address(&user.token, &request).await {
        Ok(_) => Ok(Redirect::to("/checkout?success=address-saved")),
        Err(e) => {
            tracing::error!("Failed to save address: {e}");
            Ok(Redirect::to("/checkout?error=address-save"))
        }
    }
}

/// City dropdown options for a state (HTMX).
#[instrument(skip(state))]
pub async fn cities(
    State(state): State<AppState>,
    Query(query): Query<CityQuery>,
) -> Result<CityOptionsTemplate> {
    let directory = state.api().get_locations().await?;

    Ok(CityOptionsTemplate {
        cities: directory
            .cities(&query.state)
            .into_iter()
            .map(String::from)
            .collect(),
        selected: query.selected,
    })
}

/// Postal code dropdown options for a city (HTMX).
#[instrument(skip(state))]
pub async fn postal_codes(
    State(state): State<AppState>,
    Query(query): Query<PostalCodeQuery>,
) -> Result<PostalCodeOptionsTemplate> {
    let directory = state.api().get_locations().await?;

    Ok(PostalCodeOptionsTemplate {
        postal_codes: directory
            .postal_codes(&query.state, &query.city)
            .into_iter()
            .map(String::from)
            .collect(),
        selected: query.selected,
    })
}

// =============================================================================
// Order Placement
// =============================================================================

/// Place the order, or hand off to the payment widget for online payment.
#[instrument(skip(state, user, session))]
pub async fn place_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Form(form): Form<PlaceOrderForm>,
) -> Result<Response> {
    let items = state.api().get_cart(&user.token, &user.id).await?;
    let totals = cart_totals(&items, state.pricing());

    let addresses = state.api().get_addresses(&user.token, &user.id).await?;
    let Some(address) = addresses.into_iter().find(|a| a.id == form.address_id) else {
        return Ok(Redirect::to("/checkout?error=address").into_response());
    };

    let flow = PaymentFlow::new();
    match form.payment_mode.as_str() {
        "cash" => {
            let flow = match flow.choose_cash(&totals, state.pricing()) {
                Ok(flow) => flow,
                Err(e) => return Ok(checkout_error_redirect(&e).into_response()),
            };
            let PaymentFlow::OrderReady(payment) = flow else {
                // choose_cash settles immediately; anything else was refused above.
                return Ok(Redirect::to("/checkout?error=payment-state").into_response());
            };

            let request = order_request(&user, &items, address, payment, totals.total);
            submit_order(&state, &user, &request, &Uuid::new_v4().to_string()).await
        }
        "online" => {
            let flow = match flow.choose_online(&totals, state.pricing()) {
                Ok(flow) => flow,
                Err(e) => return Ok(checkout_error_redirect(&e).into_response()),
            };

            start_gateway_payment(&state, &user, &session, flow, &items, address, &totals).await
        }
        _ => Ok(Redirect::to("/checkout?error=payment-mode").into_response()),
    }
}

/// Register a gateway order, park the attempt in the session, and render
/// the payment page.
async fn start_gateway_payment(
    state: &AppState,
    user: &CurrentUser,
    session: &Session,
    flow: PaymentFlow,
    items: &[CartItem],
    address: Address,
    totals: &CartTotals,
) -> Result<Response> {
    let request = CreateGatewayOrderRequest {
        user: user.id.clone(),
        items: items.iter().map(OrderItem::from).collect(),
        address: address.clone(),
        payment_mode: PaymentMode::Online,
        total: totals.total.paise(),
        currency: "INR".to_string(),
    };

    let gateway = match state.api().create_gateway_order(&user.token, &request).await {
        Ok(gateway) => gateway,
        Err(e) => {
            tracing::error!("Failed to create gateway order: {e}");
            return Ok(Redirect::to("/checkout?error=payment").into_response());
        }
    };

    let flow = match flow.gateway_order_registered(&gateway.order_id) {
        Ok(flow) => flow,
        Err(e) => return Ok(checkout_error_redirect(&e).into_response()),
    };

    let pending = PendingPayment {
        flow,
        address_id: address.id.clone(),
        total: totals.total,
        idempotency_key: Uuid::new_v4().to_string(),
    };
    session
        .insert(session_keys::PENDING_PAYMENT, &pending)
        .await?;

    Ok(CheckoutPayTemplate {
        user: Some(user.clone()),
        key_id: state.config().razorpay_key_id.clone(),
        gateway_order_id: gateway.order_id,
        amount: gateway.amount,
        currency: gateway.currency,
        customer_name: user.name.clone(),
        customer_email: user.email.clone(),
        customer_phone: address.phone_number,
        total: totals.total.to_string(),
    }
    .into_response())
}

/// Handle the widget's confirmation callback and create the paid order.
#[instrument(skip(state, user, session, confirmation))]
pub async fn confirm_payment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Form(confirmation): Form<GatewayConfirmation>,
) -> Result<Response> {
    let Some(pending) = session
        .get::<PendingPayment>(session_keys::PENDING_PAYMENT)
        .await?
    else {
        return Ok(Redirect::to("/checkout?error=payment-session-expired").into_response());
    };

    let payment = match pending.flow.clone().confirm(confirmation) {
        Ok(PaymentFlow::OrderReady(payment)) => payment,
        Ok(flow) => {
            // confirm() only ever lands on OrderReady; refusals come back as errors.
            tracing::error!(state = flow.state_name(), "Unexpected payment state");
            return Ok(Redirect::to("/checkout?error=payment-state").into_response());
        }
        Err(e) => {
            tracing::warn!("Payment confirmation refused: {e}");
            drop_pending_payment(&session).await;
            return Ok(checkout_error_redirect(&e).into_response());
        }
    };

    let items = state.api().get_cart(&user.token, &user.id).await?;
    if items.is_empty() {
        drop_pending_payment(&session).await;
        return Ok(Redirect::to("/cart?error=payment-session").into_response());
    }

    let addresses = state.api().get_addresses(&user.token, &user.id).await?;
    let Some(address) = addresses.into_iter().find(|a| a.id == pending.address_id) else {
        tracing::error!("Delivery address disappeared during payment");
        drop_pending_payment(&session).await;
        return Ok(Redirect::to("/checkout?error=address").into_response());
    };

    // Charge exactly what the widget was opened with, even if the cart
    // moved underneath the payment.
    let request = order_request(&user, &items, address, payment, pending.total);

    // Keep the pending attempt on failure: the idempotency key makes a
    // resubmitted confirmation safe.
    submit_paid_order(&state, &user, &session, &request, &pending.idempotency_key).await
}

/// Handle the widget being dismissed without paying.
#[instrument(skip(session))]
pub async fn cancel_payment(session: Session) -> Result<Redirect> {
    if let Some(pending) = session
        .remove::<PendingPayment>(session_keys::PENDING_PAYMENT)
        .await?
    {
        if let Ok(flow) = pending.flow.fail("payment widget dismissed") {
            tracing::info!(state = flow.state_name(), "Online payment abandoned");
        }
    }

    Ok(Redirect::to("/checkout?error=payment-cancelled"))
}

// =============================================================================
// Order Submission
// =============================================================================

/// Build the order-creation payload from the cart and resolved payment.
fn order_request(
    user: &CurrentUser,
    items: &[CartItem],
    address: Address,
    payment: ResolvedPayment,
    total: Rupees,
) -> CreateOrderRequest {
    CreateOrderRequest {
        user: user.id.clone(),
        items: items.iter().map(OrderItem::from).collect(),
        address,
        payment_mode: payment.mode,
        total,
        payment_status: payment.status,
        payment_details: payment.confirmation.into_iter().collect(),
    }
}

/// Create a cash-on-delivery order and clear the cart.
async fn submit_order(
    state: &AppState,
    user: &CurrentUser,
    request: &CreateOrderRequest,
    idempotency_key: &str,
) -> Result<Response> {
    match state
        .api()
        .create_order(&user.token, request, idempotency_key)
        .await
    {
        Ok(order) => {
            clear_cart_after_order(state, user, &order.id).await;
            Ok(Redirect::to(&format!("/order-success/{}", order.id)).into_response())
        }
        Err(e) => {
            tracing::error!("Failed to create order: {e}");
            Ok(Redirect::to("/checkout?error=order").into_response())
        }
    }
}

/// Create a paid order, drop the parked attempt, and clear the cart.
async fn submit_paid_order(
    state: &AppState,
    user: &CurrentUser,
    session: &Session,
    request: &CreateOrderRequest,
    idempotency_key: &str,
) -> Result<Response> {
    match state
        .api()
        .create_order(&user.token, request, idempotency_key)
        .await
    {
        Ok(order) => {
            drop_pending_payment(session).await;
            clear_cart_after_order(state, user, &order.id).await;
            Ok(Redirect::to(&format!("/order-success/{}", order.id)).into_response())
        }
        Err(e) => {
            tracing::error!("Failed to create paid order: {e}");
            Ok(Redirect::to("/checkout?error=order").into_response())
        }
    }
}

/// Clear the cart once the order exists. The order is already placed, so
/// a failure here only leaves stale lines behind.
async fn clear_cart_after_order(state: &AppState, user: &CurrentUser, order_id: &OrderId) {
    if let Err(e) = state.api().clear_cart(&user.token, &user.id).await {
        tracing::warn!("Order {order_id} created but cart clear failed: {e}");
    }
}

/// Remove the parked payment attempt, logging (not failing) on error.
async fn drop_pending_payment(session: &Session) {
    if let Err(e) = session
        .remove::<PendingPayment>(session_keys::PENDING_PAYMENT)
        .await
    {
        tracing::error!("Failed to clear pending payment from session: {e}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::CartSummary;

    fn policy() -> PricingPolicy {
        PricingPolicy {
            shipping: Rupees::new(20),
            taxes: Rupees::new(10),
            minimum_order: Rupees::new(499),
        }
    }

    fn checkout_template(eligible: bool) -> CheckoutTemplate {
        CheckoutTemplate {
            user: None,
            cart: CartView {
                lines: vec![],
                summary: CartSummary {
                    item_count: 2,
                    subtotal: "\u{20b9}200".to_string(),
                    shipping: "\u{20b9}20".to_string(),
                    taxes: "\u{20b9}10".to_string(),
                    total: "\u{20b9}230".to_string(),
                    eligible,
                    minimum_order: "\u{20b9}499".to_string(),
                },
            },
            addresses: vec![],
            states: vec![],
            error: None,
            success: None,
        }
    }

    #[test]
    fn test_address_error_codes() {
        assert_eq!(
            address_error_code(&AddressError::MissingField("street")),
            "address-missing"
        );
        assert_eq!(address_error_code(&AddressError::InvalidPhone), "phone");
        assert_eq!(
            address_error_code(&AddressError::InvalidLocation {
                state: "Maharashtra".to_string(),
                city: "Ulwe".to_string(),
                postal_code: "410206".to_string(),
            }),
            "location"
        );
    }

    #[test]
    fn test_checkout_error_messages_cover_flow_codes() {
        let policy = policy();
        for code in [
            "below-minimum",
            "payment-mismatch",
            "payment-session-expired",
            "payment-cancelled",
            "order",
        ] {
            assert_ne!(
                checkout_error_message(code, &policy),
                "Something went wrong. Please try again.",
                "no message wired for {code}"
            );
        }
    }

    #[test]
    fn test_below_minimum_message_names_the_threshold() {
        let message = checkout_error_message("below-minimum", &policy());
        assert!(
            message.contains("\u{20b9}499"),
            "threshold missing from: {message}"
        );
    }

    #[test]
    fn test_place_order_button_follows_eligibility() {
        let under = checkout_template(false).render().unwrap();
        assert!(under.contains("disabled"));
        assert!(
            under.contains("\u{20b9}499"),
            "the note should carry the threshold"
        );

        let over = checkout_template(true).render().unwrap();
        assert!(!over.contains("disabled"));
        assert!(!over.contains("checkout-minimum"));
    }
}
