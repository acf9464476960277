use crate::application::workflow::PaymentWorkflow;
use crate::domain::booking::{Booking, BookingId, Guest, ListingId};
use crate::domain::payment::{Amount, PaymentId, PaymentStatus};
use crate::domain::ports::Payer;
use crate::error::PaymentError;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<PaymentWorkflow>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/bookings", post(create_booking))
        .route("/api/payments/initiate", post(initiate_payment))
        .route("/api/payments/verify", get(verify_payment))
        .route("/health", get(health))
        .with_state(state)
}

/// `PaymentError` wrapper carrying the HTTP mapping.
pub struct ApiError(PaymentError);

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        Self(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PaymentError::BookingNotFound | PaymentError::PaymentNotFound => {
                StatusCode::NOT_FOUND
            }
            PaymentError::InvalidAmount
            | PaymentError::GatewayRejected(_)
            | PaymentError::ValidationError(_) => StatusCode::BAD_REQUEST,
            PaymentError::InvalidTransition { .. } => StatusCode::CONFLICT,
            PaymentError::GatewayUnreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
            PaymentError::NotificationDelivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub listing_id: ListingId,
    pub guest: Guest,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: Decimal,
}

async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    let total_price = Amount::new(request.total_price)?;
    let booking = Booking::new(
        request.listing_id,
        request.guest,
        request.start_date,
        request.end_date,
        total_price,
    )?;
    let booking = state.workflow.create_booking(booking).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

#[derive(Debug, Deserialize)]
pub struct InitiatePaymentRequest {
    pub booking_id: BookingId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize)]
pub struct InitiatePaymentResponse {
    pub payment_id: PaymentId,
    pub checkout_url: String,
}

async fn initiate_payment(
    State(state): State<AppState>,
    Json(request): Json<InitiatePaymentRequest>,
) -> Result<Json<InitiatePaymentResponse>, ApiError> {
    let payer = Payer {
        email: request.email,
        first_name: request.first_name,
        last_name: request.last_name,
    };
    let session = state
        .workflow
        .initiate_payment(&request.booking_id, payer)
        .await?;
    Ok(Json(InitiatePaymentResponse {
        payment_id: session.payment_id,
        checkout_url: session.checkout_url,
    }))
}

#[derive(Debug, Deserialize)]
pub struct VerifyPaymentQuery {
    pub tx_ref: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub payment_status: PaymentStatus,
}

async fn verify_payment(
    State(state): State<AppState>,
    Query(query): Query<VerifyPaymentQuery>,
) -> Result<Json<VerifyPaymentResponse>, ApiError> {
    let payment_status = state.workflow.verify_payment(&query.tx_ref).await?;
    Ok(Json(VerifyPaymentResponse { payment_status }))
}

async fn health() -> &'static str {
    "OK"
}
