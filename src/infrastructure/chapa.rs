use crate::domain::ports::{CheckoutIntent, Initialization, PaymentGateway, Verification};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.chapa.co/v1";
pub const DEFAULT_CURRENCY: &str = "ETB";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration injected into the gateway client at construction.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub secret_key: String,
    /// Single fixed currency carried on every initialize call.
    pub currency: String,
    /// Where the provider posts verification callbacks.
    pub callback_url: String,
    /// Where the payer lands after completing checkout.
    pub return_url: String,
    /// Bound on every outbound call; exceeding it surfaces as
    /// `GatewayUnreachable`.
    pub timeout: Duration,
}

/// HTTP client for the Chapa payment provider.
///
/// Translates checkout intents into initialize/verify calls and provider
/// responses back into domain results. Carries no retry policy.
pub struct ChapaGateway {
    config: GatewayConfig,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct InitializeBody<'a> {
    amount: String,
    currency: &'a str,
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    tx_ref: &'a str,
    callback_url: &'a str,
    return_url: &'a str,
    customization: Customization<'a>,
}

#[derive(Serialize)]
struct Customization<'a> {
    title: &'a str,
    description: &'a str,
}

/// Provider reply envelope. Every field is optional: known deployments
/// report success either at the top level or nested under `data`, and the
/// parser falls back gracefully across both shapes.
#[derive(Debug, Deserialize)]
struct GatewayReply {
    status: Option<String>,
    message: Option<String>,
    data: Option<ReplyData>,
}

#[derive(Debug, Default, Deserialize)]
struct ReplyData {
    #[serde(default)]
    checkout_url: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    reference: Option<String>,
}

const SUCCESS: &str = "success";

impl GatewayReply {
    fn top_level_success(&self) -> bool {
        self.status.as_deref() == Some(SUCCESS)
    }

    fn nested_success(&self) -> bool {
        self.data
            .as_ref()
            .is_some_and(|d| d.status.as_deref() == Some(SUCCESS))
    }
}

impl ChapaGateway {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::GatewayUnreachable(e.to_string()))?;
        Ok(Self { config, http })
    }
}

#[async_trait]
impl PaymentGateway for ChapaGateway {
    async fn initialize(&self, intent: CheckoutIntent) -> Result<Initialization> {
        let body = InitializeBody {
            amount: intent.amount.to_string(),
            currency: &self.config.currency,
            email: &intent.payer.email,
            first_name: &intent.payer.first_name,
            last_name: &intent.payer.last_name,
            tx_ref: &intent.tx_ref,
            callback_url: &self.config.callback_url,
            return_url: &self.config.return_url,
            customization: Customization {
                title: &intent.title,
                description: &intent.description,
            },
        };

        let reply: GatewayReply = self
            .http
            .post(format!("{}/transaction/initialize", self.config.base_url))
            .bearer_auth(&self.config.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::GatewayUnreachable(e.to_string()))?
            .json()
            .await
            .map_err(|e| PaymentError::GatewayUnreachable(e.to_string()))?;

        if !reply.top_level_success() {
            return Err(PaymentError::GatewayRejected(
                reply
                    .message
                    .unwrap_or_else(|| "payment initiation failed".to_string()),
            ));
        }

        let data = reply.data.unwrap_or_default();
        let checkout_url = data.checkout_url.ok_or_else(|| {
            PaymentError::GatewayRejected("provider returned no checkout url".to_string())
        })?;
        // Chapa assigns no separate transaction id on initialize; the
        // checkout URL stands in as the handle when no reference comes back.
        let external_handle = data.reference.or_else(|| Some(checkout_url.clone()));

        Ok(Initialization {
            checkout_url,
            external_handle,
        })
    }

    async fn verify(&self, tx_ref: &str) -> Result<Verification> {
        let reply: GatewayReply = self
            .http
            .get(format!(
                "{}/transaction/verify/{}",
                self.config.base_url, tx_ref
            ))
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(|e| PaymentError::GatewayUnreachable(e.to_string()))?
            .json()
            .await
            .map_err(|e| PaymentError::GatewayUnreachable(e.to_string()))?;

        let confirmed = reply.top_level_success() || reply.nested_success();
        let raw_status = reply
            .data
            .as_ref()
            .and_then(|d| d.status.clone())
            .or(reply.status);

        Ok(Verification {
            confirmed,
            raw_status,
        })
    }
}
