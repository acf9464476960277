use clap::Parser;
use lodgepay::application::dispatcher::NotificationDispatcher;
use lodgepay::application::workflow::PaymentWorkflow;
use lodgepay::domain::ports::{
    SharedBookingStore, SharedNotificationSender, SharedPaymentGateway, SharedPaymentStore,
};
use lodgepay::infrastructure::chapa::{self, ChapaGateway, GatewayConfig};
use lodgepay::infrastructure::email::EmailNotifier;
use lodgepay::infrastructure::in_memory::{InMemoryBookingStore, InMemoryPaymentStore};
use lodgepay::interfaces::http::{router, AppState};
use miette::{IntoDiagnostic, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to serve the API on
    #[arg(long, env = "LODGEPAY_BIND", default_value = "127.0.0.1:8000")]
    bind: SocketAddr,

    /// Chapa API secret key
    #[arg(long, env = "CHAPA_SECRET_KEY")]
    chapa_secret_key: String,

    /// Chapa API base URL
    #[arg(long, env = "CHAPA_BASE_URL", default_value = chapa::DEFAULT_BASE_URL)]
    chapa_base_url: String,

    /// Currency code sent on every checkout
    #[arg(long, env = "LODGEPAY_CURRENCY", default_value = chapa::DEFAULT_CURRENCY)]
    currency: String,

    /// URL the provider posts verification callbacks to
    #[arg(long, env = "LODGEPAY_CALLBACK_URL")]
    callback_url: String,

    /// URL the payer is returned to after checkout
    #[arg(long, env = "LODGEPAY_RETURN_URL")]
    return_url: String,

    /// Timeout for outbound gateway calls, in seconds
    #[arg(long, env = "LODGEPAY_GATEWAY_TIMEOUT", default_value_t = chapa::DEFAULT_TIMEOUT.as_secs())]
    gateway_timeout_secs: u64,

    /// From address on confirmation emails
    #[arg(long, env = "LODGEPAY_FROM_EMAIL", default_value = "no-reply@lodgepay.example")]
    from_email: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lodgepay=info".into()),
        )
        .init();
    let cli = Cli::parse();

    let bookings: SharedBookingStore = Arc::new(InMemoryBookingStore::new());
    let payments: SharedPaymentStore = Arc::new(InMemoryPaymentStore::new());

    let gateway: SharedPaymentGateway = Arc::new(
        ChapaGateway::new(GatewayConfig {
            base_url: cli.chapa_base_url,
            secret_key: cli.chapa_secret_key,
            currency: cli.currency,
            callback_url: cli.callback_url,
            return_url: cli.return_url,
            timeout: Duration::from_secs(cli.gateway_timeout_secs),
        })
        .into_diagnostic()?,
    );

    let notifier: SharedNotificationSender = Arc::new(EmailNotifier::new(
        bookings.clone(),
        payments.clone(),
        cli.from_email,
    ));
    let dispatcher = NotificationDispatcher::start(notifier);

    let workflow = Arc::new(PaymentWorkflow::new(
        bookings, payments, gateway, dispatcher,
    ));

    let app = router(AppState { workflow });
    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .into_diagnostic()?;
    info!(addr = %cli.bind, "lodgepay listening");
    axum::serve(listener, app).await.into_diagnostic()?;

    Ok(())
}
