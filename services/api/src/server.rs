use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use tracing::info;

use civet::accounts::AccountService;
use civet::config::AppConfig;
use civet::directus::{AdminSession, ConfigCredentials, DirectusClient, DirectusStore};
use civet::error::AppError;
use civet::forms::{FormRepository, FormService};
use civet::leads::{LeadInboxService, LeadIntakeService};
use civet::pages::{PageRepository, PageService};
use civet::telemetry;

use crate::cli::ServeArgs;
use crate::infra::{
    demo_form_draft, demo_page_draft, demo_user, AppState, DevAuthenticator,
    InMemoryEmailRepository, InMemoryFormRepository, InMemoryLeadRepository,
    InMemoryNoteRepository, InMemoryPageRepository, LoggingEmailSender,
};
use crate::routes::{with_service_routes, ServiceSet};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let services = if args.in_memory {
        demo_services(&config).await?
    } else {
        directus_services(&config)
    };

    let app = with_service_routes(services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "civet api ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Production wiring: all five repositories live in Directus collections and
/// authentication resolves session tokens against the Directus user store.
fn directus_services(config: &AppConfig) -> ServiceSet {
    let client = Arc::new(DirectusClient::new(config.directus.base_url.clone()));
    let admin = Arc::new(AdminSession::new(
        client.clone(),
        Arc::new(ConfigCredentials::new(&config.directus)),
    ));
    let store = DirectusStore::new(admin.clone());

    let pages = Arc::new(store.pages());
    let forms = Arc::new(store.forms());
    let leads = Arc::new(store.leads());
    let notes = Arc::new(store.notes());
    let emails = Arc::new(store.emails());

    let accounts = Arc::new(AccountService::new(
        client,
        admin,
        config.directus.user_role.clone(),
    ));

    ServiceSet {
        intake: Arc::new(LeadIntakeService::new(
            pages.clone(),
            forms.clone(),
            leads.clone(),
        )),
        inbox: Arc::new(LeadInboxService::new(
            leads,
            notes,
            emails,
            Arc::new(LoggingEmailSender),
            pages.clone(),
        )),
        pages: Arc::new(PageService::new(pages, forms.clone())),
        forms: Arc::new(FormService::new(forms)),
        accounts: Some(accounts.clone()),
        auth: accounts,
        session: config.session.clone(),
    }
}

/// Demo wiring: in-memory storage seeded with one published page and its
/// intake form, authenticated by a single token printed at startup.
async fn demo_services(config: &AppConfig) -> Result<ServiceSet, AppError> {
    let pages = Arc::new(InMemoryPageRepository::default());
    let forms = Arc::new(InMemoryFormRepository::default());
    let leads = Arc::new(InMemoryLeadRepository::default());
    let notes = Arc::new(InMemoryNoteRepository::default());
    let emails = Arc::new(InMemoryEmailRepository::default());

    let user = demo_user();
    let form = forms.insert(&user.id, demo_form_draft()).await?;
    let page = pages.insert(&user.id, demo_page_draft(&form.id)).await?;

    let token = format!(
        "dev-{:x}",
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    );
    info!(%token, subdomain = %page.subdomain, "demo mode: use this session token");

    Ok(ServiceSet {
        intake: Arc::new(LeadIntakeService::new(
            pages.clone(),
            forms.clone(),
            leads.clone(),
        )),
        inbox: Arc::new(LeadInboxService::new(
            leads,
            notes,
            emails,
            Arc::new(LoggingEmailSender),
            pages.clone(),
        )),
        pages: Arc::new(PageService::new(pages, forms.clone())),
        forms: Arc::new(FormService::new(forms)),
        accounts: None,
        auth: Arc::new(DevAuthenticator::new(token, user)),
        session: config.session.clone(),
    })
}
