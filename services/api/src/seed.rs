//! Inbox seed and cleanup tooling. `seed` backfills the first owner account
//! with a spread of sample leads so the dashboard has something to show;
//! `clean` deletes every lead that account owns.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tracing::info;

use civet::config::AppConfig;
use civet::directus::{AdminSession, ConfigCredentials, DirectusClient, DirectusStore, ItemQuery};
use civet::error::AppError;
use civet::forms::FormRepository;
use civet::leads::{score, FormResponses, LeadRepository, LeadStatus, NewLead, ResponseValue};
use civet::pages::{Page, PageRepository};
use civet::repository::RepositoryError;
use civet::telemetry;

use crate::infra::{demo_form_draft, demo_page_draft};

struct SeedContext {
    admin: Arc<AdminSession>,
    store: DirectusStore,
    owner_id: String,
    owner_subdomain: String,
}

async fn connect() -> Result<SeedContext, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let client = Arc::new(DirectusClient::new(config.directus.base_url.clone()));
    let admin = Arc::new(AdminSession::new(
        client.clone(),
        Arc::new(ConfigCredentials::new(&config.directus)),
    ));
    let store = DirectusStore::new(admin.clone());

    let token = admin.ensure_authenticated().await?;
    let users = client
        .read_users(
            &token,
            &ItemQuery::filtered(json!({ "subdomain": { "_nnull": true } })),
        )
        .await?;

    let owner = users
        .iter()
        .find(|user| {
            user.get("email").and_then(Value::as_str) != Some(config.directus.admin_email.as_str())
        })
        .ok_or_else(|| {
            RepositoryError::Unavailable("no owner account found; sign up first".to_string())
        })?;

    let owner_id = owner
        .get("id")
        .and_then(Value::as_str)
        .ok_or(RepositoryError::Unavailable(
            "owner record is missing an id".to_string(),
        ))?
        .to_string();
    let owner_subdomain = owner
        .get("subdomain")
        .and_then(Value::as_str)
        .unwrap_or("demo")
        .to_string();

    Ok(SeedContext {
        admin,
        store,
        owner_id,
        owner_subdomain,
    })
}

pub(crate) async fn run_seed() -> Result<(), AppError> {
    let ctx = connect().await?;

    let page = ensure_page(&ctx).await?;
    let form = ctx
        .store
        .forms()
        .fetch(&page.form_id)
        .await?
        .ok_or(RepositoryError::NotFound)?;

    let leads = ctx.store.leads();
    let now = Utc::now();
    let mut created = 0usize;

    for sample in sample_leads() {
        let responses = sample.responses();
        let lead = leads
            .insert(NewLead {
                user_id: ctx.owner_id.clone(),
                page_id: page.id.clone(),
                form_id: form.id.clone(),
                score: score(&responses, &form.scoring_rules),
                responses,
                status: sample.status,
                date_created: Some(now - sample.age),
            })
            .await?;
        created += 1;
        info!(lead_id = %lead.id, status = lead.status.label(), "seeded lead");
    }

    info!(
        created,
        owner = %ctx.owner_id,
        subdomain = %ctx.owner_subdomain,
        "inbox seeded"
    );
    Ok(())
}

pub(crate) async fn run_clean() -> Result<(), AppError> {
    let ctx = connect().await?;

    let token = ctx.admin.ensure_authenticated().await?;
    let leads = ctx
        .admin
        .client()
        .read_items(
            &token,
            "leads",
            &ItemQuery::filtered(json!({ "user_id": { "_eq": ctx.owner_id } })),
        )
        .await?;

    let mut deleted = 0usize;
    for lead in &leads {
        if let Some(id) = lead.get("id").and_then(Value::as_str) {
            ctx.admin.client().delete_item(&token, "leads", id).await?;
            deleted += 1;
        }
    }

    info!(deleted, owner = %ctx.owner_id, "inbox cleaned");
    Ok(())
}

/// Use the owner's existing landing page, or create a starter page and intake
/// form on their subdomain if they have none yet.
async fn ensure_page(ctx: &SeedContext) -> Result<Page, AppError> {
    let pages = ctx.store.pages();
    if let Some(page) = pages.list_for_user(&ctx.owner_id).await?.into_iter().next() {
        return Ok(page);
    }

    let form = ctx
        .store
        .forms()
        .insert(&ctx.owner_id, demo_form_draft())
        .await?;
    let mut draft = demo_page_draft(&form.id);
    draft.subdomain = ctx.owner_subdomain.clone();
    let page = pages.insert(&ctx.owner_id, draft).await?;

    info!(page_id = %page.id, subdomain = %page.subdomain, "created starter page for seeding");
    Ok(page)
}

struct SampleLead {
    name: Option<&'static str>,
    email: Option<&'static str>,
    message: &'static str,
    budget: Option<f64>,
    status: LeadStatus,
    age: Duration,
}

impl SampleLead {
    fn responses(&self) -> FormResponses {
        let mut responses = FormResponses::new();
        if let Some(name) = self.name {
            responses.insert("name".to_string(), ResponseValue::from(name));
        }
        if let Some(email) = self.email {
            responses.insert("email".to_string(), ResponseValue::from(email));
        }
        responses.insert("message".to_string(), ResponseValue::from(self.message));
        if let Some(budget) = self.budget {
            responses.insert("budget".to_string(), ResponseValue::from(budget));
        }
        responses
    }
}

/// Fifteen leads spread across statuses and ages: six new, three contacted,
/// two qualified, four closed. A few omit name or email to exercise the
/// inbox fallbacks.
fn sample_leads() -> Vec<SampleLead> {
    let lead = |name: Option<&'static str>,
                email: Option<&'static str>,
                message: &'static str,
                budget: Option<f64>,
                status: LeadStatus,
                age: Duration| SampleLead {
        name,
        email,
        message,
        budget,
        status,
        age,
    };

    vec![
        lead(
            Some("Sarah Mitchell"),
            Some("sarah.mitchell@gmail.com"),
            "My landlord is refusing to return my security deposit even though I left the unit spotless.",
            None,
            LeadStatus::New,
            Duration::minutes(12),
        ),
        lead(
            Some("James Okafor"),
            Some("j.okafor@outlook.com"),
            "Got rear-ended last week and injured my neck. Need representation urgently.",
            Some(10000.0),
            LeadStatus::New,
            Duration::minutes(45),
        ),
        lead(
            Some("Priya Raman"),
            Some("priya@ramanbakes.com"),
            "Opening a second bakery location and need a commercial lease reviewed.",
            Some(2500.0),
            LeadStatus::New,
            Duration::hours(3),
        ),
        lead(
            None,
            Some("anon4452@proton.me"),
            "Is a verbal agreement to split a business enforceable?",
            None,
            LeadStatus::New,
            Duration::hours(7),
        ),
        lead(
            Some("Miguel Santos"),
            Some("miguel.santos@yahoo.com"),
            "HOA fined me for a fence the previous owner built. Can they do that?",
            None,
            LeadStatus::New,
            Duration::days(1),
        ),
        lead(
            Some("Hannah Lee"),
            Some("hannah.lee.writes@gmail.com"),
            "A publisher is using my illustrations without a license.",
            Some(7500.0),
            LeadStatus::New,
            Duration::days(2),
        ),
        lead(
            Some("Tom Bradley"),
            Some("tbradley@bradleyhvac.com"),
            "Customer refusing to pay a $14k invoice for completed HVAC work.",
            Some(14000.0),
            LeadStatus::Contacted,
            Duration::days(3),
        ),
        lead(
            Some("Alicia Gomez"),
            Some("alicia.gomez@icloud.com"),
            "Slipped on an unmarked wet floor at a grocery store and fractured my wrist.",
            Some(20000.0),
            LeadStatus::Contacted,
            Duration::days(4),
        ),
        lead(
            Some("Derek Wong"),
            Some("derek.w@fastmail.com"),
            "Need help forming an LLC with two partners before the end of the quarter.",
            Some(3000.0),
            LeadStatus::Contacted,
            Duration::days(5),
        ),
        lead(
            Some("Rachel Kim"),
            Some("rachel.kim@kimdesignco.com"),
            "Former employer is enforcing a non-compete that seems far too broad.",
            Some(8000.0),
            LeadStatus::Qualified,
            Duration::days(6),
        ),
        lead(
            Some("Omar Haddad"),
            Some("omar.haddad@gmail.com"),
            "Insurance denied my roof claim after the hailstorm. Policy seems clear to me.",
            Some(12000.0),
            LeadStatus::Qualified,
            Duration::days(8),
        ),
        lead(
            Some("Nina Petrova"),
            Some("nina.petrova@gmail.com"),
            "Question about updating a will after remarriage.",
            None,
            LeadStatus::Closed,
            Duration::days(10),
        ),
        lead(
            Some("Carl Jensen"),
            Some("cjensen1962@aol.com"),
            "Neighbor's tree fell on my garage and his insurer is stalling. I have photos of the damage, the adjuster's emails, and two contractor estimates ready to share.",
            Some(9000.0),
            LeadStatus::Closed,
            Duration::days(12),
        ),
        lead(
            Some("Dana Whitfield"),
            None,
            "Wanted a consult about a speeding ticket, resolved it myself.",
            None,
            LeadStatus::Closed,
            Duration::days(20),
        ),
        lead(
            Some("Grace Liu"),
            Some("grace.liu@gracedesign.studio"),
            "Needed a trademark filed for my studio name.",
            Some(1500.0),
            LeadStatus::Closed,
            Duration::days(40),
        ),
    ]
}
