use super::handlers::{auth, feedback, health, quiz, scores};
use utoipa::openapi::{Contact, InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// JSON endpoints are registered here via `.routes(routes!(...))`. Page routes
/// and static assets are merged in `api::app` and stay undocumented.
pub(crate) fn api_router() -> OpenApiRouter {
    let mut router = OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(auth::register::register))
        .routes(routes!(auth::login::login))
        .routes(routes!(auth::session::logout))
        .routes(routes!(quiz::quiz))
        .routes(routes!(scores::submit_score))
        .routes(routes!(scores::scoreboard_list))
        .routes(routes!(feedback::submit_feedback))
        .routes(routes!(feedback::get_feedback));

    let tags = [
        ("health", "Service and database status"),
        ("auth", "Registration, login and logout"),
        ("quiz", "Question passthrough"),
        ("scores", "Score submission and leaderboard"),
        ("feedback", "Player feedback"),
    ]
    .into_iter()
    .map(|(name, description)| {
        let mut tag = Tag::new(name);
        tag.description = Some(description.to_string());
        tag
    })
    .collect();

    router.get_openapi_mut().tags = Some(tags);

    router
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    // Title, version and contact come from Cargo.toml.
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = cargo_contact();
    info.license = optional_str(env!("CARGO_PKG_LICENSE")).map(|identifier| {
        let mut license = License::new(identifier);
        license.identifier = Some(identifier.to_string());
        license
    });

    OpenApiBuilder::new().info(info).build()
}

fn cargo_contact() -> Option<Contact> {
    let primary = env!("CARGO_PKG_AUTHORS").split(':').next().map(str::trim)?;
    let (name, email) = match primary.split_once('<') {
        Some((name, email)) => (name.trim(), email.trim_end_matches('>').trim()),
        None => (primary, ""),
    };
    if name.is_empty() && email.is_empty() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = (!name.is_empty()).then(|| name.to_string());
    contact.email = (!email.is_empty()).then(|| email.to_string());
    Some(contact)
}

fn optional_str(value: &'static str) -> Option<&'static str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
