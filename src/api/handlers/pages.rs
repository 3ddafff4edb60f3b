//! HTML pages and static assets from the public directory.

use axum::{middleware, routing::get_service, Router};
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

use super::auth::require_session;

/// Pages anyone may load.
const PUBLIC_PAGES: &[(&str, &str)] = &[("/", "login.html"), ("/reg", "register.html")];

/// Pages behind the session gate.
const PROTECTED_PAGES: &[(&str, &str)] = &[
    ("/game", "index.html"),
    ("/leaderboard", "leaderboard.html"),
    ("/about", "about.html"),
    ("/feedback", "feedback.html"),
    ("/allfeedbacks", "allfeedbacks.html"),
    ("/scoreboard", "scoreboard.html"),
];

fn page_routes(public_dir: &Path, pages: &[(&str, &str)]) -> Router {
    pages.iter().fold(Router::new(), |router, (path, file)| {
        router.route(path, get_service(ServeFile::new(public_dir.join(file))))
    })
}

/// Page routes plus the static fallback.
///
/// Protected pages need `Extension<Arc<AuthState>>` from an outer layer.
pub fn router(public_dir: &Path) -> Router {
    let protected = page_routes(public_dir, PROTECTED_PAGES)
        .route_layer(middleware::from_fn(require_session));

    page_routes(public_dir, PUBLIC_PAGES)
        .merge(protected)
        .fallback_service(ServeDir::new(public_dir))
}
