use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use lostfound_types::models::{Caller, Viewer};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Resolve the caller once per request and stash a `Viewer` in the request
/// extensions. A missing or rejected credential yields an anonymous viewer;
/// endpoints that need a caller use the `AuthUser` extractor.
pub async fn resolve_viewer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let viewer = match req.headers().typed_get::<Authorization<Bearer>>() {
        None => Viewer::anonymous(),
        Some(auth) => match state.identity.resolve(auth.token()) {
            Ok(caller) => caller.into(),
            Err(e) => {
                debug!("Treating request as anonymous: {}", e);
                Viewer::anonymous()
            }
        },
    };

    req.extensions_mut().insert(viewer);
    next.run(req).await
}

/// The request's viewer, anonymous or not.
#[derive(Debug, Clone, Copy)]
pub struct CurrentViewer(pub Viewer);

impl<S: Send + Sync> FromRequestParts<S> for CurrentViewer {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Viewer>().copied().unwrap_or_default()))
    }
}

/// An authenticated caller. Rejects with 401 before the body is read.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Caller);

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Viewer>()
            .and_then(Viewer::caller)
            .map(Self)
            .ok_or_else(|| ApiError::Unauthorized("authentication required".into()))
    }
}
