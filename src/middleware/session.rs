use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "smartdoc_session";

/// Identifies the browser session a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

/// Attaches a [`SessionId`] to every request, issuing a cookie for new sessions.
pub async fn session_middleware(mut request: Request, next: Next) -> Response {
    let existing = session_from_headers(request.headers());
    let id = existing.unwrap_or_else(Uuid::new_v4);

    if existing.is_none() {
        debug!(session_id = %id, "Issuing new session cookie");
    }

    request.extensions_mut().insert(SessionId(id));
    let mut response = next.run(request).await;

    if existing.is_none() {
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}

pub fn session_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_session_cookie_among_others() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {}={}", SESSION_COOKIE, id)).unwrap(),
        );
        assert_eq!(session_from_headers(&headers), Some(id));
    }

    #[test]
    fn ignores_malformed_session_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("smartdoc_session=nope"));
        assert_eq!(session_from_headers(&headers), None);
    }
}
