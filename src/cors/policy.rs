use crate::config::{CorsConfig, HeaderList, OriginPolicy};
use crate::cors::header;
use crate::http::HeaderBag;

/// CORS policy evaluated against each request's headers.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    static_headers: HeaderBag,
    origin: Option<OriginPolicy>,
    reflect_request_headers: bool,
}

impl CorsPolicy {
    pub fn new(config: &CorsConfig) -> Self {
        let mut static_headers = HeaderBag::new();

        let lists = [
            (header::ACCESS_CONTROL_ALLOW_METHODS, &config.methods),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, &config.allowed_headers),
            (header::ACCESS_CONTROL_EXPOSE_HEADERS, &config.exposed_headers),
        ];
        for (name, list) in lists {
            if let Some(value) = list.as_ref().and_then(HeaderList::joined) {
                static_headers.set(name, value);
            }
        }

        if config.credentials {
            static_headers.set(header::ACCESS_CONTROL_ALLOW_CREDENTIALS, "true");
        }
        if let Some(max_age) = config.max_age {
            static_headers.set(header::ACCESS_CONTROL_MAX_AGE, max_age.to_string());
        }

        let allowed_headers_configured = config
            .allowed_headers
            .as_ref()
            .and_then(HeaderList::joined)
            .is_some();

        Self {
            static_headers,
            origin: config.origin.clone().filter(is_enabled),
            reflect_request_headers: !allowed_headers_configured,
        }
    }

    /// Headers emitted regardless of the request.
    pub fn static_headers(&self) -> &HeaderBag {
        &self.static_headers
    }

    /// Compute the CORS headers for one request.
    pub fn headers_for(&self, request_headers: &HeaderBag) -> HeaderBag {
        let mut headers = self.static_headers.clone();

        let Some(policy) = &self.origin else {
            return headers;
        };

        let request_origin = request_headers
            .get(header::ORIGIN)
            .filter(|origin| !origin.is_empty());

        match (policy, request_origin) {
            (OriginPolicy::Exact(origin), _) => {
                headers.set(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.as_str());
            }
            (OriginPolicy::Reflect(_), Some(origin)) => {
                headers.set(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
                headers.set(header::VARY, header::ORIGIN);
            }
            (OriginPolicy::List(allowed), Some(origin)) => {
                if allowed.iter().any(|candidate| candidate == origin) {
                    headers.set(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
                }
                headers.set(header::VARY, header::ORIGIN);
            }
            _ => {}
        }

        if self.reflect_request_headers {
            if let Some(requested) = request_headers
                .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
                .filter(|value| !value.is_empty())
            {
                headers.set(header::ACCESS_CONTROL_ALLOW_HEADERS, requested);
            }
        }

        headers
    }
}

// `false` and "" disable the per-request origin handling entirely.
fn is_enabled(policy: &OriginPolicy) -> bool {
    match policy {
        OriginPolicy::Reflect(enabled) => *enabled,
        OriginPolicy::Exact(origin) => !origin.is_empty(),
        OriginPolicy::List(_) => true,
    }
}
