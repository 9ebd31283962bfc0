//! Request/response backend over `reqwest`.

use super::{BackendFailure, Body, Method, Request};
use crud_actions_core::{FormData, FormField};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

/// HTTP backend. Any 2xx status is a success; everything else, including
/// connection failures, is a failure.
#[derive(Clone, Debug, Default)]
pub struct HttpBackend {
    client: Client,
}

impl HttpBackend {
    /// Backend with a default client
    #[must_use]
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Backend over a preconfigured client (timeouts, proxies, TLS)
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub(crate) async fn send(&self, request: Request) -> Result<Value, BackendFailure> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in request.headers.iter().flatten() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            Some(Body::Json(data)) => builder.json(&data),
            Some(Body::Form(form)) => builder.multipart(to_multipart(form)?),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| BackendFailure::unanswered(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| BackendFailure::unanswered(e.to_string()))?;
        let body = parse_body(&bytes);

        if status.is_success() {
            Ok(body)
        } else {
            Err(BackendFailure {
                status: Some(status.as_u16()),
                payload: body,
            })
        }
    }
}

/// JSON when possible, text otherwise, `null` for an empty body.
fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn to_multipart(form: FormData) -> Result<Form, BackendFailure> {
    form.fields()
        .iter()
        .cloned()
        .try_fold(Form::new(), |multipart, (name, field)| match field {
            FormField::Text(text) => Ok(multipart.text(name, text)),
            FormField::File {
                file_name,
                mime,
                bytes,
            } => {
                let part = Part::bytes(bytes).file_name(file_name);
                let part = match mime {
                    Some(mime) => part
                        .mime_str(&mime)
                        .map_err(|e| BackendFailure::unanswered(e.to_string()))?,
                    None => part,
                };
                Ok(multipart.part(name, part))
            }
        })
}
