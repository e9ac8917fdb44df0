//! Blocking HTTP transport for the amoCRM v4 REST API.
//!
//! Every call is one request against `{api_root}/{collection}`. Listing
//! responses wrap records in `_embedded.{kind}` and advertise a following
//! page with `_links.next`; write endpoints take and return lists.

use std::sync::Arc;
use std::time::Duration;

use amocrm_model::{
    CustomFieldDef, EntityId, LinkTarget, ListQuery, Page, RawData, Transport, TransportError,
    TransportResult,
};
use reqwest::Method;
use reqwest::blocking::Client;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::token::TokenProvider;

/// [`Transport`] over the amoCRM REST API.
pub struct HttpTransport {
    config: ClientConfig,
    client: Client,
    tokens: Arc<dyn TokenProvider>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("api_root", &self.config.api_root())
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    pub fn new(config: ClientConfig, tokens: Arc<dyn TokenProvider>) -> ClientResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                ClientError::Transport(TransportError::Network(format!(
                    "failed to create HTTP client: {e}"
                )))
            })?;
        Ok(Self {
            config,
            client,
            tokens,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> TransportResult<Option<Value>> {
        let url = self.config.url(path);
        let token = self.tokens.access_token().map_err(|e| {
            warn!(error = %e, "access token unavailable");
            TransportError::Unauthorized
        })?;

        let mut request = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(token)
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, %url, "request");
        let response = request
            .send()
            .map_err(|e| TransportError::Network(format!("{method} {url}: {e}")))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .map_err(|e| TransportError::Network(format!("{method} {url}: reading body: {e}")))?;
        debug!(%method, %url, status, bytes = text.len(), "response");
        interpret(status, &text)
    }
}

/// Maps a status code and body to the transport result.
///
/// 204 and empty 2xx bodies are `None`. 400 carries the server's
/// validation report.
pub fn interpret(status: u16, body: &str) -> TransportResult<Option<Value>> {
    match status {
        204 => Ok(None),
        401 => Err(TransportError::Unauthorized),
        402 => Err(TransportError::PaymentRequired),
        403 => Err(TransportError::PermissionDenied),
        400 => Err(TransportError::Validation(
            serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())),
        )),
        200..=299 if body.trim().is_empty() => Ok(None),
        200..=299 => serde_json::from_str(body)
            .map(Some)
            .map_err(|e| TransportError::Decode(format!("invalid JSON body: {e}"))),
        _ => Err(TransportError::Status {
            status,
            body: body.to_string(),
        }),
    }
}

/// Key under `_embedded` that holds the records of `collection`: its last
/// non-numeric segment (`contacts/12/notes` → `notes`).
pub fn embedded_key(collection: &str) -> &str {
    collection
        .rsplit('/')
        .find(|segment| !segment.is_empty() && !segment.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(collection)
}

fn embedded_items(body: &Value, key: &str) -> TransportResult<Vec<RawData>> {
    let Some(items) = body.pointer(&format!("/_embedded/{key}")) else {
        return Ok(Vec::new());
    };
    let items = items
        .as_array()
        .ok_or_else(|| TransportError::Decode(format!("_embedded.{key} is not a list")))?;
    Ok(items.iter().filter_map(|v| v.as_object().cloned()).collect())
}

fn has_next(body: &Value) -> bool {
    body.pointer("/_links/next").is_some_and(|next| !next.is_null())
}

impl Transport for HttpTransport {
    fn get(&self, collection: &str, id: EntityId, include: &[String]) -> TransportResult<Option<RawData>> {
        let mut query = Vec::new();
        if !include.is_empty() {
            query.push(("with".to_string(), include.join(",")));
        }
        match self.send(Method::GET, &format!("{collection}/{id}"), &query, None) {
            Ok(Some(Value::Object(record))) => Ok(Some(record)),
            Ok(Some(other)) => Err(TransportError::Decode(format!(
                "expected an object for {collection}/{id}, got {other}"
            ))),
            Ok(None) | Err(TransportError::Status { status: 404, .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn list(&self, collection: &str, query: &ListQuery) -> TransportResult<Page> {
        let Some(body) = self.send(Method::GET, collection, &query.as_params(), None)? else {
            return Ok(Page::default());
        };
        Ok(Page {
            items: embedded_items(&body, embedded_key(collection))?,
            has_next: has_next(&body),
        })
    }

    fn create(&self, collection: &str, data: &RawData) -> TransportResult<RawData> {
        let payload = json!([data]);
        let body = self
            .send(Method::POST, collection, &[], Some(&payload))?
            .ok_or_else(|| TransportError::Decode(format!("empty response creating in {collection}")))?;
        let created = embedded_items(&body, embedded_key(collection))?
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::Decode(format!("no record in create response for {collection}")))?;
        let mut record = data.clone();
        record.extend(created);
        Ok(record)
    }

    fn update(&self, collection: &str, id: EntityId, diff: &RawData) -> TransportResult<RawData> {
        let payload = Value::Object(diff.clone());
        match self.send(Method::PATCH, &format!("{collection}/{id}"), &[], Some(&payload))? {
            Some(Value::Object(mut record)) => {
                for (key, value) in diff {
                    record.entry(key.clone()).or_insert_with(|| value.clone());
                }
                Ok(record)
            }
            _ => Ok(diff.clone()),
        }
    }

    fn delete(&self, collection: &str, id: EntityId) -> TransportResult<()> {
        self.send(Method::DELETE, &format!("{collection}/{id}"), &[], None)?;
        Ok(())
    }

    fn custom_fields(&self, collection: &str) -> TransportResult<Vec<CustomFieldDef>> {
        let path = format!("{collection}/custom_fields");
        let mut fields = Vec::new();
        let mut page = 1u32;
        loop {
            let query = [
                ("page".to_string(), page.to_string()),
                ("limit".to_string(), self.config.page_limit.to_string()),
            ];
            let Some(body) = self.send(Method::GET, &path, &query, None)? else {
                break;
            };
            for item in embedded_items(&body, "custom_fields")? {
                let def: CustomFieldDef = serde_json::from_value(Value::Object(item))
                    .map_err(|e| TransportError::Decode(format!("custom field of {collection}: {e}")))?;
                fields.push(def);
            }
            if !has_next(&body) {
                break;
            }
            page += 1;
        }
        debug!(collection, count = fields.len(), "custom fields fetched");
        Ok(fields)
    }

    fn link(&self, collection: &str, id: EntityId, target: &LinkTarget) -> TransportResult<()> {
        let payload = json!([target]);
        self.send(Method::POST, &format!("{collection}/{id}/link"), &[], Some(&payload))?;
        Ok(())
    }

    fn unlink(&self, collection: &str, id: EntityId, target: &LinkTarget) -> TransportResult<()> {
        let payload = json!([target]);
        self.send(Method::POST, &format!("{collection}/{id}/unlink"), &[], Some(&payload))?;
        Ok(())
    }
}
