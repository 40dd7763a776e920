//! SOAP 1.1 client for the `consultaIUE` operation of the judicial case
//! tracking service.

use crate::adapters::xml::XmlElement;
use crate::domain::ports::{CaseService, ConfigProvider};
use crate::domain::raw::{RawMovement, RawMovements, RawResponse};
use crate::utils::error::{ConsultaError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

pub const DEFAULT_WSDL: &str =
    "http://www.expedientes.poderjudicial.gub.uy/wsConsultaIUE.php?wsdl";
pub const OPERATION: &str = "consultaIUE";

const CONNECT_FAILURE: &str =
    "Could not connect to the case-tracking service. Please try again later.";

/// What the client needs from the WSDL to call the operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDescription {
    pub endpoint: String,
    pub namespace: String,
    pub soap_action: String,
}

impl ServiceDescription {
    pub fn from_wsdl(wsdl_url: &str, wsdl: &str) -> Result<Self> {
        let root = XmlElement::parse(wsdl)?;
        let elements = root.descendants();

        let operations: Vec<&XmlElement> = elements
            .iter()
            .copied()
            .filter(|e| e.name == "operation" && e.attribute("name") == Some(OPERATION))
            .collect();
        if operations.is_empty() {
            return Err(ConsultaError::ConfigError {
                message: format!("service description has no {} operation", OPERATION),
            });
        }

        let namespace = root.attribute("targetNamespace").unwrap_or_default().to_string();

        let endpoint = match elements
            .iter()
            .filter(|e| e.name == "address")
            .find_map(|e| e.attribute("location"))
        {
            Some(location) => location.to_string(),
            None => {
                let mut url = Url::parse(wsdl_url).map_err(|e| ConsultaError::ConfigError {
                    message: format!("invalid WSDL URL '{}': {}", wsdl_url, e),
                })?;
                url.set_query(None);
                url.to_string()
            }
        };

        // The binding's <wsdl:operation> wraps a <soap:operation soapAction=...>.
        let soap_action = operations
            .iter()
            .flat_map(|op| op.children.iter())
            .filter(|c| c.name == "operation")
            .find_map(|c| c.attribute("soapAction"))
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}#{}", namespace, OPERATION));

        Ok(Self {
            endpoint,
            namespace,
            soap_action,
        })
    }
}

/// Concrete [`CaseService`] over HTTP. `reqwest::Client` is shared safely
/// between concurrent lookups.
#[derive(Debug, Clone)]
pub struct SoapCaseService {
    client: Client,
    description: ServiceDescription,
}

impl SoapCaseService {
    /// Downloads and reads the WSDL. Any failure here is a connection error.
    pub async fn connect(wsdl_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            tracing::error!("Error building the HTTP client: {}", e);
            ConsultaError::connection(CONNECT_FAILURE)
        })?;

        tracing::debug!("Downloading service description from {}", wsdl_url);
        let wsdl = download(&client, wsdl_url).await.map_err(|e| {
            tracing::error!("Error initializing the SOAP client: {}", e);
            ConsultaError::connection(CONNECT_FAILURE)
        })?;

        let description = ServiceDescription::from_wsdl(wsdl_url, &wsdl).map_err(|e| {
            tracing::error!("Unusable service description at {}: {}", wsdl_url, e);
            ConsultaError::connection(CONNECT_FAILURE)
        })?;

        tracing::debug!(
            "SOAP client initialized with WSDL {} (endpoint {}, action {})",
            wsdl_url,
            description.endpoint,
            description.soap_action
        );
        Ok(Self {
            client,
            description,
        })
    }

    pub async fn from_config(config: &impl ConfigProvider) -> Result<Self> {
        Self::connect(
            config.wsdl_url(),
            Duration::from_secs(config.timeout_seconds()),
        )
        .await
    }

    pub fn description(&self) -> &ServiceDescription {
        &self.description
    }

    fn envelope(&self, iue: &str) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" "#,
                r#"xmlns:tns="{ns}">"#,
                r#"<soapenv:Body><tns:{op}><iue>{iue}</iue></tns:{op}></soapenv:Body>"#,
                r#"</soapenv:Envelope>"#
            ),
            ns = quick_xml::escape::escape(self.description.namespace.as_str()),
            op = OPERATION,
            iue = quick_xml::escape::escape(iue),
        )
    }
}

async fn download(client: &Client, url: &str) -> reqwest::Result<String> {
    client.get(url).send().await?.error_for_status()?.text().await
}

#[async_trait]
impl CaseService for SoapCaseService {
    async fn consulta_iue(&self, iue: &str) -> Result<Option<RawResponse>> {
        let envelope = self.envelope(iue);
        tracing::debug!("SOAP request to {}: {}", self.description.endpoint, envelope);

        let response = self
            .client
            .post(&self.description.endpoint)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", format!("\"{}\"", self.description.soap_action))
            .body(envelope)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("SOAP response ({}): {}", status, body);

        // Faults usually arrive with HTTP 500, so decode before checking the status.
        match decode_reply(&body) {
            Err(ConsultaError::ServiceFault { message }) => {
                Err(ConsultaError::ServiceFault { message })
            }
            _ if !status.is_success() => Err(ConsultaError::Unexpected {
                detail: format!("HTTP {} from {}", status, self.description.endpoint),
            }),
            other => other,
        }
    }
}

/// Reads a SOAP reply. A Fault becomes [`ConsultaError::ServiceFault`]; a
/// missing or nil return value means nothing was found.
pub fn decode_reply(body: &str) -> Result<Option<RawResponse>> {
    let root = XmlElement::parse(body)?;
    let soap_body = root.find("Body").ok_or_else(|| ConsultaError::Unexpected {
        detail: "SOAP reply has no Body".to_string(),
    })?;

    if let Some(fault) = soap_body.child("Fault") {
        let message = fault
            .find("faultstring")
            .map(|f| f.text.trim())
            .filter(|s| !s.is_empty())
            .unwrap_or("unknown SOAP fault")
            .to_string();
        return Err(ConsultaError::ServiceFault { message });
    }

    let Some(value) = soap_body
        .children
        .first()
        .and_then(|operation| operation.children.first())
    else {
        return Ok(None);
    };
    if value.is_nil() || (value.is_leaf() && value.text.trim().is_empty()) {
        return Ok(None);
    }

    Ok(Some(raw_response(value)))
}

fn raw_response(value: &XmlElement) -> RawResponse {
    let mut response = RawResponse::default();
    if value.is_leaf() {
        response.extra.insert(value.name.clone(), value.text.clone());
        return response;
    }

    for child in &value.children {
        match child.name.as_str() {
            "movimientos" => response.movements = raw_movements(child),
            _ if child.is_nil() => {}
            "origen" if child.is_leaf() => response.origin = Some(child.text.clone()),
            "caratula" if child.is_leaf() => response.title = Some(child.text.clone()),
            name if child.is_leaf() => {
                response.extra.insert(name.to_string(), child.text.clone());
            }
            name => tracing::debug!("Ignoring nested element <{}> in reply", name),
        }
    }
    response
}

fn raw_movements(element: &XmlElement) -> Option<RawMovements> {
    if element.is_nil() {
        return None;
    }
    if element.is_leaf() {
        let text = element.text.trim();
        return (!text.is_empty()).then(|| RawMovements::Malformed(text.to_string()));
    }

    // A list holds only entries; a leaf field directly under `movimientos`
    // means the entry itself was sent unwrapped.
    let is_list = element
        .children
        .iter()
        .all(|c| c.name == "item" || !c.is_leaf());
    if is_list {
        let entries = element
            .children
            .iter()
            .filter(|c| !c.is_leaf())
            .map(raw_movement)
            .collect();
        Some(RawMovements::Many(entries))
    } else {
        Some(RawMovements::Single(raw_movement(element)))
    }
}

fn raw_movement(element: &XmlElement) -> RawMovement {
    let mut movement = RawMovement::default();
    for child in element.children.iter().filter(|c| !c.is_nil()) {
        if !child.is_leaf() {
            flatten_into(&mut movement.extra, child);
            continue;
        }
        let text = Some(child.text.clone());
        match child.name.as_str() {
            "fecha" => movement.date = text,
            "tipo" => movement.kind = text,
            "decreto" => movement.decree = text,
            "vencimiento" => movement.expiry = text,
            "sede" => movement.venue = text,
            name => {
                movement.extra.insert(name.to_string(), child.text.clone());
            }
        }
    }
    movement
}

/// Nested fields of an entry land in `extra` under their own leaf names.
/// The first occurrence of a name wins.
fn flatten_into(extra: &mut BTreeMap<String, String>, element: &XmlElement) {
    for leaf in element
        .descendants()
        .into_iter()
        .filter(|e| e.is_leaf() && !e.is_nil() && !e.text.trim().is_empty())
    {
        extra
            .entry(leaf.name.clone())
            .or_insert_with(|| leaf.text.clone());
    }
}
