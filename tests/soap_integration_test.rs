use anyhow::Result;
use consulta_iue::{CaseFetcher, ConsultaError, SoapCaseService};
use httpmock::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

const ACTION: &str = "urn:wsConsultaIUE#consultaIUE";

fn wsdl(endpoint: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<definitions xmlns="http://schemas.xmlsoap.org/wsdl/"
             xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/"
             targetNamespace="urn:wsConsultaIUE">
  <portType name="wsConsultaIUEPortType">
    <operation name="consultaIUE"><input message="tns:consultaIUERequest"/></operation>
  </portType>
  <binding name="wsConsultaIUEBinding" type="tns:wsConsultaIUEPortType">
    <operation name="consultaIUE">
      <soap:operation soapAction="{action}" style="rpc"/>
    </operation>
  </binding>
  <service name="wsConsultaIUE">
    <port name="wsConsultaIUEPort" binding="tns:wsConsultaIUEBinding">
      <soap:address location="{endpoint}"/>
    </port>
  </service>
</definitions>"#,
        action = ACTION,
        endpoint = endpoint
    )
}

fn reply(inner: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <SOAP-ENV:Body><ns1:consultaIUEResponse xmlns:ns1="urn:wsConsultaIUE">{}</ns1:consultaIUEResponse></SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#,
        inner
    )
}

fn fault(message: &str) -> String {
    format!(
        r#"<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/">
<SOAP-ENV:Body><SOAP-ENV:Fault><faultcode>SOAP-ENV:Server</faultcode>
<faultstring>{}</faultstring></SOAP-ENV:Fault></SOAP-ENV:Body></SOAP-ENV:Envelope>"#,
        message
    )
}

async fn connected(server: &MockServer) -> Result<Arc<SoapCaseService>> {
    let endpoint = server.url("/ws");
    server
        .mock_async(|when, then| {
            when.method(GET).path("/wsConsultaIUE.php");
            then.status(200)
                .header("Content-Type", "text/xml")
                .body(wsdl(&endpoint));
        })
        .await;

    let service = SoapCaseService::connect(
        &server.url("/wsConsultaIUE.php?wsdl"),
        Duration::from_secs(5),
    )
    .await?;
    Ok(Arc::new(service))
}

#[tokio::test]
async fn test_lookup_end_to_end() -> Result<()> {
    let server = MockServer::start_async().await;
    let service = connected(&server).await?;
    assert_eq!(service.description().endpoint, server.url("/ws"));

    let body = reply(
        r#"<return>
  <origen>Juzgado Letrado de Primera Instancia de Maldonado</origen>
  <caratula>AA c/ BB - Cobro de pesos</caratula>
  <expediente>Ver https://ws.example/exp/12345</expediente>
  <movimientos>
    <item><fecha>2024-02-01</fecha><tipo>Decreto</tipo><decreto>55/2024</decreto>
      <linkDecreto>https://ws.example/d/55.pdf</linkDecreto></item>
    <item><fecha>2024-01-10</fecha><tipo>Demanda</tipo><decreto xsi:nil="true"/></item>
  </movimientos>
</return>"#,
    );
    let call = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/ws")
                .header("SOAPAction", format!("\"{}\"", ACTION))
                .body_contains("<iue>2-12345/2024</iue>");
            then.status(200).header("Content-Type", "text/xml").body(body);
        })
        .await;

    let fetcher = CaseFetcher::new(service);
    let record = fetcher.fetch("2 - 12345 / 2024").await?;
    call.assert_async().await;

    assert_eq!(record.identifier, "2-12345/2024");
    assert_eq!(record.origin, "Juzgado Letrado de Primera Instancia de Maldonado");
    assert_eq!(record.title, "AA c/ BB - Cobro de pesos");
    assert_eq!(
        record.first_movement,
        "2024-02-01: Decreto - Decreto: 55/2024 (Con enlace)"
    );
    assert_eq!(
        record.movement_urls,
        vec![
            "2024-02-01: https://ws.example/d/55.pdf",
            "expediente: https://ws.example/exp/12345",
        ]
    );
    assert_eq!(record.movements.len(), 2);
    assert_eq!(
        record.movements[0].decree_link.as_deref(),
        Some("https://ws.example/d/55.pdf")
    );
    Ok(())
}

#[tokio::test]
async fn test_nil_return_is_not_found() -> Result<()> {
    let server = MockServer::start_async().await;
    let service = connected(&server).await?;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/ws");
            then.status(200).body(reply(r#"<return xsi:nil="true"/>"#));
        })
        .await;

    let record = CaseFetcher::new(service).fetch("2-99/2024").await?;
    assert_eq!(record.origin, "unavailable");
    assert_eq!(record.title, "no information found");
    assert_eq!(record.first_movement, "unavailable");
    assert!(record.movement_urls.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_fault_with_http_500_is_service_fault() -> Result<()> {
    let server = MockServer::start_async().await;
    let service = connected(&server).await?;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/ws");
            then.status(500).body(fault("IUE inexistente"));
        })
        .await;

    let err = assert_err!(CaseFetcher::new(service).fetch("2-1/2024").await);
    match err {
        ConsultaError::ServiceFault { message } => assert_eq!(message, "IUE inexistente"),
        other => panic!("expected a service fault, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_unreadable_reply_is_unexpected() -> Result<()> {
    let server = MockServer::start_async().await;
    let service = connected(&server).await?;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/ws");
            then.status(502).body("<html><body>Bad Gateway</body></html>");
        })
        .await;

    let err = assert_err!(CaseFetcher::new(service).fetch("2-1/2024").await);
    assert!(matches!(err, ConsultaError::Unexpected { .. }));
    assert!(err.is_core_kind());
    assert_eq!(
        err.to_string(),
        "Error processing the query. Please try again later."
    );
    Ok(())
}

#[tokio::test]
async fn test_bad_identifier_never_reaches_the_service() -> Result<()> {
    let server = MockServer::start_async().await;
    let service = connected(&server).await?;
    let call = server
        .mock_async(|when, then| {
            when.method(POST).path("/ws");
            then.status(200).body(reply(""));
        })
        .await;

    let err = assert_err!(CaseFetcher::new(service).fetch("2-12345").await);
    assert!(matches!(err, ConsultaError::Format { .. }));
    call.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn test_missing_wsdl_is_connection_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/wsConsultaIUE.php");
            then.status(404);
        })
        .await;

    let result = SoapCaseService::connect(
        &server.url("/wsConsultaIUE.php?wsdl"),
        Duration::from_secs(5),
    )
    .await;
    let err = assert_err!(result);
    assert!(matches!(err, ConsultaError::Connection { .. }));
    assert_eq!(
        err.user_friendly_message(),
        "Could not connect to the case-tracking service. Please try again later."
    );
}

#[tokio::test]
async fn test_wsdl_without_operation_is_connection_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/wsConsultaIUE.php");
            then.status(200).body("<definitions targetNamespace=\"urn:x\"/>");
        })
        .await;

    let result = SoapCaseService::connect(
        &server.url("/wsConsultaIUE.php?wsdl"),
        Duration::from_secs(5),
    )
    .await;
    assert!(matches!(assert_err!(result), ConsultaError::Connection { .. }));
}

#[tokio::test]
async fn test_connect_succeeds_against_valid_wsdl() {
    let server = MockServer::start_async().await;
    let service = assert_ok!(connected(&server).await);
    assert_eq!(service.description().soap_action, ACTION);
}
