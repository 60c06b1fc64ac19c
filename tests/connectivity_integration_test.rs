use httpmock::prelude::*;
use rma_query::config::toml_config::EndpointsConfig;
use rma_query::{
    ClientConfig, GridSearchParams, HttpTransport, MouseConnectivityApi, ResponseFormat,
    ResponseParser, RmaClient, RmaError, Value, VolumetricDownload,
};
use tempfile::TempDir;

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig {
        endpoints: EndpointsConfig {
            rma: server.url("/api/v2/data"),
            informatics_archive: server.url("/informatics-archive"),
        },
        ..Default::default()
    }
}

fn api_for(server: &MockServer, format: ResponseFormat) -> MouseConnectivityApi {
    let config = config_for(server);
    let client = RmaClient::new(config.build_transport(), ResponseParser, format);
    MouseConnectivityApi::new(client, &config)
}

#[tokio::test]
async fn test_get_experiments_returns_msg_payload() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v2/data/query.json").query_param(
                "q",
                "model::SectionDataSet,rma::criteria,products[id$eq5],rma::include,specimen(stereotaxic_injections(primary_injection_structure,structures[id$eq385]))",
            );
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "success": true,
                    "id": 0,
                    "start_row": 0,
                    "num_rows": 2,
                    "total_rows": 2,
                    "msg": [
                        {"id": 126862385, "name": "Emx1-IRES-Cre-156-MOp"},
                        {"id": 100141219, "name": "C57BL/6J-100141219"}
                    ]
                }));
        })
        .await;

    let api = api_for(&server, ResponseFormat::Json);
    let payload = api.get_experiments(Some(385)).await.unwrap();

    api_mock.assert_async().await;
    let rows = payload.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], serde_json::json!(126862385));
}

#[tokio::test]
async fn test_signal_statistics_excluding_injection_site() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v2/data/query.json").query_param(
                "q",
                "model::ProjectionStructureUnionize,rma::criteria,[section_data_set_id$eq126862385][is_injection$eqfalse],rma::include,structure,rma::options,[num_rows$eq5000]",
            );
            then.status(200).json_body(serde_json::json!({
                "success": true,
                "msg": [{"structure_id": 385, "is_injection": false, "projection_density": 0.12}]
            }));
        })
        .await;

    let api = api_for(&server, ResponseFormat::Json);
    let payload = api
        .get_structure_projection_signal_statistics(126862385, Some(false))
        .await
        .unwrap();

    api_mock.assert_async().await;
    assert_eq!(payload[0]["is_injection"], serde_json::json!(false));
}

#[tokio::test]
async fn test_grid_search_hits_service_stage() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v2/data/query.json")
                .query_param(
                    "q",
                    "service::mouse_connectivity_injection_structure[injection_structures$eqIsocortex,MOp][primary_structure_only$eqtrue][num_rows$eq50]",
                );
            then.status(200)
                .json_body(serde_json::json!({"success": true, "msg": []}));
        })
        .await;

    let params = GridSearchParams {
        injection_structures: Some(Value::from(vec![
            Value::ident("Isocortex"),
            Value::ident("MOp"),
        ])),
        primary_structure_only: Some(true),
        num_rows: Some(50),
        ..Default::default()
    };

    let api = api_for(&server, ResponseFormat::Json);
    let payload = api.get_projection_grid_search(&params).await.unwrap();

    api_mock.assert_async().await;
    assert_eq!(payload, serde_json::json!([]));
}

#[tokio::test]
async fn test_xml_response_is_unwrapped() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v2/data/query.xml");
            then.status(200)
                .header("Content-Type", "application/xml")
                .body(
                    r#"<?xml version="1.0" encoding="UTF-8"?>
<Response success="true" start_row="0" num_rows="1" total_rows="1">
  <section-data-sets>
    <section-data-set>
      <id type="integer">126862385</id>
      <section-thickness type="float">100.0</section-thickness>
    </section-data-set>
  </section-data-sets>
</Response>"#,
                );
        })
        .await;

    let api = api_for(&server, ResponseFormat::Xml);
    let payload = api.get_experiment_detail(126862385).await.unwrap();

    api_mock.assert_async().await;
    assert_eq!(
        payload,
        serde_json::json!([{"id": 126862385, "section-thickness": 100.0}])
    );
}

#[tokio::test]
async fn test_http_error_status_is_not_swallowed() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v2/data/query.json");
            then.status(500).body("Internal Server Error");
        })
        .await;

    let api = api_for(&server, ResponseFormat::Json);
    let err = api.get_projection_image_meta_info(126862385, 74).await.unwrap_err();

    api_mock.assert_async().await;
    assert!(matches!(err, RmaError::HttpStatus { status: 500, .. }));
}

#[tokio::test]
async fn test_missing_envelope_field() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v2/data/query.json");
            then.status(200).json_body(serde_json::json!({"success": false}));
        })
        .await;

    let api = api_for(&server, ResponseFormat::Json);
    let err = api.get_experiments(None).await.unwrap_err();

    assert!(matches!(err, RmaError::MissingEnvelopeField { ref field } if field == "msg"));
}

#[tokio::test]
async fn test_download_volumetric_data_writes_file() {
    let server = MockServer::start_async().await;
    let volume = vec![0x4e, 0x52, 0x52, 0x44, 0x30, 0x30, 0x30, 0x34];
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path(
                "/informatics-archive/current-release/mouse_ccf/average_template/average_template_25.nrrd",
            );
            then.status(200).body(volume.clone());
        })
        .await;

    let dir = TempDir::new().unwrap();
    let target = dir.path().join("volumes").join("avg_25.nrrd");
    let download = VolumetricDownload {
        save_file_path: Some(target.clone()),
        ..VolumetricDownload::new("average_template", "average_template_25.nrrd")
    };

    let api = api_for(&server, ResponseFormat::Json);
    let saved = api.download_volumetric_data(&download).await.unwrap();

    api_mock.assert_async().await;
    assert_eq!(saved, target);
    assert_eq!(std::fs::read(&target).unwrap(), volume);
}

#[tokio::test]
async fn test_unreachable_host_is_a_transport_error() {
    let client = RmaClient::new(HttpTransport::new(), ResponseParser, ResponseFormat::Json);
    let err = client
        .query("http://127.0.0.1:1/api/v2/data/query.json?q=model::Structure")
        .await
        .unwrap_err();

    assert!(matches!(err, RmaError::Transport(_)));
}
