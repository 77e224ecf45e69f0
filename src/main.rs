mod config;
mod deploy;
mod erc20;
mod form;
mod normalize;
mod services;
mod token;
mod wallet;

use actix_multipart::Multipart;
use actix_web::{
    post, web, App, HttpResponse, HttpServer, Responder,
};
use alloy::primitives::Address;
use futures_util::StreamExt;
use log::{error, info};
use serde::Deserialize;
use serde_json::json;

use crate::{
    config::AppConfig,
    services::{
        error::ServiceError,
        investigation::{self, DataType, VALID_DATA_TYPES},
        market, metadata,
        pinning::{self, MAX_UPLOAD_BYTES},
    },
};

const DEFAULT_CHAIN_ID: u64 = 1;

struct AppState {
    config: AppConfig,
    http: reqwest::Client,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = AppConfig::from_env();

    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("Failed to build HTTP client");

    let state = web::Data::new(AppState { config, http });

    let port = 8080;
    let host = "localhost";
    let workers = 2;

    info!("Starting server on port {}", port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(hello_world)
            .service(token_investigation)
            .service(generate_metadata)
            .service(market_data)
            .service(upload_to_pinata)
    })
    .bind((host, port))?
    .workers(workers)
    .run()
    .await
}

#[actix_web::get("/")]
async fn hello_world() -> impl Responder {
    HttpResponse::Ok().body("Hello, TokenLaunchAPI!")
}

#[derive(Debug, Deserialize)]
struct InvestigationRequest {
    address: Option<String>,
    #[serde(rename = "dataType")]
    data_type: Option<String>,
    #[serde(rename = "chainId")]
    chain_id: Option<u64>,
}

#[post("/api/token-investigation")]
async fn token_investigation(
    state: web::Data<AppState>,
    body: web::Json<InvestigationRequest>,
) -> impl Responder {
    let Some(address) = body.address.as_deref() else {
        return HttpResponse::BadRequest().json(json!({ "error": "address is required" }));
    };
    let Some(data_type) = body.data_type.as_deref() else {
        return HttpResponse::BadRequest().json(json!({ "error": "dataType is required" }));
    };

    let Some(data_type) = DataType::parse(data_type) else {
        error!("Unknown dataType: {}", data_type);
        return HttpResponse::BadRequest().json(json!({
            "error": format!(
                "Unknown dataType, expected one of: {}",
                VALID_DATA_TYPES.join(", ")
            )
        }));
    };

    let Ok(checked_address) = address.parse::<Address>() else {
        error!("Invalid EVM address: {}", address);
        return HttpResponse::BadRequest().json(json!({ "error": "Invalid EVM address" }));
    };

    let chain_id = body.chain_id.unwrap_or(DEFAULT_CHAIN_ID);

    match investigation::investigate(&state.config, &state.http, data_type, checked_address, chain_id)
        .await
    {
        Ok(wrapped) => HttpResponse::Ok().json(wrapped),
        Err(e) => e.to_response(),
    }
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    #[serde(rename = "systemPrompt")]
    system_prompt: Option<String>,
    #[serde(rename = "userPrompt")]
    user_prompt: Option<String>,
}

#[post("/api/generate-metadata")]
async fn generate_metadata(
    state: web::Data<AppState>,
    body: web::Json<GenerateRequest>,
) -> impl Responder {
    let Some(system_prompt) = body.system_prompt.as_deref() else {
        return HttpResponse::BadRequest().json(json!({ "error": "systemPrompt is required" }));
    };
    let Some(user_prompt) = body.user_prompt.as_deref() else {
        return HttpResponse::BadRequest().json(json!({ "error": "userPrompt is required" }));
    };

    let result = metadata::generate_metadata(
        &state.http,
        &state.config.groq_base_url,
        state.config.groq_api_key.as_deref(),
        system_prompt,
        user_prompt,
    )
    .await;

    match result {
        Ok(normalized) => {
            let mut payload = serde_json::to_value(&normalized.config)
                .expect("Failed to serialize token config");
            payload["fallback"] = json!(normalized.fallback);
            HttpResponse::Ok().json(payload)
        }
        Err(e) => e.to_response(),
    }
}

#[derive(Debug, Deserialize)]
struct MarketDataRequest {
    address: Option<String>,
    #[serde(rename = "chainId")]
    chain_id: Option<u64>,
}

#[post("/api/market-data")]
async fn market_data(
    state: web::Data<AppState>,
    body: web::Json<MarketDataRequest>,
) -> impl Responder {
    let Some(address) = body.address.as_deref() else {
        return HttpResponse::BadRequest().json(json!({ "error": "address is required" }));
    };

    let Ok(checked_address) = address.parse::<Address>() else {
        error!("Invalid EVM address: {}", address);
        return HttpResponse::BadRequest().json(json!({ "error": "Invalid EVM address" }));
    };

    let chain_id = body.chain_id.unwrap_or(DEFAULT_CHAIN_ID);

    match market::fetch_token_data(&state.http, &state.config.gecko_base_url, chain_id, checked_address)
        .await
    {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(e) => e.to_response(),
    }
}

#[post("/api/upload-to-pinata")]
async fn upload_to_pinata(state: web::Data<AppState>, mut payload: Multipart) -> impl Responder {
    while let Some(item) = payload.next().await {
        let mut field = match item {
            Ok(field) => field,
            Err(e) => {
                error!("Malformed multipart payload: {}", e);
                return HttpResponse::BadRequest()
                    .json(json!({ "error": "Malformed multipart payload" }));
            }
        };

        if field.name() != Some("file") {
            // Fields must be drained before the next one can be polled.
            while let Some(chunk) = field.next().await {
                if chunk.is_err() {
                    break;
                }
            }
            continue;
        }

        let content_type = field
            .content_type()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or("upload")
            .to_string();

        // Buffer the whole part, rejecting as soon as it grows past the cap
        // so nothing oversized ever reaches the pinning service.
        let mut data: Vec<u8> = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    error!("Failed reading upload: {}", e);
                    return HttpResponse::BadRequest()
                        .json(json!({ "error": "Failed reading upload" }));
                }
            };
            if data.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return ServiceError::BadRequest(format!(
                    "File too large (limit {} bytes)",
                    MAX_UPLOAD_BYTES
                ))
                .to_response();
            }
            data.extend_from_slice(&chunk);
        }

        let result = pinning::pin_file(
            &state.http,
            &state.config.pinata_base_url,
            state.config.pinata_jwt.as_deref(),
            file_name,
            content_type,
            data,
        )
        .await;

        return match result {
            Ok(pinned) => HttpResponse::Ok().json(pinned),
            Err(e) => e.to_response(),
        };
    }

    HttpResponse::BadRequest().json(json!({ "error": "No file field in upload" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    fn test_state() -> web::Data<AppState> {
        web::Data::new(AppState {
            config: AppConfig {
                groq_api_key: None,
                groq_base_url: String::new(),
                pinata_jwt: None,
                pinata_base_url: String::new(),
                goplus_base_url: String::new(),
                gecko_base_url: String::new(),
                investigator_interpreter: "false".to_string(),
                investigator_script: "unused".to_string(),
            },
            http: reqwest::Client::new(),
        })
    }

    #[actix_web::test]
    async fn investigation_requires_address() {
        let app = test::init_service(
            App::new().app_data(test_state()).service(token_investigation),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/token-investigation")
            .set_json(json!({ "dataType": "rug_analysis" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn investigation_rejects_unknown_data_type_listing_valid_set() {
        let app = test::init_service(
            App::new().app_data(test_state()).service(token_investigation),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/token-investigation")
            .set_json(json!({
                "address": "0x0000000000000000000000000000000000000001",
                "dataType": "moon_phase"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let body: serde_json::Value = test::read_body_json(resp).await;
        let message = body["error"].as_str().unwrap();
        for name in VALID_DATA_TYPES {
            assert!(message.contains(name), "missing {} in {}", name, message);
        }
    }

    #[actix_web::test]
    async fn investigation_rejects_invalid_address() {
        let app = test::init_service(
            App::new().app_data(test_state()).service(token_investigation),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/token-investigation")
            .set_json(json!({ "address": "not-an-address", "dataType": "token_stats" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn generate_requires_both_prompts() {
        let app = test::init_service(
            App::new().app_data(test_state()).service(generate_metadata),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/generate-metadata")
            .set_json(json!({ "systemPrompt": "You name tokens." }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn market_data_rejects_unsupported_chain() {
        let app = test::init_service(App::new().app_data(test_state()).service(market_data)).await;

        let req = test::TestRequest::post()
            .uri("/api/market-data")
            .set_json(json!({
                "address": "0x0000000000000000000000000000000000000001",
                "chainId": 424242
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn upload_without_file_field_is_rejected() {
        let app = test::init_service(
            App::new().app_data(test_state()).service(upload_to_pinata),
        )
        .await;

        let boundary = "----boundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"notes\"\r\n\r\nhello\r\n--{b}--\r\n",
            b = boundary
        );
        let req = test::TestRequest::post()
            .uri("/api/upload-to-pinata")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            ))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn oversized_upload_is_rejected_before_pinning() {
        let app = test::init_service(
            App::new().app_data(test_state()).service(upload_to_pinata),
        )
        .await;

        let boundary = "----boundary";
        let mut body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"big.png\"\r\nContent-Type: image/png\r\n\r\n",
            b = boundary
        );
        body.push_str(&"a".repeat(MAX_UPLOAD_BYTES + 1));
        body.push_str(&format!("\r\n--{}--\r\n", boundary));

        let req = test::TestRequest::post()
            .uri("/api/upload-to-pinata")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            ))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn non_image_upload_is_rejected() {
        let app = test::init_service(
            App::new().app_data(test_state()).service(upload_to_pinata),
        )
        .await;

        let boundary = "----boundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"doc.pdf\"\r\nContent-Type: application/pdf\r\n\r\n%PDF\r\n--{b}--\r\n",
            b = boundary
        );
        let req = test::TestRequest::post()
            .uri("/api/upload-to-pinata")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            ))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }
}
