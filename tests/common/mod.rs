use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use http_body_util::BodyExt;
use nifty_chain_backend::{
    build_router, error::ChainError, services::nse::OptionChainSource, AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Source that replays a fixed payload, or fails like an unreachable NSE
pub struct StubSource {
    payload: Option<Value>,
}

impl StubSource {
    pub fn returning(payload: Value) -> Self {
        Self {
            payload: Some(payload),
        }
    }

    pub fn failing() -> Self {
        Self { payload: None }
    }
}

#[async_trait]
impl OptionChainSource for StubSource {
    fn symbol(&self) -> &str {
        "NIFTY"
    }

    async fn fetch_option_chain(&self) -> Result<Value, ChainError> {
        self.payload
            .clone()
            .ok_or_else(|| ChainError::FetchFailure("NSE API returned 401 Unauthorized".to_string()))
    }
}

pub fn test_router(source: StubSource) -> Router {
    build_router(AppState::new(source))
}

/// Issue a GET and return (status, body text)
pub async fn get(app: Router, uri: &str) -> (axum::http::StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// 20 strikes from 19200 to 20150; the third PE record carries underlyingValue 19732.
///
/// Within the 19400..=20100 band:
/// - CE change in OI is 100 per strike, PE change in OI is 50 per strike
/// - CE OI peaks at 20100 (1180); PE OI ties at 2000 on 19500 and 19650
///
/// Outside the band the values are large so any leak into the summary shows up.
pub fn sample_payload() -> Value {
    let data: Vec<Value> = (0..20)
        .map(|k| {
            let strike = 19200 + 50 * k;
            let in_band = (4..=18).contains(&k);

            let ce_oi = if k == 2 { 99_999 } else { 1000 + 10 * k };
            let pe_oi = match k {
                6 | 9 => 2000,
                19 => 50_000,
                _ => 500,
            };
            let ce_coi = if in_band { 100 } else { 100_000 };
            let pe_coi = if in_band { 50 } else { -100_000 };

            let mut pe = json!({
                "strikePrice": strike,
                "openInterest": pe_oi,
                "changeinOpenInterest": pe_coi,
                "totalTradedVolume": 2000 + k,
                "impliedVolatility": 11.5,
                "lastPrice": 25.5,
                "pChange": -4.0
            });
            if k == 2 {
                pe["underlyingValue"] = json!(19732);
            }

            json!({
                "strikePrice": strike,
                "expiryDate": "26-Oct-2023",
                "CE": {
                    "strikePrice": strike,
                    "openInterest": ce_oi,
                    "changeinOpenInterest": ce_coi,
                    "totalTradedVolume": 1000 + k,
                    "impliedVolatility": 10.25,
                    "lastPrice": 120.0,
                    "pChange": 3.5
                },
                "PE": pe
            })
        })
        .collect();

    json!({
        "records": { "timestamp": "20-Oct-2023 15:30:00", "underlyingValue": 19732 },
        "filtered": { "data": data }
    })
}
