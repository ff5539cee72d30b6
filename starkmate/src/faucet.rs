use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FaucetError {
    #[error("faucet refused the request: {status} {reason}{}", body_suffix(.body))]
    Rejected {
        status: u16,
        reason: String,
        body: String,
    },
    #[error("faucet request failed")]
    Transport(#[from] reqwest::Error),
}

fn body_suffix(body: &str) -> String {
    if body.trim().is_empty() {
        String::new()
    } else {
        format!(": {}", body.trim())
    }
}

#[derive(Debug, Serialize)]
struct FundsRequest<'a> {
    address: &'a str,
}

/// POSTs `{"address": ...}` to `url`. Only a 200 counts as success.
pub async fn request_funds(client: &Client, url: &str, address: &str) -> Result<(), FaucetError> {
    log::info!("requesting funds for {address} from {url}");
    let response = client
        .post(url)
        .json(&FundsRequest { address })
        .send()
        .await?;

    let status = response.status();
    if status == StatusCode::OK {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(FaucetError::Rejected {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("unknown status").to_string(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use mockito::Matcher;
    use serde_json::json;

    use super::*;

    const ADDRESS: &str = "0x1234";

    #[tokio::test]
    async fn ok_response_is_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({ "address": ADDRESS })))
            .with_status(200)
            .with_body(r#"{"status":"ok"}"#)
            .create_async()
            .await;

        request_funds(&Client::new(), &server.url(), ADDRESS).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn other_success_codes_are_not_success() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(202)
            .create_async()
            .await;

        let err = request_funds(&Client::new(), &server.url(), ADDRESS).await.unwrap_err();
        assert_matches!(err, FaucetError::Rejected { status: 202, ref reason, .. } if reason == "Accepted");
    }

    #[tokio::test]
    async fn rejection_carries_status_text_and_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(429)
            .with_body("try again tomorrow")
            .create_async()
            .await;

        let err = request_funds(&Client::new(), &server.url(), ADDRESS).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "faucet refused the request: 429 Too Many Requests: try again tomorrow"
        );
    }

    #[tokio::test]
    async fn unreachable_faucet_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);

        let err = request_funds(&Client::new(), &url, ADDRESS).await.unwrap_err();
        assert_matches!(err, FaucetError::Transport(_));
    }
}
