use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when verifying a captcha token
#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("Captcha token missing")]
    MissingToken,

    #[error("Captcha rejected: {0:?}")]
    Rejected(Vec<String>),

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Verification service returned {0}")]
    UpstreamStatus(u16),
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(rename = "error-codes", default)]
    error_codes: Vec<String>,
}

/// Client for a Turnstile-compatible `siteverify` endpoint
pub struct CaptchaVerifier {
    client: Client,
    verify_url: String,
    secret_key: String,
    enabled: bool,
}

impl CaptchaVerifier {
    pub fn new(
        verify_url: String,
        secret_key: String,
        enabled: bool,
        timeout: Duration,
    ) -> Result<Self, CaptchaError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            verify_url,
            secret_key,
            enabled,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Verify a token submitted with a public form
    ///
    /// Always succeeds when verification is disabled.
    pub async fn verify(&self, token: Option<&str>, remote_ip: Option<&str>) -> Result<(), CaptchaError> {
        if !self.enabled {
            return Ok(());
        }

        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(CaptchaError::MissingToken)?;

        let mut form = vec![("secret", self.secret_key.as_str()), ("response", token)];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip));
        }

        let response = self.client.post(&self.verify_url).form(&form).send().await?;

        if !response.status().is_success() {
            tracing::error!("Captcha verification returned {}", response.status());
            return Err(CaptchaError::UpstreamStatus(response.status().as_u16()));
        }

        let body: SiteVerifyResponse = response.json().await?;

        if body.success {
            Ok(())
        } else {
            tracing::info!("Captcha rejected: {:?}", body.error_codes);
            Err(CaptchaError::Rejected(body.error_codes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn verifier(url: String, enabled: bool) -> CaptchaVerifier {
        CaptchaVerifier::new(url, "test-secret".to_string(), enabled, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_disabled_verifier_accepts_anything() {
        let captcha = verifier("http://127.0.0.1:9".to_string(), false);
        tokio_test::assert_ok!(captcha.verify(None, None).await);
    }

    #[tokio::test]
    async fn test_missing_token() {
        let captcha = verifier("http://127.0.0.1:9".to_string(), true);
        let err = captcha.verify(Some("  "), None).await.unwrap_err();
        assert!(matches!(err, CaptchaError::MissingToken));
    }

    #[tokio::test]
    async fn test_successful_verification() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/siteverify")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("secret".into(), "test-secret".into()),
                Matcher::UrlEncoded("response".into(), "token-123".into()),
                Matcher::UrlEncoded("remoteip".into(), "203.0.113.7".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "error-codes": []}"#)
            .create_async()
            .await;

        let captcha = verifier(format!("{}/siteverify", server.url()), true);
        tokio_test::assert_ok!(captcha.verify(Some("token-123"), Some("203.0.113.7")).await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/siteverify")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": false, "error-codes": ["invalid-input-response"]}"#)
            .create_async()
            .await;

        let captcha = verifier(format!("{}/siteverify", server.url()), true);
        match captcha.verify(Some("bad"), None).await {
            Err(CaptchaError::Rejected(codes)) => assert_eq!(codes, vec!["invalid-input-response"]),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upstream_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/siteverify")
            .with_status(503)
            .create_async()
            .await;

        let captcha = verifier(format!("{}/siteverify", server.url()), true);
        let err = tokio_test::assert_err!(captcha.verify(Some("token"), None).await);
        assert!(matches!(err, CaptchaError::UpstreamStatus(503)));
    }
}
