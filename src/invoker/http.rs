//! reqwest-backed outbound transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use url::Url;

use crate::invoker::{
    InvokerError, OutboundCallDescriptor, OutboundInvoker, RawResponse,
    DEFAULT_ERROR_STATUS_THRESHOLD,
};

/// Sends descriptors over HTTP with a shared connection pool.
#[derive(Debug, Clone)]
pub struct HttpInvoker {
    client: reqwest::Client,
    error_status_threshold: u16,
}

impl HttpInvoker {
    /// Build an invoker with its own client.
    pub fn new(error_status_threshold: u16) -> Result<Self, reqwest::Error> {
        // Redirects are handed back to the caller untouched.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self::with_client(client, error_status_threshold))
    }

    pub fn with_client(client: reqwest::Client, error_status_threshold: u16) -> Self {
        Self {
            client,
            error_status_threshold,
        }
    }

    pub fn error_status_threshold(&self) -> u16 {
        self.error_status_threshold
    }

    fn build_request(
        &self,
        descriptor: OutboundCallDescriptor,
    ) -> Result<reqwest::RequestBuilder, InvokerError> {
        let method = Method::from_bytes(descriptor.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| {
                InvokerError::TransportError(format!("invalid method '{}'", descriptor.method))
            })?;

        let mut url = Url::parse(&descriptor.url).map_err(|e| {
            InvokerError::TransportError(format!("invalid url '{}': {}", descriptor.url, e))
        })?;
        if !descriptor.query_params.is_empty() {
            url.query_pairs_mut().extend_pairs(&descriptor.query_params);
        }

        let mut headers = HeaderMap::with_capacity(descriptor.headers.len());
        for (name, value) in &descriptor.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping header that is not valid HTTP"),
            }
        }

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = descriptor.body {
            builder = builder.body(body);
        }
        Ok(builder)
    }
}

impl Default for HttpInvoker {
    fn default() -> Self {
        Self::with_client(reqwest::Client::new(), DEFAULT_ERROR_STATUS_THRESHOLD)
    }
}

#[async_trait]
impl OutboundInvoker for HttpInvoker {
    async fn call(
        &self,
        descriptor: OutboundCallDescriptor,
        timeout: Duration,
    ) -> Result<RawResponse, InvokerError> {
        let request = self.build_request(descriptor)?;

        let exchange = async {
            let response = request.send().await?;
            let status_code = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(k, v)| {
                    (
                        k.as_str().to_string(),
                        String::from_utf8_lossy(v.as_bytes()).into_owned(),
                    )
                })
                .collect::<Vec<_>>();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>(RawResponse {
                status_code,
                headers,
                body,
            })
        };

        // Elapsed drops `exchange`, which closes the in-flight connection.
        let response = match tokio::time::timeout(timeout, exchange).await {
            Err(_) => return Err(InvokerError::Timeout(timeout)),
            Ok(Err(e)) if e.is_timeout() => return Err(InvokerError::Timeout(timeout)),
            Ok(Err(e)) => return Err(InvokerError::TransportError(e.to_string())),
            Ok(Ok(response)) => response,
        };

        if response.status_code >= self.error_status_threshold {
            return Err(InvokerError::RemoteError {
                status_code: response.status_code,
                body: response.body,
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn descriptor(method: &str, url: &str) -> OutboundCallDescriptor {
        OutboundCallDescriptor {
            method: method.into(),
            url: url.into(),
            headers: BTreeMap::new(),
            query_params: BTreeMap::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn test_invalid_url_is_transport_error() {
        let invoker = HttpInvoker::default();
        let err = invoker
            .call(descriptor("GET", "not a url"), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokerError::TransportError(_)));
    }

    #[tokio::test]
    async fn test_invalid_method_is_transport_error() {
        let invoker = HttpInvoker::default();
        let err = invoker
            .call(descriptor("GE T", "http://127.0.0.1:1/"), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokerError::TransportError(_)));
    }

    #[test]
    fn test_query_params_appended() {
        let invoker = HttpInvoker::default();
        let mut d = descriptor("get", "http://example.com/api/v1/contacts");
        d.query_params.insert("env".into(), "dev".into());
        d.query_params.insert("q".into(), "a b".into());

        let request = invoker.build_request(d).unwrap().build().unwrap();
        assert_eq!(request.method(), Method::GET);
        assert_eq!(
            request.url().as_str(),
            "http://example.com/api/v1/contacts?env=dev&q=a+b"
        );
    }
}
