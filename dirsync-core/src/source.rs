use reqwest::header;
use serde::{Deserialize, Serialize};

use crate::config::SourceSettings;
use crate::error::FetchError;
use crate::types::RawUserRecord;

/// The request body sent with every directory query. The operation
/// descriptor and shared secret are fixed per deployment; the credential
/// goes in the `x-api-key` header instead.
#[derive(Debug, Serialize)]
struct DirectoryQuery<'a> {
    #[serde(rename = "OperateName")]
    operate_name: &'a str,
    #[serde(rename = "EncryptPassword")]
    encrypt_password: &'a str,
}

/// The response envelope. `code` and `msg` are application-level and only
/// used for log context; the records live under `data`.
#[derive(Debug, Deserialize)]
struct DirectoryEnvelope {
    code: Option<i64>,
    msg: Option<String>,
    data: Option<Vec<RawUserRecord>>,
}

/// A client for the directory-query endpoint. One instance is shared by all
/// concurrent source calls; the credential is the only per-call input.
pub struct DirectoryClient {
    client: reqwest::Client,
    query_url: String,
    operate_name: String,
    encrypt_password: String,
}

impl DirectoryClient {
    pub fn new(settings: &SourceSettings) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent("dirsync")
            .timeout(settings.request_timeout)
            .build()
            .expect("failed to construct reqwest client for directory queries");

        Self {
            client,
            query_url: settings.query_url.clone(),
            operate_name: settings.operate_name.clone(),
            encrypt_password: settings.encrypt_password.clone(),
        }
    }

    /// Issue one authenticated query and decode the record list.
    ///
    /// Every failure mode (transport error, non-2xx status, undecodable
    /// body, missing record list) comes back as a `FetchError` value so the
    /// caller can continue with the remaining sources.
    pub async fn fetch_users(&self, api_key: &str) -> Result<Vec<RawUserRecord>, FetchError> {
        let body = DirectoryQuery {
            operate_name: &self.operate_name,
            encrypt_password: &self.encrypt_password,
        };

        let response = self
            .client
            .post(&self.query_url)
            .header("x-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|error| FetchError::Request { error })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }

        let envelope: DirectoryEnvelope = response
            .json()
            .await
            .map_err(|error| FetchError::Decode { error })?;

        match envelope.data {
            Some(records) => Ok(records),
            None => Err(FetchError::MissingData {
                code: envelope.code,
                msg: envelope.msg,
            }),
        }
    }
}

/// Keep only the last four characters of a credential for log lines.
pub fn redact_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let start = chars.len().saturating_sub(4);
    let suffix: String = chars[start..].iter().collect();
    format!("...{suffix}")
}
