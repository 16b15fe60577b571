// Response classification shared by every API call
use crate::error::{RdsError, Result};
use crate::models::{ResponseEnvelope, ResponseHeader};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Just the header of a response body; everything else is ignored.
#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    header: Option<ResponseHeader>,
}

fn api_error(header: &ResponseHeader) -> RdsError {
    RdsError::Api {
        code: header.result_code,
        message: header.result_message.clone(),
    }
}

/// Read the whole body of `response` and classify it.
///
/// Order matters: a non-2xx status wins over anything in the body, a failed
/// header wins over the payload, and only then is the payload decoded.
pub async fn parse_response<T>(response: Response) -> Result<T>
where
    T: DeserializeOwned + ResponseEnvelope,
{
    let status = response.status();
    let body = response.bytes().await.map_err(RdsError::BodyRead)?;
    parse_body(status, &body)
}

pub fn parse_body<T>(status: StatusCode, body: &[u8]) -> Result<T>
where
    T: DeserializeOwned + ResponseEnvelope,
{
    if !status.is_success() {
        return Err(RdsError::Http {
            status,
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body: String::from_utf8_lossy(body).into_owned(),
        });
    }

    // Failure replies usually carry the header alone, so it is checked before
    // the payload fields that `T` requires.
    if T::HAS_HEADER {
        if let Ok(Envelope {
            header: Some(header),
        }) = serde_json::from_slice::<Envelope>(body)
        {
            if !header.is_success() {
                return Err(api_error(&header));
            }
        }
    }

    let value: T = serde_json::from_slice(body).map_err(|source| RdsError::Parse {
        body: String::from_utf8_lossy(body).into_owned(),
        source,
    })?;

    if let Some(header) = value.header() {
        if !header.is_success() {
            return Err(api_error(header));
        }
    }

    Ok(value)
}
