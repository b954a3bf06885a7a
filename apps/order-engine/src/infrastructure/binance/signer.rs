//! HMAC-SHA256 request signing for the Binance REST API.
//!
//! Signed endpoints authenticate by an HMAC-SHA256 signature computed
//! over the canonical URL-encoded parameter string and appended as a
//! `signature` parameter.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Build the canonical query string the signature is computed over.
///
/// Parameter order is preserved; Binance signs the string exactly as
/// sent, so the caller's ordering is the canonical one.
#[must_use]
pub fn build_query_string(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// HMAC-SHA256 signer over a shared API secret.
#[derive(Clone)]
pub struct RequestSigner {
    api_secret: String,
}

impl RequestSigner {
    /// Create a signer from the API secret.
    pub fn new(api_secret: impl Into<String>) -> Self {
        Self {
            api_secret: api_secret.into(),
        }
    }

    /// Compute the hex-encoded HMAC-SHA256 signature of `data`.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn signature(&self, data: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(data.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Sign the parameter list in place, appending `signature` last.
    pub fn sign(&self, params: &mut Vec<(String, String)>) {
        let query = build_query_string(params);
        params.push(("signature".to_string(), self.signature(&query)));
    }
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose the secret through Debug output.
        f.debug_struct("RequestSigner").finish_non_exhaustive()
    }
}
