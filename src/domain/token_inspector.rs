//! Local expiry estimate for access tokens.
//!
//! The signature is not checked and the claims are never used for
//! authorization; the backend stays authoritative. A token that cannot be
//! decoded is reported as expired.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: i64,
}

pub fn is_token_expired(token: Option<&str>) -> bool {
    is_token_expired_at(token, Utc::now().timestamp())
}

pub fn is_token_expired_at(token: Option<&str>, now_secs: i64) -> bool {
    match token.and_then(decode_exp) {
        Some(exp) => exp <= now_secs,
        None => true,
    }
}

fn decode_exp(token: &str) -> Option<i64> {
    let mut v = Validation::new(Algorithm::HS256);
    v.insecure_disable_signature_validation();
    v.validate_exp = false;
    v.validate_aud = false;
    v.leeway = 0;
    v.set_required_spec_claims(&["exp"]);
    decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &v)
        .map(|data| data.claims.exp)
        .ok()
}
