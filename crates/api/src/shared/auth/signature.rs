use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// Acceptable clock skew between us and the webhook sender, in seconds.
const EMAIL_WEBHOOK_TOLERANCE_SECS: i64 = 5 * 60;

/// SMS provider request signing: HMAC-SHA1 over the full request URL
/// followed by every form parameter sorted lexicographically by key, each
/// appended as key then value; the header carries the base64 digest.
pub fn verify_sms_signature(
    auth_token: &str,
    url: &str,
    params: &[(String, String)],
    signature_header: &str,
) -> bool {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut payload = String::from(url);
    for (key, value) in sorted {
        payload.push_str(key);
        payload.push_str(value);
    }

    let claimed = match base64::decode(signature_header) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let mut mac = match HmacSha1::new_from_slice(auth_token.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload.as_bytes());
    mac.verify_slice(&claimed).is_ok()
}

/// Signed-webhook verification for the inbound email channel: HMAC-SHA256
/// over `{message_id}.{timestamp}.{body}` with the base64 secret behind the
/// `whsec_` prefix. The signature header may list several space-separated
/// `v1,<base64>` candidates from key rotation; any match accepts. Stale
/// timestamps are rejected to stop replays.
pub fn verify_email_signature(
    secret: &str,
    message_id: &str,
    timestamp: &str,
    signature_header: &str,
    payload: &[u8],
    now_millis: i64,
) -> bool {
    let ts: i64 = match timestamp.parse() {
        Ok(ts) => ts,
        Err(_) => return false,
    };
    if (now_millis / 1000 - ts).abs() > EMAIL_WEBHOOK_TOLERANCE_SECS {
        return false;
    }

    let encoded_key = secret.strip_prefix("whsec_").unwrap_or(secret);
    let key = match base64::decode(encoded_key) {
        Ok(key) => key,
        Err(_) => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(&key) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(message_id.as_bytes());
    mac.update(b".");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    signature_header
        .split_whitespace()
        .filter_map(|candidate| candidate.strip_prefix("v1,"))
        .filter_map(|candidate| base64::decode(candidate).ok())
        .any(|candidate| mac.clone().verify_slice(&candidate).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_sms(auth_token: &str, url: &str, params: &[(String, String)]) -> String {
        let mut sorted: Vec<&(String, String)> = params.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        let mut payload = String::from(url);
        for (key, value) in sorted {
            payload.push_str(key);
            payload.push_str(value);
        }
        let mut mac = HmacSha1::new_from_slice(auth_token.as_bytes()).unwrap();
        mac.update(payload.as_bytes());
        base64::encode(mac.finalize().into_bytes())
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn accepts_correctly_signed_sms_request() {
        let token = "12345";
        let url = "https://club.example/webhooks/sms";
        let params = pairs(&[("From", "+13125550142"), ("Body", "YES")]);
        let signature = sign_sms(token, url, &params);
        assert!(verify_sms_signature(token, url, &params, &signature));
    }

    #[test]
    fn sms_signature_covers_parameter_values() {
        let token = "12345";
        let url = "https://club.example/webhooks/sms";
        let params = pairs(&[("From", "+13125550142"), ("Body", "YES")]);
        let signature = sign_sms(token, url, &params);

        let tampered = pairs(&[("From", "+13125550142"), ("Body", "NO")]);
        assert!(!verify_sms_signature(token, url, &tampered, &signature));
    }

    #[test]
    fn sms_signature_covers_the_url() {
        let token = "12345";
        let params = pairs(&[("From", "+13125550142"), ("Body", "YES")]);
        let signature = sign_sms(token, "https://club.example/webhooks/sms", &params);
        assert!(!verify_sms_signature(
            token,
            "https://evil.example/webhooks/sms",
            &params,
            &signature
        ));
    }

    #[test]
    fn rejects_wrong_token_and_garbage_signatures() {
        let url = "https://club.example/webhooks/sms";
        let params = pairs(&[("From", "+13125550142"), ("Body", "YES")]);
        let signature = sign_sms("12345", url, &params);
        assert!(!verify_sms_signature("67890", url, &params, &signature));
        assert!(!verify_sms_signature("12345", url, &params, "not base64 !!!"));
        assert!(!verify_sms_signature("12345", url, &params, ""));
    }

    const SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";

    fn sign_email(message_id: &str, timestamp: &str, payload: &[u8]) -> String {
        let key = base64::decode(SECRET.strip_prefix("whsec_").unwrap()).unwrap();
        let mut mac = HmacSha256::new_from_slice(&key).unwrap();
        mac.update(format!("{}.{}.", message_id, timestamp).as_bytes());
        mac.update(payload);
        format!("v1,{}", base64::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn accepts_correctly_signed_email_webhook() {
        let now_millis = 1_614_265_330_000;
        let timestamp = "1614265330";
        let payload = br#"{"type":"email.received"}"#;
        let signature = sign_email("msg_1", timestamp, payload);
        assert!(verify_email_signature(
            SECRET, "msg_1", timestamp, &signature, payload, now_millis
        ));
    }

    #[test]
    fn accepts_any_of_multiple_signature_candidates() {
        let now_millis = 1_614_265_330_000;
        let timestamp = "1614265330";
        let payload = b"{}";
        let good = sign_email("msg_1", timestamp, payload);
        let header = format!("v1,bm90LXRoaXMtb25l {}", good);
        assert!(verify_email_signature(
            SECRET, "msg_1", timestamp, &header, payload, now_millis
        ));
    }

    #[test]
    fn rejects_tampered_email_payload() {
        let now_millis = 1_614_265_330_000;
        let timestamp = "1614265330";
        let signature = sign_email("msg_1", timestamp, b"{}");
        assert!(!verify_email_signature(
            SECRET,
            "msg_1",
            timestamp,
            &signature,
            b"{\"evil\":true}",
            now_millis
        ));
    }

    #[test]
    fn rejects_stale_timestamps() {
        let timestamp = "1614265330";
        let payload = b"{}";
        let signature = sign_email("msg_1", timestamp, payload);
        // Six minutes later
        let now_millis = (1_614_265_330 + 6 * 60) * 1000;
        assert!(!verify_email_signature(
            SECRET, "msg_1", timestamp, &signature, payload, now_millis
        ));
    }

    #[test]
    fn rejects_malformed_headers() {
        let now_millis = 1_614_265_330_000;
        let payload = b"{}";
        assert!(!verify_email_signature(
            SECRET,
            "msg_1",
            "not-a-number",
            "v1,aaaa",
            payload,
            now_millis
        ));
        assert!(!verify_email_signature(
            SECRET,
            "msg_1",
            "1614265330",
            "v2,aaaa",
            payload,
            now_millis
        ));
        assert!(!verify_email_signature(
            SECRET,
            "msg_1",
            "1614265330",
            "",
            payload,
            now_millis
        ));
    }
}
