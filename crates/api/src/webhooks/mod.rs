mod email;
mod legacy;
mod sms;

use actix_web::web;
use email::receive_email_controller;
use sms::receive_sms_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/webhooks/sms", web::post().to(receive_sms_controller));
    cfg.route("/webhooks/email", web::post().to(receive_email_controller));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{member, test_context, upcoming_event};
    use actix_web::{test, App};
    use clubnight_infra::StaticSys;
    use hmac::{Hmac, Mac};
    use sha1::Sha1;
    use sha2::Sha256;
    use std::sync::Arc;

    fn sign_sms(auth_token: &str, url: &str, params: &[(&str, &str)]) -> String {
        let mut sorted = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let mut payload = String::from(url);
        for (key, value) in sorted {
            payload.push_str(key);
            payload.push_str(value);
        }
        let mut mac = Hmac::<Sha1>::new_from_slice(auth_token.as_bytes()).unwrap();
        mac.update(payload.as_bytes());
        base64::encode(mac.finalize().into_bytes())
    }

    fn sign_email(secret: &str, message_id: &str, timestamp: &str, payload: &[u8]) -> String {
        let key = base64::decode(secret.strip_prefix("whsec_").unwrap()).unwrap();
        let mut mac = Hmac::<Sha256>::new_from_slice(&key).unwrap();
        mac.update(format!("{}.{}.", message_id, timestamp).as_bytes());
        mac.update(payload);
        format!("v1,{}", base64::encode(mac.finalize().into_bytes()))
    }

    macro_rules! webhook_app {
        ($ctx:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($ctx.clone()))
                    .configure(configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn signed_sms_reply_round_trips_to_twiml() {
        let ctx = test_context();
        upcoming_event(&ctx, 2024, 6, 7).await;
        member(&ctx, "alice", "+13125550001").await;
        let app = webhook_app!(ctx);

        let params = [("From", "+13125550001"), ("Body", "YES")];
        let signature = sign_sms(
            "token123",
            "https://club.example/webhooks/sms",
            &params,
        );

        let req = test::TestRequest::post()
            .uri("/webhooks/sms")
            .insert_header(("x-twilio-signature", signature))
            .set_form(&[("From", "+13125550001"), ("Body", "YES")])
            .to_request();
        let res = test::call_service(&app, req).await;
        assert!(res.status().is_success());
        assert_eq!(
            res.headers().get("content-type").unwrap(),
            "text/xml"
        );
        let body = test::read_body(res).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.starts_with("<?xml"));
        assert!(body.contains("You're in for"));
    }

    #[actix_web::test]
    async fn unsigned_or_mis_signed_sms_is_rejected() {
        let ctx = test_context();
        member(&ctx, "alice", "+13125550001").await;
        let app = webhook_app!(ctx);

        let req = test::TestRequest::post()
            .uri("/webhooks/sms")
            .set_form(&[("From", "+13125550001"), ("Body", "YES")])
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 401);

        let req = test::TestRequest::post()
            .uri("/webhooks/sms")
            .insert_header(("x-twilio-signature", "aW52YWxpZA=="))
            .set_form(&[("From", "+13125550001"), ("Body", "YES")])
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 401);
    }

    #[actix_web::test]
    async fn sms_rejected_when_provider_is_unconfigured() {
        let mut ctx = test_context();
        ctx.config.sms_provider = None;
        member(&ctx, "alice", "+13125550001").await;
        let app = webhook_app!(ctx);

        let params = [("From", "+13125550001"), ("Body", "YES")];
        let signature = sign_sms("token123", "https://club.example/webhooks/sms", &params);
        let req = test::TestRequest::post()
            .uri("/webhooks/sms")
            .insert_header(("x-twilio-signature", signature))
            .set_form(&params)
            .to_request();
        // Fails closed even with a once-valid signature
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 401);
    }

    const NOW_MILLIS: i64 = 1_717_261_200_000;
    const NOW_SECS_STR: &str = "1717261200";
    const TEST_SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";

    #[actix_web::test]
    async fn signed_email_reply_reconciles_rsvp() {
        let mut ctx = test_context();
        ctx.sys = Arc::new(StaticSys(NOW_MILLIS));
        let event = upcoming_event(&ctx, 2024, 6, 7).await;
        member(&ctx, "alice", "+13125550001").await;
        let app = webhook_app!(ctx);

        let payload = serde_json::json!({
            "type": "email.received",
            "data": {
                "from": "alice@example.com",
                "subject": "Accepted: dinner",
                "text": format!("UID:event-{}@club.example\nPARTSTAT:ACCEPTED", event.id),
                "html": ""
            }
        })
        .to_string();
        let signature = sign_email(TEST_SECRET, "msg_1", NOW_SECS_STR, payload.as_bytes());

        let req = test::TestRequest::post()
            .uri("/webhooks/email")
            .insert_header(("webhook-id", "msg_1"))
            .insert_header(("webhook-timestamp", NOW_SECS_STR))
            .insert_header(("webhook-signature", signature))
            .insert_header(("content-type", "application/json"))
            .set_payload(payload)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert!(res.status().is_success());
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "yes");
    }

    #[actix_web::test]
    async fn email_with_missing_headers_is_unauthorized() {
        let mut ctx = test_context();
        ctx.sys = Arc::new(StaticSys(NOW_MILLIS));
        let app = webhook_app!(ctx);

        let req = test::TestRequest::post()
            .uri("/webhooks/email")
            .set_payload("{}")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 401);
    }

    #[actix_web::test]
    async fn email_without_configured_secret_is_a_server_error() {
        let mut ctx = test_context();
        ctx.config.email_webhook_secret = None;
        let app = webhook_app!(ctx);

        let req = test::TestRequest::post()
            .uri("/webhooks/email")
            .insert_header(("webhook-id", "msg_1"))
            .insert_header(("webhook-timestamp", NOW_SECS_STR))
            .insert_header(("webhook-signature", "v1,aaaa"))
            .set_payload("{}")
            .to_request();
        // Operator problem, not an auth failure
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 500);
    }

    #[actix_web::test]
    async fn non_email_received_events_are_acknowledged() {
        let mut ctx = test_context();
        ctx.sys = Arc::new(StaticSys(NOW_MILLIS));
        let app = webhook_app!(ctx);

        let payload = r#"{"type":"email.bounced","data":{}}"#;
        let signature = sign_email(TEST_SECRET, "msg_2", NOW_SECS_STR, payload.as_bytes());
        let req = test::TestRequest::post()
            .uri("/webhooks/email")
            .insert_header(("webhook-id", "msg_2"))
            .insert_header(("webhook-timestamp", NOW_SECS_STR))
            .insert_header(("webhook-signature", signature))
            .set_payload(payload)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert!(res.status().is_success());
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Event type ignored");
    }

    #[actix_web::test]
    async fn chatty_senders_are_rate_limited() {
        let mut ctx = test_context();
        ctx.sys = Arc::new(StaticSys(NOW_MILLIS));
        upcoming_event(&ctx, 2024, 6, 7).await;
        member(&ctx, "alice", "+13125550001").await;
        let app = webhook_app!(ctx);

        let params = [("From", "+13125550001"), ("Body", "YES")];
        let signature = sign_sms("token123", "https://club.example/webhooks/sms", &params);

        let mut last_body = String::new();
        for _ in 0..11 {
            let req = test::TestRequest::post()
                .uri("/webhooks/sms")
                .insert_header(("x-twilio-signature", signature.clone()))
                .set_form(&params)
                .to_request();
            let res = test::call_service(&app, req).await;
            assert!(res.status().is_success());
            let body = test::read_body(res).await;
            last_body = String::from_utf8(body.to_vec()).unwrap();
        }
        // The eleventh request in the window is dropped with an empty reply
        assert!(!last_body.contains("<Message>"));
    }
}
