//! Checkout signature verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verifies the gateway's checkout signature, a hex HMAC-SHA256 of
/// `order_id|payment_id` keyed with the account secret.
#[must_use]
pub fn verify_checkout_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    secret: &str,
) -> bool {
    if secret.is_empty() {
        return false;
    }
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(message: &str, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature() {
        let signature = sign("order_9A33XWu170gUtm|pay_29QQoUBi66xm2f", "secret");
        assert!(verify_checkout_signature(
            "order_9A33XWu170gUtm",
            "pay_29QQoUBi66xm2f",
            &signature,
            "secret"
        ));
    }

    #[test]
    fn test_tampered_payment_id() {
        let signature = sign("order_1|pay_1", "secret");
        assert!(!verify_checkout_signature("order_1", "pay_2", &signature, "secret"));
    }

    #[test]
    fn test_wrong_secret() {
        let signature = sign("order_1|pay_1", "other");
        assert!(!verify_checkout_signature("order_1", "pay_1", &signature, "secret"));
    }

    #[test]
    fn test_garbage_signature() {
        assert!(!verify_checkout_signature("order_1", "pay_1", "zz-not-hex", "secret"));
        assert!(!verify_checkout_signature("order_1", "pay_1", "", "secret"));
    }

    #[test]
    fn test_empty_secret_never_verifies() {
        let signature = sign("order_1|pay_1", "");
        assert!(!verify_checkout_signature("order_1", "pay_1", &signature, ""));
    }
}
