//! Plain-text message bodies.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
}

/// Message carrying a password-reset code.
pub fn password_reset(code: &str, ttl_minutes: i64) -> EmailMessage {
    EmailMessage {
        subject: "Password reset code".to_string(),
        body: format!(
            "A password reset was requested for your account.\n\n\
             Your reset code is: {code}\n\n\
             This code expires in {ttl_minutes} minutes. If you did not request \
             a reset, you can ignore this email."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_body_contains_code_and_expiry() {
        let message = password_reset("482913", 15);
        assert!(message.body.contains("482913"));
        assert!(message.body.contains("15 minutes"));
    }
}
