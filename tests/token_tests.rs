//! Tests for signed link tokens
//!
//! These tests verify that:
//! - Tokens issued for a subject verify for that subject and no other
//! - Expiry is inclusive of the configured day count
//! - Any tampering with the digest is rejected
//! - Purposes are isolated from one another
//! - Credential-bound tokens are single-use, subject-bound ones are not

use chrono::{Duration, TimeZone};
use qbuilder::prelude::*;
use qbuilder::tokens::codec::to_base36;
use qbuilder::tokens::days_since_epoch;

fn registry() -> TokenRegistry {
    AppConfig::default_config().token_registry().unwrap()
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 0).unwrap()
}

// =============================================================================
// Round Trip & Expiry
// =============================================================================

mod lifecycle_tests {
    use super::*;

    #[test]
    fn test_round_trip_for_every_purpose() {
        let registry = registry();
        let account = Account::new("ada@example.com", "pw");

        for purpose in [TokenPurpose::PasswordReset, TokenPurpose::UnsubscribeEmail] {
            let codec = registry.purpose(purpose);
            let token = codec.issue(&account, t0());
            assert!(codec.verify(Some(&account), &token, t0()), "{purpose}");
        }
    }

    #[test]
    fn test_expiry_is_inclusive() {
        let registry = registry();
        let account = Account::new("ada@example.com", "pw");

        for purpose in [TokenPurpose::PasswordReset, TokenPurpose::UnsubscribeEmail] {
            let codec = registry.purpose(purpose);
            let days = codec.expiry_days() as i64;
            let token = codec.issue(&account, t0());

            assert!(codec.verify(Some(&account), &token, t0() + Duration::days(days)));
            assert!(!codec.verify(Some(&account), &token, t0() + Duration::days(days + 1)));
        }
    }

    #[test]
    fn test_expiry_counts_calendar_days() {
        let registry = registry();
        let codec = registry.password_reset();
        let account = Account::new("ada@example.com", "pw");

        // issued one minute before midnight, the day rolls over immediately
        let token = codec.issue(&account, t0());
        let last_valid = Utc.with_ymd_and_hms(2024, 3, 7, 23, 59, 59).unwrap();
        let first_invalid = Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap();
        assert!(codec.verify(Some(&account), &token, last_valid));
        assert!(!codec.verify(Some(&account), &token, first_invalid));
    }

    #[test]
    fn test_other_subject_rejected() {
        let registry = registry();
        let codec = registry.unsubscribe_email();
        let ada = Account::new("ada@example.com", "pw");
        let bob = Account::new("bob@example.com", "pw");

        let token = codec.issue(&ada, t0());
        assert!(!codec.verify(Some(&bob), &token, t0()));
        assert!(!codec.verify(None, &token, t0()));
    }
}

// =============================================================================
// Tampering
// =============================================================================

mod tamper_tests {
    use super::*;

    fn flip(c: char) -> char {
        if c == '0' { '1' } else { '0' }
    }

    #[test]
    fn test_any_flipped_digest_char_rejected() {
        let registry = registry();
        let codec = registry.password_reset();
        let account = Account::new("ada@example.com", "pw");
        let token = codec.issue(&account, t0());
        let (ts, digest) = token.split_once('-').unwrap();

        for i in 0..digest.len() {
            let forged: String = digest
                .chars()
                .enumerate()
                .map(|(j, c)| if i == j { flip(c) } else { c })
                .collect();
            let forged = format!("{}-{}", ts, forged);
            assert!(!codec.verify(Some(&account), &forged, t0()), "position {i}");
        }
    }

    #[test]
    fn test_moved_timestamp_rejected() {
        let registry = registry();
        let codec = registry.password_reset();
        let account = Account::new("ada@example.com", "pw");
        let token = codec.issue(&account, t0() - Duration::days(30));
        let (_, digest) = token.split_once('-').unwrap();

        // re-dating an old token to today must not revive it
        let today = codec.issue(&account, t0());
        let (ts_today, _) = today.split_once('-').unwrap();
        let forged = format!("{}-{}", ts_today, digest);
        assert!(!codec.verify(Some(&account), &forged, t0()));
    }

    struct Member(&'static str);

    impl TokenSubject for Member {
        fn subject_id(&self) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn test_digest_cannot_be_moved_to_a_shorter_subject_id() {
        let codec = TokenCodec::new(
            "newsletter",
            "NewsletterToken",
            "s3cret",
            30,
            HashInputs::SubjectId,
        );
        let now = t0();
        let today = days_since_epoch(now);
        let token = codec.issue(&Member("18"), now);
        let (_, digest) = token.split_once('-').unwrap();

        // "18" then today spells the same digits as "1" then "8<today>"
        let shifted: u64 = format!("8{}", today).parse().unwrap();
        let forged = format!("{}-{}", to_base36(shifted), digest);

        assert!(codec.verify(Some(&Member("18")), &token, now));
        assert!(!codec.verify(Some(&Member("1")), &forged, now));
        assert!(!codec.verify(
            Some(&Member("1")),
            &forged,
            now + Duration::days(3650)
        ));
    }

    #[test]
    fn test_future_dated_token_rejected() {
        let registry = registry();
        let codec = registry.unsubscribe_email();
        let account = Account::new("ada@example.com", "pw");
        let tomorrow = codec.issue(&account, t0() + Duration::days(1));

        assert!(!codec.verify(Some(&account), &tomorrow, t0()));
        assert!(codec.verify(Some(&account), &tomorrow, t0() + Duration::days(1)));
    }

    #[test]
    fn test_truncated_digest_rejected() {
        let registry = registry();
        let codec = registry.password_reset();
        let account = Account::new("ada@example.com", "pw");
        let token = codec.issue(&account, t0());
        assert!(!codec.verify(Some(&account), &token[..token.len() - 1], t0()));
    }

    #[test]
    fn test_different_secret_rejected() {
        let account = Account::new("ada@example.com", "pw");
        let mut config = AppConfig::default_config();
        let token = config
            .token_registry()
            .unwrap()
            .password_reset()
            .issue(&account, t0());

        config.secret_key = "rotated".to_string();
        let rotated = config.token_registry().unwrap();
        assert!(!rotated.password_reset().verify(Some(&account), &token, t0()));
    }
}

// =============================================================================
// Purposes & Bindings
// =============================================================================

mod binding_tests {
    use super::*;

    #[test]
    fn test_purpose_isolation() {
        let registry = registry();
        let account = Account::new("ada@example.com", "pw");

        let reset = registry.password_reset().issue(&account, t0());
        let unsubscribe = registry.unsubscribe_email().issue(&account, t0());

        assert!(!registry.unsubscribe_email().verify(Some(&account), &reset, t0()));
        assert!(!registry.password_reset().verify(Some(&account), &unsubscribe, t0()));
    }

    #[test]
    fn test_password_change_invalidates_reset_token() {
        let registry = registry();
        let mut account = Account::new("ada@example.com", "pw");
        let token = registry.password_reset().issue(&account, t0());

        account.set_password("a brand new password");
        assert!(!registry.password_reset().verify(Some(&account), &token, t0()));
    }

    #[test]
    fn test_login_invalidates_reset_token() {
        let registry = registry();
        let mut account = Account::new("ada@example.com", "pw");
        let token = registry.password_reset().issue(&account, t0());

        account.last_login = Some(t0());
        assert!(!registry.password_reset().verify(Some(&account), &token, t0()));
    }

    #[test]
    fn test_unsubscribe_token_is_reusable() {
        let registry = registry();
        let mut account = Account::new("ada@example.com", "pw");
        let token = registry.unsubscribe_email().issue(&account, t0());

        account.unsubscribe(EmailNotificationType::NewsAndOffers);
        account.set_password("changed");
        assert!(registry.unsubscribe_email().verify(Some(&account), &token, t0()));
        assert!(registry.unsubscribe_email().verify(
            Some(&account),
            &token,
            t0() + Duration::days(1)
        ));
    }

    #[test]
    fn test_unknown_purpose_is_an_error() {
        let err = registry().get("invite").unwrap_err();
        assert!(matches!(
            err,
            QbError::Token(TokenError::UnknownPurpose { ref purpose }) if purpose == "invite"
        ));
    }
}

// =============================================================================
// Uid Encoding
// =============================================================================

mod uid_tests {
    use super::*;

    #[test]
    fn test_account_id_round_trip() {
        let account = Account::new("ada@example.com", "pw");
        let encoded = encode_uid(&account.id.to_string());
        let decoded = decode_uid(&encoded).unwrap();
        assert_eq!(Uuid::parse_str(&decoded).unwrap(), account.id);
    }

    #[test]
    fn test_garbage_fails_closed() {
        for garbage in ["", "%%%", "not base64!", "////"] {
            let decoded = decode_uid(garbage);
            assert!(
                decoded
                    .as_deref()
                    .and_then(|d| Uuid::parse_str(d).ok())
                    .is_none(),
                "{garbage}"
            );
        }
    }
}
