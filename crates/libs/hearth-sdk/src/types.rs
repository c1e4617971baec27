use crate::error::SupportError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Sentinel value of the `origin` payload field marking notifications that
/// belong to this SDK. Payloads with any other origin are ignored.
pub const NOTIFICATION_ORIGIN: &str = "hearth";

/// Install option key toggling in-app banner notifications ("YES"/"NO").
pub const OPTION_IN_APP_NOTIFICATIONS: &str = "enableInAppNotification";

pub const PAYLOAD_ORIGIN_KEY: &str = "origin";
pub const PAYLOAD_ISSUE_KEY: &str = "issue_id";
pub const PAYLOAD_SECTION_KEY: &str = "section_id";
pub const PAYLOAD_FAQ_KEY: &str = "faq_id";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct IssueId(pub String);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SectionId(pub String);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FaqId(pub String);

/// Opaque push-registration token handed through to the backend untouched.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DeviceToken(pub String);

/// Opaque handle naming the host surface a support screen should attach to.
/// The session never interprets it; it rides along on every [`ScreenRequest`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct HostContext(pub String);

/// Install-time credentials and options, validated before the session
/// transitions to installed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallRequest {
    pub api_key: String,
    pub domain_name: String,
    pub app_id: String,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl InstallRequest {
    pub fn new(
        api_key: impl Into<String>,
        domain_name: impl Into<String>,
        app_id: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            domain_name: domain_name.into(),
            app_id: app_id.into(),
            options: BTreeMap::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<(), SupportError> {
        if self.api_key.trim().is_empty() {
            return Err(SupportError::invalid_argument("api_key must not be empty"));
        }
        if self.app_id.trim().is_empty() {
            return Err(SupportError::invalid_argument("app_id must not be empty"));
        }
        let domain = self.domain_name.trim();
        if domain.is_empty() {
            return Err(SupportError::invalid_argument("domain_name must not be empty"));
        }
        // Bare domain only, e.g. "acme.hearth.io" — no scheme, no path.
        if domain.contains('/') {
            return Err(SupportError::invalid_argument(
                "domain_name must be a bare domain without scheme or slashes",
            ));
        }
        Ok(())
    }

    /// Freeze this request into the immutable per-process config. Unrecognized
    /// option keys are ignored; only an explicit "NO" disables in-app
    /// notifications.
    pub fn into_config(self) -> InstallConfig {
        let in_app_notifications = self
            .options
            .get(OPTION_IN_APP_NOTIFICATIONS)
            .map(|value| value != "NO")
            .unwrap_or(true);
        InstallConfig {
            api_key: self.api_key,
            domain_name: self.domain_name,
            app_id: self.app_id,
            in_app_notifications,
        }
    }
}

/// Immutable install credentials, created exactly once per session lifetime.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallConfig {
    pub api_key: String,
    pub domain_name: String,
    pub app_id: String,
    pub in_app_notifications: bool,
}

/// Optional identity fields forwarded to the backend with every issue report.
/// Setters overwrite; last write wins.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserIdentity {
    pub user_identifier: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Which support surface a [`ScreenRequest`] asks the presenter for.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Conversation { issue: Option<IssueId> },
    FaqList,
    FaqSection { section: SectionId },
    SingleFaq { faq: FaqId },
}

/// Fire-and-forget presentation request handed to the [`crate::ScreenPresenter`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScreenRequest {
    pub screen: Screen,
    pub context: HostContext,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

/// Cached reply-notification count. `value` is 0 until the first successful
/// remote refresh; `last_refreshed_ms` is a unix-epoch millisecond stamp.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationCount {
    pub value: u32,
    pub last_refreshed_ms: Option<i64>,
}

/// Opaque notification payload as delivered by the platform push plumbing.
/// Everything beyond the recognized routing keys passes through untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct NotificationPayload {
    #[serde(flatten)]
    pub fields: BTreeMap<String, JsonValue>,
}

impl NotificationPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn origin(&self) -> Option<&str> {
        self.fields.get(PAYLOAD_ORIGIN_KEY).and_then(JsonValue::as_str)
    }

    pub fn is_support_origin(&self) -> bool {
        self.origin() == Some(NOTIFICATION_ORIGIN)
    }

    // Identifiers arrive as strings from some platforms and numbers from
    // others; both shapes are accepted.
    fn id_field(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            JsonValue::String(value) => Some(value.clone()),
            JsonValue::Number(value) => Some(value.to_string()),
            _ => None,
        }
    }

    pub fn issue_id(&self) -> Option<IssueId> {
        self.id_field(PAYLOAD_ISSUE_KEY).map(IssueId)
    }

    pub fn section_id(&self) -> Option<SectionId> {
        self.id_field(PAYLOAD_SECTION_KEY).map(SectionId)
    }

    pub fn faq_id(&self) -> Option<FaqId> {
        self.id_field(PAYLOAD_FAQ_KEY).map(FaqId)
    }

    /// Screen a matching notification routes to. Issue identifiers take
    /// precedence, then FAQ sections, then single FAQs; a payload carrying
    /// none of them opens the conversation screen (reply notifications).
    pub fn target_screen(&self) -> Screen {
        if let Some(issue) = self.issue_id() {
            return Screen::Conversation { issue: Some(issue) };
        }
        if let Some(section) = self.section_id() {
            return Screen::FaqSection { section };
        }
        if let Some(faq) = self.faq_id() {
            return Screen::SingleFaq { faq };
        }
        Screen::Conversation { issue: None }
    }
}

/// Structured local notification: a banner body plus the same payload map the
/// remote path carries.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct LocalNotification {
    pub alert: Option<String>,
    #[serde(default)]
    pub payload: NotificationPayload,
}

/// Snapshot the backend consumes when an issue is filed: identity, the lazy
/// metadata block's (filtered) output, and the breadcrumb trail.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IssueReport {
    pub identity: UserIdentity,
    #[serde(default)]
    pub metadata: BTreeMap<String, JsonValue>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub breadcrumbs: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::code;
    use serde_json::json;

    fn request() -> InstallRequest {
        InstallRequest::new("key", "acme.example.com", "acme_app")
    }

    #[test]
    fn install_validation_rejects_empty_fields() {
        for bad in [
            InstallRequest::new("", "acme.example.com", "acme_app"),
            InstallRequest::new("key", "", "acme_app"),
            InstallRequest::new("key", "acme.example.com", " "),
        ] {
            let err = bad.validate().expect_err("empty field must fail validation");
            assert_eq!(err.code(), code::VALIDATION_INVALID_ARGUMENT);
        }
    }

    #[test]
    fn install_validation_rejects_scheme_and_path_in_domain() {
        for domain in ["https://acme.example.com", "acme.example.com/support"] {
            let err = InstallRequest::new("key", domain, "acme_app")
                .validate()
                .expect_err("domain with scheme or path must fail");
            assert_eq!(err.code(), code::VALIDATION_INVALID_ARGUMENT);
        }
        request().validate().expect("bare domain is valid");
    }

    #[test]
    fn in_app_notifications_default_on() {
        assert!(request().into_config().in_app_notifications);
    }

    #[test]
    fn in_app_notifications_disabled_only_by_explicit_no() {
        let off = request().with_option(OPTION_IN_APP_NOTIFICATIONS, "NO");
        assert!(!off.into_config().in_app_notifications);

        let on = request().with_option(OPTION_IN_APP_NOTIFICATIONS, "YES");
        assert!(on.into_config().in_app_notifications);

        let odd = request().with_option(OPTION_IN_APP_NOTIFICATIONS, "maybe");
        assert!(odd.into_config().in_app_notifications);
    }

    #[test]
    fn unrecognized_install_options_are_ignored() {
        let config = request().with_option("presentFullScreen", "YES").into_config();
        assert_eq!(config.app_id, "acme_app");
        assert!(config.in_app_notifications);
    }

    #[test]
    fn payload_accepts_string_and_numeric_identifiers() {
        let by_string = NotificationPayload::new().with_field(PAYLOAD_ISSUE_KEY, "42");
        assert_eq!(by_string.issue_id(), Some(IssueId("42".to_owned())));

        let by_number = NotificationPayload::new().with_field(PAYLOAD_ISSUE_KEY, 42);
        assert_eq!(by_number.issue_id(), Some(IssueId("42".to_owned())));

        let malformed = NotificationPayload::new().with_field(PAYLOAD_ISSUE_KEY, json!(["42"]));
        assert_eq!(malformed.issue_id(), None);
    }

    #[test]
    fn routing_prefers_issue_then_section_then_faq() {
        let issue = NotificationPayload::new()
            .with_field(PAYLOAD_ISSUE_KEY, "7")
            .with_field(PAYLOAD_SECTION_KEY, "s1");
        assert_eq!(
            issue.target_screen(),
            Screen::Conversation { issue: Some(IssueId("7".to_owned())) }
        );

        let section = NotificationPayload::new().with_field(PAYLOAD_SECTION_KEY, "s1");
        assert_eq!(
            section.target_screen(),
            Screen::FaqSection { section: SectionId("s1".to_owned()) }
        );

        let faq = NotificationPayload::new().with_field(PAYLOAD_FAQ_KEY, "f9");
        assert_eq!(faq.target_screen(), Screen::SingleFaq { faq: FaqId("f9".to_owned()) });

        let bare = NotificationPayload::new().with_field(PAYLOAD_ORIGIN_KEY, NOTIFICATION_ORIGIN);
        assert_eq!(bare.target_screen(), Screen::Conversation { issue: None });
    }

    #[test]
    fn origin_recognition() {
        let ours = NotificationPayload::new().with_field(PAYLOAD_ORIGIN_KEY, NOTIFICATION_ORIGIN);
        assert!(ours.is_support_origin());

        let foreign = NotificationPayload::new().with_field(PAYLOAD_ORIGIN_KEY, "other");
        assert!(!foreign.is_support_origin());

        let missing = NotificationPayload::new();
        assert!(!missing.is_support_origin());

        let non_string = NotificationPayload::new().with_field(PAYLOAD_ORIGIN_KEY, 1);
        assert!(!non_string.is_support_origin());
    }
}
