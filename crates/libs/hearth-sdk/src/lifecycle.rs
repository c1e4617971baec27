use crate::error::SupportError;
use crate::types::InstallConfig;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    New,
    Installed,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum SessionMethod {
    Install,
    SetUserIdentifier,
    SetNameAndEmail,
    SetDelegate,
    LeaveBreadcrumb,
    ClearBreadcrumbs,
    SetMetadataBlock,
    ShowScreen,
    RegisterDeviceToken,
    HandleNotification,
    NotificationCount,
    RefreshNotificationCount,
    IssueReport,
    SessionEnded,
}

impl SessionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::SetUserIdentifier => "set_user_identifier",
            Self::SetNameAndEmail => "set_name_and_email",
            Self::SetDelegate => "set_delegate",
            Self::LeaveBreadcrumb => "leave_breadcrumb",
            Self::ClearBreadcrumbs => "clear_breadcrumbs",
            Self::SetMetadataBlock => "set_metadata_block",
            Self::ShowScreen => "show_screen",
            Self::RegisterDeviceToken => "register_device_token",
            Self::HandleNotification => "handle_notification",
            Self::NotificationCount => "notification_count",
            Self::RefreshNotificationCount => "refresh_notification_count",
            Self::IssueReport => "issue_report",
            Self::SessionEnded => "session_ended",
        }
    }
}

/// Install state machine: `New` until the one successful `install`, then
/// `Installed` for the rest of the process. There is no teardown transition.
#[derive(Debug, Default)]
pub struct Lifecycle {
    state: SessionState,
    config: Option<InstallConfig>,
}

impl Lifecycle {
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> Option<&InstallConfig> {
        self.config.as_ref()
    }

    pub fn ensure_method_legal(&self, method: SessionMethod) -> Result<(), SupportError> {
        if legal_states_for_method(method).contains(&self.state) {
            return Ok(());
        }
        Err(match self.state {
            SessionState::New => SupportError::not_installed(method.as_str()),
            SessionState::Installed => SupportError::already_installed(),
        })
    }

    /// Transition `New` → `Installed`. A second install is always a reported
    /// logic error, even with an identical request: dependents may already
    /// have cached the first config.
    pub fn mark_installed(&mut self, config: InstallConfig) -> Result<(), SupportError> {
        if self.state != SessionState::New {
            return Err(SupportError::already_installed());
        }
        self.state = SessionState::Installed;
        self.config = Some(config);
        Ok(())
    }
}

fn legal_states_for_method(method: SessionMethod) -> &'static [SessionState] {
    use SessionState as S;
    match method {
        SessionMethod::Install => &[S::New],
        SessionMethod::SetUserIdentifier
        | SessionMethod::SetNameAndEmail
        | SessionMethod::SetDelegate
        | SessionMethod::LeaveBreadcrumb
        | SessionMethod::ClearBreadcrumbs
        | SessionMethod::SetMetadataBlock
        | SessionMethod::ShowScreen
        | SessionMethod::RegisterDeviceToken
        | SessionMethod::HandleNotification
        | SessionMethod::NotificationCount
        | SessionMethod::RefreshNotificationCount
        | SessionMethod::IssueReport
        | SessionMethod::SessionEnded => &[S::Installed],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::code;

    const ALL_METHODS: [SessionMethod; 14] = [
        SessionMethod::Install,
        SessionMethod::SetUserIdentifier,
        SessionMethod::SetNameAndEmail,
        SessionMethod::SetDelegate,
        SessionMethod::LeaveBreadcrumb,
        SessionMethod::ClearBreadcrumbs,
        SessionMethod::SetMetadataBlock,
        SessionMethod::ShowScreen,
        SessionMethod::RegisterDeviceToken,
        SessionMethod::HandleNotification,
        SessionMethod::NotificationCount,
        SessionMethod::RefreshNotificationCount,
        SessionMethod::IssueReport,
        SessionMethod::SessionEnded,
    ];

    fn sample_config() -> InstallConfig {
        InstallConfig {
            api_key: "key".to_owned(),
            domain_name: "acme.example.com".to_owned(),
            app_id: "acme_app".to_owned(),
            in_app_notifications: true,
        }
    }

    #[test]
    fn method_legality_matrix_enforced() {
        let mut lifecycle = Lifecycle::default();
        for method in ALL_METHODS {
            let legal = lifecycle.ensure_method_legal(method);
            if method == SessionMethod::Install {
                assert!(legal.is_ok(), "install must be legal before install");
            } else {
                let err = legal.expect_err("non-install methods are illegal before install");
                assert_eq!(err.code(), code::RUNTIME_NOT_INSTALLED);
            }
        }

        lifecycle.mark_installed(sample_config()).expect("new -> installed");

        for method in ALL_METHODS {
            let legal = lifecycle.ensure_method_legal(method);
            if method == SessionMethod::Install {
                let err = legal.expect_err("install is illegal once installed");
                assert_eq!(err.code(), code::RUNTIME_ALREADY_INSTALLED);
            } else {
                assert!(legal.is_ok(), "{} must be legal once installed", method.as_str());
            }
        }
    }

    #[test]
    fn second_install_is_rejected_even_with_identical_config() {
        let mut lifecycle = Lifecycle::default();
        lifecycle.mark_installed(sample_config()).expect("first install");
        let err = lifecycle.mark_installed(sample_config()).expect_err("second install must fail");
        assert_eq!(err.code(), code::RUNTIME_ALREADY_INSTALLED);
    }

    #[test]
    fn install_retains_config() {
        let mut lifecycle = Lifecycle::default();
        assert!(lifecycle.config().is_none());
        lifecycle.mark_installed(sample_config()).expect("install");
        assert_eq!(lifecycle.state(), SessionState::Installed);
        assert_eq!(
            lifecycle.config().map(|config| config.app_id.as_str()),
            Some("acme_app")
        );
    }

    #[test]
    fn not_installed_error_names_the_method() {
        let lifecycle = Lifecycle::default();
        let err = lifecycle
            .ensure_method_legal(SessionMethod::ShowScreen)
            .expect_err("show_screen before install");
        assert_eq!(
            err.details.get("method").and_then(serde_json::Value::as_str),
            Some("show_screen")
        );
    }
}
