#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    LoggedIn,
    LoggedOut,
    /// Refresh token rejected, user forced back to login.
    SessionExpired,
}

/// Transient user-facing notifications (toasts).
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}
