use crate::domain_port::*;
use crate::logger::*;

pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::LoggedIn => info!("Logged in successfully"),
            Notice::LoggedOut => info!("Logged out"),
            Notice::SessionExpired => warn!("Session expired. Please log in again."),
        }
    }
}
