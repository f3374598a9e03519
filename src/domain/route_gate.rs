use crate::domain_model::AuthState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate<T> {
    Render(T),
    Redirect(String),
}

/// Wraps protected content. Anything short of a confirmed session, including
/// the initial loading state, is sent to the public root.
#[derive(Debug, Clone, Copy)]
pub struct RouteGate<'a> {
    state: AuthState,
    public_root: &'a str,
}

impl<'a> RouteGate<'a> {
    pub fn new(state: AuthState, public_root: &'a str) -> Self {
        Self { state, public_root }
    }

    pub fn guard<T>(&self, render: impl FnOnce() -> T) -> Gate<T> {
        if self.state.is_authenticated() {
            Gate::Render(render())
        } else {
            Gate::Redirect(self.public_root.to_string())
        }
    }
}
