pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    /// Client-side navigation that replaces the current history entry.
    fn replace(&self, path: &str);
    /// Full reload at `path`, dropping in-memory application state.
    fn hard_redirect(&self, path: &str);
}
