#![allow(dead_code)]

mod mock_backend;

pub use mock_backend::*;

use revalyze::app::App;
use revalyze::domain_port::*;
use revalyze::infra_http::ReqwestTransport;
use revalyze::infra_local::*;
use revalyze::settings::{Settings, parse_settings_str};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("revalyze-it-{}", uuid::Uuid::new_v4()))
}

pub fn settings_for(base_url: &str, storage_dir: &Path, coalesce_refresh: bool) -> Settings {
    let toml = format!(
        r#"
        [auth]
        backend = "real"

        [api]
        base_url = "{}"
        timeout_secs = 5

        [session]
        storage_dir = "{}"
        coalesce_refresh = {}

        [log]
        filter = "debug"
        "#,
        base_url,
        storage_dir.display(),
        coalesce_refresh
    );
    parse_settings_str(&toml).unwrap()
}

/// Full production wiring against the mock backend, starting at `path`.
pub fn app_at(backend: &MockBackend, storage_dir: &Path, path: &str) -> App {
    app_with(backend, storage_dir, path, true)
}

pub fn app_with(
    backend: &MockBackend,
    storage_dir: &Path,
    path: &str,
    coalesce_refresh: bool,
) -> App {
    let settings = settings_for(&backend.base_url, storage_dir, coalesce_refresh);
    let transport: Arc<dyn HttpTransport> =
        Arc::new(ReqwestTransport::new(Some(Duration::from_secs(5))).unwrap());
    let persistence: Arc<dyn SessionPersistence> = Arc::new(FileSessionPersistence::new(
        storage_dir,
        &settings.session.storage_key,
    ));
    App::assemble(
        &settings,
        transport,
        persistence,
        Arc::new(TracingNavigator::new(path)),
        Arc::new(TracingNotifier),
    )
    .unwrap()
}
