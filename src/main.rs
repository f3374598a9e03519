use revalyze::app::*;
use revalyze::application_port::{AuthService, LoginInput};
use revalyze::logger::*;
use revalyze::settings::*;
use tokio::signal;

const PASSWORD_ENV: &str = "REVALYZE_PASSWORD";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let app = App::try_new(&project_settings)?;

    if cli.logout {
        app.auth_service.logout().await;
        app.shutdown().await;
        return Ok(());
    }

    if let Some(email) = cli.email {
        let password = std::env::var(PASSWORD_ENV)
            .map_err(|_| anyhow::anyhow!("{} must be set to log in", PASSWORD_ENV))?;
        if let Err(e) = app.auth_service.login(LoginInput { email, password }).await {
            error!("login failed: {}", e);
            app.shutdown().await;
            return Err(e.into());
        }
    }

    let state = app.guard().ready().await;
    info!(?state, path = %app.navigator.current_path(), "session checked");

    signal::ctrl_c().await?;

    let shutdown_timeout = std::time::Duration::from_secs(10);
    match tokio::time::timeout(shutdown_timeout, app.shutdown()).await {
        Ok(_) => info!("client shutdown successfully"),
        Err(_) => error!("client shutdown timed out"),
    }

    Ok(())
}
