use super::Parser;

#[derive(Parser, Debug)]
#[command(name = "revalyze", about = "Revalyze session client")]
pub struct Cli {
    #[arg(long)]
    pub settings: Option<String>,

    /// Log in as this user; the password is read from `REVALYZE_PASSWORD`.
    #[arg(long)]
    pub email: Option<String>,

    /// End the stored session and exit.
    #[arg(long, conflicts_with = "email")]
    pub logout: bool,
}
