use serverless_platform_api::{token, CredentialStore};

use crate::{commands::AsyncCliCommand, opts::PlatformOpts};

/// Show who is logged in to the Serverless Platform.
#[derive(clap::Parser, Debug)]
pub struct CmdWhoami {
    #[clap(flatten)]
    platform: PlatformOpts,
}

#[async_trait::async_trait]
impl AsyncCliCommand for CmdWhoami {
    type Output = ();

    async fn run_async(self) -> Result<(), anyhow::Error> {
        let service_path = std::env::current_dir().ok();
        let credentials = self.platform.credentials(service_path.as_deref());

        let Some(user_id) = credentials.current_user_id() else {
            println!("Not logged in.");
            return Ok(());
        };

        match credentials.auth_token(&user_id) {
            Some(auth_token) => match token::nickname(&auth_token) {
                Ok(nickname) => println!("logged in as \"{nickname}\" ({user_id})"),
                Err(e) => {
                    tracing::warn!(
                        error = &e as &dyn std::error::Error,
                        "Unable to read the nickname from the auth token"
                    );
                    println!("logged in as {user_id}");
                }
            },
            None => println!("no auth token found for {user_id}"),
        }

        Ok(())
    }
}
