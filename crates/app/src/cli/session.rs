use clap::Args;

use rouge_app::{context::AppContext, session::AccessToken};

#[derive(Debug, Args)]
pub(crate) struct LoginArgs {
    /// Bearer token issued by the storefront
    #[arg(long, env = "ROUGE_TOKEN", hide_env_values = true)]
    token: String,
}

pub(crate) async fn login(context: &AppContext, args: LoginArgs) -> Result<(), String> {
    if args.token.trim().is_empty() {
        return Err("token cannot be empty".to_string());
    }

    context
        .resume()
        .await
        .map_err(|error| format!("failed to read session: {error}"))?;

    let report = context
        .login(AccessToken::new(args.token.trim()))
        .await
        .map_err(|error| format!("failed to save session: {error}"))?;

    println!("logged in");

    if let Some(report) = report {
        println!("moved {} item(s) from the guest cart", report.migrated.len());

        for sku in &report.failed {
            println!("could not move: {sku}");
        }
    }

    Ok(())
}

pub(crate) async fn logout(context: &AppContext) -> Result<(), String> {
    context
        .logout()
        .await
        .map_err(|error| format!("failed to clear session: {error}"))?;

    println!("logged out");

    Ok(())
}
