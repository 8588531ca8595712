use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::cli::{utils::output_fields, OutputFormat};
use crate::config::config;

#[derive(Args)]
pub struct TokenArgs {
    #[arg(long, help = "User id (random when omitted)")]
    pub user: Option<Uuid>,

    #[arg(long, help = "Email claim")]
    pub email: Option<String>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config().security;
    let user_id = args.user.unwrap_or_else(Uuid::new_v4);
    let claims = Claims::new(user_id, args.email, security);
    let token = generate_jwt(&claims, security)?;

    output_fields(
        output_format,
        &json!({
            "user_id": user_id,
            "expires_at": claims.exp,
            "token": token,
        }),
    )
}
