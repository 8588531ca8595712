use clap::Args;
use serde_json::json;

use crate::cli::{utils::output_fields, OutputFormat};
use crate::services::hashing::hash_text;

#[derive(Args)]
pub struct HashArgs {
    #[arg(required = true, help = "Question texts to hash")]
    pub texts: Vec<String>,
}

pub fn handle(args: HashArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let hashes: Vec<String> = args.texts.iter().map(|t| hash_text(t)).collect();
    match output_format {
        OutputFormat::Json => output_fields(output_format, &json!({ "hashes": hashes })),
        OutputFormat::Text => {
            for hash in hashes {
                println!("{}", hash);
            }
            Ok(())
        }
    }
}
