use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "mr-bridge-cli")]
#[command(about = "Drive a running mr-bridge from the terminal", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:21036")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the merge request's assignees
    Assign {
        /// User ids; none clears the assignees
        ids: Vec<u64>,
    },
    /// Leave a comment, on a diff line when --file is given
    Comment {
        body: String,
        #[arg(long)]
        file: Option<String>,
        #[arg(long)]
        new_line: Option<u32>,
        #[arg(long)]
        old_line: Option<u32>,
        #[arg(long, default_value = "")]
        base_sha: String,
        #[arg(long, default_value = "")]
        start_sha: String,
        #[arg(long, default_value = "")]
        head_sha: String,
    },
    /// Rewrite a note
    Edit {
        discussion_id: String,
        note_id: u64,
        body: String,
    },
    /// Delete a note
    Delete {
        discussion_id: String,
        note_id: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let url = format!("{}/comment", cli.url);

    let res = match cli.command {
        Commands::Assign { ids } => {
            client
                .put(format!("{}/mr/assignee", cli.url))
                .json(&json!({ "ids": ids }))
                .send()
                .await?
        }
        Commands::Comment {
            body,
            file,
            new_line,
            old_line,
            base_sha,
            start_sha,
            head_sha,
        } => {
            let payload = match file {
                Some(file) => json!({
                    "comment": body,
                    "file_name": file,
                    "new_line": new_line,
                    "old_line": old_line,
                    "base_commit_sha": base_sha,
                    "start_commit_sha": start_sha,
                    "head_commit_sha": head_sha,
                    "type": "text",
                }),
                None => json!({ "comment": body }),
            };
            client.post(url).json(&payload).send().await?
        }
        Commands::Edit {
            discussion_id,
            note_id,
            body,
        } => {
            client
                .patch(url)
                .json(&json!({ "discussion_id": discussion_id, "note_id": note_id, "comment": body }))
                .send()
                .await?
        }
        Commands::Delete {
            discussion_id,
            note_id,
        } => {
            client
                .delete(url)
                .json(&json!({ "discussion_id": discussion_id, "note_id": note_id }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let json: Value = res.json().await?;

    if !status.is_success() {
        eprintln!("Error: mr-bridge returned status {}", status);
        eprintln!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
