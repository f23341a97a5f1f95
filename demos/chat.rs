use std::io::{self, BufRead, Write};

use queryme_http::{chat::ChatSession, AssistantClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("queryme_http=debug")),
        )
        .with_writer(io::stderr)
        .init();

    let assistant = AssistantClient::from_env()?;
    println!("QueryMe AI - ask anything ({})", assistant.query_url());
    let mut session = ChatSession::new(assistant);

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if let Some(reply) = session.send_message(line.trim_end()).await {
            println!("{}\n", reply.content);
        }
    }

    Ok(())
}
