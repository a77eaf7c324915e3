use crate::prelude::{eprintln, *};
use crate::service::CalculationService;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Serves newline-delimited JSON-RPC on stdin/stdout until stdin closes.
pub async fn run_stdio(service: &CalculationService, global: &crate::Global) -> Result<()> {
    if global.verbose {
        eprintln!("Calculator MCP server ready on stdio (history: {})", global.database);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read MCP request from stdin")?
    {
        let request = line.trim();
        if request.is_empty() {
            continue;
        }

        log::debug!("MCP request: {request}");

        let response = super::handle_request(request, service, global).await;
        let mut payload = serde_json::to_vec(&response)?;
        payload.push(b'\n');

        if global.verbose {
            eprintln!("MCP response: {}", String::from_utf8_lossy(&payload).trim_end());
        }

        stdout.write_all(&payload).await?;
        stdout.flush().await?;
    }

    log::debug!("MCP stdin closed");
    Ok(())
}
