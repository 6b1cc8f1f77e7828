use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use trevi::config::Config;
use trevi::http::{HeaderInfo, HttpParser, ParserHandler};
use trevi::net::{InetAddr, Socket, SocketType};

/// Logs every parser event.
#[derive(Default)]
struct EventLog {
    requests: usize,
    body_bytes: usize,
}

impl ParserHandler for EventLog {
    fn on_header(&mut self) {
        self.requests += 1;
        info!(request = self.requests, "header begin");
    }

    fn on_header_complete(&mut self, info: &HeaderInfo) {
        info!(
            method = info.method.as_deref().unwrap_or("-"),
            url = info.url.as_deref().unwrap_or("-"),
            headers = info.headers.len(),
            keep_alive = info.keep_alive(),
            "header complete"
        );
    }

    fn on_body(&mut self, chunk: &[u8]) {
        self.body_bytes += chunk.len();
        info!(bytes = chunk.len(), "body chunk");
    }

    fn on_body_complete(&mut self) {
        info!(total = self.body_bytes, "body complete");
        self.body_bytes = 0;
    }
}

fn open_socket(cfg: &Config) -> anyhow::Result<Socket<InetAddr>> {
    let addr = cfg.socket_addr()?;
    let mut socket = Socket::create(InetAddr::from(addr), SocketType::Stream)
        .context("creating socket")?;

    let options = cfg.socket_options.to_options();
    socket
        .set_socket_option(&options)
        .context("applying socket options")?;
    for option in &options {
        let value = socket.get_socket_option(*option)?;
        info!(?option, value, "socket option");
    }

    socket.set_nonblocking(cfg.nonblocking)?;
    socket.bind().with_context(|| format!("binding {}", addr))?;
    info!("Bound {}", addr);

    Ok(socket)
}

async fn replay(path: PathBuf, cfg: &Config) -> anyhow::Result<()> {
    let data = tokio::fs::read(&path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;

    let mut parser = HttpParser::with_config(EventLog::default(), cfg.parser_config());
    for chunk in data.chunks(cfg.read_buffer_size.max(1)) {
        parser.execute(chunk)?;
    }

    info!(
        requests = parser.handler().requests,
        state = ?parser.state(),
        "replay finished"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let mut socket = open_socket(&cfg)?;

    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        tokio::select! {
            res = replay(path, &cfg) => {
                res?;
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
            }
        }
    }

    socket.close()?;
    Ok(())
}
