//! モックサーバーの起動バイナリ

use clap::Parser;
use mock_server::MockServer;

#[derive(Debug, Parser)]
#[command(name = "mock-server", version, about = "Daily games admin API mock server")]
struct Args {
    /// 待ち受けポート
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let server = MockServer::default();
    server.set_public_base(format!("http://127.0.0.1:{}", args.port));
    let routes = server.routes().recover(mock_server::handle_rejection);

    log::info!("mock server listening on 127.0.0.1:{}", args.port);
    warp::serve(routes).run(([127, 0, 0, 1], args.port)).await;
}
