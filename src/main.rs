use clap::Parser;

use dispatch_server::cli::Cli;
use dispatch_server::{logger, Config, Server, TlsMaterial};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut cfg = Config::load_from(&cli.config)?;
    cli.apply(&mut cfg);
    cfg.validate()?;
    logger::init(&cfg.logging)?;

    // Connections are served as local tasks on one thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cfg, cli))
}

async fn async_main(cfg: Config, cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let tls_paths = cfg.tls.cert.clone().zip(cfg.tls.key.clone());
    let server = Server::new(cfg).with_startup_args(cli.startup_args());

    match tls_paths {
        Some((cert, key)) => {
            let material = TlsMaterial::from_pem_files(&cert, &key)?;
            server.serve_secure(material, None, None).await?;
        }
        None => server.serve(None, None).await?,
    }

    Ok(())
}
