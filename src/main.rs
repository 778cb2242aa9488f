use std::sync::Arc;

use coi_serve::config::{AppState, Config};
use coi_serve::error::ServerError;
use coi_serve::{logger, server};

fn main() -> Result<(), ServerError> {
    let cfg = Config::load()?;
    logger::init(&cfg.logging)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), ServerError> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(AppState::new(cfg)?);

    let listener = match server::create_listener(addr) {
        Ok(l) => l,
        Err(e) => {
            if let ServerError::Bind { addr, source } = &e {
                logger::log_bind_failed(addr, source);
            }
            return Err(e);
        }
    };

    if !state.site.root().is_dir() {
        logger::log_warning(&format!(
            "Asset root {} is not a directory, every request will be 404",
            state.site.root().display()
        ));
    }
    logger::log_server_start(&addr, &state.config, state.site.root());

    server::start_server_loop(listener, state, server::shutdown_signal()).await;
    Ok(())
}
