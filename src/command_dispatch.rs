//! Purpose: Hold top-level CLI command dispatch for `sumweb`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Results go to stdout; diagnostics go through tracing on stderr.

use std::net::{Ipv4Addr, SocketAddr};

use sumweb::api::{NumericArray, Precision, RemoteClient, demo};

use super::*;

pub(super) fn dispatch_command(command: Command) -> Result<RunOutcome, Error> {
    match command {
        Command::Serve(args) => {
            let config = serve_config_from_args(args)?;
            let runtime = build_runtime()?;
            runtime.block_on(serve::serve(config))?;
            Ok(RunOutcome::ok())
        }
        Command::Run { url } => {
            let client = RemoteClient::new(url)?;
            emit_demo(&client)?;
            Ok(RunOutcome::ok())
        }
        Command::Sum { url, numbers } => {
            let array = NumericArray::from_literals(&numbers)?;
            let client = RemoteClient::new(url)?;
            let response = client.sum(&array)?;
            let line = serde_json::to_string(&response).map_err(|err| {
                Error::new(ErrorKind::Encoding)
                    .with_message("failed to encode sum")
                    .with_source(err)
            })?;
            println!("{line}");
            Ok(RunOutcome::ok())
        }
        Command::Demo { port } => {
            run_in_process_demo(port)?;
            Ok(RunOutcome::ok())
        }
    }
}

fn serve_config_from_args(args: ServeArgs) -> Result<serve::ServeConfig, Error> {
    let bind: SocketAddr = args.bind.parse().map_err(|_| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid bind address")
            .with_hint("Use a host:port value like 127.0.0.1:8080.")
    })?;
    let config = serve::ServeConfig {
        bind,
        max_body_bytes: args.max_body_bytes,
        allow_non_loopback: args.allow_non_loopback,
        precision: Precision::new(args.decimals)?,
    };
    serve::validate_config(&config)?;
    Ok(config)
}

fn build_runtime() -> Result<tokio::runtime::Runtime, Error> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to start runtime")
                .with_source(err)
        })
}

fn emit_demo(client: &RemoteClient) -> Result<(), Error> {
    tracing::info!(url = %client.sum_url(), "running demo");
    for report in demo::run_demo(client)? {
        println!("{}", report.summary_line());
    }
    Ok(())
}

/// Binds before the client starts, so the demo never races server startup.
fn run_in_process_demo(port: u16) -> Result<(), Error> {
    let runtime = build_runtime()?;
    let config = serve::ServeConfig::loopback(SocketAddr::from((Ipv4Addr::LOCALHOST, port)));
    let listener = runtime.block_on(serve::bind(&config))?;
    let addr = listener.local_addr().map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read bound address")
            .with_source(err)
    })?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = runtime.spawn(async move {
        serve::serve_listener(listener, &config, async {
            let _ = shutdown_rx.await;
        })
        .await
    });

    let result = RemoteClient::new(format!("http://{addr}/sum")).and_then(|client| emit_demo(&client));
    let _ = shutdown_tx.send(());
    let served = runtime.block_on(server).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("server task failed")
            .with_source(err)
    })?;
    result?;
    served
}
