// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! hub0 - motion-triggered lighting daemon.
//!
//! Connects to an MQTT broker over TLS and runs the hub loop until
//! interrupted. Flags mirror the deployed service:
//!
//! ```text
//! hub0 --host <HOST> --username <USER> --password <PASS> --cacerts <FILE> [--debug]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use lighthub::{Hub, MqttConfig};
use tracing::level_filters::LevelFilter;

const USAGE: &str =
    "usage: hub0 --host <HOST> --username <USER> --password <PASS> --cacerts <FILE> [--debug]";

struct Args {
    host: String,
    username: String,
    password: String,
    cacerts: PathBuf,
    debug: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut host = None;
    let mut username = None;
    let mut password = None;
    let mut cacerts = None;
    let mut debug = false;

    while let Some(flag) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .ok_or_else(|| format!("{name} requires a value"))
        };
        match flag.as_str() {
            "-H" | "--host" => host = Some(value("--host")?),
            "-u" | "--username" => username = Some(value("--username")?),
            "-p" | "--password" => password = Some(value("--password")?),
            "-F" | "--cacerts" => cacerts = Some(PathBuf::from(value("--cacerts")?)),
            "-D" | "--debug" => debug = true,
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    Ok(Args {
        host: host.ok_or("--host is required")?,
        username: username.ok_or("--username is required")?,
        password: password.ok_or("--password is required")?,
        cacerts: cacerts.ok_or("--cacerts is required")?,
        debug,
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    let level = if args.debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = match MqttConfig::builder()
        .host(args.host)
        .credentials(args.username, args.password)
        .ca_certs(args.cacerts)
        .client_id("hub0")
        .build()
    {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(error = %error, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(host = %config.host(), port = config.port(), "connecting to broker");
    let mut hub = match Hub::connect(config).await {
        Ok(hub) => hub,
        Err(error) => {
            tracing::error!(error = %error, "failed to connect to broker");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = hub.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.stop();
        }
    });

    match hub.spin().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %error, "hub terminated");
            ExitCode::FAILURE
        }
    }
}
