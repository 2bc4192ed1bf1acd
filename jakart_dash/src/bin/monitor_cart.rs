/*
 * Copyright © 2025, the JAKART developers. All rights reserved.
 *
 * The “JAKART” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */
#![allow(unused)]

/// console monitor for the JAKART cart: prints a projected map scene for each dashboard update and reads
/// operator commands from stdin

use std::path::PathBuf;
use anyhow::Result;
use clap::Parser;
use tokio::{io::{AsyncBufReadExt, BufReader}, select};
use tracing::{info,warn,error};
use tracing_subscriber::EnvFilter;

use jakart_dash::{DashConfig, dashboard::Dashboard, projection::Viewport, view::MapView};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "monitor the JAKART cart and send operator commands from stdin")]
pub struct Args {
    /// RON config file (default is dashboard.ron in $JAKART_CONFIG_DIR or ./local/config)
    #[arg(short,long)]
    pub config: Option<PathBuf>,

    /// rendering surface to project into, as <width>x<height>
    #[arg(short,long, default_value = "1583x909")]
    pub viewport: Viewport,
}

const HELP: &str = "commands: dest <id> | pullover | resume | status | resize <width>x<height> | help";

#[tokio::main]
async fn main()->Result<()> {
    tracing_subscriber::fmt().with_env_filter( EnvFilter::from_default_env()).init();

    let args = Args::parse();
    let config = DashConfig::load( args.config.as_deref())?;

    let mut dashboard = Dashboard::start( config)?;
    let mut view = dashboard.map_view( args.viewport);
    let mut snapshots = dashboard.subscribe();
    let mut lines = BufReader::new( tokio::io::stdin()).lines();

    println!("{HELP}");
    print_scene( &dashboard, &mut view);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        select! {
            _ = &mut ctrl_c => break,

            res = snapshots.changed() => {
                if res.is_err() { break }
                snapshots.borrow_and_update();
                print_scene( &dashboard, &mut view);
            }

            maybe_line = lines.next_line() => {
                match maybe_line {
                    Ok(Some(line)) => execute( &dashboard, &mut view, line.trim()),
                    Ok(None) => break, // stdin closed
                    Err(e) => { error!("failed to read stdin: {e}"); break }
                }
            }
        }
    }

    dashboard.shutdown().await;
    Ok(())
}

fn print_scene (dashboard: &Dashboard, view: &mut MapView) {
    let scene = view.update( &dashboard.snapshot());
    println!("{scene}");
    if let Some(msg) = scene.status.overlay_message() {
        println!("  >> {msg}");
    }
}

fn execute (dashboard: &Dashboard, view: &mut MapView, line: &str) {
    let (cmd, arg) = match line.split_once( char::is_whitespace) {
        Some((cmd,arg)) => (cmd, arg.trim()),
        None => (line, "")
    };
    let commands = dashboard.commands();

    let res = match cmd {
        "" => Ok(()),
        "dest" if !arg.is_empty() => commands.choose_destination( arg),
        "pullover" => commands.request_pullover(),
        "resume" => commands.resume(),
        "status" => {
            println!("channel: {}", dashboard.channel_status());
            print_scene( dashboard, view);
            Ok(())
        }
        "resize" => {
            match arg.parse::<Viewport>() {
                Ok(viewport) => { view.resize( viewport); print_scene( dashboard, view) }
                Err(e) => println!("{e}")
            }
            Ok(())
        }
        _ => { println!("{HELP}"); Ok(()) }
    };

    if let Err(e) = res {
        println!("{e}");
    }
}
