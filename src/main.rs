use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;

use viewprobe::cli::{Cli, Commands, QueryCommand, TreeCommand};
use viewprobe::config::{Config, HostKind};
use viewprobe::console::Console;
use viewprobe::host::ViewHost;
use viewprobe::hosts::mem::MemHost;
use viewprobe::inspect::Inspector;
use viewprobe::view::View;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Tree(cmd) => run_tree(&cmd),
        Commands::Query(cmd) => run_query(&cmd),
        Commands::Console(cmd) => {
            let config = cmd.to_config()?;
            let inspector = attach(&config)?;
            run_console(inspector, config)
        }
    }
}

/// Build the configured host and attach the inspection facade to it.
fn attach(config: &Config) -> Result<Inspector> {
    let host: Arc<dyn ViewHost> = match config.host_kind {
        HostKind::Mem => match &config.snapshot {
            Some(path) => Arc::new(
                MemHost::load(path)
                    .with_context(|| format!("loading snapshot {}", path.display()))?,
            ),
            None => Arc::new(MemHost::demo()),
        },
        HostKind::Android => android_host()?,
    };
    Ok(Inspector::attach(host)?)
}

#[cfg(feature = "android-host")]
fn android_host() -> Result<Arc<dyn ViewHost>> {
    Ok(Arc::new(viewprobe::hosts::android::AndroidHost::attach()?))
}

#[cfg(not(feature = "android-host"))]
fn android_host() -> Result<Arc<dyn ViewHost>> {
    bail!("this build has no live-host backend (rebuild with --features android-host)")
}

/// Focused window root, the scope every one-shot command searches.
fn focused_root(inspector: &Inspector) -> Result<View> {
    match inspector.current_root()? {
        Some(root) => Ok(root),
        None => bail!("no focused window"),
    }
}

fn run_tree(cmd: &TreeCommand) -> Result<()> {
    let config = cmd.to_config();
    let inspector = attach(&config)?;
    let root = focused_root(&inspector)?;
    print!("{}", root.render_tree(Some(config.tree_depth_limit)));
    Ok(())
}

fn run_query(cmd: &QueryCommand) -> Result<()> {
    let config = cmd.host.to_config();
    let inspector = attach(&config)?;
    let root = focused_root(&inspector)?;
    let (selector, traversal) = cmd.to_selector(root, inspector.registry())?;

    if cmd.all {
        let views = selector.find_all();
        if views.is_empty() {
            println!("[*] no matches");
            return Ok(());
        }
        for (index, view) in views.iter().enumerate() {
            println!("[{}] {}", index, view);
        }
        println!("[*] {} match(es)", views.len());
    } else {
        match selector.find_with(traversal) {
            Some(view) => println!("[+] {}", view),
            None => println!("[*] no match"),
        }
    }
    Ok(())
}

/// Feed stdin lines through the console until `quit` or EOF.
fn run_console(inspector: Inspector, config: Config) -> Result<()> {
    let mut console = Console::new(inspector, config);
    println!("[*] viewprobe console ('help' lists commands)");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();
    loop {
        write!(stdout, "{}", console.prompt())?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let reply = console.eval(&line);
        if !reply.text.is_empty() {
            println!("{}", reply.text);
        }
        if reply.quit {
            break;
        }
    }
    Ok(())
}
