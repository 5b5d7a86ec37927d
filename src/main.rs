mod config;
mod debounce;
mod engine;
mod input;
mod matcher;
mod model;
mod sources;
mod state;
mod summary;
mod ui;

use anyhow::{Context, Result, anyhow, bail};
use calloop::EventLoop;
use calloop::channel::Event;
use clap::Parser;
use std::io::{self, BufRead, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::Instant;
use crate::config::{load_config, load_config_from};
use crate::engine::CatalogFilterEngine;
use crate::input::InputEvent;
use crate::sources::downloads::collect_downloads;
use crate::sources::index::{build_index, now_iso, write_index};
use crate::sources::{Source, index::IndexSource, packages::PackagesSource};
use crate::ui::render::Renderer;
use crate::ui::terminal::{CopyTargets, TerminalSink};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Built index.json to load
    #[arg(short, long)]
    index: Option<PathBuf>,

    /// Directory of per-package JSON files, used when no index is given
    #[arg(short, long)]
    packages_dir: Option<PathBuf>,

    /// Refuse to start if any package file is invalid
    #[arg(long)]
    strict: bool,

    /// Validate the packages directory and exit
    #[arg(long)]
    validate: bool,

    /// Build an index.json from the packages directory and exit
    #[arg(long, value_name = "OUT")]
    build_index: Option<PathBuf>,

    /// Registry owner recorded in a built index
    #[arg(long, default_value = "")]
    owner: String,

    /// Registry repository recorded in a built index
    #[arg(long, default_value = "")]
    repo: String,

    /// Package prefix recorded in a built index
    #[arg(long, default_value = "maven")]
    prefix: String,

    /// Print every downloadable artifact of the packages directory and exit
    #[arg(long)]
    list_downloads: bool,

    /// Config file to use instead of the platform default
    #[arg(short, long)]
    config: Option<PathBuf>,
}

struct App<W: Write> {
    engine: CatalogFilterEngine<TerminalSink<W>, CopyTargets>,
    copy_targets: CopyTargets,
    should_exit: bool,
}

impl<W: Write> App<W> {
    fn handle_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        match line.parse::<InputEvent>() {
            Ok(event) => self.handle(event),
            Err(e) => log::warn!("Ignoring input: {}", e),
        }
    }

    fn handle(&mut self, event: InputEvent) {
        let now = Instant::now();
        match event {
            InputEvent::Search(raw) => self.engine.set_query(&raw, now),
            InputEvent::ClearSearch => self.engine.clear_query(now),
            InputEvent::Category(name) => self.engine.set_category(name.as_deref(), now),
            InputEvent::ClearCategory => self.engine.clear_category(now),
            InputEvent::CategorySearch(substring) => self.engine.filter_category_options(&substring, now),
            InputEvent::Escape => self.engine.clear_category_search(),
            InputEvent::Copy(position) => {
                if let Some(query) = self.copy(position) {
                    println!("copied: {query}");
                }
            }
            InputEvent::Quit => self.shutdown(),
        }
    }

    /// Results may still be pending; this copies what is on screen.
    fn copy(&self, position: usize) -> Option<String> {
        let query = self.copy_targets.get(position);
        if query.is_none() {
            log::warn!(
                "No entry #{} to copy ({} visible)",
                position,
                self.copy_targets.len()
            );
        }
        query
    }

    fn shutdown(&mut self) {
        self.engine.flush();
        log::info!(
            "Exiting with {} visible entries (query '{}', category {:?}) after {} recomputes",
            self.engine.results().len(),
            self.engine.filter().query,
            self.engine.filter().selected_category,
            self.engine.recompute_count()
        );
        self.should_exit = true;
    }
}

/// Forwards input lines until EOF or until `send` refuses one. Bytes that are
/// not UTF-8 are replaced rather than ending the session.
fn read_input<R: BufRead>(mut reader: R, mut send: impl FnMut(String) -> bool) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                if !send(line.trim_end_matches(['\r', '\n']).to_string()) {
                    break;
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                log::warn!("Stopped reading input: {}", e);
                break;
            }
        }
    }
}

fn catalog_source(index: Option<PathBuf>, packages_dir: Option<PathBuf>, strict: bool) -> Result<Box<dyn Source>> {
    match (index, packages_dir) {
        (Some(path), _) => Ok(Box::new(IndexSource::new(path))),
        (None, Some(dir)) => Ok(Box::new(PackagesSource::new(dir, strict))),
        (None, None) => bail!("no catalog given: pass --index or --packages-dir, or set them in the config file"),
    }
}

fn validate(packages_dir: Option<PathBuf>) -> Result<()> {
    let dir = packages_dir.context("--validate needs --packages-dir or general.packages_dir")?;
    let collected = PackagesSource::new(&dir, true).collect();

    if !collected.errors.is_empty() {
        println!("Validation failed for one or more package files:\n");
        for e in &collected.errors {
            println!(" - {e}");
        }
        bail!("{} problem(s) under {}", collected.errors.len(), dir.display());
    }

    println!("[OK] {} package(s) valid under {}", collected.packages.len(), dir.display());
    Ok(())
}

fn build(packages_dir: Option<PathBuf>, out: &Path, args: &Args) -> Result<ExitCode> {
    let dir = packages_dir.context("--build-index needs --packages-dir or general.packages_dir")?;
    let collected = PackagesSource::new(&dir, args.strict).collect();

    if !collected.errors.is_empty() {
        if args.strict {
            eprintln!("Validation failed for one or more package files:\n");
            for e in &collected.errors {
                eprintln!(" - {e}");
            }
            return Ok(ExitCode::from(2));
        }
        for e in &collected.errors {
            log::warn!("{}", e);
        }
        log::warn!(
            "Skipped {} invalid package file(s); index contains only valid packages",
            collected.errors.len()
        );
    }

    let index = build_index(&collected.packages, &args.owner, &args.repo, &args.prefix, &now_iso())?;
    write_index(&index, out)?;
    println!("Wrote {} package(s) to {}", index.packages.len(), out.display());
    Ok(ExitCode::SUCCESS)
}

fn list_downloads(packages_dir: Option<PathBuf>) -> Result<()> {
    let dir = packages_dir.context("--list-downloads needs --packages-dir or general.packages_dir")?;
    for download in collect_downloads(&PackagesSource::new(dir, false))? {
        println!("{download}");
    }
    Ok(())
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();

    // 1. Load Config
    let config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    let index = args.index.clone().or_else(|| config.general.index.clone());
    let packages_dir = args.packages_dir.clone().or_else(|| config.general.packages_dir.clone());

    if args.validate {
        validate(packages_dir)?;
        return Ok(ExitCode::SUCCESS);
    }
    if let Some(out) = &args.build_index {
        return build(packages_dir, out, &args);
    }
    if args.list_downloads {
        list_downloads(packages_dir)?;
        return Ok(ExitCode::SUCCESS);
    }

    // 2. Snapshot the catalog
    let entries = catalog_source(index, packages_dir, args.strict)?.scan()?;

    // 3. Mount the engine
    let copy_targets = CopyTargets::new();
    let sink = TerminalSink::new(
        io::stdout(),
        Renderer::new(config.general.show_details),
        config.widgets.clone(),
    );
    let engine = CatalogFilterEngine::new(
        entries,
        sink,
        copy_targets.clone(),
        config.debounce.clone(),
        &config.general.item_label,
    );
    let mut app = App {
        engine,
        copy_targets,
        should_exit: false,
    };

    // 4. Register the input channel, then feed stdin lines into it
    let mut event_loop: EventLoop<App<io::Stdout>> = EventLoop::try_new()?;
    let (tx_input, rx_input) = calloop::channel::channel::<String>();
    event_loop
        .handle()
        .insert_source(rx_input, |event, _, app: &mut App<io::Stdout>| match event {
            Event::Msg(line) => app.handle_line(&line),
            Event::Closed => app.shutdown(),
        })
        .map_err(|e| anyhow!("registering input source: {}", e.error))?;

    thread::spawn(move || read_input(io::stdin().lock(), |line| tx_input.send(line).is_ok()));

    // 5. Run Loop, waking for the earliest debounce deadline
    loop {
        if app.should_exit {
            break;
        }
        let timeout = app
            .engine
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()));
        event_loop.dispatch(timeout, &mut app)?;
        app.engine.poll(Instant::now());
    }

    Ok(ExitCode::SUCCESS)
}
