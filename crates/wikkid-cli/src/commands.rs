use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use wikkid_filestore::FileStoreConfig;
use wikkid_sdk::{ViewHandler, Wiki};
use wikkid_store::{ChangeAction, DiskTree};
use wikkid_types::{Author, EntryKind, RevisionId};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let root = cli.root.as_path();
    match cli.command {
        Command::Init => cmd_init(root),
        Command::Cat(args) => cmd_cat(&open_wiki(root, cli.config.as_deref())?, args),
        Command::Put(args) => cmd_put(&open_wiki(root, cli.config.as_deref())?, args),
        Command::Info(args) => cmd_info(&open_wiki(root, cli.config.as_deref())?, args),
        Command::Log(args) => cmd_log(&open_wiki(root, cli.config.as_deref())?, args),
    }
}

fn open_wiki(root: &Path, config: Option<&Path>) -> anyhow::Result<Wiki<DiskTree>> {
    let config = match config {
        Some(path) => FileStoreConfig::load(path)?,
        None => FileStoreConfig::default(),
    };
    let tree = DiskTree::open(root)
        .with_context(|| format!("no wiki at {} (run `wikkid init`)", root.display()))?;
    Ok(Wiki::with_config(Arc::new(tree), config)?)
}

fn cmd_init(root: &Path) -> anyhow::Result<()> {
    DiskTree::init(root)?;
    println!(
        "{} Initialized empty wiki in {}",
        "✓".green().bold(),
        root.display().to_string().bold()
    );
    Ok(())
}

fn cmd_cat(wiki: &Wiki<DiskTree>, args: CatArgs) -> anyhow::Result<()> {
    let entry = wiki.store().entry(&args.path)?;
    match entry.kind()? {
        EntryKind::Absent => bail!("{} does not exist", entry.path()),
        EntryKind::Directory => {
            for (name, kind) in entry.children()? {
                if kind.is_directory() {
                    println!("{}/", name.blue().bold());
                } else {
                    println!("{name}");
                }
            }
        }
        EntryKind::File => {
            let content = entry.content()?.unwrap_or_default();
            io::stdout().write_all(&content)?;
        }
    }
    Ok(())
}

fn cmd_put(wiki: &Wiki<DiskTree>, args: PutArgs) -> anyhow::Result<()> {
    let content = match &args.file {
        Some(file) => fs::read(file).with_context(|| format!("reading {}", file.display()))?,
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };
    let author = Author::parse(&args.author)?;
    let entry = wiki.store().entry(&args.path)?;
    let parent = match &args.parent {
        Some(rev) => Some(RevisionId::from_hex(rev)?),
        None if args.force => entry.last_modified()?,
        None => {
            if entry.kind()?.is_file() {
                let current = entry
                    .last_modified()?
                    .map(|rev| rev.to_string())
                    .unwrap_or_default();
                bail!(
                    "{} already exists; pass --parent {current} to overwrite it, or --force",
                    entry.path()
                );
            }
            None
        }
    };

    let revision = wiki.update_page(
        &args.path,
        &content,
        &author,
        parent,
        args.message.as_deref(),
    )?;
    println!(
        "{} {} {} ({} bytes)",
        "✓".green().bold(),
        revision.short_id().yellow(),
        args.path.bold(),
        content.len()
    );
    Ok(())
}

fn cmd_info(wiki: &Wiki<DiskTree>, args: InfoArgs) -> anyhow::Result<()> {
    let dispatch = wiki.dispatch(&args.path, args.view.as_deref())?;
    let resource = &dispatch.resource;
    let file = resource.file();

    println!("{:<10}{}", "path:", resource.path().to_string().bold());
    println!("{:<10}{}", "kind:", resource.kind().to_string().cyan());
    if let Some(id) = file.file_id() {
        println!("{:<10}{}", "file id:", id.short_id().dimmed());
    }
    if let Some(rev) = file.last_modified()? {
        println!("{:<10}{}", "modified:", rev.short_id().yellow());
    }
    println!("{:<10}{}", "type:", resource.mimetype());
    println!("{:<10}{}", "views:", wiki.views_for(&args.path)?.join(", "));

    let requested = args.view.as_deref().unwrap_or("<default>");
    match dispatch.view {
        Some(view) => println!(
            "{:<10}{} {}",
            "view:",
            view.name().unwrap_or("?").green(),
            format!("(from {})", view.capability().map(|c| c.as_str()).unwrap_or("?")).dimmed()
        ),
        None => println!("{:<10}{} {}", "view:", "none".red(), format!("for {requested}").dimmed()),
    }
    Ok(())
}

fn cmd_log(wiki: &Wiki<DiskTree>, args: LogArgs) -> anyhow::Result<()> {
    let history = wiki.history(args.limit)?;
    if history.is_empty() {
        println!("No revisions.");
        return Ok(());
    }
    for rev in history {
        println!(
            "{}  {}  {}",
            rev.id.short_id().yellow().bold(),
            rev.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            rev.author
        );
        println!("    {}", rev.message);
        for change in &rev.changes {
            let marker = match change.action {
                ChangeAction::Added => "+".green(),
                ChangeAction::Modified => "~".yellow(),
            };
            println!("    {marker} {}", change.path);
        }
    }
    Ok(())
}
