//! Sheaf CLI - Gather file content across workspace roots

mod render;

use clap::{Parser, Subcommand};
use render::render_blocks;
use sheaf_core::{Config, GatherRequest, Workspace};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheaf")]
#[command(about = "Safe multi-root file gathering", long_about = None)]
struct Cli {
    /// Workspace root directories (repeatable; first is the display target)
    #[arg(long, global = true)]
    root: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read and concatenate files matching the patterns
    Gather {
        /// Path or glob patterns
        patterns: Vec<String>,

        /// Additional include patterns
        #[arg(short, long)]
        include: Vec<String>,

        /// Exclude patterns (unioned with the default excludes)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Disable the built-in default excludes
        #[arg(long)]
        no_default_excludes: bool,

        /// Do not respect .gitignore rules
        #[arg(long)]
        no_gitignore: bool,

        /// Do not respect .sheafignore rules
        #[arg(long)]
        no_sheafignore: bool,
    },

    /// List files that would be gathered, without reading them
    Ls {
        /// Path or glob patterns
        patterns: Vec<String>,

        /// Additional include patterns
        #[arg(short, long)]
        include: Vec<String>,

        /// Exclude patterns (unioned with the default excludes)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Disable the built-in default excludes
        #[arg(long)]
        no_default_excludes: bool,

        /// Do not respect .gitignore rules
        #[arg(long)]
        no_gitignore: bool,

        /// Do not respect .sheafignore rules
        #[arg(long)]
        no_sheafignore: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Gather {
            patterns,
            include,
            exclude,
            no_default_excludes,
            no_gitignore,
            no_sheafignore,
        } => cmd_gather(
            cli.root,
            build_request(
                patterns,
                include,
                exclude,
                no_default_excludes,
                no_gitignore,
                no_sheafignore,
            ),
            cli.json,
        ),
        Commands::Ls {
            patterns,
            include,
            exclude,
            no_default_excludes,
            no_gitignore,
            no_sheafignore,
        } => cmd_ls(
            cli.root,
            build_request(
                patterns,
                include,
                exclude,
                no_default_excludes,
                no_gitignore,
                no_sheafignore,
            ),
            cli.json,
        ),
    };

    if let Err(e) = result {
        if cli.json {
            let error_json = serde_json::json!({ "code": "error", "message": e.to_string() });
            eprintln!("{}", serde_json::to_string_pretty(&error_json).unwrap());
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn build_request(
    patterns: Vec<String>,
    include: Vec<String>,
    exclude: Vec<String>,
    no_default_excludes: bool,
    no_gitignore: bool,
    no_sheafignore: bool,
) -> GatherRequest {
    GatherRequest {
        patterns,
        include,
        exclude,
        use_default_excludes: !no_default_excludes,
        respect_git_ignore: !no_gitignore,
        respect_sheaf_ignore: !no_sheafignore,
    }
}

fn open_workspace(mut roots: Vec<PathBuf>) -> sheaf_core::Result<Workspace> {
    if roots.is_empty() {
        roots.push(PathBuf::from("."));
    }
    let config = Config::load_or_default(&roots[0])?;
    Workspace::new(roots, config)
}

fn cmd_gather(roots: Vec<PathBuf>, request: GatherRequest, json: bool) -> sheaf_core::Result<()> {
    let workspace = open_workspace(roots)?;
    let output = workspace.gather(&request)?;

    if json {
        let value = serde_json::json!({
            "summary": output.summary,
            "processed": output.processed,
            "skipped": output.skipped,
            "content": output.combined_text(),
        });
        println!("{}", serde_json::to_string_pretty(&value).unwrap());
    } else {
        print!("{}", render_blocks(&output.blocks));
        eprintln!("{}", output.summary);
    }
    Ok(())
}

fn cmd_ls(roots: Vec<PathBuf>, request: GatherRequest, json: bool) -> sheaf_core::Result<()> {
    use colored::Colorize;

    let workspace = open_workspace(roots)?;
    let (candidates, skipped) = workspace.resolve_only(&request)?;

    if json {
        let files: Vec<&str> = candidates.iter().map(|c| c.display.as_str()).collect();
        let value = serde_json::json!({ "files": files, "skipped": skipped });
        println!("{}", serde_json::to_string_pretty(&value).unwrap());
    } else {
        println!("{} {} file(s)", "Found".green(), candidates.len());
        for candidate in &candidates {
            println!("{}", candidate.display);
        }
        for record in &skipped {
            eprintln!("{} {} ({})", "Skipped".yellow(), record.label, record.reason);
        }
    }
    Ok(())
}
