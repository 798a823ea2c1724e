use clap::{Parser, Subcommand};
use depot_files::{FilesService, StoredFile, StoredName, DEFAULT_UPLOAD_DIR};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "depot")]
#[command(about = "Depot file store CLI")]
struct Cli {
    /// Storage directory to operate on
    #[arg(long, global = true, default_value = DEFAULT_UPLOAD_DIR)]
    dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all stored files
    List {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Store a local file under its filename
    Add {
        /// Path of the file to store
        path: PathBuf,
    },
    /// Delete a stored file
    Remove {
        /// Stored name of the file
        stored_name: String,
    },
    /// Copy a stored file's bytes out
    Cat {
        /// Stored name of the file
        stored_name: String,
        /// Destination path
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'depot --help' for commands");
        return Ok(());
    };

    let service = FilesService::open_or_create(&cli.dir)?;
    match command {
        Commands::List { json } => {
            let catalog = service.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&catalog)?);
            } else if catalog.is_empty() {
                println!("No files found.");
            } else {
                for file in &catalog {
                    println!("{}", catalog_line(file));
                }
            }
        }
        Commands::Add { path } => {
            let stored = service.add_from_path(&path)?;
            println!("Stored {} ({} bytes)", stored.stored_name, stored.size_bytes);
        }
        Commands::Remove { stored_name } => {
            service.remove(&StoredName::parse(&stored_name)?)?;
            println!("Deleted {}", stored_name);
        }
        Commands::Cat { stored_name, out } => {
            let written = copy_out(&service, &StoredName::parse(&stored_name)?, &out)?;
            println!("Wrote {} bytes to {}", written, out.display());
        }
    }

    Ok(())
}

fn catalog_line(file: &StoredFile) -> String {
    format!(
        "ID: {}, Name: {}, Original: {}, Size: {}, Created: {}",
        file.id,
        file.stored_name,
        file.original_name,
        file.size_bytes,
        file.created_at.to_rfc3339()
    )
}

fn copy_out(
    service: &FilesService,
    stored_name: &StoredName,
    out: &Path,
) -> Result<u64, Box<dyn std::error::Error>> {
    let mut blob = service.open(stored_name)?;
    let mut dest = std::fs::File::create(out)?;
    Ok(std::io::copy(&mut blob.file, &mut dest)?)
}
