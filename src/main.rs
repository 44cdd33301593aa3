use clap::{Args, Parser, Subcommand};
use prompt_gallery::config::{self, Gallery};
use prompt_gallery::fill::{self, Target, TextSource};
use prompt_gallery::generate::{self, GenerateError, OpenAiProvider};
use prompt_gallery::watch::RefreshLoop;
use prompt_gallery::{metadata, output, render};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "prompt-gallery")]
#[command(about = "Markdown gallery for AI-generated images and their prompts")]
#[command(long_about = "\
Markdown gallery for AI-generated images and their prompts

Your filesystem is the data source. Files are matched by a four-digit id and
rendered into a README table and a mobile-friendly GALLERY.md.

Gallery structure:

  my-gallery/
  ├── gallery.toml               # Optional config (see gen-config)
  ├── README.md                  # Table view (generated)
  ├── GALLERY.md                 # Mobile view (generated)
  ├── images/
  │   ├── 02seed.png             # Shared seed image (fallback)
  │   ├── 0001.jpg
  │   └── 0002.png
  └── prompts/
      ├── 0001.txt               # Prompt text
      ├── 0001.tags.json         # {\"seed\", \"title\", \"tags\"}, all optional
      └── 0002.txt

Metadata resolution (first available wins):
  Seed:   record seed (if the file exists) → images/02seed.{png,jpg,jpeg,webp}
  Title:  record title → text before the first comma of the prompt
  Tags:   record tags (string array) → none

Run 'prompt-gallery gen-config' to generate a documented gallery.toml.")]
#[command(version)]
struct Cli {
    /// Gallery root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// More diagnostics on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan, resolve, and write README.md and GALLERY.md
    Build,
    /// Render, then re-render whenever files are added or removed
    Watch {
        /// Seconds between polls (overrides gallery.toml)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },
    /// Show how every entry resolves without writing anything
    Check {
        /// Print resolved entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rewrite every tag record in normalized form
    Normalize,
    /// Write text into empty prompt files
    Fill(FillArgs),
    /// Create a new entry from a subject line
    Generate {
        /// Subject words, joined with spaces
        subject: Vec<String>,
        /// Seed image to record, relative to the gallery root
        #[arg(long)]
        seed: Option<PathBuf>,
    },
    /// Print a stock gallery.toml with all options documented
    GenConfig,
}

#[derive(Args)]
struct FillArgs {
    /// NNNN, NNNN-MMMM, or omit for every empty prompt
    target: Option<String>,
    #[command(flatten)]
    source: SourceArgs,
}

/// Text source. Without a flag, lines are read interactively until END.
#[derive(Args)]
#[group(multiple = false)]
struct SourceArgs {
    /// Read the whole of stdin (single target only)
    #[arg(long)]
    stdin: bool,
    /// Use the output of the configured clipboard command
    #[arg(long)]
    clipboard: bool,
    /// Poll the clipboard until it changes, once per entry
    #[arg(long, visible_alias = "watchclip")]
    clipboard_watch: bool,
    /// Ask before each entry: Enter reads the clipboard, s skips, q quits
    #[arg(long, visible_alias = "clipstep")]
    clipboard_per_entry: bool,
    /// Open each prompt file with the configured editor command
    #[arg(long)]
    editor: bool,
    /// Read the text from a file
    #[arg(long, value_name = "PATH")]
    from_file: Option<PathBuf>,
}

impl SourceArgs {
    fn source(&self, gallery: &Gallery) -> TextSource {
        if self.stdin {
            TextSource::Stdin
        } else if self.clipboard {
            TextSource::Clipboard
        } else if self.clipboard_watch {
            TextSource::clipboard_watch(gallery)
        } else if self.clipboard_per_entry {
            TextSource::ClipboardStep
        } else if self.editor {
            TextSource::Editor
        } else if let Some(path) = &self.from_file {
            TextSource::File(path.clone())
        } else {
            TextSource::Interactive
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let open = || Gallery::open(&cli.root);

    match cli.command {
        Command::Build => {
            let gallery = open()?;
            let report = render::build(&gallery)?;
            output::print_build_output(&report, &gallery);
        }
        Command::Watch { interval } => {
            let mut gallery = open()?;
            if let Some(secs) = interval {
                gallery.config.watch.interval_secs = secs;
            }
            println!(
                "==> Watching {} every {}s (Ctrl+C to stop)",
                gallery.root.display(),
                gallery.config.watch.interval_secs
            );
            let interval = gallery.config.watch.interval();
            let lp = RefreshLoop::new(&gallery);
            match lp.run(interval, |tick| {
                for line in output::format_tick(tick, &gallery) {
                    println!("{}", line);
                }
            }) {
                Ok(never) => match never {},
                Err(e) => return Err(e.into()),
            }
        }
        Command::Check { json } => {
            let gallery = open()?;
            let entries = render::resolve_gallery(&gallery)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                output::print_check_output(&entries);
            }
        }
        Command::Normalize => {
            let gallery = open()?;
            let ids = metadata::normalize_records(&gallery)?;
            output::print_normalize_output(&ids);
        }
        Command::Fill(args) => {
            let gallery = open()?;
            let source = args.source.source(&gallery);
            let target = Target::parse(args.target.as_deref());
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let report = fill::fill(&gallery, target, &source, &mut input, |event| {
                for line in output::format_fill_event(event, &source, &gallery) {
                    println!("{}", line);
                }
            })?;
            output::print_fill_output(&report, &gallery);
        }
        Command::Generate { subject, seed } => {
            let gallery = open()?;
            let subject = generate::choose_subject(&subject.join(" "), ask_subject);
            let provider = OpenAiProvider::from_config(&gallery.config.provider);
            let report = generate::generate(&gallery, &subject, seed.as_deref(), provider)?;
            output::print_generate_output(&report, &gallery);
            match report.image {
                Ok(_) => {}
                Err(e) if e.is_provider_error() => {
                    if let GenerateError::ProviderNotConfigured { env } = &e {
                        eprintln!("Image provider not configured. Skipping image generation.");
                        eprintln!("Set {env} to enable generation.");
                    } else {
                        eprintln!("{e}");
                        eprintln!("Prompt and tag record were kept; re-run to retry.");
                    }
                    std::process::exit(2);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Read a subject line from stdin. EOF or an unreadable stdin yields "".
fn ask_subject() -> String {
    print!("Subject: ");
    io::stdout().flush().ok();
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(_) => line,
        Err(_) => String::new(),
    }
}

/// Diagnostics go to stderr so stdout stays clean for `check --json`.
fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(verbose >= 2)
        .init();
}
