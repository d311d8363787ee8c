use clap::{ArgGroup, Parser};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "mtar")]
#[command(version)]
#[command(about = "A minimal tar-like archiver", long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["create", "extract", "list"])))]
#[command(after_help = "Examples:\n  \
  mtar -c -f out.mtar a.txt b.txt   pack a.txt and b.txt into out.mtar\n  \
  mtar -x -f out.mtar -C restore    unpack out.mtar into ./restore\n  \
  mtar -t -f out.mtar               list the files stored in out.mtar")]
pub struct Cli {
    /// Create a new archive
    #[arg(short = 'c')]
    pub create: bool,

    /// Extract files from an archive
    #[arg(short = 'x')]
    pub extract: bool,

    /// List the contents of an archive
    #[arg(short = 't')]
    pub list: bool,

    /// Archive file
    #[arg(short = 'f', value_name = "ARCHIVE")]
    pub archive: String,

    /// Files to archive (create mode)
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    /// Extract files into DIR
    #[arg(short = 'C', value_name = "DIR", default_value = ".")]
    pub directory: String,

    /// Overwrite existing files when extracting
    #[arg(short = 'o', long = "overwrite")]
    pub overwrite: bool,

    /// Verbose output (-vv => debug logging)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode
    #[arg(short = 'q')]
    pub quiet: bool,
}

impl Cli {
    /// Log level used when `RUST_LOG` is not set.
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
