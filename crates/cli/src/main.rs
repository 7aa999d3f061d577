mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use forge_lib::Command;

use cmd::{BuildOptions, cmd_build, cmd_builders};
use output::OutputFormat;

/// forge - compile game content into runtime files
#[derive(Parser)]
#[command(name = "forge")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Args)]
struct ProjectArgs {
  /// Content root (default: current directory)
  #[arg(default_value = ".")]
  root: PathBuf,

  /// Build directory, relative to the content root (default: build, or FORGE_BUILD_DIR)
  #[arg(long)]
  build_dir: Option<PathBuf>,

  /// Folder, relative to the content root, to leave out of the scan
  #[arg(long = "skip-dir")]
  skip_dirs: Vec<String>,
}

#[derive(Args)]
struct RunArgs {
  #[command(flatten)]
  project: ProjectArgs,

  /// Number of tasks to build in parallel (default: number of CPUs)
  #[arg(short, long)]
  jobs: Option<usize>,

  /// Rebuild every task, even if it is up to date
  #[arg(short, long)]
  force: bool,

  /// Output format
  #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
  /// Build every content file under the root
  Build {
    #[command(flatten)]
    run: RunArgs,
  },

  /// Remove every output of previous builds
  Clean {
    #[command(flatten)]
    run: RunArgs,
  },

  /// Remove the whole build directory
  Distclean {
    #[command(flatten)]
    run: RunArgs,
  },

  /// Run several commands in order
  Run {
    /// Commands to run (build, clean, distclean), comma separated or repeated; stops after a failed build
    #[arg(short, long = "command", required = true, value_delimiter = ',')]
    commands: Vec<Command>,

    #[command(flatten)]
    run: RunArgs,
  },

  /// List registered builders
  Builders {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  // RUST_LOG wins; -v raises the default from warn to debug.
  let default_level = if cli.verbose { "forge=debug,forge_lib=debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let code = match cli.command {
    Commands::Build { run } => cmd_build(&run.into_options(cli.verbose), &[Command::Build])?,
    Commands::Clean { run } => cmd_build(&run.into_options(cli.verbose), &[Command::Clean])?,
    Commands::Distclean { run } => cmd_build(&run.into_options(cli.verbose), &[Command::Distclean])?,
    Commands::Run { commands, run } => cmd_build(&run.into_options(cli.verbose), &commands)?,
    Commands::Builders { output } => {
      cmd_builders(output)?;
      0
    }
  };

  if code != 0 {
    std::process::exit(code);
  }
  Ok(())
}

impl RunArgs {
  fn into_options(self, verbose: bool) -> BuildOptions {
    BuildOptions {
      root: self.project.root,
      build_dir: self.project.build_dir,
      skip_dirs: self.project.skip_dirs,
      jobs: self.jobs,
      force: self.force,
      output: self.output,
      verbose,
    }
  }
}
