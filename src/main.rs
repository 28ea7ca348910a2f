use bbt::cli::commands::run::RunArgs;
use bbt::cli::logging::init_logging;
use bbt::cli::{Cli, Commands};
use clap::Parser;
use miette::Result;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_logging(&global);

    match cli.command {
        None => bbt::cli::commands::run::run(RunArgs::default(), &global),
        Some(Commands::Init(args)) => bbt::cli::commands::init::run(args),
        Some(Commands::Run(args)) => bbt::cli::commands::run::run(args, &global),
        Some(Commands::Collect(args)) => bbt::cli::commands::collect::run(args, &global),
        Some(Commands::Registry(cmd)) => bbt::cli::commands::registry::run(cmd, &global),
        Some(Commands::Stats(args)) => bbt::cli::commands::stats::run(args, &global),
        Some(Commands::Classify(args)) => bbt::cli::commands::classify::run(args, &global),
        Some(Commands::Compare(args)) => bbt::cli::commands::compare::run(args, &global),
        Some(Commands::Feedrate(args)) => bbt::cli::commands::feedrate::run(args, &global),
        Some(Commands::Report(args)) => bbt::cli::commands::report::run(args, &global),
        Some(Commands::Completions(args)) => bbt::cli::commands::completions::run(args),
    }
}
