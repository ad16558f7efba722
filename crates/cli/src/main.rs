//! hookgate entry point
//!
//! Delegates to the library and turns its outcome into a process exit code.

use clap::Parser;

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(false)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))
    .ok();

    let cli = hookgate::Cli::parse();

    match hookgate::run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            let report = miette::Report::msg(format!("{e:#}"));
            eprintln!("{report:?}");
            std::process::exit(hookgate::EXIT_ERROR);
        }
    }
}
