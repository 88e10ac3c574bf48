use clap::Parser;
use kiln::commands::{CommandArgs, KilnArgs, KilnCommand};

fn main() {
    let args = KilnArgs::parse();

    kiln_utils::logging::init(args.verbosity.log_level_filter());

    log::trace!("Parsed arguments: {args:#?}");

    match args.command {
        CommandArgs::Generate(mut command) => command.run(),
        CommandArgs::Validate(mut command) => command.run(),
    }
}
