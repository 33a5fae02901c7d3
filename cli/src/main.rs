#![forbid(unsafe_code)]

mod args;
mod logger;
mod pipeline;

use clap::{crate_version, App, AppSettings, Arg, SubCommand};
use logger::PedanticLogger;
use std::process;

use crate::errorln;

/// Each pipeline subcommand takes exactly one positional argument, the
/// source directory to process.
fn source_subcommand<'a, 'b>(name: &'b str, about: &'b str) -> App<'a, 'b> {
    SubCommand::with_name(name)
        .about(about)
        .setting(AppSettings::DisableVersion)
        .arg(
            Arg::with_name("source")
                .required(true)
                .help("Directory of MP3s to process"),
        )
}

fn main() {
    // I do not like clap. It breaks all CLI conventions with excessive newline messages and
    // infantilizing "oh uwu u fowgot an awgument" garbage. Overriding these messages is deeply
    // impractical and undocumented on purpose so that you're railroaded into their bloated
    // lowest-common-denominator vision of what "command-line **APPS**" should be. I only use it
    // because I would rather get the tool working than focus on pedantic garbage like this.
    let matches = App::new("id3kit")
        .version(crate_version!())
        .about("id3kit batch-processes ID3v1/ID3v2 tags across a directory of MP3s.")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("pedantic")
                .short("p")
                .long("pedantic")
                .help("Print all technical information"),
        )
        .subcommand(source_subcommand("scan", "List the ID3 dialects present in each file"))
        .subcommand(source_subcommand(
            "remove-v1",
            "Strip ID3v1 trailers, writing the result to a sibling directory",
        ))
        .subcommand(source_subcommand(
            "remove-v2",
            "Strip ID3v2 prefixes, writing the result to a sibling directory",
        ))
        .subcommand(source_subcommand(
            "convert-v24-to-v10",
            "Project ID3v2.4 fields onto a fresh ID3v1.0 trailer",
        ))
        .subcommand(source_subcommand(
            "full-process",
            "scan -> remove-v1 -> scan -> remove-v2 -> scan",
        ))
        .get_matches();

    if matches.is_present("pedantic") {
        PedanticLogger::setup();
    }

    let result = match matches.subcommand() {
        ("scan", Some(sub)) => pipeline::scan(sub.value_of("source").unwrap()),
        ("remove-v1", Some(sub)) => pipeline::remove_v1(sub.value_of("source").unwrap()),
        ("remove-v2", Some(sub)) => pipeline::remove_v2(sub.value_of("source").unwrap()),
        ("convert-v24-to-v10", Some(sub)) => {
            pipeline::convert_v24_to_v10(sub.value_of("source").unwrap())
        }
        ("full-process", Some(sub)) => pipeline::full_process(sub.value_of("source").unwrap()),
        _ => unreachable!(),
    };

    if let Err(err) = result {
        errorln!("{}", err);
        process::exit(1);
    }
}
