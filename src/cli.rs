use crate::rms::{CertFamily, RmsQuery, DEFAULT_FAMILY, DEFAULT_SAIL_NO};
use clap::{Arg, ArgAction, ArgMatches, Command};

pub fn build_cli() -> Command {
    Command::new("orc-rms")
        .about("Download ORC boat rating records (DownBoatRMS) and print them as JSON")
        .arg(
            Arg::new("sail-no")
                .long("sail-no")
                .num_args(1)
                .default_value(DEFAULT_SAIL_NO)
                .help("Sail number of the boat"),
        )
        .arg(
            Arg::new("family")
                .long("family")
                .num_args(1)
                .value_parser(CertFamily::ALL)
                .default_value(DEFAULT_FAMILY.as_str())
                .help("Certificate family"),
        )
        .arg(
            Arg::new("ref-no")
                .long("ref-no")
                .num_args(1)
                .conflicts_with_all(["sail-no", "family"])
                .help("Select by certificate reference number instead of sail number"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .num_args(1)
                .help("Override RUST_LOG level (e.g., info, debug)"),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .help("Print version and exit")
                .action(ArgAction::SetTrue),
        )
}

pub fn query_from_matches(matches: &ArgMatches) -> RmsQuery {
    if let Some(ref_no) = matches.get_one::<String>("ref-no") {
        return RmsQuery::ByRefNo {
            ref_no: ref_no.clone(),
        };
    }
    let mut query = RmsQuery::default();
    if let RmsQuery::BySailNo { sail_no, family } = &mut query {
        if let Some(s) = matches.get_one::<String>("sail-no") {
            *sail_no = s.clone();
        }
        // value_parser restricts the input to known families
        if let Some(f) = matches
            .get_one::<String>("family")
            .and_then(|f| f.parse().ok())
        {
            *family = f;
        }
    }
    query
}

pub fn init_logging(level: Option<&str>) {
    // Explicit level wins over RUST_LOG; default to info. Logs go to stderr only.
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(lvl) = level {
        builder.parse_filters(lvl);
    }
    builder.target(env_logger::Target::Stderr).init();
}
