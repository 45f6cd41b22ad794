//! Argument definitions

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

const GROUPINGS: [&str; 4] = ["scope", "category", "site", "month"];

fn input_arg() -> Arg {
    Arg::new("input")
        .long("input")
        .short('i')
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("JSON file of computed activities (see `pull`)")
}

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

fn period_arg() -> Arg {
    Arg::new("period")
        .long("period")
        .short('p')
        .required(true)
        .help("Reporting period id")
}

fn scope_arg() -> Arg {
    Arg::new("scope")
        .long("scope")
        .value_parser(["1", "2", "3"])
        .help("Restrict to one scope")
}

/// Full command tree
pub fn build_cli() -> Command {
    Command::new("carbon-ledger")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Carbon accounting from the command line")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .subcommand(
            Command::new("spend")
                .about("Estimate emissions from a spend amount")
                .arg(
                    Arg::new("amount")
                        .required(true)
                        .value_parser(value_parser!(f64))
                        .help("Amount spent"),
                )
                .arg(
                    Arg::new("currency")
                        .help("ISO currency code, e.g. EUR (default from configuration)"),
                )
                .arg(
                    Arg::new("ef")
                        .long("ef")
                        .required(true)
                        .value_parser(value_parser!(f64))
                        .help("Emission factor in kg CO2e per USD"),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("categories")
                .about("List GHG Protocol categories")
                .arg(scope_arg()),
        )
        .subcommand(
            Command::new("summary")
                .about("Aggregate computed activities")
                .arg(input_arg())
                .arg(
                    Arg::new("by")
                        .long("by")
                        .default_value("scope")
                        .value_parser(GROUPINGS)
                        .help("Grouping dimension"),
                )
                .arg(scope_arg())
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("export")
                .about("Write computed activities as CSV")
                .arg(input_arg())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Destination file (stdout if omitted)"),
                ),
        )
        .subcommand(
            Command::new("login")
                .about("Sign in and store the session")
                .arg(Arg::new("email").long("email").required(true))
                .arg(
                    Arg::new("password")
                        .long("password")
                        .env("CARBON_LEDGER_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                ),
        )
        .subcommand(Command::new("logout").about("Forget the stored session"))
        .subcommand(Command::new("whoami").about("Show the signed-in user and organization"))
        .subcommand(
            Command::new("periods")
                .about("List reporting periods")
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("transition")
                .about("Move a reporting period along its workflow")
                .arg(period_arg())
                .arg(
                    Arg::new("to")
                        .long("to")
                        .required(true)
                        .value_parser([
                            "draft",
                            "review",
                            "submitted",
                            "audit",
                            "verified",
                            "locked",
                        ]),
                ),
        )
        .subcommand(
            Command::new("pull")
                .about("Download a period's computed activities as JSON")
                .arg(period_arg())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Bulk-submit activity entries from a JSON file")
                .arg(period_arg())
                .arg(
                    Arg::new("input")
                        .long("input")
                        .short('i')
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON array of entries"),
                ),
        )
}
