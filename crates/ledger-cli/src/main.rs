use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ArgMatches;
use ledger_cli::commands::{
    describe, read_activities, read_entries, render_breakdown, render_categories,
    render_periods, render_spend, render_summary, spend_currency, write_output,
};
use ledger_cli::{build_cli, GroupBy};
use ledger_client::{submit_entries, AuthStore, HttpLedgerApi, LedgerApi};
use ledger_core::{LedgerConfig, PeriodId, PeriodStatus, Scope};
use ledger_dashboard::to_csv;
use tracing_subscriber::EnvFilter;

fn load_config(matches: &ArgMatches) -> Result<LedgerConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => LedgerConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => {
            let mut config = LedgerConfig::default();
            config.apply_env(|key| std::env::var(key).ok());
            config.validate()?;
            Ok(config)
        }
    }
}

fn init_tracing(config: &LedgerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn scope_of(args: &ArgMatches) -> Result<Option<Scope>> {
    args.get_one::<String>("scope")
        .map(|s| s.parse::<Scope>())
        .transpose()
        .map_err(Into::into)
}

fn period_of(args: &ArgMatches) -> Result<PeriodId> {
    let raw = args
        .get_one::<String>("period")
        .context("missing --period")?;
    Ok(PeriodId(raw.parse().with_context(|| format!("invalid period id `{raw}`"))?))
}

fn connect(config: &LedgerConfig) -> Result<HttpLedgerApi> {
    let auth = Arc::new(AuthStore::load(&config.auth.store_path));
    Ok(HttpLedgerApi::new(&config.api, auth)?)
}

async fn run(matches: ArgMatches, config: LedgerConfig) -> Result<()> {
    match matches.subcommand() {
        Some(("spend", args)) => {
            let amount = *args.get_one::<f64>("amount").context("missing amount")?;
            let currency = spend_currency(args.get_one::<String>("currency"), &config.default_currency);
            let ef = *args.get_one::<f64>("ef").context("missing --ef")?;
            println!("{}", render_spend(amount, currency, ef, args.get_flag("json"))?);
        }
        Some(("categories", args)) => {
            print!("{}", render_categories(scope_of(args)?));
        }
        Some(("summary", args)) => {
            let input = args.get_one::<PathBuf>("input").context("missing --input")?;
            let activities = read_activities(input)?;
            let by = GroupBy::parse(args.get_one::<String>("by").map_or("scope", String::as_str))?;
            let json = args.get_flag("json");
            if !json {
                println!("{}", render_summary(&activities));
            }
            print!("{}", render_breakdown(&activities, by, scope_of(args)?, json)?);
        }
        Some(("export", args)) => {
            let input = args.get_one::<PathBuf>("input").context("missing --input")?;
            let activities = read_activities(input)?;
            let output = args.get_one::<PathBuf>("output").map(PathBuf::as_path);
            write_output(output, &to_csv(&activities))?;
        }
        Some(("login", args)) => {
            let email = args.get_one::<String>("email").context("missing --email")?;
            let password = args.get_one::<String>("password").context("missing --password")?;
            let api = connect(&config)?;
            let session = api.login(email, password).await?;
            println!("Signed in as {} ({})", session.user.email, session.organization.name);
        }
        Some(("logout", _)) => {
            AuthStore::load(&config.auth.store_path).invalidate()?;
            println!("Signed out");
        }
        Some(("whoami", _)) => {
            let store = AuthStore::load(&config.auth.store_path);
            println!("{}", describe("User", store.user().map(|u| u.email)));
            println!("{}", describe("Organization", store.organization().map(|o| o.name)));
        }
        Some(("periods", args)) => {
            let periods = connect(&config)?.list_periods().await?;
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&periods)?);
            } else {
                print!("{}", render_periods(&periods));
            }
        }
        Some(("transition", args)) => {
            let id = period_of(args)?;
            let to: PeriodStatus = args
                .get_one::<String>("to")
                .context("missing --to")?
                .parse()?;
            let api = connect(&config)?;
            let period = api
                .list_periods()
                .await?
                .into_iter()
                .find(|p| p.id == id)
                .with_context(|| format!("no reporting period {id}"))?;
            let updated = api.transition_period(&period, to).await?;
            println!("{}: {} -> {}", updated.name, period.status, updated.status);
        }
        Some(("pull", args)) => {
            let id = period_of(args)?;
            let activities = connect(&config)?.list_activities(id).await?;
            let output = args.get_one::<PathBuf>("output").map(PathBuf::as_path);
            write_output(output, &serde_json::to_string_pretty(&activities)?)?;
        }
        Some(("import", args)) => {
            let id = period_of(args)?;
            let input = args.get_one::<PathBuf>("input").context("missing --input")?;
            let mut wizard = read_entries(input)?;
            let preview = wizard.total_co2e();
            let created = submit_entries(&connect(&config)?, &mut wizard, id).await?;
            let computed: f64 = created.iter().map(|a| a.co2e_kg).sum();
            println!(
                "Imported {} activities: {:.2} kg CO2e (preview {:.2} kg)",
                created.len(),
                computed,
                preview
            );
        }
        _ => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = build_cli().get_matches();
    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config);

    match run(matches, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
