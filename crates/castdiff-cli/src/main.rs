use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use castdiff_catalog::{CatalogScope, CatalogStats, TestMatrix};
use castdiff_error::CastDiffError;
use castdiff_harness::logging::{LogGuard, init_logging};
use castdiff_harness::{AnalyzeOptions, OracleConfig, analyze};
use castdiff_types::ground_truth::ORIGINAL_TABLE_FILE;
use castdiff_types::{System, TestPlan};
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Analyze {
        log_dir: PathBuf,
        plan: TestPlan,
        dry_run: bool,
    },
    Generate {
        out_dir: PathBuf,
        write: System,
        read: System,
        stats: bool,
        one_way: bool,
        extended: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    /// `None` when help was requested.
    command: Option<Command>,
    verbose: bool,
}

fn main() {
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();

    let exit_code = run(std::env::args_os(), &mut stdout, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run<I, W, E>(args: I, out: &mut W, err: &mut E) -> i32
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let options = match parse_args(args) {
        Ok(options) => options,
        Err(message) => {
            let _ = writeln!(err, "error: {message}");
            let _ = write_usage(err);
            return 2;
        }
    };

    let Some(command) = options.command else {
        if write_usage(out).is_err() {
            return 1;
        }
        return 0;
    };

    match execute(&command, options.verbose, out, err) {
        Ok(()) => 0,
        Err(error) => {
            let _ = writeln!(err, "error: {error}");
            if let Some(hint) = error.suggestion() {
                let _ = writeln!(err, "hint: {hint}");
            }
            error.exit_code()
        }
    }
}

fn start_logging<E: Write>(dir: &Path, verbose: bool, err: &mut E) -> Option<LogGuard> {
    match init_logging(dir, verbose) {
        Ok(guard) => Some(guard),
        Err(error) => {
            let _ = writeln!(err, "warning: run log disabled: {error}");
            None
        }
    }
}

fn execute<W, E>(
    command: &Command,
    verbose: bool,
    out: &mut W,
    err: &mut E,
) -> castdiff_error::Result<()>
where
    W: Write,
    E: Write,
{
    match command {
        Command::Analyze {
            log_dir,
            plan,
            dry_run,
        } => {
            let config = OracleConfig::from_env()?;
            let original = log_dir.join(ORIGINAL_TABLE_FILE);
            if !original.is_file() {
                return Err(CastDiffError::GroundTruthMissing { path: original });
            }
            let _guard = start_logging(log_dir, verbose, err);
            let outcome = analyze(
                log_dir,
                *plan,
                AnalyzeOptions {
                    config,
                    dry_run: *dry_run,
                },
            )
            .inspect_err(|failure| {
                error!(
                    error = %failure,
                    fatal = failure.is_fatal(),
                    recoverable = failure.is_user_recoverable(),
                    "analysis aborted"
                );
            })?;
            write!(out, "{}", outcome.reports.summary.render())?;
            writeln!(
                out,
                "{} report files written to {}",
                outcome.written.len(),
                log_dir.display()
            )?;
            Ok(())
        }
        Command::Generate {
            out_dir,
            write,
            read,
            stats,
            one_way,
            extended,
        } => {
            let plan = TestPlan::from_systems(*write, *read)?;
            let scope = if *extended {
                CatalogScope::Extended
            } else {
                CatalogScope::Standard
            };
            let _guard = start_logging(out_dir, verbose, err);
            info!(plan = %plan, ?scope, one_way, "generating ground truth");

            let matrix = TestMatrix::build(scope);
            let files = matrix.write_ground_truth(plan, out_dir, *one_way)?;
            for path in [&files.original, &files.expected, &files.bindings] {
                writeln!(out, "wrote {}", path.display())?;
            }
            if *stats {
                write!(out, "{}", CatalogStats::compute(scope, plan.write_system()).render())?;
            }
            Ok(())
        }
    }
}

fn take_value<I>(iter: &mut I, what: &str) -> Result<String, String>
where
    I: Iterator<Item = String>,
{
    iter.next().ok_or_else(|| format!("missing {what}"))
}

fn parse_system(name: &str) -> Result<System, String> {
    name.parse::<System>()
        .map_err(|_| format!("unknown system `{name}` (expected spark or hive)"))
}

#[allow(clippy::too_many_lines)]
fn parse_args<I>(args: I) -> Result<CliOptions, String>
where
    I: IntoIterator<Item = OsString>,
{
    let mut iter = args.into_iter();
    let _argv0 = iter.next();

    let mut verbose = false;
    let mut show_help = false;
    let mut dry_run = false;
    let mut stats = false;
    let mut one_way = false;
    let mut extended = false;
    let mut positionals: Vec<String> = Vec::new();

    while let Some(argument) = iter.next() {
        let arg = argument.to_string_lossy();
        match arg.as_ref() {
            "-h" | "--help" => show_help = true,
            "-v" | "--verbose" => verbose = true,
            "--dry-run" => dry_run = true,
            "--stats" => stats = true,
            "--one-way" => one_way = true,
            "--extended" => extended = true,
            "--" => {
                positionals.extend(iter.by_ref().map(|a| a.to_string_lossy().into_owned()));
            }
            other if other.starts_with('-') && other.len() > 1 => {
                return Err(format!("unknown option `{other}`"));
            }
            other => positionals.push(other.to_owned()),
        }
    }

    if show_help {
        return Ok(CliOptions {
            command: None,
            verbose,
        });
    }

    let mut positionals = positionals.into_iter();
    let subcommand = positionals
        .next()
        .ok_or_else(|| String::from("missing command (analyze or generate)"))?;

    let command = match subcommand.as_str() {
        "analyze" => {
            if stats || one_way || extended {
                return Err(String::from(
                    "`--stats`, `--one-way` and `--extended` only apply to `generate`",
                ));
            }
            let log_dir = take_value(&mut positionals, "log directory for `analyze`")?;
            let plan_name = take_value(&mut positionals, "test plan for `analyze` (ss, hs or sh)")?;
            let plan = plan_name
                .parse::<TestPlan>()
                .map_err(|_| format!("unknown test plan `{plan_name}` (expected ss, hs or sh)"))?;
            Command::Analyze {
                log_dir: PathBuf::from(log_dir),
                plan,
                dry_run,
            }
        }
        "generate" => {
            if dry_run {
                return Err(String::from("`--dry-run` only applies to `analyze`"));
            }
            let out_dir = take_value(&mut positionals, "output directory for `generate`")?;
            let write = parse_system(&take_value(&mut positionals, "write system for `generate`")?)?;
            let read = parse_system(&take_value(&mut positionals, "read system for `generate`")?)?;
            Command::Generate {
                out_dir: PathBuf::from(out_dir),
                write,
                read,
                stats,
                one_way,
                extended,
            }
        }
        other => return Err(format!("unknown command `{other}`")),
    };

    if let Some(extra) = positionals.next() {
        return Err(format!("unexpected argument `{extra}`"));
    }

    Ok(CliOptions {
        command: Some(command),
        verbose,
    })
}

fn write_usage<W>(out: &mut W) -> io::Result<()>
where
    W: Write,
{
    writeln!(
        out,
        "Usage: castdiff <COMMAND> [OPTIONS]\n\
         \n\
         Commands:\n\
         \n\
         analyze <LOG_DIR> <ss|hs|sh> [--dry-run] [-v]\n\
         \x20   Classify captured logs against the ground truth in LOG_DIR.\n\
         \x20   --dry-run reclassifies the saved behavior dump without reading logs.\n\
         generate <OUT_DIR> <spark|hive> <spark|hive> [--stats] [--one-way] [--extended]\n\
         \x20   Write t_original.json, t_expected and the plan's bindings.\n\
         \n\
         Environment:\n\
         \n\
         CASTDIFF_LOG_START_LINE  first log line searched for start markers (default 1)\n\
         CASTDIFF_SCAN_WINDOW     lines searched after a start marker (default 30)\n\
         RUST_LOG                 log filter override\n\
         \n\
         Examples:\n\
         \n\
         castdiff generate logs/ spark spark --stats\n\
         castdiff analyze logs/ ss\n\
         castdiff analyze logs/ ss --dry-run\n",
    )
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::fs;

    use super::{Command, parse_args, run};
    use castdiff_types::{System, TestPlan};

    fn parse_from(args: &[&str]) -> Result<super::CliOptions, String> {
        let os_args: Vec<OsString> = args.iter().map(OsString::from).collect();
        parse_args(os_args)
    }

    fn run_with(args: &[&str]) -> (i32, String, String) {
        let os_args: Vec<OsString> = args.iter().map(OsString::from).collect();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(os_args, &mut out, &mut err);
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_parse_analyze() {
        let options = parse_from(&["castdiff", "analyze", "logs", "hs", "--dry-run", "-v"])
            .expect("analyze args should parse");
        assert!(options.verbose);
        assert_eq!(
            options.command,
            Some(Command::Analyze {
                log_dir: "logs".into(),
                plan: TestPlan::HiveToSpark,
                dry_run: true,
            })
        );
    }

    #[test]
    fn test_parse_generate() {
        let options = parse_from(&[
            "castdiff",
            "generate",
            "--stats",
            "out",
            "Spark",
            "hive",
            "--one-way",
        ])
        .expect("generate args should parse");
        assert_eq!(
            options.command,
            Some(Command::Generate {
                out_dir: "out".into(),
                write: System::Spark,
                read: System::Hive,
                stats: true,
                one_way: true,
                extended: false,
            })
        );
    }

    #[test]
    fn test_parse_unknown_plan_fails() {
        let error = parse_from(&["castdiff", "analyze", "logs", "hh"]).unwrap_err();
        assert!(error.contains("unknown test plan"));
    }

    #[test]
    fn test_parse_flag_for_wrong_command_fails() {
        let error = parse_from(&["castdiff", "analyze", "logs", "ss", "--stats"]).unwrap_err();
        assert!(error.contains("only apply to `generate`"));
        let error = parse_from(&["castdiff", "generate", "out", "spark", "spark", "--dry-run"])
            .unwrap_err();
        assert!(error.contains("only applies to `analyze`"));
    }

    #[test]
    fn test_parse_unknown_option_and_extra_argument_fail() {
        let error = parse_from(&["castdiff", "analyze", "logs", "ss", "--wat"]).unwrap_err();
        assert!(error.contains("unknown option"));
        let error = parse_from(&["castdiff", "analyze", "logs", "ss", "more"]).unwrap_err();
        assert!(error.contains("unexpected argument"));
    }

    #[test]
    fn test_parse_missing_arguments_fail() {
        assert!(parse_from(&["castdiff"]).unwrap_err().contains("missing command"));
        assert!(
            parse_from(&["castdiff", "generate", "out", "spark"])
                .unwrap_err()
                .contains("read system")
        );
    }

    #[test]
    fn test_help_exits_zero() {
        let (code, out, _) = run_with(&["castdiff", "--help"]);
        assert_eq!(code, 0);
        assert!(out.contains("Usage: castdiff"));
    }

    #[test]
    fn test_bad_args_exit_two_with_usage() {
        let (code, out, err) = run_with(&["castdiff", "frobnicate"]);
        assert_eq!(code, 2);
        assert!(out.is_empty());
        assert!(err.contains("unknown command"));
        assert!(err.contains("Usage: castdiff"));
    }

    #[test]
    fn test_generate_unsupported_pair() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("gt");
        let dir = dir.to_string_lossy();
        let (code, _, err) = run_with(&["castdiff", "generate", &dir, "hive", "hive"]);
        assert_eq!(code, 2);
        assert!(err.contains("hint:"));
    }

    #[test]
    fn test_generate_writes_ground_truth() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_string_lossy().into_owned();
        let (code, out, _) = run_with(&["castdiff", "generate", &dir, "spark", "spark", "--stats"]);
        assert_eq!(code, 0);
        assert!(out.contains("t_original.json"));
        assert!(out.contains("BYTE valid: 5 invalid: 4"));
        assert!(tmp.path().join("t_expected").is_file());
        assert!(tmp.path().join("ss_bindings.json").is_file());
        let original = fs::read_to_string(tmp.path().join("t_original.json")).unwrap();
        assert!(original.contains("\"valid\""));
    }
}
