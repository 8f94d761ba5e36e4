use crate::workloads::{self, Workload};
use clap::{ArgAction, Parser};
use log::LevelFilter;

/// Command line of the `pagesim` tool.
#[derive(Debug, Parser)]
#[command(name = "pagesim")]
#[command(about = "Run paging-simulator workloads and print their memory statistics")]
pub struct Options {
    /// Maximum log level (off, error, warn, info, debug, trace)
    #[arg(long, env = "PAGESIM_LOG", default_value = "warn")]
    pub log: LevelFilter,

    /// Log at debug level
    #[arg(short, long, action = ArgAction::SetTrue, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Disable logging
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub quiet: bool,

    /// List the available workloads and exit
    #[arg(long)]
    pub list: bool,

    /// Workloads to run (default: all)
    #[arg(value_parser = parse_workload)]
    pub workloads: Vec<&'static Workload>,
}

impl Options {
    /// Effective log level after `-v` / `-q`.
    pub const fn level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Off
        } else if self.verbose {
            LevelFilter::Debug
        } else {
            self.log
        }
    }

    /// The selected workloads, or all of them if none were named.
    pub fn selected(&self) -> Vec<&'static Workload> {
        if self.workloads.is_empty() {
            workloads::ALL.iter().collect()
        } else {
            self.workloads.clone()
        }
    }
}

fn parse_workload(name: &str) -> Result<&'static Workload, String> {
    workloads::find(name).ok_or_else(|| {
        let known: Vec<_> = workloads::ALL.iter().map(|w| w.name).collect();
        format!("unknown workload {name} (known: {})", known.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Options, clap::Error> {
        Options::try_parse_from(std::iter::once("pagesim").chain(args.iter().copied()))
    }

    #[test]
    fn command_is_well_formed() {
        Options::command().debug_assert();
    }

    #[test]
    fn defaults_run_everything() {
        let o = parse(&[]).unwrap();
        assert_eq!(o.selected().len(), workloads::ALL.len());
        assert!(!o.list);
        if std::env::var_os("PAGESIM_LOG").is_none() {
            assert_eq!(o.level(), LevelFilter::Warn);
        }
    }

    #[test]
    fn level_flags() {
        assert_eq!(parse(&["-v"]).unwrap().level(), LevelFilter::Debug);
        assert_eq!(parse(&["-q"]).unwrap().level(), LevelFilter::Off);
        assert_eq!(parse(&["--log", "trace"]).unwrap().level(), LevelFilter::Trace);
        assert_eq!(parse(&["--log=error"]).unwrap().level(), LevelFilter::Error);
        assert_eq!(parse(&["--log", "trace", "-q"]).unwrap().level(), LevelFilter::Off);
        assert!(parse(&["--log", "loud"]).is_err());
        assert!(parse(&["--log"]).is_err());
        assert!(parse(&["-v", "-q"]).is_err());
    }

    #[test]
    fn selects_named_workloads_in_order() {
        let o = parse(&["two-level", "demo"]).unwrap();
        let names: Vec<_> = o.selected().iter().map(|w| w.name).collect();
        assert_eq!(names, ["two-level", "demo"]);
    }

    #[test]
    fn rejects_unknown_input() {
        assert!(parse(&["swap"]).is_err());
        assert!(parse(&["--fast"]).is_err());
    }
}
