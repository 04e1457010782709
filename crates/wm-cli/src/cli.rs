//! CLI definition using clap

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use clap::{Args, Parser, Subcommand};
use wm_types::{JobStatus, JobType, OutputFormat, WtnFormat};

#[derive(Parser)]
#[command(name = "wm-console")]
#[command(version)]
#[command(about = "Developer console for the waste-management API")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL for this run (not saved)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Driver API key for this run (not saved)
    #[arg(long, global = true)]
    pub driver_key: Option<String>,

    /// Admin API key for this run (not saved)
    #[arg(long, global = true)]
    pub admin_key: Option<String>,

    /// Storage file holding the saved configuration
    #[arg(long, global = true)]
    pub storage: Option<PathBuf>,

    /// Output format (json, table)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the saved configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set the API base URL
        #[arg(long)]
        set_base_url: Option<String>,

        /// Set the driver API key
        #[arg(long)]
        set_driver_key: Option<String>,

        /// Set the admin API key
        #[arg(long)]
        set_admin_key: Option<String>,

        /// Set the driver used by `tasks` (name or id)
        #[arg(long)]
        set_driver: Option<String>,

        /// Open generated WTN PDFs automatically
        #[arg(long)]
        set_wtn_auto_open: Option<bool>,

        /// Forget the saved configuration
        #[arg(long)]
        reset: bool,
    },

    /// Check the API is reachable
    Ping,

    /// Debug route listing, when the server exposes it
    Routes,

    /// Debug mount listing, when the server exposes it
    Mounts,

    /// Server component versions
    Versions,

    /// Skip module smoke check
    Smoke,

    /// Skip colors and sizes
    Meta,

    /// Load drivers, vehicles and contractors together
    Preload,

    /// Manage drivers
    Drivers {
        #[command(subcommand)]
        action: Option<DriverAction>,
    },

    /// Manage vehicles
    Vehicles {
        #[command(subcommand)]
        action: Option<VehicleAction>,
    },

    /// Manage contractors
    Contractors {
        #[command(subcommand)]
        action: Option<ContractorAction>,
    },

    /// Bin ownership by contractor
    Bins {
        #[command(subcommand)]
        action: BinAction,
    },

    /// Manage jobs
    Jobs {
        #[command(subcommand)]
        action: Option<JobAction>,
    },

    /// Schedule of the configured driver
    Tasks,

    /// Mark a scheduled task as done
    TaskDone {
        /// Task id
        id: String,
    },

    /// Create skips and print their label links
    Skip {
        #[command(subcommand)]
        action: SkipAction,
    },

    /// Driver flow steps
    Flow {
        #[command(subcommand)]
        step: FlowStep,
    },

    /// Waste transfer notes
    Wtn {
        #[command(subcommand)]
        action: WtnAction,
    },

    /// Walk one skip through its whole lifecycle
    Demo(DemoArgs),
}

#[derive(Subcommand)]
pub enum DriverAction {
    /// List drivers
    List,
    /// Register a driver
    Add {
        name: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        license_no: Option<String>,
    },
    /// Change a driver given by name or id
    Update {
        driver: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        license_no: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a driver given by name or id
    Delete { driver: String },
}

#[derive(Subcommand)]
pub enum VehicleAction {
    /// List vehicles
    List,
    /// Register a vehicle
    Add {
        reg_no: String,
        #[arg(long)]
        make: Option<String>,
        #[arg(long)]
        model: Option<String>,
    },
    /// Change a vehicle given by registration or id
    Update {
        vehicle: String,
        #[arg(long)]
        reg_no: Option<String>,
        #[arg(long)]
        make: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a vehicle given by registration or id
    Delete { vehicle: String },
}

#[derive(Subcommand)]
pub enum ContractorAction {
    /// List contractors
    List,
    /// Register a contractor
    Add {
        org_name: String,
        #[arg(long)]
        contact_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        billing_address: Option<String>,
    },
    /// Change a contractor given by name or id
    Update {
        contractor: String,
        #[arg(long)]
        org_name: Option<String>,
        #[arg(long)]
        contact_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a contractor given by name or id
    Delete { contractor: String },
}

#[derive(Subcommand)]
pub enum BinAction {
    /// Attach a skip to a contractor
    Assign {
        skip_qr: String,
        /// Contractor name or id
        #[arg(long, short = 'c')]
        contractor: String,
    },
    /// Detach a skip from its contractor
    Unassign { skip_qr: String },
    /// Show the contractor currently holding a skip
    Current { skip_qr: String },
}

#[derive(Subcommand)]
pub enum JobAction {
    /// List jobs
    List {
        #[arg(long, value_enum)]
        status: Option<JobStatus>,
    },
    /// Create a pending job
    Create(JobArgs),
    /// Change a job
    Patch {
        id: String,
        #[arg(long, value_enum)]
        status: Option<JobStatus>,
        #[arg(long, value_enum)]
        job_type: Option<JobType>,
        #[arg(long)]
        skip_qr: Option<String>,
        #[arg(long)]
        to_zone: Option<String>,
        /// Driver name or id
        #[arg(long)]
        driver: Option<String>,
        /// Vehicle registration or id
        #[arg(long)]
        vehicle: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Args)]
pub struct JobArgs {
    #[arg(value_enum)]
    pub job_type: JobType,
    #[arg(long)]
    pub skip_qr: Option<String>,
    #[arg(long)]
    pub from_zone: Option<String>,
    #[arg(long)]
    pub to_zone: Option<String>,
    #[arg(long)]
    pub site: Option<String>,
    #[arg(long)]
    pub destination_type: Option<String>,
    #[arg(long)]
    pub destination_name: Option<String>,
    /// RFC 3339, e.g. 2024-05-01T08:00:00+01:00
    #[arg(long, value_parser = parse_time)]
    pub window_start: Option<DateTime<FixedOffset>>,
    #[arg(long, value_parser = parse_time)]
    pub window_end: Option<DateTime<FixedOffset>>,
    /// Driver name or id
    #[arg(long)]
    pub driver: Option<String>,
    /// Vehicle registration or id
    #[arg(long)]
    pub vehicle: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

fn parse_time(raw: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(raw).map_err(|e| format!("not an RFC 3339 time: {e}"))
}

#[derive(Subcommand)]
pub enum SkipAction {
    /// Seed a skip by QR code, color and size (dev endpoint)
    Seed(SkipArgs),
    /// Create a skip for an owner organisation with server-rendered labels
    Create(OwnedSkipArgs),
}

#[derive(Args)]
pub struct OwnedSkipArgs {
    /// Owner organisation id
    #[arg(long)]
    pub owner: String,
    /// Custom QR code; the server generates one otherwise
    #[arg(long)]
    pub qr: Option<String>,
    /// Assigned commodity id
    #[arg(long)]
    pub commodity: Option<String>,
    #[arg(long)]
    pub zone: Option<String>,
    /// Open the labels PDF once created
    #[arg(long)]
    pub open: bool,
}

#[derive(Args)]
pub struct SkipArgs {
    /// QR code printed on the skip
    pub qr: String,
    #[arg(long)]
    pub color: String,
    #[arg(long)]
    pub size: String,
    #[arg(long)]
    pub notes: Option<String>,
    /// Open the labels PDF once created
    #[arg(long)]
    pub open: bool,
}

/// Flags shared by the flow steps that record who did the work
#[derive(Args)]
pub struct Crew {
    /// Driver name; defaults to the configured driver
    #[arg(long)]
    pub driver: Option<String>,
    #[arg(long)]
    pub vehicle: Option<String>,
}

/// Weights and where they came from
#[derive(Args)]
pub struct Weights {
    #[arg(long, default_value = "WEIGHBRIDGE")]
    pub weight_source: String,
    #[arg(long)]
    pub gross_kg: Option<f64>,
    #[arg(long)]
    pub tare_kg: Option<f64>,
    #[arg(long)]
    pub net_kg: Option<f64>,
}

#[derive(Subcommand)]
pub enum FlowStep {
    /// Make sure a skip exists (dev helper)
    EnsureSkip { qr: String },
    /// Look a skip up by QR code
    Scan { qr: String },
    /// Deliver an empty skip to a zone
    Deliver {
        qr: String,
        #[arg(long)]
        zone: String,
        #[command(flatten)]
        crew: Crew,
    },
    /// Move an empty skip between zones
    Relocate {
        qr: String,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: String,
        #[command(flatten)]
        crew: Crew,
    },
    /// Collect a full skip; may produce a waste transfer note
    Collect {
        qr: String,
        #[arg(long, default_value = "RECYCLING")]
        destination_type: String,
        #[arg(long)]
        destination: String,
        #[command(flatten)]
        weights: Weights,
        #[arg(long)]
        site: Option<String>,
        #[command(flatten)]
        crew: Crew,
    },
    /// Return an emptied skip to a zone
    Return {
        qr: String,
        #[arg(long)]
        zone: String,
        #[command(flatten)]
        crew: Crew,
    },
    /// Drop a full skip at a transfer facility
    Drop {
        qr: String,
        #[arg(long)]
        facility: String,
        #[command(flatten)]
        weights: Weights,
        #[arg(long)]
        site: Option<String>,
        #[command(flatten)]
        crew: Crew,
    },
}

#[derive(Subcommand)]
pub enum WtnAction {
    /// Search waste transfer notes
    Search {
        #[arg(default_value = "")]
        query: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = wm_app::api::WTN_PAGE_SIZE)]
        page_size: u32,
    },
    /// Document link for a note
    Url {
        id: String,
        #[arg(long, value_enum, default_value = "pdf")]
        format: WtnFormat,
        /// Open it in the browser
        #[arg(long)]
        open: bool,
    },
    /// Most recently generated notes
    Latest {
        #[arg(long, short = 'n', default_value_t = 5)]
        limit: u32,
    },
}

#[derive(Args)]
pub struct DemoArgs {
    #[arg(long, default_value = "QR123")]
    pub qr: String,
    #[arg(long, default_value = "Alex")]
    pub driver: String,
    #[arg(long, default_value = "TEST-001")]
    pub vehicle: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("wm-console").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_global_overrides_after_subcommand() {
        let cli = parse(&["ping", "--base-url", "http://h", "--admin-key", "a", "-f", "json"]);
        assert!(matches!(cli.command, Commands::Ping));
        assert_eq!(cli.base_url.as_deref(), Some("http://h"));
        assert_eq!(cli.admin_key.as_deref(), Some("a"));
        assert_eq!(cli.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_config_flags() {
        let cli = parse(&["config", "--set-driver", "Alex", "--set-wtn-auto-open", "false"]);
        match cli.command {
            Commands::Config {
                set_driver,
                set_wtn_auto_open,
                reset,
                ..
            } => {
                assert_eq!(set_driver.as_deref(), Some("Alex"));
                assert_eq!(set_wtn_auto_open, Some(false));
                assert!(!reset);
            }
            _ => panic!("expected config"),
        }
    }

    #[test]
    fn test_job_create_parses_type_and_window() {
        let cli = parse(&[
            "jobs",
            "create",
            "collect-full",
            "--skip-qr",
            "QR1",
            "--window-start",
            "2024-05-01T08:00:00+01:00",
        ]);
        match cli.command {
            Commands::Jobs {
                action: Some(JobAction::Create(args)),
            } => {
                assert_eq!(args.job_type, JobType::CollectFull);
                assert!(args.window_start.is_some());
            }
            _ => panic!("expected jobs create"),
        }
        assert!(Cli::try_parse_from(["wm-console", "jobs", "create", "deliver-empty", "--window-end", "tomorrow"]).is_err());
    }

    #[test]
    fn test_collect_defaults() {
        let cli = parse(&["flow", "collect", "QR1", "--destination", "ECO MRF"]);
        match cli.command {
            Commands::Flow {
                step:
                    FlowStep::Collect {
                        destination_type,
                        weights,
                        crew,
                        ..
                    },
            } => {
                assert_eq!(destination_type, "RECYCLING");
                assert_eq!(weights.weight_source, "WEIGHBRIDGE");
                assert!(crew.driver.is_none());
            }
            _ => panic!("expected flow collect"),
        }
    }

    #[test]
    fn test_skip_create_takes_owner() {
        let cli = parse(&["skip", "create", "--owner", "org-1", "--zone", "z-9"]);
        match cli.command {
            Commands::Skip {
                action: SkipAction::Create(args),
            } => {
                assert_eq!(args.owner, "org-1");
                assert_eq!(args.zone.as_deref(), Some("z-9"));
                assert!(args.qr.is_none());
            }
            _ => panic!("expected skip create"),
        }
        assert!(Cli::try_parse_from(["wm-console", "skip", "create"]).is_err());
    }

    #[test]
    fn test_bin_assign_takes_only_qr_and_contractor() {
        let cli = parse(&["bins", "assign", "QR1", "-c", "acme"]);
        assert!(matches!(
            cli.command,
            Commands::Bins {
                action: BinAction::Assign { .. }
            }
        ));
        assert!(
            Cli::try_parse_from(["wm-console", "bins", "assign", "QR1", "-c", "acme", "--zone", "ZONE_A"]).is_err()
        );
    }

    #[test]
    fn test_wtn_search_defaults() {
        let cli = parse(&["wtn", "search"]);
        match cli.command {
            Commands::Wtn {
                action: WtnAction::Search { query, page, page_size },
            } => {
                assert_eq!(query, "");
                assert_eq!(page, 1);
                assert_eq!(page_size, 20);
            }
            _ => panic!("expected wtn search"),
        }
    }
}
