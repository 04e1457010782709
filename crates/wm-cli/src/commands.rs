//! Command handlers

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;
use wm_app::{ConfigUpdate, Console, DemoInputs};
use wm_domain::repository::UrlOpener;
use wm_domain::service::Toaster;
use wm_infra::{default_storage_path, FileKeyValueStore, SystemBrowser, UreqTransport};
use wm_types::{
    BinAssignmentForm, CollectFull, ContractorPatch, DeliverEmpty, DriverPatch, Error,
    FacilityDrop, JobPatch, NewContractor, NewDriver, NewJob, NewVehicle,
    OwnedSkipIn, RelocateEmpty, Result, ReturnEmpty, SkipCreateIn, VehiclePatch,
};

use crate::cli::{
    BinAction, Cli, Commands, ContractorAction, Crew, DemoArgs, DriverAction, FlowStep, JobAction,
    JobArgs, SkipAction, VehicleAction, Weights, WtnAction,
};
use crate::output::{self, Printer};

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let path = match cli.storage.clone() {
        Some(path) => path,
        None => default_storage_path()?,
    };
    let store = Arc::new(FileKeyValueStore::open(path)?);
    debug!("storage at {}", store.path().display());

    let mut console = Console::new(store.clone(), Arc::new(UreqTransport::new()), Toaster::manual());
    console.set_opener(Arc::new(SystemBrowser));
    console.apply_overrides(ConfigUpdate {
        base_url: cli.base_url.clone(),
        driver_key: cli.driver_key.clone(),
        admin_key: cli.admin_key.clone(),
        driver_ref: None,
    });

    let out = Printer::new(cli.format.unwrap_or_default());
    let outcome = dispatch(&mut console, cli.command, &out, store.path().to_path_buf());
    output::print_toasts(console.toaster());
    outcome
}

fn dispatch(console: &mut Console, command: Commands, out: &Printer, storage: PathBuf) -> Result<()> {
    match command {
        Commands::Config {
            show,
            set_base_url,
            set_driver_key,
            set_admin_key,
            set_driver,
            set_wtn_auto_open,
            reset,
        } => {
            let update = ConfigUpdate {
                base_url: set_base_url,
                driver_key: set_driver_key,
                admin_key: set_admin_key,
                driver_ref: set_driver,
            };
            cmd_config(console, out, storage, show, update, set_wtn_auto_open, reset)
        }

        Commands::Ping => {
            let pong = console.run("ping", |c| c.health())?;
            out.value("Ping", &pong)
        }
        Commands::Routes => {
            let routes = console.run("routes", |c| c.routes())?;
            out.optional("Routes", routes.as_ref())
        }
        Commands::Mounts => {
            let mounts = console.run("mounts", |c| c.mounts())?;
            out.optional("Mounts", mounts.as_ref())
        }
        Commands::Versions => {
            let versions = console.run("versions", |c| c.versions())?;
            out.optional("Versions", versions.as_ref())
        }
        Commands::Smoke => {
            let smoke = console.run("skips smoke", |c| c.skips_smoke())?;
            out.optional("Skips smoke", smoke.as_ref())
        }
        Commands::Meta => {
            let meta = console.meta().clone();
            out.meta(&meta)
        }
        Commands::Preload => {
            let summary = console.preload_admin_lists();
            let contractors = console.load_contractors().len();
            out.preload(&summary, contractors)
        }

        Commands::Drivers { action } => cmd_drivers(console, out, action.unwrap_or(DriverAction::List)),
        Commands::Vehicles { action } => cmd_vehicles(console, out, action.unwrap_or(VehicleAction::List)),
        Commands::Contractors { action } => {
            cmd_contractors(console, out, action.unwrap_or(ContractorAction::List))
        }
        Commands::Bins { action } => cmd_bins(console, out, action),
        Commands::Jobs { action } => cmd_jobs(console, out, action.unwrap_or(JobAction::List { status: None })),

        Commands::Tasks => {
            let schedule = console.my_tasks()?;
            out.schedule(&schedule)
        }
        Commands::TaskDone { id } => {
            let schedule = console.mark_task_done(&id)?;
            out.schedule(&schedule)
        }

        Commands::Skip { action } => cmd_skip(console, out, action),
        Commands::Flow { step } => cmd_flow(console, out, step),
        Commands::Wtn { action } => cmd_wtn(console, out, action),
        Commands::Demo(args) => cmd_demo(console, out, args),
    }
}

fn cmd_config(
    console: &mut Console,
    out: &Printer,
    storage: PathBuf,
    show: bool,
    update: ConfigUpdate,
    wtn_auto_open: Option<bool>,
    reset: bool,
) -> Result<()> {
    if reset {
        console.reset_config()?;
        println!("Configuration reset to defaults");
    }

    let mut modified = false;
    if !update.is_empty() {
        console.save_config(update)?;
        modified = true;
    }
    if let Some(enabled) = wtn_auto_open {
        console.set_wtn_auto_open(enabled)?;
        modified = true;
    }
    if modified {
        println!("Configuration saved");
    }

    if show || (!reset && !modified) {
        out.config(console.config(), console.wtn_auto_open(), &storage)?;
    }
    Ok(())
}

fn cmd_drivers(console: &mut Console, out: &Printer, action: DriverAction) -> Result<()> {
    match action {
        DriverAction::List => {
            let drivers = console.refresh_drivers()?;
            out.entities("Drivers", drivers)
        }
        DriverAction::Add {
            name,
            phone,
            email,
            license_no,
        } => {
            let driver = console.create_driver(NewDriver {
                name,
                phone,
                email,
                license_no,
                active: None,
            })?;
            out.entity("Driver", &driver)
        }
        DriverAction::Update {
            driver,
            name,
            phone,
            email,
            license_no,
            active,
        } => {
            let updated = console.update_driver(
                &driver,
                DriverPatch {
                    name,
                    phone,
                    email,
                    license_no,
                    active,
                },
            )?;
            out.entity("Driver", &updated)
        }
        DriverAction::Delete { driver } => {
            let gone = console.delete_driver(&driver)?;
            out.value("Deleted", &gone)
        }
    }
}

fn cmd_vehicles(console: &mut Console, out: &Printer, action: VehicleAction) -> Result<()> {
    match action {
        VehicleAction::List => {
            let vehicles = console.refresh_vehicles()?;
            out.entities("Vehicles", vehicles)
        }
        VehicleAction::Add { reg_no, make, model } => {
            let vehicle = console.create_vehicle(NewVehicle {
                reg_no,
                make,
                model,
                active: None,
            })?;
            out.entity("Vehicle", &vehicle)
        }
        VehicleAction::Update {
            vehicle,
            reg_no,
            make,
            model,
            active,
        } => {
            let updated = console.update_vehicle(
                &vehicle,
                VehiclePatch {
                    reg_no,
                    make,
                    model,
                    active,
                },
            )?;
            out.entity("Vehicle", &updated)
        }
        VehicleAction::Delete { vehicle } => {
            let gone = console.delete_vehicle(&vehicle)?;
            out.value("Deleted", &gone)
        }
    }
}

fn cmd_contractors(console: &mut Console, out: &Printer, action: ContractorAction) -> Result<()> {
    match action {
        ContractorAction::List => {
            let contractors = console.refresh_contractors()?;
            out.entities("Contractors", contractors)
        }
        ContractorAction::Add {
            org_name,
            contact_name,
            phone,
            email,
            billing_address,
        } => {
            let created = console.create_contractor(NewContractor {
                org_name,
                contact_name,
                phone,
                email,
                billing_address,
                active: None,
            })?;
            out.entity("Contractor", &created)
        }
        ContractorAction::Update {
            contractor,
            org_name,
            contact_name,
            phone,
            email,
            active,
        } => {
            let updated = console.update_contractor(
                &contractor,
                ContractorPatch {
                    org_name,
                    contact_name,
                    phone,
                    email,
                    billing_address: None,
                    active,
                },
            )?;
            out.entity("Contractor", &updated)
        }
        ContractorAction::Delete { contractor } => {
            let gone = console.delete_contractor(&contractor)?;
            out.value("Deleted", &gone)
        }
    }
}

fn cmd_bins(console: &mut Console, out: &Printer, action: BinAction) -> Result<()> {
    match action {
        BinAction::Assign {
            skip_qr,
            contractor,
        } => {
            let receipt = console.assign_bin(BinAssignmentForm {
                skip_qr,
                contractor,
            })?;
            out.value("Assigned", &receipt)
        }
        BinAction::Unassign { skip_qr } => {
            let done = console.unassign_bin(&skip_qr)?;
            out.value("Unassigned", &done)
        }
        BinAction::Current { skip_qr } => {
            let current = console.current_assignment(&skip_qr)?;
            out.value("Current owner", &current)
        }
    }
}

/// Resolve an optional driver/vehicle reference to an id
fn assignees(
    console: &mut Console,
    driver: Option<String>,
    vehicle: Option<String>,
) -> Result<(Option<String>, Option<String>)> {
    let driver = driver.map(|d| console.resolve_driver(&d)).transpose()?;
    let vehicle = vehicle.map(|v| console.resolve_vehicle(&v)).transpose()?;
    Ok((driver, vehicle))
}

fn cmd_jobs(console: &mut Console, out: &Printer, action: JobAction) -> Result<()> {
    match action {
        JobAction::List { status } => {
            let jobs = console.run("Jobs", |c| c.list_jobs(status))?;
            out.jobs(&jobs)
        }
        JobAction::Create(args) => {
            let job = new_job(console, args)?;
            let created = console.run("Create job", |c| c.create_job(&job))?;
            out.jobs(std::slice::from_ref(&created))
        }
        JobAction::Patch {
            id,
            status,
            job_type,
            skip_qr,
            to_zone,
            driver,
            vehicle,
            notes,
        } => {
            let (assigned_driver_id, assigned_vehicle_id) = assignees(console, driver, vehicle)?;
            let patch = JobPatch {
                job_type,
                status,
                skip_qr,
                to_zone_id: to_zone,
                assigned_driver_id,
                assigned_vehicle_id,
                notes,
            };
            let patched = console.run("Update job", |c| c.patch_job(&id, &patch))?;
            out.jobs(std::slice::from_ref(&patched))
        }
    }
}

fn new_job(console: &mut Console, args: JobArgs) -> Result<NewJob> {
    let (assigned_driver_id, assigned_vehicle_id) = assignees(console, args.driver, args.vehicle)?;
    Ok(NewJob {
        skip_qr: args.skip_qr,
        from_zone_id: args.from_zone,
        to_zone_id: args.to_zone,
        site_id: args.site,
        destination_type: args.destination_type,
        destination_name: args.destination_name,
        window_start: args.window_start,
        window_end: args.window_end,
        assigned_driver_id,
        assigned_vehicle_id,
        notes: args.notes,
        ..NewJob::pending(args.job_type)
    })
}

fn cmd_skip(console: &mut Console, out: &Printer, action: SkipAction) -> Result<()> {
    let (created, open) = match action {
        SkipAction::Seed(args) => {
            let created = console.create_skip(SkipCreateIn {
                qr: args.qr,
                color: args.color,
                size: args.size,
                notes: args.notes,
            })?;
            (created, args.open)
        }
        SkipAction::Create(args) => {
            let created = console.create_owned_skip(OwnedSkipIn {
                owner_org_id: args.owner,
                qr_code: args.qr,
                assigned_commodity_id: args.commodity,
                zone_id: args.zone,
            })?;
            (created, args.open)
        }
    };
    out.created_skip(&created)?;
    if open {
        open_in_browser(&created.labels.pdf)?;
    }
    Ok(())
}

/// Driver name for a flow step: the flag, else the configured driver
fn driver_name(console: &Console, crew: &Crew) -> Result<String> {
    crew.driver
        .clone()
        .or_else(|| console.config().driver_ref.clone())
        .ok_or_else(|| Error::NotConfigured("Pass --driver or set Config → Driver.".to_string()))
}

fn cmd_flow(console: &mut Console, out: &Printer, step: FlowStep) -> Result<()> {
    let (label, result) = match step {
        FlowStep::EnsureSkip { qr } => {
            ("DEV ensure-skip", console.run("DEV ensure-skip", |c| c.ensure_skip_dev(&qr))?)
        }
        FlowStep::Scan { qr } => ("driver/scan", console.run("driver/scan", |c| c.scan(&qr))?),
        FlowStep::Deliver { qr, zone, crew } => {
            let payload = DeliverEmpty {
                skip_qr: qr,
                to_zone_id: zone,
                driver_name: driver_name(console, &crew)?,
                vehicle_reg: crew.vehicle,
            };
            (
                "driver/deliver-empty",
                console.run("driver/deliver-empty", |c| c.deliver_empty(&payload))?,
            )
        }
        FlowStep::Relocate { qr, from, to, crew } => {
            let payload = RelocateEmpty {
                skip_qr: qr,
                from_zone_id: from,
                to_zone_id: to,
                driver_name: driver_name(console, &crew)?,
            };
            (
                "driver/relocate-empty",
                console.run("driver/relocate-empty", |c| c.relocate_empty(&payload))?,
            )
        }
        FlowStep::Collect {
            qr,
            destination_type,
            destination,
            weights,
            site,
            crew,
        } => {
            let Weights {
                weight_source,
                gross_kg,
                tare_kg,
                net_kg,
            } = weights;
            let payload = CollectFull {
                skip_qr: qr,
                destination_type,
                destination_name: destination,
                weight_source,
                gross_kg,
                tare_kg,
                net_kg,
                driver_name: driver_name(console, &crew)?,
                site_id: site,
                vehicle_reg: crew.vehicle,
            };
            (
                "driver/collect-full",
                console.run("driver/collect-full", |c| c.collect_full(&payload))?,
            )
        }
        FlowStep::Return { qr, zone, crew } => {
            let payload = ReturnEmpty {
                skip_qr: qr,
                to_zone_id: zone,
                driver_name: driver_name(console, &crew)?,
            };
            (
                "driver/return-empty",
                console.run("driver/return-empty", |c| c.return_empty(&payload))?,
            )
        }
        FlowStep::Drop {
            qr,
            facility,
            weights,
            site,
            crew,
        } => {
            let facility_drop = FacilityDrop {
                skip_qr: qr,
                facility_name: facility,
                weight_source: weights.weight_source,
                gross_kg: weights.gross_kg,
                tare_kg: weights.tare_kg,
                net_kg: weights.net_kg,
                driver_name: driver_name(console, &crew)?,
                vehicle_reg: crew.vehicle,
                site_id: site,
            };
            (
                "driver/drop-at-facility",
                console.run("driver/drop-at-facility", |c| c.drop_at_facility(facility_drop))?,
            )
        }
    };
    out.value(label, &result)?;
    if let Some(ready) = console.wtn().last() {
        out.wtn_ready(&ready);
    }
    Ok(())
}

fn cmd_wtn(console: &mut Console, out: &Printer, action: WtnAction) -> Result<()> {
    match action {
        WtnAction::Search { query, page, page_size } => {
            let found = console.run("WTN search", |c| c.search_wtns(&query, page, page_size))?;
            out.wtn_page(&found)
        }
        WtnAction::Url { id, format, open } => {
            let url = console.client().wtn_document_url(&id, format);
            println!("{}", url);
            if open {
                open_in_browser(&url)?;
            }
            Ok(())
        }
        WtnAction::Latest { limit } => {
            let latest = console.run("Latest WTNs", |c| c.latest_wtns(limit))?;
            out.recent_wtns(latest.as_ref())
        }
    }
}

fn cmd_demo(console: &mut Console, out: &Printer, args: DemoArgs) -> Result<()> {
    let inputs = DemoInputs {
        qr: args.qr,
        driver_name: args.driver,
        vehicle_reg: args.vehicle,
        ..DemoInputs::default()
    };
    let outcome = console.run_lifecycle_demo(&inputs);
    out.result_log(console.results())?;
    outcome.map(|_| ())
}

fn open_in_browser(url: &str) -> Result<()> {
    SystemBrowser
        .open(url)
        .map_err(|e| Error::Browser(format!("{url}: {e}")))
}
