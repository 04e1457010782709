//! Multi-step console workflows
//!
//! Mutations re-fetch the affected list afterwards; nothing is merged
//! optimistically.

use std::thread;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use wm_domain::service::validation::{
    is_valid_email, validate_assignment, validate_contractor, validate_owned_skip, validate_skip,
};
use wm_types::{
    AssignmentReceipt, CollectFull, Contractor, ContractorPatch, CreatedSkip, DeliverEmpty, Driver,
    DriverPatch, Error, FieldErrors, MetaConfig, NewContractor, NewDriver, NewVehicle,
    OwnedSkipIn, RelocateEmpty, Result, ReturnEmpty, SkipCreateIn, Vehicle, VehiclePatch,
};
use wm_types::{BinAssignmentForm, CurrentAssignment};

use crate::console::Console;

/// Shown by "my tasks" when no driver is configured
pub const NO_DRIVER_MESSAGE: &str = "Set Config → Driver (name or id).";

fn invalid(field: &str, message: &str) -> Error {
    let mut fields = FieldErrors::new();
    fields.insert(field.to_string(), message.to_string());
    Error::Validation(fields)
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Outcome of [`Console::preload_admin_lists`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreloadSummary {
    pub drivers: usize,
    pub vehicles: usize,
    pub errors: Vec<String>,
}

/// Inputs for the end-to-end driver demo
#[derive(Debug, Clone, PartialEq)]
pub struct DemoInputs {
    pub qr: String,
    pub driver_name: String,
    pub vehicle_reg: String,
    pub zone_a: String,
    pub zone_b: String,
    pub zone_c: String,
    pub gross_kg: f64,
    pub tare_kg: f64,
    pub destination_type: String,
    pub destination_name: String,
    pub site_id: String,
}

impl Default for DemoInputs {
    fn default() -> Self {
        Self {
            qr: "QR123".to_string(),
            driver_name: "Alex".to_string(),
            vehicle_reg: "TEST-001".to_string(),
            zone_a: "ZONE_A".to_string(),
            zone_b: "ZONE_B".to_string(),
            zone_c: "ZONE_C".to_string(),
            gross_kg: 2500.0,
            tare_kg: 1500.0,
            destination_type: "RECYCLING".to_string(),
            destination_name: "ECO MRF".to_string(),
            site_id: "SITE1".to_string(),
        }
    }
}

fn joined<T>(outcome: thread::Result<Result<T>>) -> Result<T> {
    outcome.unwrap_or_else(|_| Err(Error::UnexpectedResponse("list request panicked".to_string())))
}

impl Console {
    /// Fetch drivers and vehicles side by side.
    ///
    /// Each list fails on its own: a failed list is emptied and reported
    /// with a toast while the other still loads.
    pub fn preload_admin_lists(&mut self) -> PreloadSummary {
        let client = self.client();
        let (drivers, vehicles) = thread::scope(|s| {
            let drivers = s.spawn(|| client.list_drivers());
            let vehicles = s.spawn(|| client.list_vehicles());
            (joined(drivers.join()), joined(vehicles.join()))
        });

        let mut summary = PreloadSummary::default();
        match drivers {
            Ok(list) => self.drivers = list,
            Err(e) => {
                self.drivers.clear();
                self.toaster().error(e.to_string(), Some("Load drivers"), None);
                summary.errors.push(format!("drivers: {e}"));
            }
        }
        match vehicles {
            Ok(list) => self.vehicles = list,
            Err(e) => {
                self.vehicles.clear();
                self.toaster().error(e.to_string(), Some("Load vehicles"), None);
                summary.errors.push(format!("vehicles: {e}"));
            }
        }
        summary.drivers = self.drivers.len();
        summary.vehicles = self.vehicles.len();
        summary
    }

    /// Contractor list for pickers; failures leave it empty without a toast
    pub fn load_contractors(&mut self) -> &[Contractor] {
        if let Err(e) = self.refresh_contractors() {
            debug!("contractor preload failed: {}", e);
            self.contractors.clear();
        }
        &self.contractors
    }

    /// Skip colors and sizes, fetched once per session
    pub fn meta(&mut self) -> &MetaConfig {
        if self.meta.is_none() {
            let meta = self.client().meta_config();
            self.meta = Some(meta);
        }
        self.meta.get_or_insert_with(MetaConfig::fallback)
    }

    fn refresh_vehicles_or_toast(&mut self) {
        if let Err(e) = self.refresh_vehicles() {
            self.toaster().error(e.to_string(), Some("Load vehicles"), None);
        }
    }

    fn refresh_drivers_or_toast(&mut self) {
        if let Err(e) = self.refresh_drivers() {
            self.toaster().error(e.to_string(), Some("Load drivers"), None);
        }
    }

    /// Register a vehicle and select it.
    ///
    /// A 409 means the registration is taken: the list is re-fetched and the
    /// existing vehicle with that registration is selected and returned.
    pub fn create_vehicle(&mut self, vehicle: NewVehicle) -> Result<Vehicle> {
        const LABEL: &str = "Create vehicle";
        let reg = vehicle.reg_no.trim().to_string();
        if reg.is_empty() {
            return Err(invalid("reg_no", "Registration is required"));
        }
        let vehicle = NewVehicle {
            reg_no: reg.clone(),
            make: trimmed(vehicle.make),
            model: trimmed(vehicle.model),
            active: vehicle.active,
        };

        match self.client().create_vehicle(&vehicle) {
            Ok(created) => {
                self.record_success(LABEL, &created);
                self.toaster().success(format!("{LABEL} ✓"), None, None);
                self.refresh_vehicles_or_toast();
                self.selected_vehicle = Some(created.id.clone());
                Ok(created)
            }
            Err(err) if err.code() == 409 => {
                self.record_failure(LABEL, &err);
                self.toaster().info("Vehicle already exists", None, None);
                self.refresh_vehicles_or_toast();
                let existing = self
                    .vehicles
                    .iter()
                    .find(|v| {
                        [&v.reg_no, &v.plate]
                            .iter()
                            .filter_map(|r| r.as_deref())
                            .any(|r| r.trim().eq_ignore_ascii_case(&reg))
                    })
                    .cloned();
                match existing {
                    Some(v) => {
                        self.selected_vehicle = Some(v.id.clone());
                        Ok(v)
                    }
                    None => {
                        warn!("409 for {} but no matching vehicle in the list", reg);
                        Err(err)
                    }
                }
            }
            Err(err) => Err(self.fail(LABEL, err)),
        }
    }

    /// Register a driver and select them; a 409 selects the existing one
    pub fn create_driver(&mut self, driver: NewDriver) -> Result<Driver> {
        const LABEL: &str = "Create driver";
        let name = driver.name.trim().to_string();
        if name.is_empty() {
            return Err(invalid("name", "Name is required"));
        }
        let driver = NewDriver {
            name: name.clone(),
            phone: trimmed(driver.phone),
            email: trimmed(driver.email),
            license_no: trimmed(driver.license_no),
            active: driver.active,
        };

        match self.client().create_driver(&driver) {
            Ok(created) => {
                self.record_success(LABEL, &created);
                self.toaster().success(format!("{LABEL} ✓"), None, None);
                self.refresh_drivers_or_toast();
                self.selected_driver = Some(created.id.clone());
                Ok(created)
            }
            Err(err) if err.code() == 409 => {
                self.record_failure(LABEL, &err);
                self.toaster().info("Driver already exists", None, None);
                self.refresh_drivers_or_toast();
                let existing = self
                    .drivers
                    .iter()
                    .find(|d| {
                        [&d.full_name, &d.name]
                            .iter()
                            .filter_map(|n| n.as_deref())
                            .any(|n| n.trim().eq_ignore_ascii_case(&name))
                    })
                    .cloned();
                match existing {
                    Some(d) => {
                        self.selected_driver = Some(d.id.clone());
                        Ok(d)
                    }
                    None => Err(err),
                }
            }
            Err(err) => Err(self.fail(LABEL, err)),
        }
    }

    pub fn update_driver(&mut self, reference: &str, patch: DriverPatch) -> Result<Driver> {
        let id = self.resolve_driver(reference)?;
        let updated = self.run("Update driver", |c| c.update_driver(&id, &patch))?;
        self.refresh_drivers_or_toast();
        Ok(updated)
    }

    pub fn delete_driver(&mut self, reference: &str) -> Result<Value> {
        let id = self.resolve_driver(reference)?;
        let out = self.run("Delete driver", |c| c.delete_driver(&id))?;
        if self.selected_driver.as_deref() == Some(id.as_str()) {
            self.selected_driver = None;
        }
        self.refresh_drivers_or_toast();
        Ok(out)
    }

    pub fn update_vehicle(&mut self, reference: &str, patch: VehiclePatch) -> Result<Vehicle> {
        let id = self.resolve_vehicle(reference)?;
        let updated = self.run("Update vehicle", |c| c.update_vehicle(&id, &patch))?;
        self.refresh_vehicles_or_toast();
        Ok(updated)
    }

    pub fn delete_vehicle(&mut self, reference: &str) -> Result<Value> {
        let id = self.resolve_vehicle(reference)?;
        let out = self.run("Delete vehicle", |c| c.delete_vehicle(&id))?;
        if self.selected_vehicle.as_deref() == Some(id.as_str()) {
            self.selected_vehicle = None;
        }
        self.refresh_vehicles_or_toast();
        Ok(out)
    }

    pub fn create_contractor(&mut self, contractor: NewContractor) -> Result<Contractor> {
        let contractor = NewContractor {
            org_name: contractor.org_name.trim().to_string(),
            contact_name: trimmed(contractor.contact_name),
            phone: trimmed(contractor.phone),
            email: trimmed(contractor.email),
            billing_address: trimmed(contractor.billing_address),
            active: contractor.active,
        };
        let errors = validate_contractor(&contractor);
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }
        let created = self.run("Create contractor", |c| c.create_contractor(&contractor))?;
        self.load_contractors();
        Ok(created)
    }

    pub fn update_contractor(&mut self, reference: &str, patch: ContractorPatch) -> Result<Contractor> {
        if let Some(email) = patch.email.as_deref().filter(|e| !e.is_empty()) {
            if !is_valid_email(email) {
                return Err(invalid("email", "Invalid email"));
            }
        }
        let id = self.resolve_contractor(reference)?;
        let updated = self.run("Update contractor", |c| c.update_contractor(&id, &patch))?;
        self.load_contractors();
        Ok(updated)
    }

    pub fn delete_contractor(&mut self, reference: &str) -> Result<Value> {
        let id = self.resolve_contractor(reference)?;
        let out = self.run("Delete contractor", |c| c.delete_contractor(&id))?;
        self.load_contractors();
        Ok(out)
    }

    /// Attach a skip to a contractor given by name or id
    pub fn assign_bin(&mut self, form: BinAssignmentForm) -> Result<AssignmentReceipt> {
        let errors = validate_assignment(&form);
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }
        if self.contractors.is_empty() {
            self.load_contractors();
        }
        let contractor_id = match self.resolve_contractor(form.contractor.trim()) {
            Ok(id) => id,
            Err(e) => return Err(self.fail("Assign bin", e)),
        };
        let skip_qr = form.skip_qr.trim().to_string();
        self.run("Assign bin", |c| c.assign_bin(&skip_qr, &contractor_id))
    }

    pub fn unassign_bin(&mut self, skip_qr: &str) -> Result<Value> {
        let skip_qr = skip_qr.trim();
        if skip_qr.is_empty() {
            return Err(invalid("skip_qr", "QR code required"));
        }
        self.run("Unassign bin", |c| c.unassign_bin(skip_qr))
    }

    pub fn current_assignment(&mut self, skip_qr: &str) -> Result<CurrentAssignment> {
        self.run("Current owner", |c| c.current_assignment(skip_qr.trim()))
    }

    /// Validate, create the skip, and build its label links from the new id
    pub fn create_skip(&mut self, form: SkipCreateIn) -> Result<CreatedSkip> {
        const LABEL: &str = "Create skip";
        let form = SkipCreateIn {
            qr: form.qr.trim().to_string(),
            color: form.color.trim().to_string(),
            size: form.size.trim().to_string(),
            notes: trimmed(form.notes),
        };
        let errors = validate_skip(&form, self.meta());
        if !errors.is_empty() {
            self.toaster()
                .error("Please fix the highlighted fields", Some(LABEL), None);
            return Err(Error::Validation(errors));
        }

        let receipt = self.run(LABEL, |c| c.admin_create_skip(&form))?;
        if receipt.id.trim().is_empty() {
            return Err(self.fail(
                LABEL,
                Error::UnexpectedResponse("no skip id in response".to_string()),
            ));
        }
        let labels = self.client().label_links(&receipt.id);
        Ok(CreatedSkip {
            qr_code: receipt.qr_code.filter(|q| !q.is_empty()).unwrap_or(form.qr),
            id: receipt.id,
            owner_org_id: None,
            labels,
        })
    }

    /// Create a skip for an owner organisation; labels come from the server
    pub fn create_owned_skip(&mut self, form: OwnedSkipIn) -> Result<CreatedSkip> {
        const LABEL: &str = "Create labels";
        let form = OwnedSkipIn {
            owner_org_id: form.owner_org_id.trim().to_string(),
            qr_code: trimmed(form.qr_code),
            assigned_commodity_id: trimmed(form.assigned_commodity_id),
            zone_id: trimmed(form.zone_id),
        };
        let errors = validate_owned_skip(&form);
        if !errors.is_empty() {
            self.toaster()
                .error("Please fix the highlighted fields", Some(LABEL), None);
            return Err(Error::Validation(errors));
        }
        self.run(LABEL, |c| c.create_owned_skip(&form))
    }

    /// Id of the configured driver, resolved through the admin list
    fn scheduled_driver(&mut self, label: &str) -> Result<String> {
        let Some(reference) = self.config().driver_ref.clone() else {
            return Err(Error::NotConfigured(NO_DRIVER_MESSAGE.to_string()));
        };
        self.resolve_driver(&reference).map_err(|e| self.fail(label, e))
    }

    /// Schedule of the configured driver
    pub fn my_tasks(&mut self) -> Result<Value> {
        const LABEL: &str = "My tasks";
        let driver_id = self.scheduled_driver(LABEL)?;
        self.run(LABEL, |c| c.driver_schedule(&driver_id))
    }

    /// Mark a task done and return the re-fetched schedule
    pub fn mark_task_done(&mut self, task_id: &str) -> Result<Value> {
        let driver_id = self.scheduled_driver("Task done")?;
        self.run("Task done", |c| c.mark_task_done(task_id))?;
        self.run("My tasks", |c| c.driver_schedule(&driver_id))
    }

    /// Walk one skip through its whole lifecycle, stopping at the first error
    pub fn run_lifecycle_demo(&mut self, demo: &DemoInputs) -> Result<Vec<(String, Value)>> {
        let mut steps = Vec::new();

        let qr = demo.qr.as_str();
        let out = self.run("DEV ensure-skip", |c| c.ensure_skip_dev(qr))?;
        steps.push(("DEV ensure-skip".to_string(), out));

        let out = self.run("driver/scan", |c| c.scan(qr))?;
        steps.push(("driver/scan".to_string(), out));

        let deliver = DeliverEmpty {
            skip_qr: demo.qr.clone(),
            to_zone_id: demo.zone_c.clone(),
            driver_name: demo.driver_name.clone(),
            vehicle_reg: Some(demo.vehicle_reg.clone()),
        };
        let out = self.run("driver/deliver-empty", |c| c.deliver_empty(&deliver))?;
        steps.push(("driver/deliver-empty".to_string(), out));

        let relocate = RelocateEmpty {
            skip_qr: demo.qr.clone(),
            from_zone_id: Some(demo.zone_a.clone()),
            to_zone_id: demo.zone_b.clone(),
            driver_name: demo.driver_name.clone(),
        };
        let out = self.run("driver/relocate-empty", |c| c.relocate_empty(&relocate))?;
        steps.push(("driver/relocate-empty".to_string(), out));

        let collect = CollectFull {
            skip_qr: demo.qr.clone(),
            destination_type: demo.destination_type.clone(),
            destination_name: demo.destination_name.clone(),
            weight_source: "WEIGHBRIDGE".to_string(),
            gross_kg: Some(demo.gross_kg),
            tare_kg: Some(demo.tare_kg),
            net_kg: None,
            driver_name: demo.driver_name.clone(),
            site_id: Some(demo.site_id.clone()),
            vehicle_reg: Some(demo.vehicle_reg.clone()),
        };
        let out = self.run("driver/collect-full", |c| c.collect_full(&collect))?;
        steps.push(("driver/collect-full".to_string(), out));

        let ret = ReturnEmpty {
            skip_qr: demo.qr.clone(),
            to_zone_id: demo.zone_c.clone(),
            driver_name: demo.driver_name.clone(),
        };
        let out = self.run("driver/return-empty", |c| c.return_empty(&ret))?;
        steps.push(("driver/return-empty".to_string(), out));

        Ok(steps)
    }
}
