//! Admin CRUD for drivers, vehicles, contractors and bin assignments

use serde_json::Value;
use wm_types::{
    AssignmentReceipt, Contractor, ContractorPatch, CurrentAssignment, Driver, DriverPatch,
    NewContractor, NewDriver, NewVehicle, Result, Vehicle, VehiclePatch,
};

use crate::client::{segment, with_query, ApiClient};

impl ApiClient {
    pub fn list_drivers(&self) -> Result<Vec<Driver>> {
        self.get("/admin/drivers")
    }

    pub fn get_driver(&self, id: &str) -> Result<Driver> {
        self.get(&format!("/admin/drivers/{}", segment(id)))
    }

    pub fn create_driver(&self, driver: &NewDriver) -> Result<Driver> {
        self.post("/admin/drivers", driver)
    }

    pub fn update_driver(&self, id: &str, patch: &DriverPatch) -> Result<Driver> {
        self.patch(&format!("/admin/drivers/{}", segment(id)), patch)
    }

    pub fn delete_driver(&self, id: &str) -> Result<Value> {
        self.delete(&format!("/admin/drivers/{}", segment(id)))
    }

    pub fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
        self.get("/admin/vehicles")
    }

    pub fn get_vehicle(&self, id: &str) -> Result<Vehicle> {
        self.get(&format!("/admin/vehicles/{}", segment(id)))
    }

    pub fn create_vehicle(&self, vehicle: &NewVehicle) -> Result<Vehicle> {
        self.post("/admin/vehicles", vehicle)
    }

    pub fn update_vehicle(&self, id: &str, patch: &VehiclePatch) -> Result<Vehicle> {
        self.patch(&format!("/admin/vehicles/{}", segment(id)), patch)
    }

    pub fn delete_vehicle(&self, id: &str) -> Result<Value> {
        self.delete(&format!("/admin/vehicles/{}", segment(id)))
    }

    pub fn list_contractors(&self) -> Result<Vec<Contractor>> {
        self.get("/admin/contractors")
    }

    pub fn get_contractor(&self, id: &str) -> Result<Contractor> {
        self.get(&format!("/admin/contractors/{}", segment(id)))
    }

    pub fn create_contractor(&self, contractor: &NewContractor) -> Result<Contractor> {
        self.post("/admin/contractors", contractor)
    }

    pub fn update_contractor(&self, id: &str, patch: &ContractorPatch) -> Result<Contractor> {
        self.patch(&format!("/admin/contractors/{}", segment(id)), patch)
    }

    pub fn delete_contractor(&self, id: &str) -> Result<Value> {
        self.delete(&format!("/admin/contractors/{}", segment(id)))
    }

    /// Attach a skip to a contractor, closing any active assignment
    pub fn assign_bin(&self, skip_qr: &str, contractor_id: &str) -> Result<AssignmentReceipt> {
        self.post(
            &with_query(
                "/admin/bin-assignments/assign",
                &[("skip_qr", skip_qr), ("contractor_id", contractor_id)],
            ),
            &serde_json::json!({}),
        )
    }

    pub fn unassign_bin(&self, skip_qr: &str) -> Result<Value> {
        self.post(
            &with_query("/admin/bin-assignments/unassign", &[("skip_qr", skip_qr)]),
            &serde_json::json!({}),
        )
    }

    /// Current owner of a skip; `contractor` is `None` when unassigned
    pub fn current_assignment(&self, skip_qr: &str) -> Result<CurrentAssignment> {
        self.get(&with_query("/admin/bin-assignments/current", &[("skip_qr", skip_qr)]))
    }
}
