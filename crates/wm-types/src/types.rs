//! Client-side copies of backend entities and request payloads

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Accept ids the backend sends as strings, UUIDs or integers
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}

/// Size groups arrive as `{"sizes_m3": [6, 8, 12]}` or as strings
fn size_groups<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: BTreeMap<String, Vec<Value>> = Option::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .map(|(group, items)| {
            let items = items
                .into_iter()
                .map(|v| match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect();
            (group, items)
        })
        .collect())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Which kind of backend entity a reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Driver,
    Vehicle,
    Contractor,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Driver => write!(f, "driver"),
            EntityKind::Vehicle => write!(f, "vehicle"),
            EntityKind::Contractor => write!(f, "contractor"),
        }
    }
}

/// Anything with a server id and a human label
pub trait Labelled {
    fn id(&self) -> &str;
    fn label(&self) -> String;
}

// ---------------------------------------------------------------------------
// Drivers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub license_no: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl Labelled for Driver {
    fn id(&self) -> &str {
        &self.id
    }

    /// full name, then name, then email, then phone
    fn label(&self) -> String {
        non_empty(&self.full_name)
            .or_else(|| non_empty(&self.name))
            .or_else(|| non_empty(&self.email))
            .or_else(|| non_empty(&self.phone))
            .unwrap_or("(unnamed)")
            .to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewDriver {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl NewDriver {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

// ---------------------------------------------------------------------------
// Vehicles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub reg_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl Labelled for Vehicle {
    fn id(&self) -> &str {
        &self.id
    }

    /// registration, then plate, then id
    fn label(&self) -> String {
        non_empty(&self.reg_no)
            .or_else(|| non_empty(&self.plate))
            .or_else(|| Some(self.id.as_str()).filter(|s| !s.is_empty()))
            .unwrap_or("(no reg)")
            .to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewVehicle {
    pub reg_no: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl NewVehicle {
    pub fn registered(reg_no: impl Into<String>) -> Self {
        Self {
            reg_no: reg_no.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehiclePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reg_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

// ---------------------------------------------------------------------------
// Contractors and bin assignments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contractor {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub org_name: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub billing_address: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl Labelled for Contractor {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        non_empty(&self.org_name)
            .or_else(|| non_empty(&self.contact_name))
            .unwrap_or(self.id.as_str())
            .to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewContractor {
    pub org_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractorPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Form state for attaching a skip to a contractor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinAssignmentForm {
    pub skip_qr: String,
    pub contractor: String,
}

/// Returned by `/admin/bin-assignments/assign`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentReceipt {
    #[serde(deserialize_with = "string_or_number")]
    pub skip_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub contractor_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub assignment_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractorRef {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub org_name: Option<String>,
}

/// Returned by `/admin/bin-assignments/current`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentAssignment {
    #[serde(deserialize_with = "string_or_number")]
    pub skip_id: String,
    #[serde(default)]
    pub contractor: Option<ContractorRef>,
    #[serde(default)]
    pub assigned_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    DeliverEmpty,
    RelocateEmpty,
    CollectFull,
    ReturnEmpty,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::DeliverEmpty => "DELIVER_EMPTY",
            JobType::RelocateEmpty => "RELOCATE_EMPTY",
            JobType::CollectFull => "COLLECT_FULL",
            JobType::ReturnEmpty => "RETURN_EMPTY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    InProgress,
    Done,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Done => "DONE",
            JobStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub status: JobStatus,
    #[serde(default)]
    pub skip_qr: Option<String>,
    #[serde(default)]
    pub from_zone_id: Option<String>,
    #[serde(default)]
    pub to_zone_id: Option<String>,
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default)]
    pub destination_type: Option<String>,
    #[serde(default)]
    pub destination_name: Option<String>,
    #[serde(default)]
    pub window_start: Option<chrono::DateTime<chrono::FixedOffset>>,
    #[serde(default)]
    pub window_end: Option<chrono::DateTime<chrono::FixedOffset>>,
    #[serde(default)]
    pub assigned_driver_id: Option<String>,
    #[serde(default)]
    pub assigned_vehicle_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJob {
    #[serde(rename = "type")]
    pub job_type: JobType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_qr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_zone_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_zone_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_start: Option<chrono::DateTime<chrono::FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_end: Option<chrono::DateTime<chrono::FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_driver_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_vehicle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewJob {
    /// A pending job of the given type with every other field unset
    pub fn pending(job_type: JobType) -> Self {
        Self {
            job_type,
            status: Some(JobStatus::Pending),
            skip_qr: None,
            from_zone_id: None,
            to_zone_id: None,
            site_id: None,
            destination_type: None,
            destination_name: None,
            window_start: None,
            window_end: None,
            assigned_driver_id: None,
            assigned_vehicle_id: None,
            notes: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub job_type: Option<JobType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_qr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_zone_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_driver_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_vehicle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Driver flow payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliverEmpty {
    pub skip_qr: String,
    pub to_zone_id: String,
    pub driver_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_reg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelocateEmpty {
    pub skip_qr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_zone_id: Option<String>,
    pub to_zone_id: String,
    pub driver_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectFull {
    pub skip_qr: String,
    pub destination_type: String,
    pub destination_name: String,
    pub weight_source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tare_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_kg: Option<f64>,
    pub driver_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_reg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnEmpty {
    pub skip_qr: String,
    pub to_zone_id: String,
    pub driver_name: String,
}

/// Drop a full skip at a transfer facility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityDrop {
    pub skip_qr: String,
    pub facility_name: String,
    pub weight_source: String,
    pub gross_kg: Option<f64>,
    pub tare_kg: Option<f64>,
    pub net_kg: Option<f64>,
    pub driver_name: String,
    pub vehicle_reg: Option<String>,
    pub site_id: Option<String>,
}

impl From<FacilityDrop> for CollectFull {
    fn from(drop: FacilityDrop) -> Self {
        Self {
            skip_qr: drop.skip_qr,
            destination_type: "TRANSFER".to_string(),
            destination_name: drop.facility_name,
            weight_source: drop.weight_source,
            gross_kg: drop.gross_kg,
            tare_kg: drop.tare_kg,
            net_kg: drop.net_kg,
            driver_name: drop.driver_name,
            site_id: drop.site_id,
            vehicle_reg: drop.vehicle_reg,
        }
    }
}

// ---------------------------------------------------------------------------
// Skips, meta and labels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkipCreateIn {
    pub qr: String,
    pub color: String,
    pub size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Returned by the seed endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedReceipt {
    #[serde(alias = "skip_id", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub qr_code: Option<String>,
}

/// Download links for a skip's printable labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelLinks {
    pub pdf: String,
    pub pngs: Vec<String>,
}

/// A created skip plus its label links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedSkip {
    pub id: String,
    pub qr_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_org_id: Option<String>,
    pub labels: LabelLinks,
}

/// Body of `POST /skips`; the server issues a QR code when none is given
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnedSkipIn {
    pub owner_org_id: String,
    pub qr_code: Option<String>,
    pub assigned_commodity_id: Option<String>,
    pub zone_id: Option<String>,
}

/// Returned by `POST /skips`, with server-rendered label assets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkipOut {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub qr_code: String,
    pub owner_org_id: String,
    pub labels_pdf_url: String,
    #[serde(default)]
    pub label_png_urls: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkipMeta {
    #[serde(default)]
    pub colors: BTreeMap<String, Value>,
    #[serde(default, deserialize_with = "size_groups")]
    pub sizes: BTreeMap<String, Vec<String>>,
}

/// Subset of `/meta/config` the console needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaConfig {
    #[serde(default)]
    pub skip: SkipMeta,
}

impl MetaConfig {
    /// Used when `/meta/config` is unavailable
    pub fn fallback() -> Self {
        let mut colors = BTreeMap::new();
        colors.insert("green".to_string(), serde_json::json!({ "label": "Recycling" }));
        let mut sizes = BTreeMap::new();
        sizes.insert(
            "sizes_m3".to_string(),
            vec!["6".to_string(), "8".to_string(), "12".to_string()],
        );
        Self {
            skip: SkipMeta { colors, sizes },
        }
    }

    /// `(key, "key — meaning")` pairs for the color picker
    pub fn color_options(&self) -> Vec<(String, String)> {
        self.skip
            .colors
            .iter()
            .map(|(key, val)| {
                let meaning = ["label", "name", "meaning"]
                    .iter()
                    .find_map(|k| val.get(k).and_then(Value::as_str))
                    .unwrap_or(key.as_str());
                (key.clone(), format!("{key} — {meaning}"))
            })
            .collect()
    }

    pub fn has_color(&self, key: &str) -> bool {
        self.skip.colors.contains_key(key)
    }

    pub fn has_size(&self, size: &str) -> bool {
        self.skip
            .sizes
            .values()
            .any(|items| items.iter().any(|s| s == size))
    }
}

// ---------------------------------------------------------------------------
// Waste transfer notes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WtnItem {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub waste_type: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub vehicle_reg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WtnPage {
    pub items: Vec<WtnItem>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl WtnPage {
    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            return 1;
        }
        self.total.div_ceil(u64::from(self.page_size)).max(1)
    }
}

/// Entry from `/__debug/wtns`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WtnSummary {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecentWtns {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub items: Vec<WtnSummary>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WtnFormat {
    #[default]
    Pdf,
    Html,
}

impl WtnFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            WtnFormat::Pdf => "pdf",
            WtnFormat::Html => "html",
        }
    }
}

/// Broadcast when a collection produced a waste transfer note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WtnReady {
    pub url: String,
    pub id: Option<String>,
}
