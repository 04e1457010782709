//! Output formatting module

use std::path::Path;

use serde::Serialize;
use serde_json::{json, Value};
use wm_app::api::schedule_items;
use wm_app::{Config, PreloadSummary};
use wm_domain::model::ToastKind;
use wm_domain::service::{find_wtn_url, ResultLog, Toaster};
use wm_types::{
    CreatedSkip, Job, Labelled, MetaConfig, OutputFormat, RecentWtns, Result, WtnPage, WtnReady,
};

/// Prints results as aligned text or pretty JSON
pub struct Printer {
    format: OutputFormat,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn heading(title: &str) {
    println!("\n{}", title);
    println!("{}", "=".repeat(title.chars().count()));
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|s| !s.is_empty()).unwrap_or("-")
}

impl Printer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Any serializable payload; tables fall back to indented JSON
    pub fn value<T: Serialize + ?Sized>(&self, title: &str, value: &T) -> Result<()> {
        if self.json() {
            return print_json(value);
        }
        heading(title);
        let value = serde_json::to_value(value)?;
        match &value {
            Value::Null => println!("(no content)"),
            Value::String(s) => println!("{}", s),
            other => println!("{}", serde_json::to_string_pretty(other)?),
        }
        if let Some(url) = find_wtn_url(&value) {
            println!("\nWTN: {}", url);
        }
        Ok(())
    }

    /// Payload of an endpoint the server may not expose
    pub fn optional(&self, title: &str, value: Option<&Value>) -> Result<()> {
        match value {
            Some(v) => self.value(title, v),
            None if self.json() => print_json(&Value::Null),
            None => {
                println!("{}: not available on this server", title);
                Ok(())
            }
        }
    }

    pub fn config(&self, config: &Config, wtn_auto_open: bool, storage: &Path) -> Result<()> {
        if self.json() {
            let mut shown = config.redacted();
            shown["wtnAutoOpen"] = json!(wtn_auto_open);
            shown["storage"] = json!(storage.display().to_string());
            return print_json(&shown);
        }
        print!("{}", config);
        println!("WTN auto-open: {}", if wtn_auto_open { "on" } else { "off" });
        println!("\nStorage: {}", storage.display());
        Ok(())
    }

    pub fn entities<T: Labelled + Serialize>(&self, title: &str, items: &[T]) -> Result<()> {
        if self.json() {
            return print_json(items);
        }
        heading(&format!("{} ({})", title, items.len()));
        if items.is_empty() {
            println!("(none)");
        }
        for item in items {
            println!("{:<38} {}", item.id(), item.label());
        }
        Ok(())
    }

    pub fn entity<T: Labelled + Serialize>(&self, title: &str, item: &T) -> Result<()> {
        if self.json() {
            return print_json(item);
        }
        println!("{}: {} ({})", title, item.label(), item.id());
        Ok(())
    }

    pub fn meta(&self, meta: &MetaConfig) -> Result<()> {
        if self.json() {
            return print_json(meta);
        }
        heading("Skip colors");
        for (_, label) in meta.color_options() {
            println!("  {}", label);
        }
        heading("Skip sizes");
        for (group, sizes) in &meta.skip.sizes {
            println!("  {:<12} {}", group, sizes.join(", "));
        }
        Ok(())
    }

    pub fn preload(&self, summary: &PreloadSummary, contractors: usize) -> Result<()> {
        if self.json() {
            return print_json(&json!({
                "drivers": summary.drivers,
                "vehicles": summary.vehicles,
                "contractors": contractors,
                "errors": summary.errors,
            }));
        }
        println!("Drivers:     {}", summary.drivers);
        println!("Vehicles:    {}", summary.vehicles);
        println!("Contractors: {}", contractors);
        Ok(())
    }

    pub fn jobs(&self, jobs: &[Job]) -> Result<()> {
        if self.json() {
            return print_json(jobs);
        }
        heading(&format!("Jobs ({})", jobs.len()));
        for job in jobs {
            println!(
                "{:<38} {:<15} {:<12} {:<12} {}",
                job.id,
                job.job_type.as_str(),
                job.status.as_str(),
                or_dash(job.skip_qr.as_deref()),
                or_dash(job.assigned_driver_id.as_deref()),
            );
        }
        Ok(())
    }

    /// A driver schedule, either a bare list or `{driver, items}`
    pub fn schedule(&self, schedule: &Value) -> Result<()> {
        if self.json() {
            return print_json(schedule);
        }
        let items = schedule_items(schedule);
        heading(&format!("My tasks ({})", items.len()));
        if items.is_empty() {
            println!("No tasks scheduled");
        }
        for item in items {
            let field = |k: &str| item.get(k).and_then(Value::as_str).map(str::to_string);
            let id = item
                .get("id")
                .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                .unwrap_or_default();
            println!(
                "{:<38} {:<15} {:<12} {}",
                id,
                or_dash(field("type").as_deref()),
                or_dash(field("status").as_deref()),
                or_dash(field("skip_qr").as_deref()),
            );
        }
        Ok(())
    }

    pub fn created_skip(&self, created: &CreatedSkip) -> Result<()> {
        if self.json() {
            return print_json(created);
        }
        println!("Skip created: {} (QR {})", created.id, created.qr_code);
        if let Some(owner) = &created.owner_org_id {
            println!("Owner org: {}", owner);
        }
        println!("\nLabels PDF: {}", created.labels.pdf);
        for (i, png) in created.labels.pngs.iter().enumerate() {
            println!("Label PNG {}: {}", i + 1, png);
        }
        Ok(())
    }

    pub fn wtn_ready(&self, ready: &WtnReady) {
        if !self.json() {
            match &ready.id {
                Some(id) => println!("\nWTN {} ready: {}", id, ready.url),
                None => println!("\nWTN ready: {}", ready.url),
            }
        }
    }

    pub fn wtn_page(&self, page: &WtnPage) -> Result<()> {
        if self.json() {
            return print_json(page);
        }
        heading(&format!(
            "Waste transfer notes (page {} of {}, {} total)",
            page.page,
            page.page_count(),
            page.total
        ));
        for item in &page.items {
            println!(
                "{:<38} {:<14} {:<20} {:<16} {}",
                item.id,
                or_dash(item.number.as_deref()),
                or_dash(item.created_at.as_deref()),
                or_dash(item.waste_type.as_deref()),
                or_dash(item.destination.as_deref()),
            );
        }
        Ok(())
    }

    pub fn recent_wtns(&self, recent: Option<&RecentWtns>) -> Result<()> {
        let Some(recent) = recent else {
            return self.optional("Latest WTNs", None);
        };
        if self.json() {
            return print_json(recent);
        }
        heading(&format!("Latest WTNs ({} stored)", recent.count));
        for item in &recent.items {
            println!(
                "{:<38} {:<26} {}",
                item.id,
                or_dash(item.created_at.as_deref()),
                or_dash(item.pdf_url.as_deref()),
            );
        }
        Ok(())
    }

    /// Session log, oldest first
    pub fn result_log(&self, log: &ResultLog) -> Result<()> {
        let mut entries: Vec<_> = log.entries().collect();
        entries.reverse();
        if self.json() {
            return print_json(&entries);
        }
        for entry in entries {
            heading(&format!("{} [{}]", entry.title, entry.at.format("%H:%M:%S")));
            println!("{}", serde_json::to_string_pretty(&entry.payload)?);
        }
        Ok(())
    }
}

/// Toasts raised during the command, oldest first, on stderr
pub fn print_toasts(toaster: &Toaster) {
    for toast in toaster.snapshot().iter().rev() {
        let tag = match toast.kind {
            ToastKind::Info => "info",
            ToastKind::Success => "ok",
            ToastKind::Error => "error",
        };
        match (&toast.title, &toast.message) {
            (Some(title), Some(message)) => eprintln!("[{}] {}: {}", tag, title, message),
            (Some(text), None) | (None, Some(text)) => eprintln!("[{}] {}", tag, text),
            (None, None) => {}
        }
    }
}
