//! facfind show - Show one faculty profile

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::emit_json;
use crate::error::{FfError, Result};
use crate::storage::FacultyProfile;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Faculty id
    pub id: i64,
}

pub fn run(ctx: &AppContext, args: &ShowArgs) -> Result<()> {
    let store = ctx.open_store()?;
    let profile = store
        .get(args.id)?
        .ok_or_else(|| FfError::NotFound(format!("faculty {}", args.id)))?;

    if ctx.is_json() {
        return emit_json(&profile);
    }
    show_human(&profile);
    Ok(())
}

fn show_human(profile: &FacultyProfile) {
    let name = profile.name.as_deref().unwrap_or("(unnamed)");
    println!("{}", name.bold());
    println!("{}", "═".repeat(name.chars().count()));
    println!();

    println!("{}: {}", "ID".dimmed(), profile.id);
    field("Type", profile.faculty_type.as_deref());
    field("Education", profile.education.as_deref());
    field("Research", profile.research.as_deref());
    field("Specializations", profile.specializations.as_deref());
    field("Topics", profile.topics.as_deref());
    field("Address", profile.address.as_deref());

    if let Some(emails) = profile.email.as_ref().filter(|e| !e.is_empty()) {
        println!("{}: {}", "Email".dimmed(), emails.join(", "));
    }
    if let Some(phone) = &profile.phone {
        if !phone.mobile.is_empty() {
            println!("{}: {}", "Mobile".dimmed(), phone.mobile.join(", "));
        }
        if !phone.landline.is_empty() {
            println!("{}: {}", "Landline".dimmed(), phone.landline.join(", "));
        }
    }
    if let (Some(citations), Some(works)) = (profile.citations, profile.works_count) {
        println!("{}: {citations} citations, {works} works", "Impact".dimmed());
    }

    list("Teaching", profile.teaching.as_deref());
    list("Publications", profile.publications.as_deref());

    if let Some(links) = profile.website_links.as_ref().filter(|l| !l.is_empty()) {
        println!();
        println!("{}", "Links".bold());
        for (label, urls) in links {
            for url in urls {
                println!("  {} {}", format!("{label}:").dimmed(), url);
            }
        }
    }

    if let Some(bio) = profile.biography.as_deref() {
        println!();
        println!("{}", "Biography".bold());
        println!("{bio}");
    }
}

fn field(label: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        println!("{}: {}", label.dimmed(), value);
    }
}

fn list(label: &str, items: Option<&[String]>) {
    let Some(items) = items.filter(|items| !items.is_empty()) else {
        return;
    };
    println!();
    println!("{}", label.bold());
    for item in items {
        println!("  - {item}");
    }
}
