//! facfind list - List or filter faculty profiles in the store

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::emit_json;
use crate::error::Result;
use crate::storage::{FacultyProfile, FacultyType};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Case-insensitive substring of the name
    #[arg(long, conflicts_with_all = ["faculty_type", "keyword"])]
    pub name: Option<String>,

    /// Faculty type: faculty, adjunct-faculty, adjunct-faculty-international,
    /// distinguished-professor, professor-practice
    #[arg(long = "type", conflicts_with = "keyword")]
    pub faculty_type: Option<FacultyType>,

    /// Keyword in research, teaching or specializations
    #[arg(long)]
    pub keyword: Option<String>,

    /// Maximum number of profiles to show
    #[arg(long, short = 'n', default_value = "50")]
    pub limit: usize,

    /// Offset for pagination
    #[arg(long, default_value = "0")]
    pub offset: usize,
}

#[derive(Serialize)]
struct ListReport<'a> {
    count: usize,
    offset: usize,
    faculty: &'a [FacultyProfile],
}

pub fn run(ctx: &AppContext, args: &ListArgs) -> Result<()> {
    let store = ctx.open_store()?;

    let profiles = if let Some(name) = &args.name {
        page(store.find_by_name(name)?, args)
    } else if let Some(faculty_type) = args.faculty_type {
        page(store.find_by_type(faculty_type)?, args)
    } else if let Some(keyword) = &args.keyword {
        page(store.keyword_search(keyword)?, args)
    } else {
        store.list(args.limit, args.offset)?
    };

    if ctx.is_json() {
        return emit_json(&ListReport {
            count: profiles.len(),
            offset: args.offset,
            faculty: &profiles,
        });
    }

    if profiles.is_empty() {
        println!("{} No faculty matched", "!".yellow());
        return Ok(());
    }

    for profile in &profiles {
        println!(
            "{:>6}  {}  {}",
            profile.id.to_string().dimmed(),
            profile.name.as_deref().unwrap_or("(unnamed)").bold(),
            profile.faculty_type.as_deref().unwrap_or("").cyan()
        );
    }
    println!();
    println!("{} profiles", profiles.len().to_string().bold());
    Ok(())
}

fn page(profiles: Vec<FacultyProfile>, args: &ListArgs) -> Vec<FacultyProfile> {
    profiles
        .into_iter()
        .skip(args.offset)
        .take(args.limit)
        .collect()
}
